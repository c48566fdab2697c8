//! Error types for the MI client.

use std::{io, time::Duration};

/// Errors that can occur while talking to GDB over MI.
#[derive(Debug, thiserror::Error)]
pub enum MiError {
    /// An I/O error occurred while reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An output line looked like an MI record but could not be parsed.
    #[error("malformed MI record: {0}")]
    Parse(String),

    /// GDB answered a command with `^error`.
    #[error("{message}")]
    Command {
        /// The command that failed.
        command: String,
        /// The error message reported by GDB.
        message: String,
    },

    /// No result record arrived in time.
    #[error("no response to `{command}` after {timeout:?}")]
    Timeout {
        /// The command that timed out.
        command: String,
        /// How long the client waited.
        timeout: Duration,
    },

    /// The connection to GDB was closed.
    #[error("debugger connection closed")]
    Disconnected,
}
