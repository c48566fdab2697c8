use std::path::PathBuf;

/// Errors from a synchronisation pass
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The debugger could not map the request to a source line
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// The editor could not be reached or rejected the batch
    #[error("editor unavailable: {0}")]
    TransportUnavailable(String),

    /// A required configuration file does not exist
    #[error("configuration file {} does not exist", .0.display())]
    ConfigMissing(PathBuf),

    /// Talking to the debugger failed
    #[error("debugger error: {0}")]
    Debugger(String),
}
