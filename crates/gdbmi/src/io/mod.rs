//! IO abstraction for talking to GDB
//!
//! GDB normally runs as a child process with its standard streams piped to
//! us ([`ProcessTransport`]). Tests substitute [`InMemoryTransport`] and play
//! the part of GDB themselves.
//!
//! ```
//! use gdbmi::{Client, io::InMemoryTransport};
//!
//! let (client_transport, _gdb) = InMemoryTransport::pair();
//! let (tx, _rx) = crossbeam_channel::unbounded();
//! let client = Client::with_transport(client_transport, tx)?;
//! # Ok::<(), gdbmi::MiError>(())
//! ```

use std::io::{BufRead, Write};

use crate::MiError;

mod memory;
mod process;

pub use memory::{InMemoryReader, InMemoryTransport, InMemoryWriter};
pub use process::{ProcessTransport, ProcessWriter};

/// A bidirectional line stream to GDB
///
/// The reader half is moved into a background thread, the writer half stays
/// with the client. Readers may return `WouldBlock` when no data is available.
pub trait MiTransport: Send + 'static {
    type Reader: BufRead + Send + 'static;
    type Writer: Write + Send + 'static;

    /// Split the transport into separate reader and writer halves
    fn split(self) -> Result<(Self::Reader, Self::Writer), MiError>;
}
