//! In-memory transport for testing
//!
//! MI is line based, so the pair moves whole lines: a writer holds bytes
//! back until it sees a newline, and a reader never observes half a line.

use std::io::{self, BufRead, Read, Write};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::MiTransport;
use crate::MiError;

/// In-memory transport
///
/// Lines written to one end of a [`pair`](InMemoryTransport::pair) can be
/// read from the other, so a test can act as GDB without spawning it.
pub struct InMemoryTransport {
    reader: InMemoryReader,
    writer: InMemoryWriter,
}

/// Reader half of the in-memory transport
///
/// Returns `WouldBlock` when no complete line is waiting and EOF once the
/// other end has been dropped.
pub struct InMemoryReader {
    line: Vec<u8>,
    consumed: usize,
    rx: Receiver<Vec<u8>>,
}

/// Writer half of the in-memory transport
pub struct InMemoryWriter {
    // bytes after the last newline written
    pending: Vec<u8>,
    tx: Sender<Vec<u8>>,
}

impl InMemoryTransport {
    /// Create a connected pair, `(client, gdb)`
    pub fn pair() -> (Self, Self) {
        let (client_tx, gdb_rx) = crossbeam_channel::unbounded();
        let (gdb_tx, client_rx) = crossbeam_channel::unbounded();

        let client = Self {
            reader: InMemoryReader::new(client_rx),
            writer: InMemoryWriter::new(client_tx),
        };
        let gdb = Self {
            reader: InMemoryReader::new(gdb_rx),
            writer: InMemoryWriter::new(gdb_tx),
        };
        (client, gdb)
    }
}

impl MiTransport for InMemoryTransport {
    type Reader = InMemoryReader;
    type Writer = InMemoryWriter;

    fn split(self) -> Result<(Self::Reader, Self::Writer), MiError> {
        Ok((self.reader, self.writer))
    }
}

impl InMemoryReader {
    fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            line: Vec::new(),
            consumed: 0,
            rx,
        }
    }
}

impl BufRead for InMemoryReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.consumed >= self.line.len() {
            match self.rx.try_recv() {
                Ok(line) => {
                    self.line = line;
                    self.consumed = 0;
                }
                Err(TryRecvError::Empty) => {
                    return Err(io::Error::new(io::ErrorKind::WouldBlock, "no line available"));
                }
                Err(TryRecvError::Disconnected) => return Ok(&[]),
            }
        }
        Ok(&self.line[self.consumed..])
    }

    fn consume(&mut self, amt: usize) {
        self.consumed = (self.consumed + amt).min(self.line.len());
    }
}

impl Read for InMemoryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let len = available.len().min(buf.len());
        buf[..len].copy_from_slice(&available[..len]);
        self.consume(len);
        Ok(len)
    }
}

impl InMemoryWriter {
    fn new(tx: Sender<Vec<u8>>) -> Self {
        Self {
            pending: Vec::new(),
            tx,
        }
    }

    fn send(&self, line: Vec<u8>) -> io::Result<()> {
        self.tx
            .send(line)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "other end dropped"))
    }
}

impl Write for InMemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let rest = self.pending.split_off(end + 1);
            let line = std::mem::replace(&mut self.pending, rest);
            self.send(line)?;
        }
        Ok(buf.len())
    }

    /// Lines are delivered as soon as they are complete; an unterminated
    /// tail stays buffered until its newline arrives or the writer is dropped.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for InMemoryWriter {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            let _ = self.send(line);
        }
    }
}
