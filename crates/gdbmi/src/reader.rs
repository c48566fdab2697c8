//! Line-oriented reader turning GDB output into [`Record`]s
use std::io::{self, BufRead};

use crate::{MiError, Record};

/// Result of polling the reader
#[derive(Debug)]
pub enum PollResult {
    /// A complete line was read
    Record(Record),
    /// GDB closed its output
    Closed,
    /// The underlying input had nothing to offer yet
    Timeout,
}

pub struct Reader<R> {
    input: R,
    // partial line kept across `WouldBlock`, as bytes since the debuggee
    // shares GDB's stdout and may print anything
    buffer: Vec<u8>,
}

impl<R> Reader<R>
where
    R: BufRead,
{
    pub fn new(input: R) -> Self {
        Self {
            input,
            buffer: Vec::new(),
        }
    }

    /// Read the next line of output
    ///
    /// If the input reports `WouldBlock` half way through a line, the bytes
    /// read so far are retained and the line is completed by a later call.
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    pub fn poll_record(&mut self) -> Result<PollResult, MiError> {
        loop {
            match self.input.read_until(b'\n', &mut self.buffer) {
                Ok(0) => {
                    if self.buffer.is_empty() {
                        return Ok(PollResult::Closed);
                    }
                    return Ok(PollResult::Record(self.take_line()));
                }
                Ok(_) => {
                    if self.buffer.last() == Some(&b'\n') {
                        return Ok(PollResult::Record(self.take_line()));
                    }
                    // end of input without a terminator, loop round to see EOF
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    return Ok(PollResult::Timeout);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(MiError::Io(e)),
            }
        }
    }

    fn take_line(&mut self) -> Record {
        let bytes = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&bytes);
        tracing::trace!(line = line.trim_end(), "received line");
        Record::parse(&line)
    }
}
