//! GDB as a child process

use std::{
    ffi::OsStr,
    io::{self, BufReader, Write},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

use super::MiTransport;
use crate::MiError;

/// A GDB child process speaking MI on its standard streams
pub struct ProcessTransport {
    child: Child,
}

/// Writer half of [`ProcessTransport`]
///
/// Owns the child process and kills it on drop, which in turn closes the
/// reader half.
pub struct ProcessWriter {
    stdin: ChildStdin,
    child: Child,
}

impl ProcessTransport {
    /// Start `gdb` in MI mode, passing `args` after the MI flags
    ///
    /// The user's `.gdbinit` is not read (`-nx`); callers that want an init
    /// file pass `-x FILE` explicitly.
    pub fn spawn<I, S>(gdb: impl AsRef<OsStr>, args: I) -> Result<Self, MiError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        tracing::debug!(gdb = ?gdb.as_ref(), "starting debugger process");
        let child = Command::new(gdb)
            .args(["--interpreter=mi3", "-q", "-nx"])
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(Self { child })
    }
}

impl MiTransport for ProcessTransport {
    type Reader = BufReader<ChildStdout>;
    type Writer = ProcessWriter;

    fn split(mut self) -> Result<(Self::Reader, Self::Writer), MiError> {
        let stdout = self
            .child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("debugger stdout is not piped"))?;
        let stdin = self
            .child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("debugger stdin is not piped"))?;
        Ok((
            BufReader::new(stdout),
            ProcessWriter {
                stdin,
                child: self.child,
            },
        ))
    }
}

impl Write for ProcessWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdin.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdin.flush()
    }
}

impl Drop for ProcessWriter {
    fn drop(&mut self) {
        tracing::debug!("terminating debugger");
        match self.child.kill() {
            Ok(_) => {
                let _ = self.child.wait();
            }
            Err(e) => tracing::warn!(error = %e, "could not terminate debugger process"),
        }
    }
}
