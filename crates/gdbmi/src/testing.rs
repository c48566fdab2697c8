//! A scripted stand-in for GDB, for tests
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::io::{InMemoryTransport, InMemoryWriter, MiTransport};

/// Answers commands arriving on the GDB end of an [`InMemoryTransport`] pair
///
/// The responder is called with each command, token stripped, and returns the
/// lines to print. A line starting with `^` is the result record and gets the
/// command's token prefixed. A prompt is printed after the lines.
pub struct FakeGdb {
    writer: Arc<Mutex<InMemoryWriter>>,
    commands: Arc<Mutex<Vec<String>>>,
}

impl FakeGdb {
    pub fn spawn<F>(transport: InMemoryTransport, mut respond: F) -> Self
    where
        F: FnMut(&str) -> Vec<String> + Send + 'static,
    {
        let (mut reader, writer) = transport.split().expect("in-memory split");
        let writer = Arc::new(Mutex::new(writer));
        let commands = Arc::new(Mutex::new(Vec::new()));

        let thread_writer = Arc::clone(&writer);
        let thread_commands = Arc::clone(&commands);
        thread::spawn(move || {
            let mut line = String::new();
            loop {
                match reader.read_line(&mut line) {
                    Ok(0) => return,
                    Ok(_) if line.ends_with('\n') => {
                        let input = std::mem::take(&mut line);
                        let input = input.trim_end();
                        let split = input
                            .find(|c: char| !c.is_ascii_digit())
                            .unwrap_or(input.len());
                        let (token, command) = input.split_at(split);
                        thread_commands.lock().unwrap().push(command.to_string());

                        let mut writer = thread_writer.lock().unwrap();
                        for out in respond(command) {
                            let out = if out.starts_with('^') {
                                format!("{token}{out}")
                            } else {
                                out
                            };
                            if writeln!(writer, "{out}").is_err() {
                                return;
                            }
                        }
                        if writeln!(writer, "(gdb) ").is_err() {
                            return;
                        }
                    }
                    Ok(_) => {}
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(1));
                    }
                    Err(_) => return,
                }
            }
        });

        Self { writer, commands }
    }

    /// Print an unsolicited line, such as an async record
    pub fn emit(&self, line: &str) {
        let mut writer = self.writer.lock().unwrap();
        let _ = writeln!(writer, "{line}");
    }

    /// Print raw bytes, such as output from the program being debugged
    pub fn emit_bytes(&self, bytes: &[u8]) {
        let mut writer = self.writer.lock().unwrap();
        let _ = writer.write_all(bytes);
    }

    /// Every command received so far, without tokens
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}
