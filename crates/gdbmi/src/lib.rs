//! GDB/MI client
//!
//! This crate speaks the GDB machine interface (`gdb --interpreter=mi3`). It
//! parses MI output records, correlates command results with the token they
//! were sent with, and publishes asynchronous records (stops, breakpoint
//! notifications, stream output) on a channel.
mod client;
mod error;
pub mod io;
mod parse;
pub mod reader;
pub mod records;
mod request_store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{Client, Notification, Response};
pub use error::MiError;
pub use io::{InMemoryTransport, MiTransport, ProcessTransport};
pub use reader::{PollResult, Reader};
pub use records::{AsyncKind, AsyncRecord, Record, ResultClass, ResultRecord, Results, StreamKind, Value};

/// Token prefixed to every command so its result record can be matched up
pub type Token = u64;

/// The prompt GDB prints when it is ready for the next command
pub const PROMPT: &str = "(gdb)";

/// Quote a string as an MI c-string argument
///
/// ```
/// assert_eq!(gdbmi::quote(r#"info line "a b.c":3"#), r#""info line \"a b.c\":3""#);
/// ```
pub fn quote(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 2);
    out.push('"');
    for c in input.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
