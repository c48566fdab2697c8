//! The GDB side of the synchronisation
//!
//! [`GdbDebugger`] answers the engine's questions about the session using
//! GDB/MI, forwards commands typed by the user and remembers them.
//! [`translate`] turns MI notifications into [`engine::DebuggerEvent`]s.
mod debugger;
mod events;
mod history;
mod mi;

pub use debugger::{Executed, GdbDebugger};
pub use events::{loads_executable, translate};
pub use history::CommandHistory;
