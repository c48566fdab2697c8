//! Editor/debugger synchronisation
//!
//! Keeps the open file, breakpoint markers and execution-line highlight of an
//! editor in step with a debugger session. The debugger and the editor are
//! reached through the [`Debugger`] and [`Editor`] traits; [`SyncEngine`]
//! works out what has changed since the last pass and sends the difference to
//! the editor as a single batch.
mod batch;
mod commands;
mod debugger;
mod dispatch;
mod editor;
mod engine;
mod error;
pub mod resolver;
mod state;
pub mod tracker;
mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use batch::CommandBatch;
pub use commands::{CommandError, SubCommand};
pub use debugger::Debugger;
pub use dispatch::{DebuggerEvent, is_run_command};
pub use editor::{Editor, Instruction, MarkerKind};
pub use engine::{Status, SyncEngine, UpdateRequest};
pub use error::SyncError;
pub use state::SyncState;
pub use tracker::BreakpointView;
pub use types::{BreakpointId, BreakpointInfo, Location};
