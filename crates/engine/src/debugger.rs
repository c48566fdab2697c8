use crate::{BreakpointInfo, Location, SyncError};

/// What the engine needs to know about the debugger session
pub trait Debugger {
    /// The source line execution is stopped at, or the debugger's default
    /// listing location when nothing is running
    fn current_location(&self) -> Result<Location, SyncError>;

    /// Resolve a symbolic location such as `main` or `prog.c:42`
    fn resolve(&self, spec: &str) -> Result<Location, SyncError>;

    /// Where the function `name` is declared, if it names a function
    fn function_location(&self, name: &str) -> Result<Option<Location>, SyncError>;

    /// Whether the debuggee is live
    fn is_executing(&self) -> bool;

    fn list_breakpoints(&self) -> Result<Vec<BreakpointInfo>, SyncError>;

    /// Commands typed by the user, most recent last
    fn recent_command_history(&self) -> Vec<String>;
}
