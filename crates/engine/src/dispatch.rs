use crate::{BreakpointId, Debugger, Editor, Status, SyncEngine, SyncError, UpdateRequest};

/// Debugger lifecycle notifications the engine reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebuggerEvent {
    /// Execution halted (breakpoint, step, signal)
    Stopped,
    BreakpointCreated { id: BreakpointId },
    BreakpointModified { id: BreakpointId },
    BreakpointDeleted { id: BreakpointId },
    /// A new executable or its symbols were loaded
    ExecutableLoaded,
    /// The debuggee exited
    Exited,
}

/// Whether `command` starts the program (`r`, `ru` or `run`, with or
/// without arguments)
pub fn is_run_command(command: &str) -> bool {
    matches!(command.split_whitespace().next(), Some("r" | "ru" | "run"))
}

impl<D, E> SyncEngine<D, E>
where
    D: Debugger,
    E: Editor,
{
    /// Handle an event, logging rather than returning any failure
    pub fn dispatch(&mut self, event: &DebuggerEvent) {
        match self.handle(event) {
            Ok(status) => tracing::debug!(?event, ?status, "handled event"),
            Err(e) => tracing::warn!(?event, error = %e, "could not update editor"),
        }
    }

    /// Handle an event
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn handle(&mut self, event: &DebuggerEvent) -> Result<Status, SyncError> {
        match event {
            DebuggerEvent::Stopped => self.update(&UpdateRequest::new().force(true).goto_line(true)),
            DebuggerEvent::BreakpointCreated { .. } => {
                self.update(&UpdateRequest::new().force(true))
            }
            DebuggerEvent::BreakpointModified { id } => {
                self.update(&UpdateRequest::new().force(true).modify_breakpoint(*id))
            }
            DebuggerEvent::BreakpointDeleted { id } => {
                self.update(&UpdateRequest::new().force(true).delete_breakpoint(*id))
            }
            DebuggerEvent::ExecutableLoaded => {
                self.clear();
                if self.last_command_was_run() {
                    // the stop that follows will update the editor
                    return Ok(Status::Skipped);
                }
                self.update(
                    &UpdateRequest::new()
                        .force(true)
                        .goto_line(true)
                        .update_cle(false)
                        .location("main"),
                )
            }
            DebuggerEvent::Exited => self.clear_highlight(),
        }
    }

    fn last_command_was_run(&self) -> bool {
        self.debugger()
            .recent_command_history()
            .last()
            .is_some_and(|command| is_run_command(command))
    }
}
