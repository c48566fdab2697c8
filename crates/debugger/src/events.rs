use engine::DebuggerEvent;
use gdbmi::{AsyncKind, Notification};

/// The engine event, if any, behind an MI notification
pub fn translate(notification: &Notification) -> Option<DebuggerEvent> {
    let Notification::Async(record) = notification else {
        return None;
    };

    match (record.kind, record.class.as_str()) {
        (AsyncKind::Exec, "stopped") => match record.results.get_str("reason") {
            Some(reason) if reason.starts_with("exited") => Some(DebuggerEvent::Exited),
            _ => Some(DebuggerEvent::Stopped),
        },
        (AsyncKind::Notify, "breakpoint-created") => {
            breakpoint_number(record).map(|id| DebuggerEvent::BreakpointCreated { id })
        }
        (AsyncKind::Notify, "breakpoint-modified") => {
            breakpoint_number(record).map(|id| DebuggerEvent::BreakpointModified { id })
        }
        (AsyncKind::Notify, "breakpoint-deleted") => record
            .results
            .get_u32("id")
            .map(|id| DebuggerEvent::BreakpointDeleted { id }),
        (AsyncKind::Notify, "library-loaded") => Some(DebuggerEvent::ExecutableLoaded),
        _ => None,
    }
}

fn breakpoint_number(record: &gdbmi::AsyncRecord) -> Option<u32> {
    record
        .results
        .get("bkpt")?
        .get_str("number")?
        .split('.')
        .next()?
        .parse()
        .ok()
}

/// Whether `command` loads a new executable, symbol file or core dump
pub fn loads_executable(command: &str) -> bool {
    matches!(
        command.split_whitespace().next(),
        Some("file" | "exec-file" | "symbol-file" | "core-file" | "core")
    )
}
