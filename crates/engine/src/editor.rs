use serde::Serialize;

use crate::SyncError;

/// Gutter marker glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerKind {
    BreakpointEnabled,
    BreakpointDisabled,
    ExecutionLine,
}

impl MarkerKind {
    pub fn breakpoint(enabled: bool) -> Self {
        if enabled {
            MarkerKind::BreakpointEnabled
        } else {
            MarkerKind::BreakpointDisabled
        }
    }
}

/// A single editor mutation
///
/// Line-scoped instructions apply to the file currently open in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Instruction {
    OpenFile { path: String },
    MoveCursor { line: u32 },
    /// Placing the execution-line marker moves it from wherever it was
    PlaceMarker { line: u32, kind: MarkerKind },
    /// Remove the breakpoint marker at `line`
    ClearMarker { line: u32 },
    /// Remove the execution-line marker, whichever file it is in
    ClearExecutionLine,
    /// Remove every marker in the current file, keeping the gutter open
    ResetMarkers,
    /// Remove every marker in every file
    ClearAllMarkers,
    Redraw,
}

/// The editor end of the synchronisation
pub trait Editor {
    /// Apply all instructions in one remote call
    ///
    /// Fails with [`SyncError::TransportUnavailable`] if the editor cannot be
    /// reached or rejects the call.
    fn apply(&self, instructions: &[Instruction]) -> Result<(), SyncError>;

    /// Checked before every batch; an unreachable editor is not sent to
    fn is_reachable(&self) -> bool;
}
