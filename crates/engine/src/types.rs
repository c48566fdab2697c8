use serde::Serialize;

/// Breakpoint number as assigned by the debugger
pub type BreakpointId = u32;

/// A line in a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Absolute path, as normalised by the debugger
    pub full_path: String,
    /// The file name as recorded in the debug info
    pub relative_path: String,
    /// 1-based line number
    pub line: u32,
}

impl Location {
    pub fn new(full_path: impl Into<String>, relative_path: impl Into<String>, line: u32) -> Self {
        Self {
            full_path: full_path.into(),
            relative_path: relative_path.into(),
            line,
        }
    }

    /// Two locations are in the same file when their full paths are equal
    pub fn same_file(&self, other: &Location) -> bool {
        self.full_path == other.full_path
    }
}

/// One source location of a breakpoint
///
/// A breakpoint with several locations is reported once per location, all
/// with the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointInfo {
    pub id: BreakpointId,
    pub file: String,
    pub full_path: Option<String>,
    pub line: u32,
    pub enabled: bool,
    /// Internal breakpoints set by the debugger itself are not visible
    pub visible: bool,
}

impl BreakpointInfo {
    pub fn new(id: BreakpointId, file: impl Into<String>, line: u32, enabled: bool) -> Self {
        Self {
            id,
            file: file.into(),
            full_path: None,
            line,
            enabled,
            visible: true,
        }
    }

    pub fn with_full_path(mut self, full_path: impl Into<String>) -> Self {
        self.full_path = Some(full_path.into());
        self
    }

    /// Whether this breakpoint is in the file at `location`
    pub fn is_in(&self, location: &Location) -> bool {
        self.file == location.relative_path
            || self.full_path.as_deref() == Some(location.full_path.as_str())
    }
}
