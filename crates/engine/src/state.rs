use std::collections::BTreeSet;

use crate::Location;

/// What the editor was last confirmed to be showing
///
/// Only the engine mutates this, after a batch has been sent (or failed to
/// send). If `open_file` is `None` there are no breakpoint lines and no
/// highlight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    pub(crate) open_file: Option<Location>,
    pub(crate) breakpoint_lines: BTreeSet<u32>,
    pub(crate) highlight: Option<u32>,
}

impl SyncState {
    pub fn open_file(&self) -> Option<&Location> {
        self.open_file.as_ref()
    }

    pub fn breakpoint_lines(&self) -> &BTreeSet<u32> {
        &self.breakpoint_lines
    }

    /// Line of the execution-line highlight in the open file
    pub fn highlight(&self) -> Option<u32> {
        self.highlight
    }

    pub fn highlight_active(&self) -> bool {
        self.highlight.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self == &SyncState::default()
    }

    /// Whether `location` is in the file the editor has open
    pub fn is_open(&self, location: &Location) -> bool {
        self.open_file
            .as_ref()
            .is_some_and(|open| open.same_file(location))
    }

    pub fn clear(&mut self) {
        *self = SyncState::default();
    }
}
