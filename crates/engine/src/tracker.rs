//! Breakpoints as the editor should show them
use std::collections::{BTreeMap, BTreeSet};

use crate::{BreakpointId, Debugger, Location};

/// Breakpoint lines of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakpointView {
    /// line -> enabled
    pub lines: BTreeMap<u32, bool>,
    /// Line of the breakpoint that was just modified, if it is in this file
    pub modified_line: Option<u32>,
}

impl BreakpointView {
    pub fn line_set(&self) -> BTreeSet<u32> {
        self.lines.keys().copied().collect()
    }

    pub fn is_enabled(&self, line: u32) -> Option<bool> {
        self.lines.get(&line).copied()
    }
}

/// Collect the breakpoints in the file of `location`
///
/// `deleted` is left out even if the debugger still lists it. A line holding
/// several breakpoints is enabled if any of them is. If the breakpoints
/// cannot be listed (e.g. no symbols are loaded yet) the view is empty.
pub fn breakpoints_in<D>(
    debugger: &D,
    location: &Location,
    deleted: Option<BreakpointId>,
    modified: Option<BreakpointId>,
) -> BreakpointView
where
    D: Debugger,
{
    let breakpoints = match debugger.list_breakpoints() {
        Ok(breakpoints) => breakpoints,
        Err(e) => {
            tracing::debug!(error = %e, "could not list breakpoints");
            return BreakpointView::default();
        }
    };

    let mut view = BreakpointView::default();
    for breakpoint in breakpoints
        .iter()
        .filter(|b| b.visible && Some(b.id) != deleted && b.is_in(location))
    {
        let enabled = view.lines.entry(breakpoint.line).or_insert(false);
        *enabled |= breakpoint.enabled;

        if Some(breakpoint.id) == modified {
            view.modified_line = Some(breakpoint.line);
        }
    }
    view
}
