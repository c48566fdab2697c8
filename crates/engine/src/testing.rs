//! In-memory collaborators for exercising the engine
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{BreakpointInfo, Debugger, Editor, Instruction, Location, SyncError};

#[derive(Debug, Default)]
struct DebuggerState {
    current: Option<Location>,
    executing: bool,
    locations: HashMap<String, Location>,
    functions: HashMap<String, Location>,
    breakpoints: Vec<BreakpointInfo>,
    breakpoints_fail: bool,
    history: Vec<String>,
    breakpoint_queries: usize,
}

/// A debugger whose answers are set up by the test
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct FakeDebugger {
    state: Arc<Mutex<DebuggerState>>,
}

impl FakeDebugger {
    fn state(&self) -> MutexGuard<'_, DebuggerState> {
        self.state.lock().unwrap()
    }

    pub fn set_current(&self, location: Location) {
        self.state().current = Some(location);
    }

    pub fn set_executing(&self, executing: bool) {
        self.state().executing = executing;
    }

    /// Make `spec` resolve to `location`
    pub fn add_location(&self, spec: &str, location: Location) {
        self.state().locations.insert(spec.to_string(), location);
    }

    /// Declare a function called `name`
    pub fn add_function(&self, name: &str, location: Location) {
        self.state().functions.insert(name.to_string(), location);
    }

    pub fn set_breakpoints(&self, breakpoints: Vec<BreakpointInfo>) {
        self.state().breakpoints = breakpoints;
    }

    pub fn fail_breakpoints(&self, fail: bool) {
        self.state().breakpoints_fail = fail;
    }

    pub fn push_history(&self, command: &str) {
        self.state().history.push(command.to_string());
    }

    /// How many times breakpoints were listed
    pub fn breakpoint_queries(&self) -> usize {
        self.state().breakpoint_queries
    }
}

impl Debugger for FakeDebugger {
    fn current_location(&self) -> Result<Location, SyncError> {
        self.state()
            .current
            .clone()
            .ok_or_else(|| SyncError::LocationNotFound("no current location".to_string()))
    }

    fn resolve(&self, spec: &str) -> Result<Location, SyncError> {
        self.state()
            .locations
            .get(spec)
            .cloned()
            .ok_or_else(|| SyncError::LocationNotFound(spec.to_string()))
    }

    fn function_location(&self, name: &str) -> Result<Option<Location>, SyncError> {
        Ok(self.state().functions.get(name).cloned())
    }

    fn is_executing(&self) -> bool {
        self.state().executing
    }

    fn list_breakpoints(&self) -> Result<Vec<BreakpointInfo>, SyncError> {
        let mut state = self.state();
        state.breakpoint_queries += 1;
        if state.breakpoints_fail {
            return Err(SyncError::Debugger("No symbol table is loaded.".to_string()));
        }
        Ok(state.breakpoints.clone())
    }

    fn recent_command_history(&self) -> Vec<String> {
        self.state().history.clone()
    }
}

#[derive(Debug)]
struct EditorState {
    reachable: bool,
    attempts: usize,
    batches: Vec<Vec<Instruction>>,
}

/// An editor that records every batch it is sent
#[derive(Debug, Clone)]
pub struct RecordingEditor {
    state: Arc<Mutex<EditorState>>,
}

impl Default for RecordingEditor {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(EditorState {
                reachable: true,
                attempts: 0,
                batches: Vec::new(),
            })),
        }
    }
}

impl RecordingEditor {
    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().unwrap().reachable = reachable;
    }

    /// Every batch successfully applied
    pub fn batches(&self) -> Vec<Vec<Instruction>> {
        self.state.lock().unwrap().batches.clone()
    }

    /// Calls to [`Editor::apply`], including failed ones
    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }

    pub fn last_batch(&self) -> Option<Vec<Instruction>> {
        self.state.lock().unwrap().batches.last().cloned()
    }

    pub fn take_batches(&self) -> Vec<Vec<Instruction>> {
        std::mem::take(&mut self.state.lock().unwrap().batches)
    }
}

impl Editor for RecordingEditor {
    fn apply(&self, instructions: &[Instruction]) -> Result<(), SyncError> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;
        if !state.reachable {
            return Err(SyncError::TransportUnavailable(
                "no editor server".to_string(),
            ));
        }
        state.batches.push(instructions.to_vec());
        Ok(())
    }

    fn is_reachable(&self) -> bool {
        self.state.lock().unwrap().reachable
    }
}
