use crate::{
    BreakpointId, CommandBatch, Debugger, Editor, Instruction, Location, SyncError, SyncState,
    resolver, tracker,
};

/// Parameters of one synchronisation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Run even if the debuggee is not executing
    pub force: bool,
    /// Reopen the file and rebuild all markers even if it is already open
    pub update_file: bool,
    /// Move the cursor to the resolved line
    pub goto_line: bool,
    /// Update the current-line-of-execution highlight
    pub update_cle: bool,
    pub modify_breakpoint: Option<BreakpointId>,
    pub delete_breakpoint: Option<BreakpointId>,
    /// Where to go; the current point of execution if unset
    pub location_spec: Option<String>,
}

impl Default for UpdateRequest {
    fn default() -> Self {
        Self {
            force: false,
            update_file: false,
            goto_line: false,
            update_cle: true,
            modify_breakpoint: None,
            delete_breakpoint: None,
            location_spec: None,
        }
    }
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn update_file(mut self, update_file: bool) -> Self {
        self.update_file = update_file;
        self
    }

    pub fn goto_line(mut self, goto_line: bool) -> Self {
        self.goto_line = goto_line;
        self
    }

    pub fn update_cle(mut self, update_cle: bool) -> Self {
        self.update_cle = update_cle;
        self
    }

    pub fn modify_breakpoint(mut self, id: BreakpointId) -> Self {
        self.modify_breakpoint = Some(id);
        self
    }

    pub fn delete_breakpoint(mut self, id: BreakpointId) -> Self {
        self.delete_breakpoint = Some(id);
        self
    }

    pub fn location(mut self, spec: impl Into<String>) -> Self {
        self.location_spec = Some(spec.into());
        self
    }
}

/// Outcome of a pass that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Nothing is executing and the pass was not forced
    Skipped,
    /// The editor is already up to date
    NoChange,
    /// This many instructions were sent
    Sent(usize),
}

/// Keeps an editor in step with a debugger
pub struct SyncEngine<D, E> {
    debugger: D,
    editor: E,
    state: SyncState,
}

impl<D, E> SyncEngine<D, E>
where
    D: Debugger,
    E: Editor,
{
    pub fn new(debugger: D, editor: E) -> Self {
        Self {
            debugger,
            editor,
            state: SyncState::default(),
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn debugger(&self) -> &D {
        &self.debugger
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    /// Forget what the editor is showing, so the next pass rebuilds it
    pub fn clear(&mut self) {
        tracing::debug!("clearing sync state");
        self.state.clear();
    }

    /// Run one synchronisation pass
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn update(&mut self, request: &UpdateRequest) -> Result<Status, SyncError> {
        let executing = self.debugger.is_executing();
        if !executing && !request.force {
            tracing::debug!("not executing, skipping update");
            return Ok(Status::Skipped);
        }

        let spec = request.location_spec.as_deref();
        let location = resolver::resolve(&self.debugger, spec)?;
        let update_file = request.update_file || !self.state.is_open(&location);

        let mut batch = CommandBatch::default();
        if update_file {
            batch.open_file(&location.full_path);
            batch.reset_markers();
        }

        let view = tracker::breakpoints_in(
            &self.debugger,
            &location,
            request.delete_breakpoint,
            request.modify_breakpoint,
        );
        let lines = view.line_set();

        if update_file {
            for (&line, &enabled) in &view.lines {
                batch.set_breakpoint(line, enabled);
            }
        } else {
            let mut to_add: Vec<u32> = lines
                .difference(&self.state.breakpoint_lines)
                .copied()
                .collect();
            if let Some(modified) = view.modified_line {
                if !to_add.contains(&modified) {
                    to_add.push(modified);
                }
            }
            for line in to_add {
                batch.set_breakpoint(line, view.is_enabled(line).unwrap_or(true));
            }
            for &line in self.state.breakpoint_lines.difference(&lines) {
                batch.clear_breakpoint(line);
            }
        }

        if request.goto_line {
            batch.move_cursor(location.line);
        }

        let highlight = if request.update_cle {
            let desired = self.execution_line(&location, spec, executing);
            if update_file || desired != self.state.highlight {
                match desired {
                    Some(line) => batch.highlight(line),
                    None => batch.clear_highlight(),
                }
            }
            desired
        } else if update_file {
            None
        } else {
            self.state.highlight
        };

        let instructions = batch.finish();
        if instructions.is_empty() {
            tracing::debug!("editor up to date");
            return Ok(Status::NoChange);
        }

        self.send(&instructions)?;

        if update_file {
            self.state.open_file = Some(location);
        }
        self.state.breakpoint_lines = lines;
        self.state.highlight = highlight;

        Ok(Status::Sent(instructions.len()))
    }

    /// Remove every marker from every file
    #[tracing::instrument(skip(self))]
    pub fn disable(&mut self) -> Result<Status, SyncError> {
        let mut batch = CommandBatch::default();
        batch.clear_all_markers();
        self.send_and_reset(batch)
    }

    /// Remove the execution-line highlight
    #[tracing::instrument(skip(self))]
    pub fn clear_highlight(&mut self) -> Result<Status, SyncError> {
        let mut batch = CommandBatch::default();
        batch.clear_highlight();
        self.send_and_reset(batch)
    }

    /// Rebuild the editor view from scratch
    #[tracing::instrument(skip(self))]
    pub fn resync_all(&mut self) -> Result<Status, SyncError> {
        self.clear();
        self.update(&UpdateRequest::new().force(true).goto_line(true))
    }

    /// Where the highlight should be once this pass is applied
    fn execution_line(
        &self,
        target: &Location,
        spec: Option<&str>,
        executing: bool,
    ) -> Option<u32> {
        if !executing {
            return None;
        }
        if spec.is_none() {
            return Some(target.line);
        }

        // the user asked for somewhere specific, which may not be where
        // execution actually is
        match resolver::resolve(&self.debugger, None) {
            Ok(current) if current.same_file(target) => Some(current.line),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "no current location to highlight");
                None
            }
        }
    }

    fn send_and_reset(&mut self, batch: CommandBatch) -> Result<Status, SyncError> {
        let instructions = batch.finish();
        let result = self.send(&instructions);
        self.state.clear();
        result.map(|_| Status::Sent(instructions.len()))
    }

    fn send(&mut self, instructions: &[Instruction]) -> Result<(), SyncError> {
        if !self.editor.is_reachable() {
            tracing::warn!("editor not reachable, dropping batch");
            self.state.clear();
            return Err(SyncError::TransportUnavailable(
                "editor not reachable".to_string(),
            ));
        }
        tracing::debug!(
            batch = %serde_json::to_string(instructions).unwrap_or_default(),
            "sending batch"
        );
        if let Err(e) = self.editor.apply(instructions) {
            tracing::warn!(error = %e, "sending batch failed, editor state unknown");
            self.state.clear();
            return Err(e);
        }
        Ok(())
    }
}
