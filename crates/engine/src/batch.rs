use crate::{Instruction, MarkerKind};

/// Instructions collected during one synchronisation pass
#[derive(Debug, Default)]
pub struct CommandBatch {
    instructions: Vec<Instruction>,
}

impl CommandBatch {
    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn open_file(&mut self, path: &str) {
        self.push(Instruction::OpenFile {
            path: path.to_string(),
        });
    }

    pub fn reset_markers(&mut self) {
        self.push(Instruction::ResetMarkers);
    }

    pub fn clear_all_markers(&mut self) {
        self.push(Instruction::ClearAllMarkers);
    }

    pub fn set_breakpoint(&mut self, line: u32, enabled: bool) {
        self.push(Instruction::PlaceMarker {
            line,
            kind: MarkerKind::breakpoint(enabled),
        });
    }

    pub fn clear_breakpoint(&mut self, line: u32) {
        self.push(Instruction::ClearMarker { line });
    }

    pub fn move_cursor(&mut self, line: u32) {
        self.push(Instruction::MoveCursor { line });
    }

    pub fn highlight(&mut self, line: u32) {
        self.push(Instruction::PlaceMarker {
            line,
            kind: MarkerKind::ExecutionLine,
        });
    }

    pub fn clear_highlight(&mut self) {
        self.push(Instruction::ClearExecutionLine);
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The instructions to send, with a trailing redraw unless empty
    pub fn finish(mut self) -> Vec<Instruction> {
        if !self.instructions.is_empty() {
            self.instructions.push(Instruction::Redraw);
        }
        self.instructions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_has_no_redraw() {
        assert!(CommandBatch::default().finish().is_empty());
    }

    #[test]
    fn redraw_is_appended_last() {
        let mut batch = CommandBatch::default();
        batch.open_file("/src/a.c");
        batch.reset_markers();
        batch.set_breakpoint(4, false);

        assert_eq!(
            batch.finish(),
            vec![
                Instruction::OpenFile {
                    path: "/src/a.c".to_string()
                },
                Instruction::ResetMarkers,
                Instruction::PlaceMarker {
                    line: 4,
                    kind: MarkerKind::BreakpointDisabled
                },
                Instruction::Redraw,
            ]
        );
    }

    #[test]
    fn serialises_for_logging() {
        let mut batch = CommandBatch::default();
        batch.highlight(12);
        let json = serde_json::to_string(batch.instructions()).unwrap();
        assert_eq!(
            json,
            r#"[{"op":"place-marker","line":12,"kind":"execution-line"}]"#
        );
    }
}
