use engine::{Editor, Instruction, MarkerKind, SyncError};

use crate::VimServer;

/// Sign id of the execution-line marker
pub const LOCATION_SIGN_ID: u32 = 999998;
/// Sign id of the placeholder that keeps the sign column open
pub const DUMMY_SIGN_ID: u32 = 999999;

/// Vim script expression for the full path of the current buffer
const CURRENT_FILE: &str = "fnameescape(expand('%:p'))";

/// The editor, driven over Vim's client-server interface
#[derive(Debug, Clone)]
pub struct VimEditor {
    server: VimServer,
}

impl VimEditor {
    pub fn new(server: VimServer) -> Self {
        Self { server }
    }

    pub fn server(&self) -> &VimServer {
        &self.server
    }
}

impl Editor for VimEditor {
    fn apply(&self, instructions: &[Instruction]) -> Result<(), SyncError> {
        let expr = render(instructions);
        tracing::debug!(%expr, "sending batch to vim");
        self.server
            .remote_expr(&expr)
            .map(|_| ())
            .map_err(|e| SyncError::TransportUnavailable(format!("{e:#}")))
    }

    fn is_reachable(&self) -> bool {
        self.server.is_running()
    }
}

/// Render a batch as a single `execute([...])` expression
pub fn render(instructions: &[Instruction]) -> String {
    let commands: Vec<String> = instructions.iter().flat_map(commands_for).collect();
    format!("execute([{}])", commands.join(", "))
}

fn sign_name(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::BreakpointEnabled => "VimgdbBreakpointEnabled",
        MarkerKind::BreakpointDisabled => "VimgdbBreakpointDisabled",
        MarkerKind::ExecutionLine => "VimgdbLocation",
    }
}

/// Vim string literal
fn literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// An Ex command applying to the current file
fn in_current_file(command: &str) -> String {
    format!("{} . {CURRENT_FILE}", literal(&format!("{command} file=")))
}

fn commands_for(instruction: &Instruction) -> Vec<String> {
    match instruction {
        Instruction::OpenFile { path } => {
            vec![format!("'edit ' . fnameescape({})", literal(path))]
        }
        Instruction::MoveCursor { line } => vec![literal(&format!("call cursor({line}, 1)"))],
        Instruction::PlaceMarker {
            line,
            kind: kind @ MarkerKind::ExecutionLine,
        } => vec![
            literal(&format!("sign unplace {LOCATION_SIGN_ID}")),
            in_current_file(&format!(
                "sign place {LOCATION_SIGN_ID} line={line} name={}",
                sign_name(*kind)
            )),
        ],
        Instruction::PlaceMarker { line, kind } => vec![in_current_file(&format!(
            "sign place {line} line={line} name={}",
            sign_name(*kind)
        ))],
        Instruction::ClearMarker { line } => {
            vec![in_current_file(&format!("sign unplace {line}"))]
        }
        Instruction::ClearExecutionLine => vec![literal(&format!("sign unplace {LOCATION_SIGN_ID}"))],
        Instruction::ResetMarkers => vec![
            in_current_file("sign unplace *"),
            in_current_file(&format!(
                "sign place {DUMMY_SIGN_ID} line=1 name=VimgdbDummy"
            )),
        ],
        Instruction::ClearAllMarkers => vec![literal("sign unplace *")],
        Instruction::Redraw => vec![literal("redraw!")],
    }
}
