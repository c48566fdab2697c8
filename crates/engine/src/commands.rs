use std::str::FromStr;

use crate::{Debugger, Editor, Status, SyncEngine, SyncError, UpdateRequest};

/// `vimgdb` commands typed at the debugger console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubCommand {
    /// Show `location` (or the current line) in the editor
    Sync { location: Option<String> },
    /// Remove all markers
    Disable,
    /// Remove the execution-line highlight
    ClearHighlight,
    /// Rebuild the editor view from scratch
    ResyncAll,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("missing vimgdb command, expected one of: sync, disable, clear-highlight, resync-all")]
    Missing,

    #[error("unknown vimgdb command `{0}`")]
    Unknown(String),

    #[error("`{command}` takes no arguments")]
    UnexpectedArgument { command: String },
}

impl FromStr for SubCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, rest) = match s.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (s, ""),
        };

        let no_args = |command: SubCommand| {
            if rest.is_empty() {
                Ok(command)
            } else {
                Err(CommandError::UnexpectedArgument {
                    command: name.to_string(),
                })
            }
        };

        match name {
            "" => Err(CommandError::Missing),
            "sync" => Ok(SubCommand::Sync {
                location: (!rest.is_empty()).then(|| rest.to_string()),
            }),
            "disable" => no_args(SubCommand::Disable),
            "clear-highlight" => no_args(SubCommand::ClearHighlight),
            "resync-all" => no_args(SubCommand::ResyncAll),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

impl<D, E> SyncEngine<D, E>
where
    D: Debugger,
    E: Editor,
{
    pub fn run_command(&mut self, command: &SubCommand) -> Result<Status, SyncError> {
        match command {
            SubCommand::Sync { location } => {
                let mut request = UpdateRequest::new().force(true).goto_line(true);
                request.location_spec = location.clone();
                self.update(&request)
            }
            SubCommand::Disable => self.disable(),
            SubCommand::ClearHighlight => self.clear_highlight(),
            SubCommand::ResyncAll => self.resync_all(),
        }
    }
}
