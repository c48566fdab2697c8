use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use engine::{BreakpointInfo, Location, SyncError};
use eyre::WrapErr;
use gdbmi::{Client, MiError, MiTransport, Notification, ProcessTransport, Response};

use crate::{CommandHistory, events::loads_executable, mi};

/// What running a user command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executed {
    /// Console output, as the user would see it in plain GDB
    pub output: String,
    /// The command loaded a new executable
    pub loaded_executable: bool,
}

/// A GDB session driven over MI
#[derive(Clone)]
pub struct GdbDebugger {
    client: Client,
    history: Arc<Mutex<CommandHistory>>,
}

impl GdbDebugger {
    pub fn new(client: Client, history_size: usize) -> Self {
        Self {
            client,
            history: Arc::new(Mutex::new(CommandHistory::new(history_size))),
        }
    }

    /// Start GDB and connect to it
    ///
    /// `args` are passed to GDB as given, e.g. the program to debug.
    #[tracing::instrument(skip(args))]
    pub fn spawn(
        gdb: &Path,
        gdbinit: Option<&Path>,
        args: &[String],
        timeout: Duration,
        history_size: usize,
    ) -> eyre::Result<(Self, crossbeam_channel::Receiver<Notification>)> {
        let mut gdb_args: Vec<String> = Vec::new();
        if let Some(gdbinit) = gdbinit {
            gdb_args.push("-x".to_string());
            gdb_args.push(gdbinit.display().to_string());
        }
        gdb_args.extend(args.iter().cloned());

        let transport =
            ProcessTransport::spawn(gdb, &gdb_args).wrap_err_with(|| format!("starting {}", gdb.display()))?;
        Self::with_transport(transport, timeout, history_size)
    }

    pub fn with_transport<T>(
        transport: T,
        timeout: Duration,
        history_size: usize,
    ) -> eyre::Result<(Self, crossbeam_channel::Receiver<Notification>)>
    where
        T: MiTransport,
    {
        let (tx, rx) = crossbeam_channel::unbounded();
        let client = Client::with_transport(transport, tx)
            .wrap_err("connecting to debugger")?
            .with_timeout(timeout);
        Ok((Self::new(client, history_size), rx))
    }

    /// Run a command typed by the user
    #[tracing::instrument(skip(self))]
    pub fn execute(&self, command: &str) -> eyre::Result<Executed> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(command);

        let response = self
            .client
            .send(&console_command(command))
            .wrap_err_with(|| format!("running `{command}`"))?;

        Ok(Executed {
            output: response.console(),
            loaded_executable: loads_executable(command),
        })
    }

    fn query(&self, command: &str) -> Result<Response, MiError> {
        self.client.send(command)
    }

    fn source_file(&self, file: &str) -> eyre::Result<String> {
        let response = self
            .query("-file-list-exec-source-files")
            .wrap_err("listing source files")?;
        match mi::full_path_of(&response.record.results, file) {
            Some(full_path) => Ok(full_path),
            None if Path::new(file).is_absolute() => Ok(file.to_string()),
            None => eyre::bail!("no full path known for {file}"),
        }
    }
}

fn console_command(command: &str) -> String {
    format!("-interpreter-exec console {}", gdbmi::quote(command))
}

impl engine::Debugger for GdbDebugger {
    fn current_location(&self) -> Result<Location, SyncError> {
        let location = match self.query("-stack-info-frame") {
            Ok(response) => response
                .record
                .results
                .get("frame")
                .and_then(|frame| frame.as_results())
                .and_then(mi::location_from),
            Err(MiError::Command { message, .. }) => {
                // no frame: use the default listing location
                tracing::debug!(%message, "no stack frame");
                let response = self
                    .query("-file-list-exec-source-file")
                    .map_err(|e| SyncError::LocationNotFound(e.to_string()))?;
                mi::location_from(&response.record.results)
            }
            Err(e) => return Err(SyncError::Debugger(e.to_string())),
        };
        location.ok_or_else(|| SyncError::LocationNotFound("current location".to_string()))
    }

    fn resolve(&self, spec: &str) -> Result<Location, SyncError> {
        let response = self
            .query(&console_command(&format!("info line {spec}")))
            .map_err(|e| SyncError::LocationNotFound(e.to_string()))?;
        let (line, file) = mi::parse_info_line(&response.console())
            .ok_or_else(|| SyncError::LocationNotFound(spec.to_string()))?;
        let full_path = self
            .source_file(&file)
            .map_err(|e| SyncError::LocationNotFound(format!("{e:#}")))?;
        Ok(Location::new(full_path, file, line))
    }

    fn function_location(&self, name: &str) -> Result<Option<Location>, SyncError> {
        let pattern = format!("^{}$", mi::regex_escape(name));
        let response = self
            .query(&format!(
                "-symbol-info-functions --name {}",
                gdbmi::quote(&pattern)
            ))
            .map_err(|e| SyncError::Debugger(e.to_string()))?;
        Ok(mi::function_from(&response.record.results, name))
    }

    fn is_executing(&self) -> bool {
        match self.query("-thread-info") {
            Ok(response) => response
                .record
                .results
                .get("threads")
                .is_some_and(|threads| !threads.values().is_empty()),
            Err(e) => {
                tracing::debug!(error = %e, "could not list threads");
                false
            }
        }
    }

    fn list_breakpoints(&self) -> Result<Vec<BreakpointInfo>, SyncError> {
        let response = self
            .query("-break-list")
            .map_err(|e| SyncError::Debugger(e.to_string()))?;
        Ok(mi::breakpoints_from(&response.record.results))
    }

    fn recent_command_history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .to_vec()
    }
}
