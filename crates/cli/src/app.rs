use std::io::{BufRead, Write};

use crossbeam_channel::Receiver;
use debugger::{GdbDebugger, translate};
use engine::{DebuggerEvent, Editor, SubCommand, SyncEngine};
use eyre::WrapErr;
use gdbmi::{Notification, StreamKind};

pub(crate) const PROMPT: &str = "(vimgdb) ";

/// Word introducing a command handled here rather than by GDB
const COMMAND_PREFIX: &str = "vimgdb";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ShouldQuit {
    True,
    False,
}

/// The interactive console in front of GDB
pub(crate) struct App<E> {
    debugger: GdbDebugger,
    engine: SyncEngine<GdbDebugger, E>,
    notifications: Receiver<Notification>,
    input_rx: Receiver<String>,
    // print the whole error chain for failed sub-commands
    verbose: bool,
}

impl<E> App<E>
where
    E: Editor,
{
    pub(crate) fn new(
        debugger: GdbDebugger,
        editor: E,
        notifications: Receiver<Notification>,
        input_rx: Receiver<String>,
        verbose: bool,
    ) -> Self {
        let engine = SyncEngine::new(debugger.clone(), editor);
        Self {
            debugger,
            engine,
            notifications,
            input_rx,
            verbose,
        }
    }

    /// Show the program GDB was started with
    pub(crate) fn program_loaded(&mut self) {
        self.engine.dispatch(&DebuggerEvent::ExecutableLoaded);
    }

    pub(crate) fn loop_step(&mut self) -> eyre::Result<ShouldQuit> {
        print!("{PROMPT}");
        std::io::stdout().flush()?;

        crossbeam_channel::select! {
            recv(self.input_rx) -> input => match input {
                Ok(input) => self.handle_input(&input).context("handling command"),
                // stdin closed
                Err(_) => Ok(ShouldQuit::True),
            },
            recv(self.notifications) -> notification => match notification {
                Ok(notification) => Ok(self.handle_notification(notification)),
                Err(_) => Ok(ShouldQuit::True),
            },
        }
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn handle_notification(&mut self, notification: Notification) -> ShouldQuit {
        match &notification {
            Notification::Closed => {
                println!("debugger exited");
                return ShouldQuit::True;
            }
            Notification::Output {
                kind: StreamKind::Log,
                ..
            }
            | Notification::Async(_) => {}
            Notification::Output { text, .. } => print!("{text}"),
            Notification::Raw(line) => println!("{line}"),
        }

        if let Some(event) = translate(&notification) {
            self.engine.dispatch(&event);
        }
        ShouldQuit::False
    }

    pub(crate) fn handle_input(&mut self, input: &str) -> eyre::Result<ShouldQuit> {
        let input = input.trim();
        match input {
            "" => {}
            "q" | "quit" => return Ok(ShouldQuit::True),
            _ => match input.strip_prefix(COMMAND_PREFIX) {
                Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                    self.run_local(rest);
                }
                _ => self.forward(input)?,
            },
        }
        Ok(ShouldQuit::False)
    }

    fn run_local(&mut self, input: &str) {
        let command = match input.parse::<SubCommand>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", self.describe(input, e));
                return;
            }
        };
        match self.engine.run_command(&command) {
            Ok(status) => tracing::debug!(?command, ?status, "ran command"),
            Err(e) => println!("{}", self.describe(input, e)),
        }
    }

    /// How a failed sub-command is reported: one line normally, the full
    /// chain in verbose mode
    fn describe(
        &self,
        input: &str,
        e: impl std::error::Error + Send + Sync + 'static,
    ) -> String {
        if self.verbose {
            let report = eyre::Report::new(e).wrap_err(format!("{COMMAND_PREFIX}{input}"));
            format!("{report:?}")
        } else {
            e.to_string()
        }
    }

    fn forward(&mut self, command: &str) -> eyre::Result<()> {
        match self.debugger.execute(command) {
            Ok(executed) => {
                print!("{}", executed.output);
                if executed.loaded_executable {
                    self.engine.dispatch(&DebuggerEvent::ExecutableLoaded);
                }
            }
            Err(e) => match e.downcast_ref::<gdbmi::MiError>() {
                Some(gdbmi::MiError::Command { message, .. }) => println!("{message}"),
                _ => return Err(e),
            },
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn engine(&self) -> &SyncEngine<GdbDebugger, E> {
        &self.engine
    }
}

/// Read lines from stdin on a background thread
pub(crate) fn spawn_input_thread() -> Receiver<String> {
    let (input_tx, input_rx) = crossbeam_channel::unbounded();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if input_tx.send(line).is_err() {
                break;
            }
        }
    });
    input_rx
}
