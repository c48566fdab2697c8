use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::io::MiTransport;
use crate::reader::{PollResult, Reader};
use crate::request_store::{RequestStore, WaitingRequest};
use crate::{AsyncRecord, MiError, Record, ResultClass, ResultRecord, StreamKind, Token};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The answer to a command
#[derive(Debug, Clone)]
pub struct Response {
    pub record: ResultRecord,
    /// Stream records GDB printed between the command and its result
    pub output: Vec<(StreamKind, String)>,
}

impl Response {
    /// All console stream output joined together
    pub fn console(&self) -> String {
        self.output
            .iter()
            .filter(|(kind, _)| *kind == StreamKind::Console)
            .map(|(_, text)| text.as_str())
            .collect()
    }
}

/// Output from GDB that is not the answer to a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Async(AsyncRecord),
    Output { kind: StreamKind, text: String },
    /// A line that is not MI, normally output of the debuggee
    Raw(String),
    /// GDB closed its output
    Closed,
}

struct ClientInternals {
    output: Box<dyn Write + Send>,
    next_token: Token,
    store: RequestStore,
    timeout: Duration,

    // Option because of drop and take
    exit: Option<oneshot::Sender<()>>,
}

/// GDB/MI client
///
/// Commands are serialised: a clone of the client blocks in [`Client::send`]
/// until any command in flight on another clone has been answered.
#[derive(Clone)]
pub struct Client {
    internals: Arc<Mutex<ClientInternals>>,
}

impl Client {
    /// Create a client over the given transport
    ///
    /// Everything GDB prints that is not the answer to a command is sent on
    /// `notifications`.
    pub fn with_transport<T>(
        transport: T,
        notifications: crossbeam_channel::Sender<Notification>,
    ) -> Result<Self, MiError>
    where
        T: MiTransport,
    {
        let (input, output) = transport.split()?;

        let store = RequestStore::default();
        let store_clone = Arc::clone(&store);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        thread::spawn(move || {
            let mut reader = Reader::new(input);

            loop {
                match shutdown_rx.try_recv() {
                    Ok(_) => return,
                    Err(oneshot::TryRecvError::Empty) => {}
                    Err(oneshot::TryRecvError::Disconnected) => {
                        tracing::debug!("client dropped, stopping reader");
                        return;
                    }
                }

                match reader.poll_record() {
                    Ok(PollResult::Record(record)) => {
                        dispatch_record(record, &store_clone, &notifications)
                    }
                    Ok(PollResult::Timeout) => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Ok(PollResult::Closed) => {
                        tracing::debug!("debugger output closed");
                        // dropping the reply senders wakes any waiting command
                        with_lock("Reader.store", store_clone.as_ref(), |mut store| {
                            store.clear()
                        });
                        let _ = notifications.send(Notification::Closed);
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "reader error");
                        let _ = notifications.send(Notification::Closed);
                        return;
                    }
                }
            }
        });

        let internals = ClientInternals {
            output: Box::new(output),
            next_token: 0,
            store,
            timeout: DEFAULT_TIMEOUT,
            exit: Some(shutdown_tx),
        };

        Ok(Self {
            internals: Arc::new(Mutex::new(internals)),
        })
    }

    /// Change how long [`Client::send`] waits for a result record
    pub fn with_timeout(self, timeout: Duration) -> Self {
        with_lock("Client.internals", self.internals.as_ref(), |mut internals| {
            internals.timeout = timeout
        });
        self
    }

    /// Send an MI command (e.g. `-break-list`) and wait for its result
    ///
    /// An `^error` result is turned into [`MiError::Command`].
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn send(&self, command: &str) -> Result<Response, MiError> {
        with_lock("Client.internals", self.internals.as_ref(), |mut internals| {
            internals.send(command)
        })
    }
}

fn dispatch_record(
    record: Record,
    store: &RequestStore,
    notifications: &crossbeam_channel::Sender<Notification>,
) {
    match record {
        Record::Result(result) => {
            let Some(token) = result.token else {
                tracing::warn!(?result, "result record without a token");
                return;
            };
            with_lock("Reader.store", store.as_ref(), |mut store| {
                match store.remove(&token) {
                    Some(WaitingRequest { output, reply, .. }) => {
                        let _ = reply.send(Response {
                            record: result,
                            output,
                        });
                    }
                    None => tracing::warn!(?result, "no command waiting for result"),
                }
            });
        }
        Record::Stream(kind, text) => {
            let unclaimed = with_lock("Reader.store", store.as_ref(), |mut store| {
                match store.values_mut().next() {
                    Some(waiting) => {
                        waiting.output.push((kind, text));
                        None
                    }
                    None => Some(Notification::Output { kind, text }),
                }
            });
            if let Some(notification) = unclaimed {
                let _ = notifications.send(notification);
            }
        }
        Record::Async(record) => {
            tracing::debug!(class = %record.class, "async record");
            let _ = notifications.send(Notification::Async(record));
        }
        Record::Unparsed(line) => {
            let _ = notifications.send(Notification::Raw(line));
        }
        Record::Prompt => {}
    }
}

fn with_lock<T, F, R>(name: &str, lock: &Mutex<T>, f: F) -> R
where
    F: FnOnce(MutexGuard<'_, T>) -> R,
{
    tracing::trace!(%name, "taking lock");
    let inner = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let res = f(inner);
    tracing::trace!(%name, "releasing lock");
    res
}

impl ClientInternals {
    fn send(&mut self, command: &str) -> Result<Response, MiError> {
        self.next_token += 1;
        let token = self.next_token;

        let (tx, rx) = oneshot::channel();
        with_lock("ClientInternals.store", self.store.as_ref(), |mut store| {
            store.insert(
                token,
                WaitingRequest {
                    command: command.to_string(),
                    output: Vec::new(),
                    reply: tx,
                },
            );
        });

        tracing::debug!(%token, %command, "sending command");
        let written = writeln!(self.output, "{token}{command}").and_then(|_| self.output.flush());
        if let Err(e) = written {
            self.forget(token);
            return Err(e.into());
        }

        let response = match rx.recv_timeout(self.timeout) {
            Ok(response) => response,
            Err(oneshot::RecvTimeoutError::Timeout) => {
                self.forget(token);
                return Err(MiError::Timeout {
                    command: command.to_string(),
                    timeout: self.timeout,
                });
            }
            Err(oneshot::RecvTimeoutError::Disconnected) => return Err(MiError::Disconnected),
        };

        if response.record.class == ResultClass::Error {
            let message = response
                .record
                .error_message()
                .unwrap_or_default()
                .to_string();
            return Err(MiError::Command {
                command: command.to_string(),
                message,
            });
        }

        Ok(response)
    }

    fn forget(&mut self, token: Token) {
        with_lock("ClientInternals.store", self.store.as_ref(), |mut store| {
            if let Some(waiting) = store.remove(&token) {
                tracing::debug!(command = %waiting.command, "abandoning command");
            }
        });
    }
}

impl Drop for ClientInternals {
    fn drop(&mut self) {
        tracing::debug!("shutting down client");
        if let Some(exit) = self.exit.take() {
            let _ = exit.send(());
        }
    }
}
