use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{StreamKind, Token, client::Response};

/// A command awaiting its result record, together with the stream output
/// GDB produced while running it
pub(crate) struct WaitingRequest {
    pub(crate) command: String,
    pub(crate) output: Vec<(StreamKind, String)>,
    pub(crate) reply: oneshot::Sender<Response>,
}

/// A container for the commands awaiting results
pub(crate) type RequestStore = Arc<Mutex<HashMap<Token, WaitingRequest>>>;
