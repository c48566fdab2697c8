//! The Vim end of the synchronisation
//!
//! [`VimServer`] manages a Vim running in client-server mode and
//! [`VimEditor`] renders engine instructions as Vim script for it.
mod editor;
mod process;
mod vim;

pub use editor::{DUMMY_SIGN_ID, LOCATION_SIGN_ID, VimEditor, render};
pub use process::is_binary;
pub use vim::{REMOTE_TIMEOUT, VimServer};
