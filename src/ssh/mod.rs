// ABOUTME: SSH client module for the remote half of the pair.
// ABOUTME: Key-file authentication, host key policies and non-blocking command execution.

mod client;
mod error;
mod remote;

pub use client::{HostKeyPolicy, Session, SessionConfig};
pub use error::{Error, Result};
pub use remote::{CommandOutput, PartialOutput, RemoteProcess};
