// ABOUTME: SSH-specific error types.
// ABOUTME: Covers connection, authentication, host key and remote command failures.

use super::remote::PartialOutput;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("host key for {host}:{port} rejected")]
    HostKeyRejected { host: String, port: u16 },

    #[error("authentication failed for user {0}")]
    AuthenticationFailed(String),

    #[error("failed to load key from {path}: {reason}")]
    KeyLoadFailed { path: PathBuf, reason: String },

    #[error("command execution failed: {0}")]
    CommandFailed(String),

    #[error("remote command killed by signal {signal}")]
    Killed {
        signal: String,
        partial: PartialOutput,
    },

    #[error("command timed out after {timeout:?}")]
    CommandTimeout {
        timeout: std::time::Duration,
        partial: PartialOutput,
    },

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed { partial: PartialOutput },

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),
}

impl Error {
    /// Output the remote command produced before it ended abnormally.
    pub fn partial_output(&self) -> Option<&PartialOutput> {
        match self {
            Error::Killed { partial, .. }
            | Error::CommandTimeout { partial, .. }
            | Error::ChannelClosed { partial } => Some(partial),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
