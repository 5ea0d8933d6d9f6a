// ABOUTME: Launch error types with SNAFU pattern.
// ABOUTME: Groups local and remote failures with a kind for programmatic handling.

use snafu::Snafu;

use crate::local::LocalError;
use crate::ssh;

/// Failure of either half of the pair.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LaunchError {
    #[snafu(display("local process failed: {source}"))]
    Local { source: LocalError },

    #[snafu(display("remote process failed: {source}"))]
    Remote { source: ssh::Error },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchErrorKind {
    /// The local executable could not be started.
    LocalSpawn,
    /// Waiting on the local process failed.
    LocalWait,
    /// The SSH session could not be established.
    RemoteConnect,
    /// The remote command could not be run or its output was lost.
    RemoteCommand,
    /// The remote command outlived the configured timeout.
    RemoteTimeout,
}

impl LaunchError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> LaunchErrorKind {
        match self {
            LaunchError::Local { source } => match source {
                LocalError::Spawn { .. } => LaunchErrorKind::LocalSpawn,
                LocalError::Wait { .. } => LaunchErrorKind::LocalWait,
            },
            LaunchError::Remote { source } => match source {
                ssh::Error::Connection(_)
                | ssh::Error::HostKeyRejected { .. }
                | ssh::Error::AuthenticationFailed(_)
                | ssh::Error::KeyLoadFailed { .. }
                | ssh::Error::Protocol(_) => LaunchErrorKind::RemoteConnect,
                ssh::Error::CommandFailed(_)
                | ssh::Error::Killed { .. }
                | ssh::Error::ChannelClosed { .. } => LaunchErrorKind::RemoteCommand,
                ssh::Error::CommandTimeout { .. } => LaunchErrorKind::RemoteTimeout,
            },
        }
    }
}
