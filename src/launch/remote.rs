// ABOUTME: Seam between the launch sequence and the remote host.
// ABOUTME: The SSH implementation connects lazily so the local process starts first.

use crate::ssh::{RemoteProcess, Result, Session, SessionConfig};
use async_trait::async_trait;

/// Something that can start the remote half of the pair.
#[async_trait]
pub trait RemoteLauncher: Send {
    /// Start `command` remotely and return without waiting for it.
    async fn start(&mut self, command: &str) -> Result<RemoteProcess>;
}

/// Starts the remote command over SSH.
///
/// The session is opened on the first [`RemoteLauncher::start`] and kept
/// until [`SshLauncher::close`].
#[derive(Debug)]
pub struct SshLauncher {
    config: SessionConfig,
    session: Option<Session>,
}

impl SshLauncher {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Close the session if one was opened.
    pub async fn close(self) -> Result<()> {
        match self.session {
            Some(session) => session.disconnect().await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteLauncher for SshLauncher {
    async fn start(&mut self, command: &str) -> Result<RemoteProcess> {
        let session = match self.session.take() {
            Some(session) => session,
            None => Session::connect(self.config.clone()).await?,
        };
        let session = self.session.insert(session);
        session.spawn(command).await
    }
}
