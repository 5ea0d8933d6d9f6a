// ABOUTME: SSH session management using russh.
// ABOUTME: Handles connection, key-file authentication, and remote command execution.

use super::error::{Error, Result};
use super::remote::{self, OutputCollector, RemoteProcess};
use parking_lot::Mutex;
use russh::client::{self, Config, Handle};
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key};
use russh::Disconnect;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

/// How the server's host key is verified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Accept any host key without consulting known_hosts.
    #[default]
    AcceptAny,
    /// Accept and record unknown hosts, reject changed keys.
    TrustFirstUse,
    /// Only accept keys already present in known_hosts.
    Strict,
}

impl fmt::Display for HostKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostKeyPolicy::AcceptAny => write!(f, "accept-any"),
            HostKeyPolicy::TrustFirstUse => write!(f, "trust-first-use"),
            HostKeyPolicy::Strict => write!(f, "strict"),
        }
    }
}

/// Configuration for establishing an SSH session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote host to connect to.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    /// Private key used for authentication.
    pub key_path: PathBuf,
    pub host_key_policy: HostKeyPolicy,
    /// Optional path to known_hosts file.
    /// If None, uses the default ~/.ssh/known_hosts.
    pub known_hosts_path: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            key_path: key_path.into(),
            host_key_policy: HostKeyPolicy::default(),
            known_hosts_path: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }
}

/// Result of looking a host key up in known_hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KnownHostStatus {
    Match,
    Unknown,
    Changed,
    Unreadable,
}

/// What to do with a presented host key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HostKeyDecision {
    Accept,
    AcceptAndLearn,
    Reject,
}

impl HostKeyPolicy {
    fn consults_known_hosts(self) -> bool {
        !matches!(self, HostKeyPolicy::AcceptAny)
    }

    pub(crate) fn decide(self, status: KnownHostStatus) -> HostKeyDecision {
        match (self, status) {
            (HostKeyPolicy::AcceptAny, _) => HostKeyDecision::Accept,
            (_, KnownHostStatus::Match) => HostKeyDecision::Accept,
            (_, KnownHostStatus::Changed) => HostKeyDecision::Reject,
            (HostKeyPolicy::TrustFirstUse, KnownHostStatus::Unknown) => {
                HostKeyDecision::AcceptAndLearn
            }
            (HostKeyPolicy::TrustFirstUse, KnownHostStatus::Unreadable) => {
                HostKeyDecision::AcceptAndLearn
            }
            (HostKeyPolicy::Strict, _) => HostKeyDecision::Reject,
        }
    }
}

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
    known_hosts_path: Option<PathBuf>,
}

impl SshHandler {
    fn known_host_status(&self, key: &ssh_key::PublicKey) -> KnownHostStatus {
        let check_result = match &self.known_hosts_path {
            Some(path) => check_known_hosts_path(&self.host, self.port, key, path),
            None => check_known_hosts(&self.host, self.port, key),
        };

        match check_result {
            Ok(true) => KnownHostStatus::Match,
            Ok(false) => KnownHostStatus::Unknown,
            Err(russh::keys::Error::KeyChanged { .. }) => KnownHostStatus::Changed,
            Err(e) => {
                tracing::debug!("known_hosts lookup failed: {}", e);
                KnownHostStatus::Unreadable
            }
        }
    }

    fn learn(&self, key: &ssh_key::PublicKey) {
        let learn_result = match &self.known_hosts_path {
            Some(path) => learn_known_hosts_path(&self.host, self.port, key, path),
            None => learn_known_hosts(&self.host, self.port, key),
        };
        if let Err(e) = learn_result {
            tracing::warn!("Failed to save host key to known_hosts: {}", e);
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let status = if self.policy.consults_known_hosts() {
            self.known_host_status(server_public_key)
        } else {
            KnownHostStatus::Unknown
        };

        let fingerprint = server_public_key.fingerprint(ssh_key::HashAlg::Sha256);
        match self.policy.decide(status) {
            HostKeyDecision::Accept => {
                tracing::debug!(
                    "accepting host key {} for {}:{} ({})",
                    fingerprint,
                    self.host,
                    self.port,
                    self.policy
                );
                Ok(true)
            }
            HostKeyDecision::AcceptAndLearn => {
                tracing::warn!(
                    "Trust-On-First-Use: accepting unknown host key {} for {}:{}",
                    fingerprint,
                    self.host,
                    self.port
                );
                self.learn(server_public_key);
                Ok(true)
            }
            HostKeyDecision::Reject => {
                tracing::warn!(
                    "rejecting host key {} for {}:{} ({:?})",
                    fingerprint,
                    self.host,
                    self.port,
                    status
                );
                Ok(false)
            }
        }
    }
}

/// An established SSH session.
pub struct Session {
    config: SessionConfig,
    handle: Handle<SshHandler>,
    /// Output drains of commands started with [`Session::spawn`].
    drains: Mutex<Vec<AbortHandle>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

impl Session {
    /// Connect to the remote host and authenticate with the configured key.
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        // Load the key before touching the network
        let key = load_secret_key(&config.key_path, None).map_err(|e| Error::KeyLoadFailed {
            path: config.key_path.clone(),
            reason: e.to_string(),
        })?;

        // Remote commands may stay silent for a long time; keepalives hold the link.
        let russh_config = Config {
            inactivity_timeout: None,
            keepalive_interval: Some(Duration::from_secs(15)),
            ..Default::default()
        };

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            policy: config.host_key_policy,
            known_hosts_path: config.known_hosts_path.clone(),
        };

        tracing::debug!("connecting to {}@{}:{}", config.user, config.host, config.port);

        let mut session = client::connect(
            Arc::new(russh_config),
            (config.host.as_str(), config.port),
            handler,
        )
        .await
        .map_err(|e| match e {
            russh::Error::UnknownKey => Error::HostKeyRejected {
                host: config.host.clone(),
                port: config.port,
            },
            e if e.to_string().contains("Connection refused") => Error::Connection(format!(
                "connection refused to {}:{}",
                config.host, config.port
            )),
            e => Error::Connection(e.to_string()),
        })?;

        let hash_alg = session
            .best_supported_rsa_hash()
            .await
            .map_err(Error::Protocol)?
            .flatten();

        let result = session
            .authenticate_publickey(
                &config.user,
                PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
            )
            .await
            .map_err(Error::Protocol)?;

        if !result.success() {
            return Err(Error::AuthenticationFailed(config.user.clone()));
        }

        tracing::info!("connected to {}@{}:{}", config.user, config.host, config.port);

        Ok(Self {
            config,
            handle: session,
            drains: Mutex::new(Vec::new()),
        })
    }

    /// Start a command on the remote host without waiting for it.
    pub async fn spawn(&self, command: &str) -> Result<RemoteProcess> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to exec command: {}", e)))?;

        tracing::debug!("remote command started on {}", self.config.host);

        let collector = Arc::<Mutex<OutputCollector>>::default();
        let task = tokio::spawn(remote::drain(channel, Arc::clone(&collector)));
        self.drains.lock().push(task.abort_handle());
        Ok(RemoteProcess::with_collector(task, collector))
    }

    /// Disconnect the session.
    pub async fn disconnect(self) -> Result<()> {
        abort_drains(&self.drains);

        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)?;
        tracing::debug!("disconnected from {}", self.config.host);
        Ok(())
    }
}

/// Abort every registered drain task and clear the registry.
fn abort_drains(drains: &Mutex<Vec<AbortHandle>>) {
    // Take under the lock, abort after releasing it
    let pending: Vec<_> = drains.lock().drain(..).collect();
    for drain in pending {
        drain.abort();
    }
}
