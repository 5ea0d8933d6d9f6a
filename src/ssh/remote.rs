// ABOUTME: Handle for a command running on the remote host.
// ABOUTME: Drains channel output in a background task until the caller collects it.

use super::error::{Error, Result};
use parking_lot::Mutex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Output from a remote command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code of the command.
    pub exit_code: u32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Streams captured from a remote command that ended without an exit status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialOutput {
    pub stdout: String,
    pub stderr: String,
}

/// A command started on the remote host whose output has not been read yet.
///
/// Consumed by [`RemoteProcess::wait_with_output`], so the output is
/// collected exactly once.
#[derive(Debug)]
pub struct RemoteProcess {
    task: JoinHandle<Result<CommandOutput>>,
    /// Shared with the drain task so a timeout can still report what arrived.
    collector: Arc<Mutex<OutputCollector>>,
}

impl RemoteProcess {
    /// Wrap a task that resolves to the command's output.
    pub fn from_task(task: JoinHandle<Result<CommandOutput>>) -> Self {
        Self::with_collector(task, Arc::default())
    }

    pub(crate) fn with_collector(
        task: JoinHandle<Result<CommandOutput>>,
        collector: Arc<Mutex<OutputCollector>>,
    ) -> Self {
        Self { task, collector }
    }

    /// Wait for the remote command to finish and return what it wrote.
    ///
    /// With `timeout` set to `None` this waits as long as the remote command
    /// runs. On timeout the drain task is aborted and the output received so
    /// far is carried in the error.
    pub async fn wait_with_output(self, timeout: Option<Duration>) -> Result<CommandOutput> {
        let mut task = self.task;
        let joined = match timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    task.abort();
                    return Err(Error::CommandTimeout {
                        timeout: limit,
                        partial: self.collector.lock().partial(),
                    });
                }
            },
            None => task.await,
        };

        joined.map_err(|e| Error::CommandFailed(format!("output task failed: {}", e)))?
    }
}

/// Accumulates channel events into a [`CommandOutput`].
#[derive(Debug, Default)]
pub(crate) struct OutputCollector {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_code: Option<u32>,
    signal: Option<String>,
    eof: bool,
}

impl OutputCollector {
    pub(crate) fn data(&mut self, data: &[u8]) {
        self.stdout.extend_from_slice(data);
    }

    /// Extended data; only stream 1 (stderr) is kept.
    pub(crate) fn extended_data(&mut self, ext: u32, data: &[u8]) {
        if ext == 1 {
            self.stderr.extend_from_slice(data);
        }
    }

    /// Record the exit status. Returns true once nothing more is expected.
    pub(crate) fn exit_status(&mut self, code: u32) -> bool {
        self.exit_code = Some(code);
        self.eof
    }

    /// Record end of output. Returns true once nothing more is expected.
    pub(crate) fn eof(&mut self) -> bool {
        self.eof = true;
        self.exit_code.is_some()
    }

    pub(crate) fn exit_signal(&mut self, signal: String) {
        self.signal = Some(signal);
    }

    pub(crate) fn partial(&self) -> PartialOutput {
        PartialOutput {
            stdout: String::from_utf8_lossy(&self.stdout).to_string(),
            stderr: String::from_utf8_lossy(&self.stderr).to_string(),
        }
    }

    pub(crate) fn finish(&mut self) -> Result<CommandOutput> {
        let partial = self.partial();
        match (self.exit_code, self.signal.take()) {
            (Some(exit_code), _) => Ok(CommandOutput {
                exit_code,
                stdout: partial.stdout,
                stderr: partial.stderr,
            }),
            (None, Some(signal)) => Err(Error::Killed { signal, partial }),
            (None, None) => Err(Error::ChannelClosed { partial }),
        }
    }
}

/// Read a channel until the command exits and the output is complete.
pub(crate) async fn drain(
    mut channel: Channel<Msg>,
    collector: Arc<Mutex<OutputCollector>>,
) -> Result<CommandOutput> {
    while let Some(msg) = channel.wait().await {
        let done = {
            let mut collector = collector.lock();
            match msg {
                ChannelMsg::Data { data } => {
                    collector.data(&data);
                    false
                }
                ChannelMsg::ExtendedData { data, ext } => {
                    collector.extended_data(ext, &data);
                    false
                }
                ChannelMsg::ExitStatus { exit_status } => collector.exit_status(exit_status),
                ChannelMsg::ExitSignal { signal_name, .. } => {
                    collector.exit_signal(format!("{:?}", signal_name));
                    false
                }
                ChannelMsg::Eof => collector.eof(),
                ChannelMsg::Close => true,
                _ => false,
            }
        };
        if done {
            break;
        }
    }

    collector.lock().finish()
}
