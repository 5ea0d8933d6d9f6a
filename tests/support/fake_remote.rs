// ABOUTME: Scripted stand-in for the SSH remote launcher.
// ABOUTME: Records the commands it was asked to start and replays canned output.

use async_trait::async_trait;
use pairrun::launch::RemoteLauncher;
use pairrun::ssh::{CommandOutput, Error, PartialOutput, RemoteProcess, Result};
use std::time::Duration;

/// What the fake remote does when started.
pub enum Behavior {
    /// Finish after `delay` with the given output.
    Succeed {
        output: CommandOutput,
        delay: Duration,
    },
    /// Write `partial` and lose the channel before any exit status arrives.
    DropChannel { partial: PartialOutput },
    /// Fail to start, as if the connection were refused.
    RefuseConnection,
}

pub struct FakeRemote {
    behavior: Behavior,
    pub started: Vec<String>,
}

impl FakeRemote {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            started: Vec::new(),
        }
    }

    /// Remote that immediately reports `stdout`/`stderr` with `exit_code`.
    pub fn with_output(stdout: &str, stderr: &str, exit_code: u32) -> Self {
        Self::new(Behavior::Succeed {
            output: CommandOutput {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
            delay: Duration::ZERO,
        })
    }
}

#[async_trait]
impl RemoteLauncher for FakeRemote {
    async fn start(&mut self, command: &str) -> Result<RemoteProcess> {
        self.started.push(command.to_string());

        match &self.behavior {
            Behavior::Succeed { output, delay } => {
                let output = output.clone();
                let delay = *delay;
                Ok(RemoteProcess::from_task(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    Ok(output)
                })))
            }
            Behavior::DropChannel { partial } => {
                let partial = partial.clone();
                Ok(RemoteProcess::from_task(tokio::spawn(async move {
                    Err(Error::ChannelClosed { partial })
                })))
            }
            Behavior::RefuseConnection => Err(Error::Connection(
                "connection refused to remote:22".to_string(),
            )),
        }
    }
}
