// ABOUTME: Launch sequence for a cooperating local/remote process pair.
// ABOUTME: Starts both halves, waits on the local one, then emits the remote output.

mod error;
mod remote;

pub use error::{LaunchError, LaunchErrorKind, LocalSnafu, RemoteSnafu};
pub use remote::{RemoteLauncher, SshLauncher};

use crate::local::{LocalCommand, LocalExit};
use crate::ssh::CommandOutput;
use snafu::ResultExt;
use std::time::Duration;

/// Destination for the remote process's captured streams.
pub trait StreamSink {
    fn stdout(&self, text: &str);
    fn stderr(&self, text: &str);
}

/// Everything needed to start the pair.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub local: LocalCommand,
    /// Shell script sent as a single exec request.
    pub remote_command: String,
    /// Upper bound on waiting for remote output after the local process exits.
    pub remote_timeout: Option<Duration>,
}

/// How both halves ended.
#[derive(Debug, Clone)]
pub struct PairOutcome {
    pub local: LocalExit,
    pub remote: CommandOutput,
}

/// Run the pair: start local, start remote, wait local, then emit remote output.
///
/// The remote streams are read only after the local process has exited. If
/// the remote side cannot be started the local process is still waited on
/// before the error is returned. If the remote command ends without an exit
/// status or times out, the output captured so far is emitted before the
/// error is returned.
pub async fn launch<R, S>(
    plan: &LaunchPlan,
    remote: &mut R,
    sink: &S,
) -> Result<PairOutcome, LaunchError>
where
    R: RemoteLauncher + ?Sized,
    S: StreamSink + ?Sized,
{
    let local = plan.local.spawn().context(LocalSnafu)?;

    let remote_process = match remote.start(&plan.remote_command).await {
        Ok(process) => process,
        Err(source) => {
            tracing::error!("remote start failed, waiting for local process: {}", source);
            if let Err(e) = local.wait().await {
                tracing::warn!("{}", e);
            }
            return Err(LaunchError::Remote { source });
        }
    };

    let local_exit = local.wait().await.context(LocalSnafu)?;

    let remote_output = match remote_process.wait_with_output(plan.remote_timeout).await {
        Ok(output) => output,
        Err(source) => {
            // Whatever arrived before a kill, timeout or lost channel still goes out
            if let Some(partial) = source.partial_output() {
                sink.stdout(&partial.stdout);
                sink.stderr(&partial.stderr);
            }
            return Err(source).context(RemoteSnafu);
        }
    };

    tracing::debug!(
        "remote command exited with {} ({} bytes stdout, {} bytes stderr)",
        remote_output.exit_code,
        remote_output.stdout.len(),
        remote_output.stderr.len()
    );

    sink.stdout(&remote_output.stdout);
    sink.stderr(&remote_output.stderr);

    Ok(PairOutcome {
        local: local_exit,
        remote: remote_output,
    })
}
