// ABOUTME: Run command implementation.
// ABOUTME: Launches the local/remote pair and reports non-fatal problems.

use pairrun::config::{Config, RemoteAddr};
use pairrun::diagnostics::{Diagnostics, Warning};
use pairrun::error::Result;
use pairrun::launch::{LaunchPlan, SshLauncher, launch};
use pairrun::output::Output;

pub const LOCAL_ADDR_ENV: &str = "PAIRRUN_LOCAL_ADDR";
pub const REMOTE_ADDR_ENV: &str = "PAIRRUN_REMOTE_ADDR";

/// Launch the pair described by `config` against `remote_addr`.
pub async fn run_pair(
    config: Config,
    local_addr: String,
    remote_addr: RemoteAddr,
    output: &Output,
) -> Result<()> {
    // The local address is handed through, never dialed
    tracing::debug!("local address: {}", local_addr);

    let session_config = config.remote.session_config(&remote_addr)?;
    let plan = LaunchPlan {
        local: config
            .local
            .command()
            .env(LOCAL_ADDR_ENV, &local_addr)
            .env(REMOTE_ADDR_ENV, remote_addr.to_string()),
        remote_command: config.remote.command_script(),
        remote_timeout: config.remote.timeout,
    };

    output.progress(&format!("  → Starting {}", plan.local.command_line()));
    output.progress(&format!(
        "  → Starting remote commands on {}@{}:{}",
        session_config.user, session_config.host, session_config.port
    ));

    let mut diag = Diagnostics::default();
    let mut launcher = SshLauncher::new(session_config);

    let result = launch(&plan, &mut launcher, output).await;

    // Disconnect SSH session (non-fatal if it fails)
    if let Err(e) = launcher.close().await {
        diag.warn(Warning::ssh_disconnect(format!(
            "SSH disconnect failed for {}: {}",
            remote_addr.host, e
        )));
    }

    let result = result.map(|outcome| {
        if !outcome.local.success {
            diag.warn(Warning::local_exit(match outcome.local.code {
                Some(code) => format!("{} exited with code {}", plan.local.program, code),
                None => format!("{} was terminated by a signal", plan.local.program),
            }));
        }
        if !outcome.remote.success() {
            diag.warn(Warning::remote_exit(format!(
                "remote commands exited with code {}",
                outcome.remote.exit_code
            )));
        }
    });

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    result?;
    output.success("Pair finished");
    Ok(())
}
