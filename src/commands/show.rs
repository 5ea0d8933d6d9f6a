// ABOUTME: Show command implementation.
// ABOUTME: Prints the local command, SSH settings and remote script in effect.

use pairrun::config::Config;
use pairrun::output::{Output, OutputMode};

pub fn show(config: &Config, output: &Output) {
    if output.mode() == OutputMode::Json {
        let value = serde_json::json!({
            "local": {
                "program": config.local.program,
                "args": config.local.args,
                "working_dir": config.local.working_dir,
            },
            "remote": {
                "user": config.remote.user,
                "port": config.remote.port,
                "key_path": config.remote.key_path,
                "host_key_policy": config.remote.host_key_policy.to_string(),
                "timeout_secs": config.remote.timeout.map(|t| t.as_secs_f64()),
                "commands": config.remote.commands,
            },
        });
        println!("{value}");
        return;
    }

    println!("Local: {}", config.local.command().command_line());
    if let Some(dir) = &config.local.working_dir {
        println!("  in {}", dir.display());
    }
    println!(
        "Remote user: {} (port {})",
        config.remote.user, config.remote.port
    );
    println!("Key: {}", config.remote.key_path.display());
    println!("Host keys: {}", config.remote.host_key_policy);
    match config.remote.timeout {
        Some(timeout) => println!("Remote timeout: {:?}", timeout),
        None => println!("Remote timeout: none"),
    }
    println!("Remote commands:");
    for line in &config.remote.commands {
        println!("  {line}");
    }
}
