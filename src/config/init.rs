// ABOUTME: Config scaffolding for new setups.
// ABOUTME: Creates a pairrun.yml template holding the built-in defaults.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

/// Write `pairrun.yml` into `dir` and return its path.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, generate_template_yaml(&Config::default()))?;
    tracing::debug!("wrote {}", config_path.display());

    Ok(config_path)
}

/// Single-quoted YAML scalar; backslashes stay literal.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn generate_template_yaml(config: &Config) -> String {
    let args = config
        .local
        .args
        .iter()
        .map(|a| quote(a))
        .collect::<Vec<_>>()
        .join(", ");
    let commands: String = config
        .remote
        .commands
        .iter()
        .map(|c| format!("    - {}\n", quote(c)))
        .collect();

    format!(
        r#"local:
  program: {}
  args: [{}]
  # working_dir: ./sim
  # env:
  #   SIM_LOG: debug

remote:
  user: {}
  port: {}
  key_path: {}
  # Host key verification: accept-any (default), trust-first-use or strict
  host_key_policy: {}
  # Give up waiting for remote output after this long (default: wait forever)
  # timeout: 10m
  commands:
{}"#,
        quote(&config.local.program),
        args,
        quote(&config.remote.user),
        config.remote.port,
        quote(&config.remote.key_path.to_string_lossy()),
        config.remote.host_key_policy,
        commands
    )
}
