// ABOUTME: Configuration types and parsing for pairrun.yml.
// ABOUTME: Handles YAML parsing, discovery, defaults and SSH session settings.

mod init;
mod remote_addr;

pub use init::init_config;
pub use remote_addr::RemoteAddr;

use crate::error::{Error, Result};
use crate::local::LocalCommand;
use crate::ssh::{HostKeyPolicy, SessionConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "pairrun.yml";
pub const CONFIG_FILENAME_ALT: &str = "pairrun.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".pairrun/config.yml";

pub const DEFAULT_LOCAL_PROGRAM: &str = r".\pinkypi.exe";
pub const DEFAULT_LOCAL_ARGS: [&str; 4] = ["-f", "27", "-sf", "0"];
pub const DEFAULT_REMOTE_USER: &str = "administrator";
pub const DEFAULT_KEY_PATH: &str = "~/.ssh/id_rsa";
pub const DEFAULT_REMOTE_COMMANDS: [&str; 2] =
    [r"cd $home\pentan_cpu", r".\pinkypi.exe -f 23 -sf 27"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub local: LocalConfig,

    #[serde(default)]
    pub remote: RemoteConfig,
}

/// The local executable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "LocalConfigEntry")]
pub struct LocalConfig {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_LOCAL_PROGRAM.to_string(),
            args: DEFAULT_LOCAL_ARGS.iter().map(|a| a.to_string()).collect(),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }
}

/// Raw `local:` section; `command` is shorthand for program + args.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LocalConfigEntry {
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    program: Option<String>,
    #[serde(default)]
    args: Option<Vec<String>>,
    #[serde(default)]
    working_dir: Option<PathBuf>,
    #[serde(default)]
    env: BTreeMap<String, String>,
}

impl TryFrom<LocalConfigEntry> for LocalConfig {
    type Error = String;

    fn try_from(entry: LocalConfigEntry) -> std::result::Result<Self, Self::Error> {
        let (program, args) = match (entry.command, entry.program) {
            (Some(_), Some(_)) => {
                return Err("local: use either `command` or `program`, not both".to_string());
            }
            (Some(_), None) if entry.args.is_some() => {
                return Err("local: `args` cannot be combined with `command`".to_string());
            }
            (Some(line), None) => {
                let parsed = LocalCommand::parse(&line)
                    .ok_or_else(|| "local: command cannot be empty".to_string())?;
                (parsed.program, parsed.args)
            }
            (None, Some(program)) => (program, entry.args.unwrap_or_default()),
            (None, None) => {
                let defaults = LocalConfig::default();
                (defaults.program, entry.args.unwrap_or(defaults.args))
            }
        };

        Ok(LocalConfig {
            program,
            args,
            working_dir: entry.working_dir,
            env: entry.env,
        })
    }
}

impl LocalConfig {
    pub fn command(&self) -> LocalCommand {
        let mut command = LocalCommand::new(&self.program).args(&self.args);
        command.env = self.env.clone();
        if let Some(dir) = &self.working_dir {
            command = command.working_dir(dir);
        }
        command
    }
}

/// The SSH side: who to log in as and what to run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_key_path")]
    pub key_path: PathBuf,

    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,

    #[serde(default)]
    pub known_hosts_path: Option<PathBuf>,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    #[serde(default = "default_commands")]
    pub commands: Vec<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            port: default_port(),
            key_path: default_key_path(),
            host_key_policy: HostKeyPolicy::default(),
            known_hosts_path: None,
            timeout: None,
            commands: default_commands(),
        }
    }
}

fn default_user() -> String {
    DEFAULT_REMOTE_USER.to_string()
}

fn default_port() -> u16 {
    22
}

fn default_key_path() -> PathBuf {
    PathBuf::from(DEFAULT_KEY_PATH)
}

fn default_commands() -> Vec<String> {
    DEFAULT_REMOTE_COMMANDS.iter().map(|c| c.to_string()).collect()
}

impl RemoteConfig {
    /// The command lines as one script: a leading blank line, then each line
    /// newline-terminated.
    pub fn command_script(&self) -> String {
        let mut script = String::from("\n");
        for line in &self.commands {
            script.push_str(line);
            script.push('\n');
        }
        script
    }

    /// Session settings for `addr`; user and port in the address win.
    pub fn session_config(&self, addr: &RemoteAddr) -> Result<SessionConfig> {
        let user = addr.user.clone().unwrap_or_else(|| self.user.clone());
        let port = addr.port.unwrap_or(self.port);

        let mut config = SessionConfig::new(&addr.host, user, expand_home(&self.key_path)?)
            .port(port)
            .host_key_policy(self.host_key_policy);
        if let Some(path) = &self.known_hosts_path {
            config = config.known_hosts_path(expand_home(path)?);
        }
        Ok(config)
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find a config file in `dir`.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Load the config from `dir`, or fall back to built-in defaults.
    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => {
                tracing::debug!("loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                tracing::debug!("no configuration in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    /// Load an explicitly named file, or discover one in `dir`.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(Error::ConfigNotFound(path.to_path_buf())),
            Some(path) => Self::load(path),
            None => Self::discover(dir),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.local.program.trim().is_empty() {
            return Err(Error::InvalidConfig("local program cannot be empty".to_string()));
        }
        if self.remote.user.trim().is_empty() {
            return Err(Error::InvalidConfig("remote user cannot be empty".to_string()));
        }
        if self.remote.port == 0 {
            return Err(Error::InvalidConfig("remote port cannot be 0".to_string()));
        }
        if self.remote.commands.iter().all(|c| c.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "remote commands cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .ok_or_else(|| {
            Error::InvalidConfig(format!(
                "cannot expand {}: HOME is not set",
                path.display()
            ))
        })?;

    Ok(PathBuf::from(home).join(rest))
}
