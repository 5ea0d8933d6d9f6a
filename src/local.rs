// ABOUTME: Launcher for the local half of the pair.
// ABOUTME: Spawns the executable without waiting and hands back a handle to wait on.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;
use tokio::process::{Child, Command};

#[derive(Debug, Error)]
pub enum LocalError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A local executable with its fixed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl LocalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    /// Split a command line on spaces into program and arguments.
    ///
    /// No quoting is interpreted. Returns None for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split(' ').filter(|part| !part.is_empty());
        let program = parts.next()?;
        Some(Self::new(program).args(parts))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Program and arguments joined for display.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build the process command. Standard streams are inherited.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).envs(&self.env);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }

    /// Start the process and return immediately.
    pub fn spawn(&self) -> Result<LocalProcess, LocalError> {
        let child = self.to_command().spawn().map_err(|source| LocalError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        tracing::info!("started {} (pid {:?})", self.command_line(), child.id());

        Ok(LocalProcess {
            program: self.program.clone(),
            child,
        })
    }
}

/// A running local process. Consumed by [`LocalProcess::wait`].
#[derive(Debug)]
pub struct LocalProcess {
    program: String,
    child: Child,
}

impl LocalProcess {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Block until the process exits.
    pub async fn wait(mut self) -> Result<LocalExit, LocalError> {
        let status = self.child.wait().await.map_err(|source| LocalError::Wait {
            program: self.program.clone(),
            source,
        })?;

        let exit = LocalExit::from(status);
        tracing::info!("{} exited with {:?}", self.program, exit.code);
        Ok(exit)
    }
}

/// How the local process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalExit {
    /// Exit code, or None when terminated by a signal.
    pub code: Option<i32>,
    pub success: bool,
}

impl From<ExitStatus> for LocalExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            success: status.success(),
        }
    }
}
