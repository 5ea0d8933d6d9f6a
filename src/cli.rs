// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use pairrun::config::RemoteAddr;
use pairrun::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pairrun")]
#[command(about = "Launch a cooperating local and remote process pair over SSH")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the remote output and errors
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (default: pairrun.yml in the current directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the local and remote processes, wait for the local one, print remote output
    Run {
        /// Address of this machine, handed to the local process
        local_addr: String,

        /// Remote host as [user@]host[:port]
        remote_addr: RemoteAddr,
    },

    /// Write a pairrun.yml with the default commands
    Init {
        /// Overwrite an existing pairrun.yml
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_both_addresses() {
        let cli = Cli::parse_from(["pairrun", "run", "10.0.0.1", "admin@10.0.0.2:2222"]);
        match cli.command {
            Commands::Run {
                local_addr,
                remote_addr,
            } => {
                assert_eq!(local_addr, "10.0.0.1");
                assert_eq!(remote_addr.host, "10.0.0.2");
                assert_eq!(remote_addr.port, Some(2222));
                assert_eq!(remote_addr.user.as_deref(), Some("admin"));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn output_mode_from_flags() {
        let cli = Cli::parse_from(["pairrun", "--json", "show"]);
        assert_eq!(cli.output_mode(), OutputMode::Json);

        let cli = Cli::parse_from(["pairrun", "show", "-q"]);
        assert_eq!(cli.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn quiet_conflicts_with_json() {
        assert!(Cli::try_parse_from(["pairrun", "-q", "--json", "show"]).is_err());
    }
}
