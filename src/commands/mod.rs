// ABOUTME: Command module aggregator for the pairrun CLI.
// ABOUTME: Re-exports run and show command handlers.

mod run;
mod show;

pub use run::run_pair;
pub use show::show;
