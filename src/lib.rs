// ABOUTME: Library root for pairrun - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod launch;
pub mod local;
pub mod output;
pub mod ssh;
