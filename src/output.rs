// ABOUTME: Output formatting for CLI feedback and remote stream relay.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use crate::launch::StreamSink;
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
///
/// Progress, warnings and errors go to stderr. Stdout carries the remote
/// process's output and the final result.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration_secs(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            eprintln!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    eprintln!("{message} ({:.1}s)", elapsed);
                } else {
                    eprintln!("{message}");
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => {
                println!("{}", JsonEvent::new("success", message, self.duration_secs()));
            }
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => {
                eprintln!("{}", JsonEvent::new("warning", message, self.duration_secs()));
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                eprintln!("{}", JsonEvent::new("error", message, self.duration_secs()));
            }
        }
    }
}

/// Standard stream of this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Where and how a captured remote stream is relayed in `mode`.
///
/// Remote stdout goes to our stdout and remote stderr to our stderr in every
/// mode. JSON mode wraps the text in one event line.
pub fn render_remote(mode: OutputMode, from: Stream, text: &str) -> (Stream, String) {
    let rendered = match mode {
        OutputMode::Normal | OutputMode::Quiet => terminated(text),
        OutputMode::Json => {
            let event = match from {
                Stream::Stdout => "remote_stdout",
                Stream::Stderr => "remote_stderr",
            };
            format!("{}\n", JsonEvent::new(event, text, None))
        }
    };
    (from, rendered)
}

impl Output {
    fn relay(&self, from: Stream, text: &str) {
        match render_remote(self.mode, from, text) {
            (Stream::Stdout, rendered) => print!("{rendered}"),
            (Stream::Stderr, rendered) => eprint!("{rendered}"),
        }
    }
}

impl StreamSink for Output {
    fn stdout(&self, text: &str) {
        self.relay(Stream::Stdout, text);
    }

    fn stderr(&self, text: &str) {
        self.relay(Stream::Stderr, text);
    }
}

/// Text with a trailing newline added if it lacks one. Empty stays empty.
fn terminated(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

impl<'a> JsonEvent<'a> {
    fn new(event: &'a str, message: &'a str, duration_secs: Option<f64>) -> Self {
        Self {
            event,
            message,
            duration_secs,
        }
    }
}

impl std::fmt::Display for JsonEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminated_adds_missing_newline() {
        assert_eq!(terminated("done"), "done\n");
        assert_eq!(terminated("done\n"), "done\n");
        assert_eq!(terminated(""), "");
    }

    #[test]
    fn plain_modes_keep_streams_apart() {
        for mode in [OutputMode::Normal, OutputMode::Quiet] {
            assert_eq!(
                render_remote(mode, Stream::Stdout, "tick 1"),
                (Stream::Stdout, "tick 1\n".to_string())
            );
            assert_eq!(
                render_remote(mode, Stream::Stderr, "warning: slow\n"),
                (Stream::Stderr, "warning: slow\n".to_string())
            );
        }
    }

    #[test]
    fn empty_remote_stream_renders_nothing() {
        assert_eq!(
            render_remote(OutputMode::Normal, Stream::Stderr, ""),
            (Stream::Stderr, String::new())
        );
    }

    #[test]
    fn json_mode_tags_each_stream() {
        let (stream, line) = render_remote(OutputMode::Json, Stream::Stdout, "tick 1\n");
        assert_eq!(stream, Stream::Stdout);
        assert_eq!(line, "{\"event\":\"remote_stdout\",\"message\":\"tick 1\\n\"}\n");

        let (stream, line) = render_remote(OutputMode::Json, Stream::Stderr, "boom");
        assert_eq!(stream, Stream::Stderr);
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["event"], "remote_stderr");
        assert_eq!(value["message"], "boom");
    }

    #[test]
    fn json_event_omits_missing_duration() {
        let event = JsonEvent::new("remote_stdout", "tick 1\n", None);
        assert_eq!(
            event.to_string(),
            r#"{"event":"remote_stdout","message":"tick 1\n"}"#
        );
    }

    #[test]
    fn json_event_includes_duration() {
        let event = JsonEvent::new("success", "done", Some(1.5));
        let value: serde_json::Value = serde_json::from_str(&event.to_string()).unwrap();
        assert_eq!(value["duration_secs"], 1.5);
    }
}
