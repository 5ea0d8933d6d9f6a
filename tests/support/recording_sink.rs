// ABOUTME: Stream sink that records what the launcher emitted.
// ABOUTME: Notes whether a marker file existed at the moment of each write.

use pairrun::launch::StreamSink;
use parking_lot::Mutex;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone)]
pub struct Write {
    pub stream: Stream,
    pub text: String,
    pub marker_existed: bool,
}

pub struct RecordingSink {
    marker: Option<PathBuf>,
    writes: Mutex<Vec<Write>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            marker: None,
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Sink that checks for `marker` on every write.
    pub fn watching(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: Some(marker.into()),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().clone()
    }

    fn record(&self, stream: Stream, text: &str) {
        let marker_existed = self.marker.as_ref().is_some_and(|m| m.exists());
        self.writes.lock().push(Write {
            stream,
            text: text.to_string(),
            marker_existed,
        });
    }
}

impl StreamSink for RecordingSink {
    fn stdout(&self, text: &str) {
        self.record(Stream::Stdout, text);
    }

    fn stderr(&self, text: &str) {
        self.record(Stream::Stderr, text);
    }
}
