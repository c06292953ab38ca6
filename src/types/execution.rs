//! Reply result types
//!
//! What a finished submission hands back to the caller: the accumulated
//! reply text, how the stream ended and the per-request stream counters.

use crate::telemetry::StreamStats;
use std::time::Duration;

/// How a response stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfStream {
    /// Server sent an explicit `{"done": true}` record
    DoneSignal,

    /// Transport closed without a done record
    Exhausted,
}

/// Completed reply from one submission
#[derive(Debug, Clone)]
pub struct Reply {
    /// Concatenated tokens in arrival order
    pub text: String,

    pub ended_by: EndOfStream,

    /// Session identifier the request was sent under
    pub session_id: String,

    /// Last error message reported in-stream by the server
    pub server_error: Option<String>,

    pub stats: StreamStats,
}

impl Reply {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.stats.elapsed_ms)
    }

    /// Get a human-readable summary of the request
    pub fn summary(&self) -> String {
        let ending = match self.ended_by {
            EndOfStream::DoneSignal => "done",
            EndOfStream::Exhausted => "stream closed",
        };
        let mut summary = format!(
            "{} tokens in {:.2}s ({})",
            self.stats.tokens,
            self.duration().as_secs_f64(),
            ending
        );
        if self.stats.malformed > 0 {
            summary.push_str(&format!(", {} malformed records skipped", self.stats.malformed));
        }
        summary
    }
}

/// Outcome of a submit call
#[derive(Debug, Clone)]
pub enum Submission {
    /// Blank question, nothing was sent
    Skipped,

    Completed(Reply),
}

impl Submission {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Submission::Skipped)
    }

    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Submission::Skipped => None,
            Submission::Completed(reply) => Some(reply),
        }
    }

    pub fn into_reply(self) -> Option<Reply> {
        match self {
            Submission::Skipped => None,
            Submission::Completed(reply) => Some(reply),
        }
    }
}
