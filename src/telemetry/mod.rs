//! Telemetry for streamed requests
//!
//! Per-request stream counters plus the tracing subscriber setup used by
//! the binary.

use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Counters collected while consuming one response stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub chunks: usize,
    pub bytes: usize,
    pub records: usize,
    pub tokens: usize,
    pub malformed: usize,
    pub server_errors: usize,
    /// Milliseconds from request start to the first token, if any arrived
    pub first_token_ms: Option<u64>,
    pub elapsed_ms: u64,
}

impl StreamStats {
    /// Tokens per second over the whole request
    pub fn throughput(&self) -> f64 {
        if self.elapsed_ms == 0 {
            0.0
        } else {
            self.tokens as f64 / (self.elapsed_ms as f64 / 1000.0)
        }
    }
}

/// Stream telemetry collector
///
/// Owned by a single request; the query client resets it on each submit.
#[derive(Debug)]
pub struct StreamTelemetry {
    stats: StreamStats,
    start_time: Instant,
}

impl StreamTelemetry {
    /// Create a new collector and start its clock
    pub fn new() -> Self {
        Self {
            stats: StreamStats::default(),
            start_time: Instant::now(),
        }
    }

    pub fn record_chunk(&mut self, len: usize) {
        self.stats.chunks += 1;
        self.stats.bytes += len;
    }

    pub fn record_record(&mut self) {
        self.stats.records += 1;
    }

    pub fn record_token(&mut self) {
        if self.stats.tokens == 0 {
            self.stats.first_token_ms = Some(self.elapsed().as_millis() as u64);
        }
        self.stats.tokens += 1;
    }

    pub fn record_malformed(&mut self) {
        self.stats.malformed += 1;
    }

    pub fn record_server_error(&mut self) {
        self.stats.server_errors += 1;
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Snapshot current statistics
    pub fn snapshot(&self) -> StreamStats {
        let mut stats = self.stats.clone();
        stats.elapsed_ms = self.elapsed().as_millis() as u64;
        stats
    }
}

impl Default for StreamTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// Default log directive for a verbosity level
pub fn default_directive(verbosity: crate::cli::Verbosity) -> &'static str {
    use crate::cli::Verbosity;

    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "agri_advisor=info,agri=info",
        Verbosity::VeryVerbose => "agri_advisor=debug,agri=debug",
    }
}

/// Install the global tracing subscriber
///
/// Logs go to stderr so they never interleave with the streamed reply on
/// stdout. `RUST_LOG` overrides the verbosity default.
pub fn init_logging(verbosity: crate::cli::Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
