//! Agri Advisor - streaming agricultural advisory client
//!
//! Sends a farmer's question and location to the advisory service and
//! renders the markdown reply token by token as it streams in.
//!
//! # Architecture
//!
//! - **streaming**: HTTP transport + incremental event-stream parser
//! - **query**: streaming query client (status, reply accumulator, events)
//! - **store / session**: durable session id and theme preference
//! - **cli / repl / execution**: terminal front end

pub mod errors;
pub mod types;
pub mod streaming;
pub mod store;
pub mod session;
pub mod query;

// Re-export commonly used types
pub use errors::{AdvisorError, Result};
pub use query::{QueryEvent, ReplyObserver, StreamingQueryClient};

// Terminal front end
pub mod cli;
pub mod config;
pub mod telemetry;
pub mod repl;

// Shared ask logic for CLI and interactive modes
pub mod execution;
