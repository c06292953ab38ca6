//! Streaming client module
//! 
//! Provides the advisory API transport and the incremental event-stream parser.

pub mod client;
pub mod parser;

// Re-export commonly used types
pub use client::{AdvisorHttpClient, ByteStream, QueryTransport, DEFAULT_API_BASE, DEFAULT_CONNECT_TIMEOUT};
pub use parser::{EventStreamParser, ParsedRecord, MAX_BUFFER_SIZE};
