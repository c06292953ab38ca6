//! Type definitions module
//! 
//! Wire payloads, request status and reply results.

pub mod messages;

// Re-export commonly used types
pub use messages::{Query, RequestStatus, StreamPayload};

// Reply result types
pub mod execution;
pub use execution::{EndOfStream, Reply, Submission};
