//! Query module
//! 
//! The streaming query client and the events it publishes while a reply
//! streams in.

pub mod client;
pub mod events;

// Re-export commonly used types
pub use client::StreamingQueryClient;
pub use events::{QueryEvent, ReplyObserver};
