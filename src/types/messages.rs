//! Wire types for the advisory API
//!
//! Defines the request body sent to the advisory endpoint and the payloads
//! carried by each `data: ` record of the response stream.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{AdvisorError, Result};

/// Query sent to the advisory endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    pub question: String,
    pub location: String,

    /// Optional crop hint, read by the backend when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
}

impl Query {
    pub fn new(question: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            location: location.into(),
            crop: None,
        }
    }

    pub fn with_crop(mut self, crop: impl Into<String>) -> Self {
        self.crop = Some(crop.into());
        self
    }

    /// True when the question has visible content
    pub fn has_question(&self) -> bool {
        !self.question.trim().is_empty()
    }

    /// Reject a query whose question is blank after trimming
    pub fn validate(&self) -> Result<()> {
        if self.has_question() {
            Ok(())
        } else {
            Err(AdvisorError::EmptyQuestion)
        }
    }
}

/// Raw JSON shape of a record payload
///
/// All fields are optional; interpreted by `StreamPayload::classify`.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawPayload {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

/// Recognized record payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamPayload {
    /// Incremental text fragment to append to the reply
    Token(String),

    /// Explicit end-of-stream signal
    Done,

    /// Generation failed on the server; a `done` record usually follows
    Error(String),
}

impl StreamPayload {
    /// Parse a record body (the text after `data: `)
    ///
    /// Returns `None` when the body is not a JSON object or carries no
    /// recognized field. A true `done` flag wins over `token`, which wins
    /// over `error`.
    pub fn parse(body: &str) -> Option<Self> {
        // Derived struct deserialization also accepts arrays
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        if !value.is_object() {
            return None;
        }

        let raw: RawPayload = serde_json::from_value(value).ok()?;
        Self::classify(raw)
    }

    fn classify(raw: RawPayload) -> Option<Self> {
        if raw.done == Some(true) {
            return Some(StreamPayload::Done);
        }
        if let Some(token) = raw.token {
            return Some(StreamPayload::Token(token));
        }
        raw.error.map(StreamPayload::Error)
    }
}

/// Request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,

    /// Transport failure; the partial reply is preserved
    Failed,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Idle => write!(f, "idle"),
            RequestStatus::Loading => write!(f, "loading"),
            RequestStatus::Failed => write!(f, "failed"),
        }
    }
}
