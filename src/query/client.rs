//! Streaming query client
//!
//! Drives one advisory request end to end:
//! 1. Resolve the durable session identifier
//! 2. Reset the reply and enter `Loading`
//! 3. Open the response stream through the transport
//! 4. Fold `token` records into the reply in arrival order, publishing
//!    each update, until a `done` record or the end of the stream
//!
//! Status transitions:
//! - Idle/Failed → Loading (on: submit with a non-blank question)
//! - Loading     → Idle    (on: done record | stream exhausted)
//! - Loading     → Failed  (on: transport error, partial reply kept)

use crate::errors::{AdvisorError, Result};
use crate::query::events::{QueryEvent, ReplyObserver};
use crate::session::SessionIdentity;
use crate::store::KeyValueStore;
use crate::streaming::{EventStreamParser, ParsedRecord, QueryTransport};
use crate::telemetry::StreamTelemetry;
use crate::types::{EndOfStream, Query, Reply, RequestStatus, StreamPayload, Submission};
use futures_util::StreamExt;
use std::sync::Arc;

/// Streaming query client
///
/// `submit` borrows the client mutably, so a second submission cannot start
/// while one is in flight on the same client.
pub struct StreamingQueryClient {
    transport: Arc<dyn QueryTransport>,
    store: Arc<dyn KeyValueStore>,
    observers: Vec<Box<dyn ReplyObserver>>,
    status: RequestStatus,
    reply: String,
    session_id: Option<String>,
    last_server_error: Option<String>,
}

impl StreamingQueryClient {
    /// Create client over a transport and a key-value store
    pub fn new(transport: Arc<dyn QueryTransport>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            transport,
            store,
            observers: Vec::new(),
            status: RequestStatus::Idle,
            reply: String::new(),
            session_id: None,
            last_server_error: None,
        }
    }

    /// Register an observer for reply events
    pub fn subscribe(&mut self, observer: impl ReplyObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Builder-style variant of [`subscribe`](Self::subscribe)
    pub fn with_observer(mut self, observer: impl ReplyObserver + 'static) -> Self {
        self.subscribe(observer);
        self
    }

    /// Submit a question for a location and stream the reply
    ///
    /// A question that is blank after trimming is a no-op: nothing is sent,
    /// no state changes and `Submission::Skipped` is returned.
    pub async fn submit(&mut self, question: &str, location: &str) -> Result<Submission> {
        self.submit_query(Query::new(question, location)).await
    }

    /// Submit a fully built query
    pub async fn submit_query(&mut self, query: Query) -> Result<Submission> {
        if let Err(e) = query.validate() {
            tracing::debug!(error = %e, "Ignoring blank question");
            return Ok(Submission::Skipped);
        }

        let session_id = SessionIdentity::resolve(self.store.as_ref())?;
        self.session_id = Some(session_id.clone());

        self.status = RequestStatus::Loading;
        self.reply.clear();
        self.last_server_error = None;
        self.publish(QueryEvent::Started {
            session_id: session_id.clone(),
        });

        tracing::info!(session_id = %session_id, location = %query.location, "Submitting question");

        let mut telemetry = StreamTelemetry::new();

        let mut stream = match self.transport.open(&session_id, &query).await {
            Ok(stream) => stream,
            Err(e) => return Err(self.fail(e)),
        };

        let mut parser = EventStreamParser::new();
        let mut ended_by = EndOfStream::Exhausted;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => return Err(self.fail(e)),
            };
            telemetry.record_chunk(chunk.len());

            if self.apply(parser.push(&chunk), &mut telemetry) {
                ended_by = EndOfStream::DoneSignal;
                break;
            }
        }

        // Drop the connection without reading past a done record
        drop(stream);

        if ended_by == EndOfStream::Exhausted && self.apply(parser.finish(), &mut telemetry) {
            ended_by = EndOfStream::DoneSignal;
        }

        self.status = RequestStatus::Idle;

        let stats = telemetry.snapshot();
        tracing::info!(
            tokens = stats.tokens,
            malformed = stats.malformed,
            elapsed_ms = stats.elapsed_ms,
            ?ended_by,
            "Reply complete"
        );

        self.publish(QueryEvent::Finished {
            reply: self.reply.clone(),
        });

        Ok(Submission::Completed(Reply {
            text: self.reply.clone(),
            ended_by,
            session_id,
            server_error: self.last_server_error.clone(),
            stats,
        }))
    }

    /// Fold records into the reply in order
    ///
    /// Returns true when a done record was seen; records after it are ignored.
    fn apply(&mut self, records: Vec<ParsedRecord>, telemetry: &mut StreamTelemetry) -> bool {
        for record in records {
            telemetry.record_record();

            match record {
                ParsedRecord::Payload(StreamPayload::Done) => return true,
                ParsedRecord::Payload(StreamPayload::Token(token)) => {
                    if token.is_empty() {
                        continue;
                    }
                    self.reply.push_str(&token);
                    telemetry.record_token();
                    let reply = self.reply.clone();
                    self.publish(QueryEvent::Token { token, reply });
                }
                ParsedRecord::Payload(StreamPayload::Error(message)) => {
                    tracing::warn!(%message, "Server reported an error in-stream");
                    telemetry.record_server_error();
                    self.last_server_error = Some(message.clone());
                    self.publish(QueryEvent::ServerError { message });
                }
                ParsedRecord::Malformed(ref body) => {
                    tracing::debug!(%body, "Skipping malformed record");
                    telemetry.record_malformed();
                }
                ParsedRecord::Overflow { .. } => {
                    if let Some(error) = record.diagnostic() {
                        tracing::warn!(%error, "Discarding oversized pending record");
                    }
                    telemetry.record_malformed();
                }
                ParsedRecord::Ignored => {
                    tracing::trace!("Skipping non-data record");
                }
            }
        }

        false
    }

    /// Enter the failed state, keeping the partial reply
    fn fail(&mut self, error: AdvisorError) -> AdvisorError {
        tracing::error!(error = %error, partial_len = self.reply.len(), "Request failed");
        self.status = RequestStatus::Failed;
        self.publish(QueryEvent::Failed {
            error: error.to_string(),
            reply: self.reply.clone(),
        });
        error
    }

    fn publish(&mut self, event: QueryEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
    }

    /// Current request status
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Reply accumulated so far
    pub fn reply(&self) -> &str {
        &self.reply
    }

    /// Session identifier used by the latest submission
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Last in-stream error reported by the server during the latest submission
    pub fn last_server_error(&self) -> Option<&str> {
        self.last_server_error.as_deref()
    }

    /// Key-value store backing the session identifier
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::streaming::ByteStream;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTransport(&'static str);

    #[async_trait]
    impl QueryTransport for FixedTransport {
        async fn open(&self, _session_id: &str, _query: &Query) -> Result<ByteStream> {
            let chunk: Result<Bytes> = Ok(Bytes::from_static(self.0.as_bytes()));
            Ok(futures_util::stream::iter(vec![chunk]).boxed())
        }
    }

    fn client(body: &'static str) -> StreamingQueryClient {
        StreamingQueryClient::new(Arc::new(FixedTransport(body)), Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_initial_state() {
        let client = client("");
        assert_eq!(client.status(), RequestStatus::Idle);
        assert_eq!(client.reply(), "");
        assert!(client.session_id().is_none());
    }

    #[tokio::test]
    async fn test_tokens_accumulate() {
        let mut client = client("data: {\"token\":\"Hel\"}\n\ndata: {\"token\":\"lo\"}\n\n");

        let reply = client.submit("hi", "Karnal").await.unwrap().into_reply().unwrap();

        assert_eq!(reply.text, "Hello");
        assert_eq!(reply.ended_by, EndOfStream::Exhausted);
        assert_eq!(client.status(), RequestStatus::Idle);
        assert_eq!(client.reply(), "Hello");
        assert_eq!(client.session_id(), Some(reply.session_id.as_str()));
    }

    #[tokio::test]
    async fn test_empty_tokens_not_published() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        let mut client = client("data: {\"token\":\"\"}\n\ndata: {\"token\":\"a\"}\n\n").with_observer(
            move |event: &QueryEvent| {
                if matches!(event, QueryEvent::Token { .. }) {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            },
        );

        client.submit("q", "l").await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(client.reply(), "a");
    }

    #[tokio::test]
    async fn test_server_error_is_recorded() {
        let mut client = client("data: {\"error\":\"model offline\"}\n\ndata: {\"done\":true}\n\n");

        let reply = client.submit("q", "l").await.unwrap().into_reply().unwrap();

        assert_eq!(reply.ended_by, EndOfStream::DoneSignal);
        assert_eq!(reply.server_error.as_deref(), Some("model offline"));
        assert_eq!(client.last_server_error(), Some("model offline"));
        assert_eq!(reply.stats.server_errors, 1);
        assert_eq!(client.status(), RequestStatus::Idle);
    }

    #[tokio::test]
    async fn test_trailing_done_without_delimiter() {
        let mut client = client("data: {\"token\":\"x\"}\n\ndata: {\"done\":true}");

        let reply = client.submit("q", "l").await.unwrap().into_reply().unwrap();
        assert_eq!(reply.text, "x");
        assert_eq!(reply.ended_by, EndOfStream::DoneSignal);
    }
}
