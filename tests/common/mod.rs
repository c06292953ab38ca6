//! Scripted transport shared by the integration tests

use agri_advisor::streaming::{ByteStream, QueryTransport};
use agri_advisor::types::Query;
use agri_advisor::{AdvisorError, QueryEvent, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// One step of a scripted response body
#[derive(Debug, Clone)]
pub enum Step {
    Chunk(Vec<u8>),
    Fail(String),
}

pub fn chunk(text: &str) -> Step {
    Step::Chunk(text.as_bytes().to_vec())
}

/// Request as seen by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    pub session_id: String,
    pub query: Query,
}

/// Transport replaying a queue of scripted responses, one per request
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<Vec<std::result::Result<Vec<Step>, String>>>>,
    pub sent: Arc<Mutex<Vec<SentRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response body
    pub fn respond(self, steps: Vec<Step>) -> Self {
        self.responses.lock().unwrap().push(Ok(steps));
        self
    }

    /// Queue a failure to open the stream at all
    pub fn refuse(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryTransport for ScriptedTransport {
    async fn open(&self, session_id: &str, query: &Query) -> Result<ByteStream> {
        self.sent.lock().unwrap().push(SentRequest {
            session_id: session_id.to_string(),
            query: query.clone(),
        });

        let next = {
            let mut responses = self.responses.lock().unwrap();
            assert!(!responses.is_empty(), "unexpected request");
            responses.remove(0)
        };

        let steps = next.map_err(AdvisorError::Transport)?;
        let items: Vec<Result<Bytes>> = steps
            .into_iter()
            .map(|step| match step {
                Step::Chunk(bytes) => Ok(Bytes::from(bytes)),
                Step::Fail(message) => Err(AdvisorError::Transport(message)),
            })
            .collect();

        Ok(futures_util::stream::iter(items).boxed())
    }
}

/// Transport whose body is fed step by step while the request runs
///
/// The stream stays open until the sender is dropped.
pub struct ChannelTransport {
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Step>>>,
}

impl ChannelTransport {
    pub fn new() -> (mpsc::UnboundedSender<Step>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let transport = Self {
            receiver: Mutex::new(Some(receiver)),
        };
        (sender, transport)
    }
}

#[async_trait]
impl QueryTransport for ChannelTransport {
    async fn open(&self, _session_id: &str, _query: &Query) -> Result<ByteStream> {
        let receiver = self
            .receiver
            .lock()
            .unwrap()
            .take()
            .expect("channel transport opened twice");

        let stream = futures_util::stream::unfold(receiver, |mut receiver| async move {
            let item = match receiver.recv().await? {
                Step::Chunk(bytes) => Ok(Bytes::from(bytes)),
                Step::Fail(message) => Err(AdvisorError::Transport(message)),
            };
            Some((item, receiver))
        });

        Ok(stream.boxed())
    }
}

/// Observer collecting every published event
pub fn recorder() -> (Arc<Mutex<Vec<QueryEvent>>>, impl FnMut(&QueryEvent) + Send + 'static) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    (events, move |event: &QueryEvent| sink.lock().unwrap().push(event.clone()))
}

/// Reply values carried by token events, in publish order
pub fn published_replies(events: &[QueryEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            QueryEvent::Token { reply, .. } => Some(reply.clone()),
            _ => None,
        })
        .collect()
}
