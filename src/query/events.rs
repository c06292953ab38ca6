//! Reply events and observers
//!
//! The query client publishes every state change of a request as a
//! [`QueryEvent`]. Rendering layers subscribe through [`ReplyObserver`],
//! usually with a closure or the terminal renderer.

/// Request lifecycle and progress events
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    /// Request submitted; reply reset to empty
    Started { session_id: String },

    /// Token appended; `reply` is the accumulated text so far
    Token { token: String, reply: String },

    /// Server reported a generation error in-stream
    ServerError { message: String },

    /// Stream ended normally; status is back to idle
    Finished { reply: String },

    /// Transport failure; `reply` holds whatever arrived before it
    Failed { error: String, reply: String },
}

/// Receives reply events as they are published
pub trait ReplyObserver: Send {
    fn on_event(&mut self, event: &QueryEvent);
}

impl<F> ReplyObserver for F
where
    F: FnMut(&QueryEvent) + Send,
{
    fn on_event(&mut self, event: &QueryEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_observer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut observer = move |event: &QueryEvent| sink.lock().unwrap().push(event.clone());

        observer.on_event(&QueryEvent::ServerError {
            message: "boom".to_string(),
        });
        observer.on_event(&QueryEvent::Finished {
            reply: "done".to_string(),
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[1], QueryEvent::Finished { ref reply } if reply == "done"));
    }

    #[test]
    fn test_boxed_observers_keep_state() {
        let mut count = 0usize;
        {
            let mut observers: Vec<Box<dyn ReplyObserver + '_>> = Vec::new();
            observers.push(Box::new(|_: &QueryEvent| count += 1));

            for observer in observers.iter_mut() {
                observer.on_event(&QueryEvent::Started { session_id: "s".into() });
                observer.on_event(&QueryEvent::Token { token: "a".into(), reply: "a".into() });
            }
        }
        assert_eq!(count, 2);
    }
}
