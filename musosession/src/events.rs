//! Session event fan-out.
//!
//! One unbounded channel per subscriber; broadcasting never blocks on a
//! slow consumer and silently drops subscribers whose receiver is gone.

use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::metadata::PreparedMedia;
use crate::queue::QueueSnapshot;
use crate::state::PlaybackSnapshot;

/// Event published by the session host to its connected clients.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// Queue content or cursor changed; carries the full queue so listeners
    /// can render without polling.
    QueueChanged(QueueSnapshot),
    /// Prepared metadata changed (`None` when the cache was cleared).
    MetadataChanged(Option<PreparedMedia>),
    StateChanged(PlaybackSnapshot),
    /// Host-initiated teardown; the session handle is no longer valid.
    SessionDestroyed,
}

#[derive(Clone, Default)]
pub struct SessionEventBus {
    subscribers: Arc<Mutex<Vec<Sender<SessionEvent>>>>,
}

impl SessionEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = unbounded::<SessionEvent>();
        {
            let mut subscribers = self.subscribers.lock().unwrap();
            subscribers.push(tx);
        }
        rx
    }

    pub fn broadcast(&self, event: SessionEvent) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
