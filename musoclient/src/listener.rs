//! Client-side listener fan-out.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

use tracing::warn;

use musosession::{PlaybackSnapshot, PreparedMedia, QueueItem, QueueSnapshot};

/// Party interested in session broadcasts (UI widgets, diagnostics, …).
///
/// All methods have empty defaults; implementors override what they need.
/// `None` values signal a reset (the connection went away), distinct from a
/// regular pause/stop which always carries a snapshot.
pub trait SessionListener: Send {
    fn on_playback_state_changed(&mut self, _state: Option<&PlaybackSnapshot>) {}
    fn on_metadata_changed(&mut self, _metadata: Option<&PreparedMedia>) {}
    fn on_queue_changed(&mut self, _queue: &QueueSnapshot) {}
    fn on_children_loaded(&mut self, _parent_id: &str, _children: &[QueueItem]) {}
    /// Host-initiated teardown, NOT a caller-initiated stop.
    fn on_session_destroyed(&mut self) {}
}

/// Ordered collection of listeners.
///
/// Delivery follows registration order. A listener that panics is dropped
/// from the registry so it cannot poison delivery to the others.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<Vec<Box<dyn SessionListener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener and immediately replays the last known metadata and
    /// state to it, when there are any, so it need not wait for the next
    /// event.
    pub fn register_with_replay(
        &self,
        mut listener: Box<dyn SessionListener>,
        metadata: Option<&PreparedMedia>,
        state: Option<&PlaybackSnapshot>,
    ) {
        if let Some(metadata) = metadata {
            listener.on_metadata_changed(Some(metadata));
        }
        if let Some(state) = state {
            listener.on_playback_state_changed(Some(state));
        }
        let mut listeners = self.listeners.lock().unwrap();
        listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify_state(&self, state: Option<&PlaybackSnapshot>) {
        self.broadcast(|listener| listener.on_playback_state_changed(state));
    }

    pub fn notify_metadata(&self, metadata: Option<&PreparedMedia>) {
        self.broadcast(|listener| listener.on_metadata_changed(metadata));
    }

    pub fn notify_queue(&self, queue: &QueueSnapshot) {
        self.broadcast(|listener| listener.on_queue_changed(queue));
    }

    pub fn notify_children(&self, parent_id: &str, children: &[QueueItem]) {
        self.broadcast(|listener| listener.on_children_loaded(parent_id, children));
    }

    pub fn notify_destroyed(&self) {
        self.broadcast(|listener| listener.on_session_destroyed());
    }

    fn broadcast(&self, mut deliver: impl FnMut(&mut dyn SessionListener)) {
        let mut listeners = self.listeners.lock().unwrap();
        let mut index = 0;
        while index < listeners.len() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                deliver(listeners[index].as_mut());
            }));
            match outcome {
                Ok(()) => index += 1,
                Err(_) => {
                    warn!("listener panicked during delivery, dropping it");
                    listeners.remove(index);
                }
            }
        }
    }
}
