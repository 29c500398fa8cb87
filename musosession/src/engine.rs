//! Playback engine contract.
//!
//! The engine is an opaque collaborator: the controller drives it through
//! [`PlaybackEngine`] and observes it exclusively through [`EngineEvent`]s.
//! An engine may run its own decode/output threads, but it must never touch
//! controller state directly — every notification goes through the
//! [`EngineEventSender`], and the session host drains that channel on its
//! serialized dispatch thread.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::debug;

use crate::metadata::PreparedMedia;

/// Transport state as reported by an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Playing,
    Paused,
    Stopped,
}

/// Notification emitted by a playback engine.
#[derive(Clone, Debug)]
pub enum EngineEvent {
    StateChanged {
        state: EngineState,
        position: Duration,
    },
    /// The current item played to its end.
    PlaybackCompleted,
}

/// Sending half handed to an engine at construction time.
#[derive(Clone)]
pub struct EngineEventSender(Sender<EngineEvent>);

impl EngineEventSender {
    /// Creates the engine event channel; the receiver side belongs to the
    /// session host dispatch.
    pub fn channel() -> (EngineEventSender, Receiver<EngineEvent>) {
        let (tx, rx) = unbounded();
        (EngineEventSender(tx), rx)
    }

    /// Fire-and-forget emission; a closed dispatch simply drops the event.
    pub fn emit(&self, event: EngineEvent) {
        let _ = self.0.send(event);
    }
}

/// Transport capability every engine backend must provide.
pub trait PlaybackEngine: Send {
    /// Opens the resolved media and starts playback from its beginning.
    fn play_prepared(&mut self, media: &PreparedMedia) -> Result<()>;

    /// Pauses playback, keeping the current item and position.
    fn pause(&mut self) -> Result<()>;

    /// Stops playback and releases the current item.
    fn stop(&mut self) -> Result<()>;

    /// Seeks inside the current item.
    fn seek_to(&mut self, position: Duration) -> Result<()>;
}

/// In-process engine that simulates transport without decoding audio.
///
/// Position runs off a wall clock while "playing". Used by the demo app and
/// by tests; a real audio backend would implement [`PlaybackEngine`] the
/// same way and report through the same channel.
pub struct VirtualEngine {
    events: EngineEventSender,
    state: EngineState,
    current: Option<String>,
    base_position: Duration,
    resumed_at: Option<Instant>,
}

impl VirtualEngine {
    pub fn new(events: EngineEventSender) -> Self {
        Self {
            events,
            state: EngineState::Stopped,
            current: None,
            base_position: Duration::ZERO,
            resumed_at: None,
        }
    }

    fn position(&self) -> Duration {
        match self.resumed_at {
            Some(since) => self.base_position + since.elapsed(),
            None => self.base_position,
        }
    }

    fn transition(&mut self, state: EngineState) {
        let position = self.position();
        self.state = state;
        self.base_position = position;
        self.resumed_at = match state {
            EngineState::Playing => Some(Instant::now()),
            _ => None,
        };
        self.events.emit(EngineEvent::StateChanged { state, position });
    }
}

impl PlaybackEngine for VirtualEngine {
    fn play_prepared(&mut self, media: &PreparedMedia) -> Result<()> {
        debug!(item = media.item_id.as_str(), uri = media.media_uri.as_str(), "virtual engine opening media");
        self.current = Some(media.item_id.clone());
        self.base_position = Duration::ZERO;
        self.resumed_at = None;
        self.transition(EngineState::Playing);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.state == EngineState::Playing {
            self.transition(EngineState::Paused);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.current = None;
        self.base_position = Duration::ZERO;
        self.resumed_at = None;
        self.transition(EngineState::Stopped);
        Ok(())
    }

    fn seek_to(&mut self, position: Duration) -> Result<()> {
        self.base_position = position;
        if self.resumed_at.is_some() {
            self.resumed_at = Some(Instant::now());
        }
        let state = self.state;
        self.events.emit(EngineEvent::StateChanged { state, position });
        Ok(())
    }
}
