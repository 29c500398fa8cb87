//! Queue/transport state machine of a session.
//!
//! Every public operation locks the controller state for its whole
//! duration, so operations never overlap: commands coming from clients and
//! engine events drained by the host dispatch thread are applied one at a
//! time. The controller is the single producer of playback snapshots; the
//! lifecycle reaction runs under the same lock, before the snapshot is
//! broadcast.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, warn};

use crate::catalog::CatalogResolver;
use crate::engine::{EngineEvent, EngineState, PlaybackEngine};
use crate::errors::{Result, SessionError};
use crate::events::{SessionEvent, SessionEventBus};
use crate::handle::SessionHandle;
use crate::lifecycle::LifecycleManager;
use crate::metadata::PreparedMedia;
use crate::queue::{Queue, QueueItem, QueueSnapshot};
use crate::state::{PlaybackSnapshot, PlaybackState, TransportActions};

struct ControllerInner {
    queue: Queue,
    prepared: Option<PreparedMedia>,
    /// `None` once the session has been torn down; dropping the engine also
    /// closes its event channel and lets the host dispatch thread exit.
    engine: Option<Box<dyn PlaybackEngine>>,
    catalog: Arc<dyn CatalogResolver>,
    lifecycle: LifecycleManager,
    active: bool,
    last: PlaybackSnapshot,
    destroyed: bool,
}

/// Owner of the queue, the prepared-media cache and the transport state
/// machine. Shared between the host dispatch thread and client transport
/// handles.
pub struct SessionController {
    inner: Mutex<ControllerInner>,
    bus: SessionEventBus,
    handle: SessionHandle,
}

impl SessionController {
    pub fn new(
        engine: Box<dyn PlaybackEngine>,
        catalog: Arc<dyn CatalogResolver>,
        lifecycle: LifecycleManager,
        bus: SessionEventBus,
        handle: SessionHandle,
    ) -> Self {
        Self {
            inner: Mutex::new(ControllerInner {
                queue: Queue::new(),
                prepared: None,
                engine: Some(engine),
                catalog,
                lifecycle,
                active: false,
                last: PlaybackSnapshot::idle(),
                destroyed: false,
            }),
            bus,
            handle,
        }
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Appends an item to the queue and re-publishes the queue.
    ///
    /// The first item of an empty queue becomes the cursor item.
    pub fn add_item(&self, item: QueueItem) -> Result<()> {
        let mut inner = self.locked()?;
        inner.queue.append(item);
        Self::clear_prepared(&mut inner, &self.bus);
        self.publish_queue(&inner);
        Ok(())
    }

    /// Removes the first queue entry structurally equal to `item`.
    ///
    /// Removing an absent item is a guarded no-op and publishes nothing.
    pub fn remove_item(&self, item: &QueueItem) -> Result<()> {
        let mut inner = self.locked()?;
        if !inner.queue.remove_first(item) {
            debug!(item = item.id.as_str(), "remove ignored: item not in queue");
            return Ok(());
        }
        Self::clear_prepared(&mut inner, &self.bus);
        self.publish_queue(&inner);
        Ok(())
    }

    /// Resolves the cursor item into prepared metadata.
    ///
    /// Guarded no-op when the cursor is unset or when the catalog has no
    /// entry for the item.
    pub fn prepare(&self) -> Result<()> {
        let mut inner = self.locked()?;
        self.prepare_locked(&mut inner);
        Ok(())
    }

    /// Starts playback of the prepared media, preparing implicitly first.
    ///
    /// Guarded no-op on an empty queue, or when resolution yields nothing.
    pub fn play(&self) -> Result<()> {
        let mut inner = self.locked()?;
        self.play_locked(&mut inner)
    }

    /// Delegates to the engine unconditionally.
    pub fn pause(&self) -> Result<()> {
        let mut inner = self.locked()?;
        Self::engine_mut(&mut inner)?
            .pause()
            .map_err(|e| SessionError::EngineFailure(e.to_string()))
    }

    /// Delegates to the engine and marks the session inactive.
    pub fn stop(&self) -> Result<()> {
        let mut inner = self.locked()?;
        Self::engine_mut(&mut inner)?
            .stop()
            .map_err(|e| SessionError::EngineFailure(e.to_string()))?;
        if inner.active {
            inner.active = false;
            debug!(session = self.handle.name(), "session inactive");
        }
        Ok(())
    }

    /// Advances the cursor (wrapping) and plays the new cursor item.
    pub fn skip_to_next(&self) -> Result<()> {
        let mut inner = self.locked()?;
        if inner.queue.is_empty() {
            debug!("skip-to-next ignored: queue is empty");
            return Ok(());
        }
        inner.queue.advance_wrapping();
        Self::clear_prepared(&mut inner, &self.bus);
        self.publish_queue(&inner);
        self.play_locked(&mut inner)
    }

    /// Moves the cursor back (wrapping to the last item from the first) and
    /// plays the new cursor item.
    pub fn skip_to_previous(&self) -> Result<()> {
        let mut inner = self.locked()?;
        if inner.queue.is_empty() {
            debug!("skip-to-previous ignored: queue is empty");
            return Ok(());
        }
        inner.queue.retreat_wrapping();
        Self::clear_prepared(&mut inner, &self.bus);
        self.publish_queue(&inner);
        self.play_locked(&mut inner)
    }

    /// Delegates a seek to the engine.
    pub fn seek_to(&self, position: Duration) -> Result<()> {
        let mut inner = self.locked()?;
        Self::engine_mut(&mut inner)?
            .seek_to(position)
            .map_err(|e| SessionError::EngineFailure(e.to_string()))
    }

    /// Applies an engine notification. Called from the host dispatch thread
    /// only; events arriving after teardown are dropped.
    pub fn handle_engine_event(&self, event: EngineEvent) {
        let mut inner = self.inner.lock().unwrap();
        if inner.destroyed {
            debug!(?event, "engine event dropped: session destroyed");
            return;
        }
        match event {
            EngineEvent::StateChanged { state, position } => {
                let state = match state {
                    EngineState::Playing => PlaybackState::Playing,
                    EngineState::Paused => PlaybackState::Paused,
                    EngineState::Stopped => PlaybackState::Stopped,
                };
                self.publish_state(&mut inner, state, position);
            }
            EngineEvent::PlaybackCompleted => {
                // No auto-advance: completion surfaces as a stop.
                inner.active = false;
                self.publish_state(&mut inner, PlaybackState::Stopped, Duration::ZERO);
            }
        }
    }

    /// Tears the session down: stops the engine, runs the final lifecycle
    /// release, invalidates the handle and broadcasts the destroyed signal.
    /// Idempotent.
    pub fn teardown(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.destroyed {
            return;
        }
        if let Some(engine) = inner.engine.as_mut() {
            if let Err(e) = engine.stop() {
                warn!(error = %e, "engine stop failed during teardown");
            }
        }
        inner.active = false;
        // Synchronous release so the foreground guarantee can never outlive
        // the session, even if the engine's own stop event never arrives.
        self.publish_state(&mut inner, PlaybackState::Stopped, Duration::ZERO);
        inner.destroyed = true;
        inner.engine = None;
        self.handle.invalidate();
        self.bus.broadcast(SessionEvent::SessionDestroyed);
    }

    /// Last published snapshot.
    pub fn playback_snapshot(&self) -> PlaybackSnapshot {
        self.inner.lock().unwrap().last.clone()
    }

    pub fn prepared_media(&self) -> Option<PreparedMedia> {
        self.inner.lock().unwrap().prepared.clone()
    }

    pub fn queue_snapshot(&self) -> QueueSnapshot {
        self.inner.lock().unwrap().queue.snapshot()
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().unwrap().active
    }

    fn locked(&self) -> Result<MutexGuard<'_, ControllerInner>> {
        let inner = self.inner.lock().unwrap();
        if inner.destroyed {
            return Err(SessionError::SessionDestroyed);
        }
        Ok(inner)
    }

    fn engine_mut<'a>(
        inner: &'a mut ControllerInner,
    ) -> Result<&'a mut Box<dyn PlaybackEngine>> {
        inner.engine.as_mut().ok_or(SessionError::SessionDestroyed)
    }

    fn prepare_locked(&self, inner: &mut ControllerInner) {
        let Some(item) = inner.queue.current().cloned() else {
            debug!("prepare ignored: cursor unset");
            return;
        };
        match inner.catalog.resolve_metadata(&item.id) {
            Some(media) => {
                inner.prepared = Some(media.clone());
                self.bus.broadcast(SessionEvent::MetadataChanged(Some(media)));
                if !inner.active {
                    inner.active = true;
                    debug!(session = self.handle.name(), "session active");
                }
                self.publish_state(inner, PlaybackState::Prepared, Duration::ZERO);
            }
            None => {
                debug!(item = item.id.as_str(), "prepare yielded nothing: catalog has no entry");
            }
        }
    }

    fn play_locked(&self, inner: &mut ControllerInner) -> Result<()> {
        if inner.queue.is_empty() {
            debug!("play ignored: queue is empty");
            return Ok(());
        }
        if inner.prepared.is_none() {
            self.prepare_locked(inner);
        }
        let Some(media) = inner.prepared.clone() else {
            return Ok(());
        };
        Self::engine_mut(inner)?
            .play_prepared(&media)
            .map_err(|e| SessionError::EngineFailure(e.to_string()))
    }

    /// Clears the prepared-media cache (cursor moved or content changed)
    /// and tells listeners about it.
    fn clear_prepared(inner: &mut ControllerInner, bus: &SessionEventBus) {
        if inner.prepared.take().is_some() {
            bus.broadcast(SessionEvent::MetadataChanged(None));
        }
    }

    fn publish_queue(&self, inner: &ControllerInner) {
        self.bus
            .broadcast(SessionEvent::QueueChanged(inner.queue.snapshot()));
    }

    fn publish_state(&self, inner: &mut ControllerInner, state: PlaybackState, position: Duration) {
        let actions = TransportActions::for_queue(
            inner.queue.len(),
            inner.queue.cursor(),
            inner.prepared.is_some(),
        );
        let snapshot = PlaybackSnapshot {
            state,
            position,
            actions,
        };
        inner.last = snapshot.clone();
        let ControllerInner {
            lifecycle, prepared, ..
        } = inner;
        lifecycle.on_playback_state(&snapshot, prepared.as_ref(), &self.handle);
        self.bus.broadcast(SessionEvent::StateChanged(snapshot));
    }
}
