//! Session host: wires the controller, the engine event dispatch and the
//! discovery registration together.

use std::io;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;
use tracing::debug;

use crate::catalog::CatalogResolver;
use crate::controller::SessionController;
use crate::directory::SessionDirectory;
use crate::engine::{EngineEventSender, PlaybackEngine};
use crate::errors::{Result, SessionError};
use crate::events::{SessionEvent, SessionEventBus};
use crate::handle::SessionHandle;
use crate::lifecycle::{LifecycleManager, NotificationRenderer, ProcessPinner};
use crate::metadata::PreparedMedia;
use crate::queue::{QueueItem, QueueSnapshot};
use crate::state::PlaybackSnapshot;

/// Everything a freshly attached client needs to render an up-to-date view
/// without waiting for the next event.
pub struct ClientAttachment {
    /// Live event stream, subscribed before the replay values were read, so
    /// a client may see an event twice but never misses one.
    pub events: Receiver<SessionEvent>,
    pub state: PlaybackSnapshot,
    pub metadata: Option<PreparedMedia>,
    pub queue: QueueSnapshot,
}

/// Owns one session: controller, event bus, handle, catalog and the
/// dispatch thread draining engine events.
pub struct SessionHost {
    controller: Arc<SessionController>,
    bus: SessionEventBus,
    handle: SessionHandle,
    catalog: Arc<dyn CatalogResolver>,
    directory: Arc<SessionDirectory>,
}

impl SessionHost {
    /// Creates the session, spawns its dispatch thread and registers it in
    /// the directory.
    ///
    /// The engine is built last so it can capture the event sender; it must
    /// deliver every notification through that channel.
    pub fn spawn<F>(
        name: &str,
        catalog: Arc<dyn CatalogResolver>,
        pinner: Box<dyn ProcessPinner>,
        notifier: Box<dyn NotificationRenderer>,
        directory: &Arc<SessionDirectory>,
        make_engine: F,
    ) -> io::Result<Arc<Self>>
    where
        F: FnOnce(EngineEventSender) -> Box<dyn PlaybackEngine>,
    {
        let handle = SessionHandle::new(name);
        let bus = SessionEventBus::new();
        let (engine_tx, engine_rx) = EngineEventSender::channel();
        let engine = make_engine(engine_tx);
        let lifecycle = LifecycleManager::new(pinner, notifier);
        let controller = Arc::new(SessionController::new(
            engine,
            Arc::clone(&catalog),
            lifecycle,
            bus.clone(),
            handle.clone(),
        ));

        let dispatch_controller = Arc::clone(&controller);
        thread::Builder::new()
            .name(format!("muso-session-{name}"))
            .spawn(move || {
                // Exits when the engine (sole sender) is dropped at teardown.
                while let Ok(event) = engine_rx.recv() {
                    dispatch_controller.handle_engine_event(event);
                }
                debug!("engine event channel closed, session dispatch exiting");
            })?;

        let host = Arc::new(Self {
            controller,
            bus,
            handle,
            catalog,
            directory: Arc::clone(directory),
        });
        directory.register(Arc::clone(&host));
        Ok(host)
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn controller(&self) -> Arc<SessionController> {
        Arc::clone(&self.controller)
    }

    /// Id of the catalog's browse root.
    pub fn root_id(&self) -> String {
        self.catalog.root_id().to_string()
    }

    /// Ordered children of a browsable container.
    pub fn browse(&self, parent_id: &str) -> Vec<QueueItem> {
        self.catalog.browse_children(parent_id)
    }

    /// Binds a client: live subscription plus a replay of the current view.
    ///
    /// Fails cleanly once the session has been torn down.
    pub fn attach_client(&self) -> Result<ClientAttachment> {
        if !self.handle.is_valid() {
            return Err(SessionError::SessionDestroyed);
        }
        let events = self.bus.subscribe();
        Ok(ClientAttachment {
            events,
            state: self.controller.playback_snapshot(),
            metadata: self.controller.prepared_media(),
            queue: self.controller.queue_snapshot(),
        })
    }

    /// Host-initiated teardown: releases the guarantee, invalidates the
    /// handle, tells connected clients, and leaves the directory.
    pub fn shutdown(&self) {
        self.controller.teardown();
        self.directory.unregister(self.handle.name());
    }
}
