//! Client-side connection protocol.
//!
//! `ConnectionManager` walks Disconnected → Connecting → Connected. On a
//! successful attach it replays the host's current state to every
//! registered listener (a reconnecting UI never sees a blank or stale
//! view), delivers the browse root, then pumps live events on a dedicated
//! thread. A connection attempt that fails is fatal for that attempt; the
//! caller decides whether to `start()` again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{Sender, bounded};
use tracing::{debug, info};

use musosession::{
    PlaybackSnapshot, PreparedMedia, QueueSnapshot, SessionDirectory, SessionEvent,
};

use crate::error::{ClientError, Result};
use crate::listener::{ListenerRegistry, SessionListener};
use crate::transport::TransportHandle;

enum ConnState {
    Disconnected,
    /// A connect is in flight; the payload identifies the attempt so a late
    /// completion cannot clobber a `stop()` that landed in between.
    Connecting(u64),
    Connected(Connection),
}

struct Connection {
    transport: TransportHandle,
    stop_tx: Sender<()>,
    attempt: u64,
}

/// Locally cached display state, replayed to late-registering listeners
/// and reset whenever the connection goes away.
#[derive(Default)]
struct CachedView {
    state: Option<PlaybackSnapshot>,
    metadata: Option<PreparedMedia>,
    queue: Option<QueueSnapshot>,
}

/// Manages one client's connection to a named session.
pub struct ConnectionManager {
    directory: Arc<SessionDirectory>,
    session_name: String,
    listeners: Arc<ListenerRegistry>,
    view: Arc<Mutex<CachedView>>,
    state: Arc<Mutex<ConnState>>,
    attempts: AtomicU64,
}

impl ConnectionManager {
    pub fn new(directory: Arc<SessionDirectory>, session_name: impl Into<String>) -> Self {
        Self {
            directory,
            session_name: session_name.into(),
            listeners: Arc::new(ListenerRegistry::new()),
            view: Arc::new(Mutex::new(CachedView::default())),
            state: Arc::new(Mutex::new(ConnState::Disconnected)),
            attempts: AtomicU64::new(0),
        }
    }

    /// Opens the connection. No-op when already connecting or connected.
    ///
    /// Errors are fatal for this attempt: the manager is back in
    /// Disconnected when this returns `Err`, and nothing is retried. A
    /// `stop()` landing while the connect is in flight wins: the late
    /// success is torn down again and the manager stays Disconnected.
    pub fn start(&self) -> Result<()> {
        let attempt = {
            let mut state = self.state.lock().unwrap();
            match *state {
                ConnState::Connecting(_) | ConnState::Connected(_) => {
                    debug!("start ignored: already connecting or connected");
                    return Ok(());
                }
                ConnState::Disconnected => {
                    let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
                    *state = ConnState::Connecting(attempt);
                    attempt
                }
            }
        };
        match self.connect(attempt) {
            Ok(connection) => {
                let mut state = self.state.lock().unwrap();
                if matches!(*state, ConnState::Connecting(current) if current == attempt) {
                    *state = ConnState::Connected(connection);
                    drop(state);
                    info!(session = self.session_name.as_str(), "connected");
                } else {
                    // Something superseded this attempt mid-connect.
                    drop(state);
                    let _ = connection.stop_tx.send(());
                    *self.view.lock().unwrap() = CachedView::default();
                    info!(
                        session = self.session_name.as_str(),
                        "late connect superseded, tearing it down"
                    );
                }
                Ok(())
            }
            Err(err) => {
                let mut state = self.state.lock().unwrap();
                if matches!(*state, ConnState::Connecting(current) if current == attempt) {
                    *state = ConnState::Disconnected;
                }
                Err(err)
            }
        }
    }

    /// Disconnects and resets the cached display state. Safe to call at any
    /// point, including while connecting or already disconnected.
    pub fn stop(&self) {
        let previous = {
            let mut state = self.state.lock().unwrap();
            std::mem::replace(&mut *state, ConnState::Disconnected)
        };
        if let ConnState::Connected(connection) = previous {
            // Wakes the pump; an already-exited pump just ignores this.
            let _ = connection.stop_tx.send(());
        }
        *self.view.lock().unwrap() = CachedView::default();
        debug!(session = self.session_name.as_str(), "connection stopped, display state reset");
    }

    /// Registers a listener; it immediately receives a replay of the last
    /// known metadata and playback state, if there are any.
    pub fn register_listener(&self, listener: Box<dyn SessionListener>) {
        let view = self.view.lock().unwrap();
        self.listeners
            .register_with_replay(listener, view.metadata.as_ref(), view.state.as_ref());
    }

    pub fn is_connected(&self) -> bool {
        matches!(*self.state.lock().unwrap(), ConnState::Connected(_))
    }

    /// Control handle of the current connection.
    ///
    /// # Panics
    ///
    /// Panics when no connection is established: issuing transport commands
    /// before awaiting the connection is a contract violation, not a
    /// recoverable condition.
    pub fn transport(&self) -> TransportHandle {
        match self.try_transport() {
            Ok(transport) => transport,
            Err(_) => panic!("transport controls requested before the session connection is established"),
        }
    }

    /// Fallible variant of [`transport`](Self::transport).
    pub fn try_transport(&self) -> Result<TransportHandle> {
        match &*self.state.lock().unwrap() {
            ConnState::Connected(connection) => Ok(connection.transport.clone()),
            _ => Err(ClientError::NotConnected),
        }
    }

    fn connect(&self, attempt: u64) -> Result<Connection> {
        let host = self
            .directory
            .lookup(&self.session_name)
            .ok_or_else(|| ClientError::SessionNotFound(self.session_name.clone()))?;
        let attachment = host.attach_client()?;
        let transport = TransportHandle::new(host.controller(), host.handle());

        {
            let mut view = self.view.lock().unwrap();
            view.state = Some(attachment.state.clone());
            view.metadata = attachment.metadata.clone();
            view.queue = Some(attachment.queue.clone());
        }

        // Sync the existing session state to everyone already registered.
        self.listeners.notify_metadata(attachment.metadata.as_ref());
        self.listeners.notify_state(Some(&attachment.state));
        self.listeners.notify_queue(&attachment.queue);

        // Browse subscription: deliver the root children on every (re)connect.
        let root = host.root_id();
        let children = host.browse(&root);
        self.listeners.notify_children(&root, &children);

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let listeners = Arc::clone(&self.listeners);
        let view = Arc::clone(&self.view);
        let state = Arc::clone(&self.state);
        let events = attachment.events;

        thread::Builder::new()
            .name(format!("muso-client-{}", self.session_name))
            .spawn(move || {
                loop {
                    crossbeam_channel::select! {
                        recv(events) -> event => match event {
                            Ok(SessionEvent::StateChanged(snapshot)) => {
                                view.lock().unwrap().state = Some(snapshot.clone());
                                listeners.notify_state(Some(&snapshot));
                            }
                            Ok(SessionEvent::MetadataChanged(metadata)) => {
                                view.lock().unwrap().metadata = metadata.clone();
                                listeners.notify_metadata(metadata.as_ref());
                            }
                            Ok(SessionEvent::QueueChanged(queue)) => {
                                view.lock().unwrap().queue = Some(queue.clone());
                                listeners.notify_queue(&queue);
                            }
                            Ok(SessionEvent::SessionDestroyed) => {
                                // Only the attempt that still owns the manager
                                // state may reset it; a stop that already landed
                                // supersedes this pump.
                                let owned = {
                                    let mut state = state.lock().unwrap();
                                    match &*state {
                                        ConnState::Connected(connection)
                                            if connection.attempt == attempt =>
                                        {
                                            *state = ConnState::Disconnected;
                                            true
                                        }
                                        ConnState::Connecting(current) if *current == attempt => {
                                            *state = ConnState::Disconnected;
                                            true
                                        }
                                        _ => false,
                                    }
                                };
                                if owned {
                                    info!("session destroyed by host, resetting client state");
                                    *view.lock().unwrap() = CachedView::default();
                                    listeners.notify_state(None);
                                    listeners.notify_metadata(None);
                                    listeners.notify_destroyed();
                                }
                                break;
                            }
                            Err(_) => break,
                        },
                        recv(stop_rx) -> _ => break,
                    }
                }
                debug!("client event pump exiting");
            })
            .map_err(|e| ClientError::ConnectFailed(e.to_string()))?;

        Ok(Connection {
            transport,
            stop_tx,
            attempt,
        })
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.stop();
    }
}
