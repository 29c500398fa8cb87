//! Connection protocol: replay on (re)connect, live event pumping, the
//! distinction between a caller-initiated stop and a host teardown.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded};

use musoclient::{ClientError, ConnectionManager, ListenerRegistry, SessionListener};
use musosession::{
    CatalogResolver, LogNotifier, LogPinner, PlaybackEngine, PlaybackSnapshot, PreparedMedia,
    QueueItem, QueueSnapshot, SessionDirectory, SessionError, SessionHost,
};

struct TwoTrackCatalog;

impl CatalogResolver for TwoTrackCatalog {
    fn root_id(&self) -> &str {
        "two-track-root"
    }

    fn resolve_metadata(&self, item_id: &str) -> Option<PreparedMedia> {
        Some(PreparedMedia {
            item_id: item_id.to_string(),
            title: format!("Title {item_id}"),
            artist: "Test Artist".to_string(),
            album: "Test Album".to_string(),
            duration: Duration::from_secs(120),
            media_uri: format!("test://{item_id}"),
            artwork: None,
        })
    }

    fn browse_children(&self, parent_id: &str) -> Vec<QueueItem> {
        if parent_id != "two-track-root" {
            return Vec::new();
        }
        vec![
            QueueItem::new("one", "Title one", "Test Artist"),
            QueueItem::new("two", "Title two", "Test Artist"),
        ]
    }
}

struct SilentEngine;

impl PlaybackEngine for SilentEngine {
    fn play_prepared(&mut self, _media: &PreparedMedia) -> anyhow::Result<()> {
        Ok(())
    }

    fn pause(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn seek_to(&mut self, _position: Duration) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Ordered trace of everything delivered to the listener.
#[derive(Default)]
struct Trace {
    entries: Vec<String>,
    destroyed: bool,
}

struct RecordingListener {
    trace: Arc<Mutex<Trace>>,
}

impl SessionListener for RecordingListener {
    fn on_playback_state_changed(&mut self, state: Option<&PlaybackSnapshot>) {
        let entry = match state {
            Some(snapshot) => format!("state:{}", snapshot.state.as_str()),
            None => "state:reset".to_string(),
        };
        self.trace.lock().unwrap().entries.push(entry);
    }

    fn on_metadata_changed(&mut self, metadata: Option<&PreparedMedia>) {
        let entry = match metadata {
            Some(media) => format!("media:{}", media.item_id),
            None => "media:reset".to_string(),
        };
        self.trace.lock().unwrap().entries.push(entry);
    }

    fn on_queue_changed(&mut self, queue: &QueueSnapshot) {
        self.trace
            .lock()
            .unwrap()
            .entries
            .push(format!("queue:{}", queue.len()));
    }

    fn on_children_loaded(&mut self, parent_id: &str, children: &[QueueItem]) {
        self.trace
            .lock()
            .unwrap()
            .entries
            .push(format!("children:{parent_id}:{}", children.len()));
    }

    fn on_session_destroyed(&mut self) {
        let mut trace = self.trace.lock().unwrap();
        trace.entries.push("destroyed".to_string());
        trace.destroyed = true;
    }
}

/// Parks the connect-time replay until the test says so, exposing the
/// window between `start()` taking the state lock and installing the
/// connection.
struct BlockingListener {
    entered: Sender<()>,
    release: Receiver<()>,
}

impl SessionListener for BlockingListener {
    fn on_children_loaded(&mut self, _parent_id: &str, _children: &[QueueItem]) {
        let _ = self.entered.send(());
        let _ = self.release.recv();
    }
}

/// Panics on every queue broadcast.
struct FaultyListener;

impl SessionListener for FaultyListener {
    fn on_queue_changed(&mut self, _queue: &QueueSnapshot) {
        panic!("listener failure");
    }
}

fn spawn_host(directory: &Arc<SessionDirectory>, name: &str) -> Arc<SessionHost> {
    SessionHost::spawn(
        name,
        Arc::new(TwoTrackCatalog),
        Box::new(LogPinner),
        Box::new(LogNotifier),
        directory,
        |_events| Box::new(SilentEngine),
    )
    .expect("spawn session host")
}

/// Live events cross the pump thread; poll until the predicate holds.
fn wait_until(trace: &Arc<Mutex<Trace>>, what: &str, predicate: impl Fn(&Trace) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if predicate(&trace.lock().unwrap()) {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("timed out waiting for {what}: {:?}", trace.lock().unwrap().entries);
}

#[test]
fn connect_replays_state_and_delivers_the_browse_root() {
    let directory = SessionDirectory::new();
    let _host = spawn_host(&directory, "conn-replay");

    let manager = ConnectionManager::new(Arc::clone(&directory), "conn-replay");
    let trace = Arc::new(Mutex::new(Trace::default()));
    manager.register_listener(Box::new(RecordingListener { trace: Arc::clone(&trace) }));

    manager.start().unwrap();
    assert!(manager.is_connected());

    let entries = trace.lock().unwrap().entries.clone();
    assert_eq!(
        entries,
        vec![
            "media:reset",
            "state:IDLE",
            "queue:0",
            "children:two-track-root:2"
        ]
    );
}

#[test]
fn connect_replays_a_session_already_in_progress() {
    let directory = SessionDirectory::new();
    let host = spawn_host(&directory, "conn-in-progress");
    let controller = host.controller();
    controller
        .add_item(QueueItem::new("one", "Title one", "Test Artist"))
        .unwrap();
    controller.prepare().unwrap();

    let manager = ConnectionManager::new(Arc::clone(&directory), "conn-in-progress");
    let trace = Arc::new(Mutex::new(Trace::default()));
    manager.register_listener(Box::new(RecordingListener { trace: Arc::clone(&trace) }));
    manager.start().unwrap();

    let entries = trace.lock().unwrap().entries.clone();
    assert_eq!(entries[0], "media:one");
    assert_eq!(entries[1], "state:PREPARED");
    assert_eq!(entries[2], "queue:1");
}

#[test]
fn late_listener_is_replayed_from_the_cached_view() {
    let directory = SessionDirectory::new();
    let host = spawn_host(&directory, "conn-late-listener");
    host.controller()
        .add_item(QueueItem::new("one", "Title one", "Test Artist"))
        .unwrap();
    host.controller().prepare().unwrap();

    let manager = ConnectionManager::new(Arc::clone(&directory), "conn-late-listener");
    manager.start().unwrap();

    // Registered after the connect: still sees the current view immediately.
    let trace = Arc::new(Mutex::new(Trace::default()));
    manager.register_listener(Box::new(RecordingListener { trace: Arc::clone(&trace) }));
    let entries = trace.lock().unwrap().entries.clone();
    assert_eq!(entries, vec!["media:one", "state:PREPARED"]);
}

#[test]
fn live_events_reach_listeners_through_the_pump() {
    let directory = SessionDirectory::new();
    let host = spawn_host(&directory, "conn-live-events");

    let manager = ConnectionManager::new(Arc::clone(&directory), "conn-live-events");
    let trace = Arc::new(Mutex::new(Trace::default()));
    manager.register_listener(Box::new(RecordingListener { trace: Arc::clone(&trace) }));
    manager.start().unwrap();

    host.controller()
        .add_item(QueueItem::new("one", "Title one", "Test Artist"))
        .unwrap();
    wait_until(&trace, "queue broadcast", |t| {
        t.entries.iter().any(|e| e == "queue:1")
    });
}

#[test]
fn unknown_session_name_fails_without_retry() {
    let directory = SessionDirectory::new();
    let manager = ConnectionManager::new(Arc::clone(&directory), "no-such-session");
    let err = manager.start().unwrap_err();
    assert!(matches!(err, ClientError::SessionNotFound(name) if name == "no-such-session"));
    assert!(!manager.is_connected());
}

#[test]
#[should_panic(expected = "before the session connection is established")]
fn transport_before_connect_panics() {
    let directory = SessionDirectory::new();
    let manager = ConnectionManager::new(directory, "never-started");
    let _ = manager.transport();
}

#[test]
fn try_transport_reports_not_connected() {
    let directory = SessionDirectory::new();
    let manager = ConnectionManager::new(directory, "never-started");
    assert!(matches!(manager.try_transport(), Err(ClientError::NotConnected)));
}

#[test]
fn transport_commands_drive_the_session() {
    let directory = SessionDirectory::new();
    let host = spawn_host(&directory, "conn-transport");

    let manager = ConnectionManager::new(Arc::clone(&directory), "conn-transport");
    manager.start().unwrap();
    let transport = manager.transport();

    transport
        .add_item(QueueItem::new("one", "Title one", "Test Artist"))
        .unwrap();
    transport.play().unwrap();
    assert_eq!(
        host.controller().prepared_media().map(|m| m.item_id),
        Some("one".to_string())
    );
}

#[test]
fn caller_stop_resets_without_a_destroyed_signal() {
    let directory = SessionDirectory::new();
    let _host = spawn_host(&directory, "conn-caller-stop");

    let manager = ConnectionManager::new(Arc::clone(&directory), "conn-caller-stop");
    let trace = Arc::new(Mutex::new(Trace::default()));
    manager.register_listener(Box::new(RecordingListener { trace: Arc::clone(&trace) }));
    manager.start().unwrap();

    manager.stop();
    assert!(!manager.is_connected());
    assert!(!trace.lock().unwrap().destroyed);

    // Repeated stops stay harmless.
    manager.stop();

    // The manager can connect again afterwards.
    manager.start().unwrap();
    assert!(manager.is_connected());
}

#[test]
fn stop_during_connect_wins_over_the_late_success() {
    let directory = SessionDirectory::new();
    let _host = spawn_host(&directory, "conn-stop-race");

    let manager = Arc::new(ConnectionManager::new(Arc::clone(&directory), "conn-stop-race"));
    let (entered_tx, entered_rx) = bounded(1);
    let (release_tx, release_rx) = bounded(1);
    manager.register_listener(Box::new(BlockingListener {
        entered: entered_tx,
        release: release_rx,
    }));

    let starter = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || manager.start())
    };
    entered_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("connect reached the replay");

    // stop() returns while the connect is still parked inside the replay.
    manager.stop();
    assert!(!manager.is_connected());

    release_tx.send(()).unwrap();
    starter.join().unwrap().unwrap();

    // The connect completed after the stop; the stop must still win.
    assert!(!manager.is_connected());
    assert!(matches!(manager.try_transport(), Err(ClientError::NotConnected)));

    // The manager is reusable afterwards (pre-release the parked replay so
    // the reconnect goes straight through).
    release_tx.send(()).unwrap();
    manager.start().unwrap();
    assert!(manager.is_connected());
}

#[test]
fn panicking_listener_is_dropped_and_delivery_continues() {
    let registry = ListenerRegistry::new();
    let trace = Arc::new(Mutex::new(Trace::default()));
    registry.register_with_replay(Box::new(FaultyListener), None, None);
    registry.register_with_replay(
        Box::new(RecordingListener { trace: Arc::clone(&trace) }),
        None,
        None,
    );
    assert_eq!(registry.len(), 2);

    let queue = QueueSnapshot::default();
    registry.notify_queue(&queue);
    assert_eq!(registry.len(), 1, "the panicking listener must be dropped");
    assert_eq!(trace.lock().unwrap().entries, vec!["queue:0"]);

    // The survivor keeps receiving subsequent events.
    registry.notify_queue(&queue);
    assert_eq!(trace.lock().unwrap().entries, vec!["queue:0", "queue:0"]);
}

#[test]
fn host_teardown_surfaces_as_destroyed_with_resets() {
    let directory = SessionDirectory::new();
    let host = spawn_host(&directory, "conn-host-teardown");

    let manager = ConnectionManager::new(Arc::clone(&directory), "conn-host-teardown");
    let trace = Arc::new(Mutex::new(Trace::default()));
    manager.register_listener(Box::new(RecordingListener { trace: Arc::clone(&trace) }));
    manager.start().unwrap();
    let transport = manager.transport();

    host.shutdown();
    wait_until(&trace, "destroyed signal", |t| t.destroyed);
    assert!(!manager.is_connected());

    let entries = trace.lock().unwrap().entries.clone();
    let destroyed_at = entries.iter().position(|e| e == "destroyed").unwrap();
    assert!(entries[..destroyed_at].contains(&"state:reset".to_string()));
    assert!(entries[..destroyed_at].contains(&"media:reset".to_string()));

    // The bound transport handle fails cleanly from now on.
    assert!(matches!(
        transport.play(),
        Err(SessionError::SessionDestroyed)
    ));
    // The session also left the directory, so reconnecting cannot work.
    assert!(matches!(
        manager.start(),
        Err(ClientError::SessionNotFound(_))
    ));
}
