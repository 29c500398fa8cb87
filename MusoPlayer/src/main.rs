//! MusoPlayer: in-process demo of a full session round trip.
//!
//! Spawns a [`SessionHost`] backed by the embedded music library and a
//! virtual engine, connects a [`ConnectionManager`] to it through the
//! directory, loads the browse root into the queue and drives a short
//! transport scenario while a console listener prints what the client sees.

mod config;

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use musocatalog::MusicLibrary;
use musoclient::{ConnectionManager, SessionListener};
use musosession::{
    CatalogResolver, LogNotifier, LogPinner, PlaybackSnapshot, PreparedMedia, QueueItem,
    QueueSnapshot, SessionDirectory, SessionHost, VirtualEngine,
};

use crate::config::Config;

/// Prints every broadcast, the way a UI would redraw.
struct ConsoleListener;

impl SessionListener for ConsoleListener {
    fn on_playback_state_changed(&mut self, state: Option<&PlaybackSnapshot>) {
        match state {
            Some(snapshot) => println!(
                "  [state] {} at {:?} ({:?})",
                snapshot.state, snapshot.position, snapshot.actions
            ),
            None => println!("  [state] <reset>"),
        }
    }

    fn on_metadata_changed(&mut self, metadata: Option<&PreparedMedia>) {
        match metadata {
            Some(media) => println!("  [media] {} — {}", media.title, media.artist),
            None => println!("  [media] <none>"),
        }
    }

    fn on_queue_changed(&mut self, queue: &QueueSnapshot) {
        println!(
            "  [queue] {} item(s), cursor {:?}",
            queue.items.len(),
            queue.cursor
        );
    }

    fn on_session_destroyed(&mut self) {
        println!("  [session] destroyed by host");
    }
}

/// Captures the children delivered on connect so the demo can enqueue them.
struct BrowseCapture {
    children: Arc<Mutex<Vec<QueueItem>>>,
}

impl SessionListener for BrowseCapture {
    fn on_children_loaded(&mut self, parent_id: &str, children: &[QueueItem]) {
        println!("  [browse] {} child(ren) under {parent_id}", children.len());
        *self.children.lock().unwrap() = children.to_vec();
    }
}

fn main() -> Result<()> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log.filter)?)
        .init();

    let directory = SessionDirectory::new();
    let catalog: Arc<dyn CatalogResolver> = Arc::new(MusicLibrary::new());
    let host = SessionHost::spawn(
        &config.session.name,
        catalog,
        Box::new(LogPinner),
        Box::new(LogNotifier),
        &directory,
        |events| Box::new(VirtualEngine::new(events)),
    )?;
    info!(
        session = host.name(),
        registered = ?directory.names(),
        "session host running"
    );

    let connection = ConnectionManager::new(Arc::clone(&directory), &config.session.name);
    let children = Arc::new(Mutex::new(Vec::new()));
    connection.register_listener(Box::new(BrowseCapture {
        children: Arc::clone(&children),
    }));
    connection.register_listener(Box::new(ConsoleListener));
    connection.start()?;

    let transport = connection.transport();
    for item in children.lock().unwrap().drain(..) {
        transport.add_item(item)?;
    }

    transport.play()?;
    pause_for(Duration::from_secs(2));
    transport.pause()?;
    pause_for(Duration::from_millis(500));
    transport.skip_to_next()?;
    pause_for(Duration::from_secs(1));
    transport.seek_to(Duration::from_secs(30))?;
    pause_for(Duration::from_secs(1));
    transport.skip_to_previous()?;
    pause_for(Duration::from_secs(1));
    transport.stop()?;
    pause_for(Duration::from_millis(500));

    connection.stop();
    host.shutdown();
    info!("demo finished");
    Ok(())
}

fn pause_for(duration: Duration) {
    thread::sleep(duration);
}
