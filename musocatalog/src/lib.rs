//! Built-in media catalog for Muso.
//!
//! [`MusicLibrary`] is an in-memory catalog with a fixed, ordered set of
//! tracks. It implements the [`CatalogResolver`] contract consumed by the
//! session core: id → playable metadata resolution, and a one-level
//! browsable tree (a single root container listing every track).
//!
//! Artwork is exposed as opaque references; fetching and caching the actual
//! images is the UI layer's business.

use std::time::Duration;

use tracing::debug;

use musosession::{CatalogResolver, PreparedMedia, QueueItem};

/// Id of the single browsable container.
pub const LIBRARY_ROOT: &str = "library-root";

struct LibraryEntry {
    id: &'static str,
    title: &'static str,
    artist: &'static str,
    album: &'static str,
    duration_secs: u64,
    media_uri: &'static str,
    artwork: &'static str,
}

/// Catalogue embarqué : quelques pistes de démonstration, dans un ordre
/// stable, suffisant pour exercer la file et la navigation.
const LIBRARY: [LibraryEntry; 5] = [
    LibraryEntry {
        id: "night-drive",
        title: "Night Drive",
        artist: "The Analog Coast",
        album: "Shoreline",
        duration_secs: 214,
        media_uri: "asset:///tracks/night_drive.ogg",
        artwork: "art://shoreline",
    },
    LibraryEntry {
        id: "paper-lanterns",
        title: "Paper Lanterns",
        artist: "Mira Solene",
        album: "Low Tide",
        duration_secs: 187,
        media_uri: "asset:///tracks/paper_lanterns.ogg",
        artwork: "art://low-tide",
    },
    LibraryEntry {
        id: "glass-harbor",
        title: "Glass Harbor",
        artist: "The Analog Coast",
        album: "Shoreline",
        duration_secs: 243,
        media_uri: "asset:///tracks/glass_harbor.ogg",
        artwork: "art://shoreline",
    },
    LibraryEntry {
        id: "first-light",
        title: "First Light",
        artist: "Quartet Neuf",
        album: "Matinal",
        duration_secs: 301,
        media_uri: "asset:///tracks/first_light.ogg",
        artwork: "art://matinal",
    },
    LibraryEntry {
        id: "slow-signals",
        title: "Slow Signals",
        artist: "Mira Solene",
        album: "Low Tide",
        duration_secs: 226,
        media_uri: "asset:///tracks/slow_signals.ogg",
        artwork: "art://low-tide",
    },
];

/// In-memory catalog backed by the embedded track list.
#[derive(Default)]
pub struct MusicLibrary;

impl MusicLibrary {
    pub fn new() -> Self {
        Self
    }

    fn entry(item_id: &str) -> Option<&'static LibraryEntry> {
        LIBRARY.iter().find(|entry| entry.id == item_id)
    }
}

impl CatalogResolver for MusicLibrary {
    fn root_id(&self) -> &str {
        LIBRARY_ROOT
    }

    fn resolve_metadata(&self, item_id: &str) -> Option<PreparedMedia> {
        let entry = Self::entry(item_id)?;
        Some(PreparedMedia {
            item_id: entry.id.to_string(),
            title: entry.title.to_string(),
            artist: entry.artist.to_string(),
            album: entry.album.to_string(),
            duration: Duration::from_secs(entry.duration_secs),
            media_uri: entry.media_uri.to_string(),
            artwork: Some(entry.artwork.to_string()),
        })
    }

    fn browse_children(&self, parent_id: &str) -> Vec<QueueItem> {
        if parent_id != LIBRARY_ROOT {
            debug!(parent = parent_id, "browse of unknown container");
            return Vec::new();
        }
        LIBRARY
            .iter()
            .map(|entry| {
                QueueItem::new(entry.id, entry.title, entry.artist).with_artwork(entry.artwork)
            })
            .collect()
    }
}
