//! Resolved media metadata.

use std::time::Duration;

/// Fully resolved metadata for the queue item under the cursor.
///
/// Produced by the catalog resolver during `prepare()` and cached by the
/// controller until the cursor moves or the queue content changes. Absence
/// of a `PreparedMedia` means "not yet prepared", never an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedMedia {
    /// Catalog id of the resolved item.
    pub item_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: Duration,
    /// Resource the playback engine should open.
    pub media_uri: String,
    /// Optional artwork reference for the notification and the UI.
    pub artwork: Option<String>,
}
