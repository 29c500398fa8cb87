//! Playback queue for a Muso session.
//!
//! This module defines:
//!   - the canonical [`QueueItem`] structure shared between the session host
//!     and its clients,
//!   - the [`Queue`] itself (ordered items + cursor),
//!   - the [`QueueSnapshot`] view broadcast to listeners.
//!
//! Design goals:
//!   - All structural queue logic (length, cursor, wraparound navigation)
//!     is centralized here and kept free of transport concerns. The queue
//!     NEVER starts playback; the [`SessionController`](crate::SessionController)
//!     decides when navigation should be followed by a play command.
//!   - The cursor is `None` exactly when the queue is empty; every mutation
//!     re-establishes that invariant before returning.
//!
//! Identity model:
//!   - Items carry a stable id assigned by the catalog, but duplicate ids in
//!     a queue are tolerated. Removal therefore matches the *whole* item
//!     (id + displayed description), first occurrence only.

/// A playable entry in a session queue.
///
/// Items are immutable once enqueued; the display description is whatever
/// the catalog exposed at browse time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueItem {
    /// Stable catalog identifier of the underlying media.
    pub id: String,
    /// Primary display line (usually the track title).
    pub title: String,
    /// Secondary display line (usually the artist).
    pub subtitle: String,
    /// Optional artwork reference, resolved lazily by the UI layer.
    pub artwork: Option<String>,
}

impl QueueItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: subtitle.into(),
            artwork: None,
        }
    }

    pub fn with_artwork(mut self, artwork: impl Into<String>) -> Self {
        self.artwork = Some(artwork.into());
        self
    }
}

/// Logical snapshot of a session queue, as published to listeners.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// All items currently in the queue, in play order.
    pub items: Vec<QueueItem>,
    /// Index (0-based) of the current item, or `None` when the queue is empty.
    pub cursor: Option<usize>,
}

impl QueueSnapshot {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Ordered sequence of [`QueueItem`] with a current-position cursor.
#[derive(Clone, Debug, Default)]
pub struct Queue {
    items: Vec<QueueItem>,
    cursor: Option<usize>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Item under the cursor, if any.
    pub fn current(&self) -> Option<&QueueItem> {
        self.cursor.and_then(|idx| self.items.get(idx))
    }

    /// Appends an item at the end of the queue.
    ///
    /// On the empty→non-empty edge the cursor is set to 0; an already-set
    /// cursor is never moved by an append.
    pub fn append(&mut self, item: QueueItem) {
        self.items.push(item);
        if self.cursor.is_none() {
            self.cursor = Some(0);
        }
    }

    /// Removes the first entry structurally equal to `item`.
    ///
    /// Returns `true` when something was removed. Removing an absent item is
    /// a no-op. When the queue becomes empty the cursor is unset; otherwise
    /// it is clamped back into range so the cursor invariant holds.
    pub fn remove_first(&mut self, item: &QueueItem) -> bool {
        let Some(pos) = self.items.iter().position(|entry| entry == item) else {
            return false;
        };
        self.items.remove(pos);

        if self.items.is_empty() {
            self.cursor = None;
        } else if let Some(idx) = self.cursor {
            if idx >= self.items.len() {
                self.cursor = Some(self.items.len() - 1);
            }
        }
        true
    }

    /// Advances the cursor by one, wrapping to the first item after the last.
    ///
    /// Returns the new cursor, or `None` (and does nothing) on an empty queue.
    pub fn advance_wrapping(&mut self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let next = match self.cursor {
            Some(idx) => (idx + 1) % self.items.len(),
            None => 0,
        };
        self.cursor = Some(next);
        Some(next)
    }

    /// Moves the cursor back by one, wrapping from the first item to the last.
    ///
    /// Returns the new cursor, or `None` (and does nothing) on an empty queue.
    pub fn retreat_wrapping(&mut self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let prev = match self.cursor {
            Some(idx) if idx > 0 => idx - 1,
            _ => self.items.len() - 1,
        };
        self.cursor = Some(prev);
        Some(prev)
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            items: self.items.clone(),
            cursor: self.cursor,
        }
    }
}
