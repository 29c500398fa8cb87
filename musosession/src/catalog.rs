//! Catalog resolver contract.

use crate::metadata::PreparedMedia;
use crate::queue::QueueItem;

/// Media catalog collaborator: resolves item ids into playable metadata and
/// exposes a browsable tree of enqueueable items.
///
/// Resolution is treated as a bounded, synchronous step from the
/// controller's point of view; an implementation backed by slow storage
/// should resolve ahead of time and answer from its own cache.
pub trait CatalogResolver: Send + Sync {
    /// Id of the top-level browsable container.
    fn root_id(&self) -> &str;

    /// Resolves a catalog id into playable metadata; `None` means not found.
    fn resolve_metadata(&self, item_id: &str) -> Option<PreparedMedia>;

    /// Ordered children of a browsable container; unknown parents yield an
    /// empty list.
    fn browse_children(&self, parent_id: &str) -> Vec<QueueItem>;
}
