//! Core of the Muso media session: queue/transport state machine, session
//! discovery, and the foreground-guarantee lifecycle.
//!
//! A [`SessionHost`] owns one [`SessionController`] (queue + prepared-media
//! cache + transport state machine), an event bus fanning state out to
//! clients, and a dispatch thread marshalling [`PlaybackEngine`] events
//! into the controller's serialized execution. The [`LifecycleManager`]
//! reacts to playback transitions by pinning/unpinning the hosting process
//! and rendering the attached notification.
//!
//! Clients connect through the companion `musoclient` crate; the catalog
//! behind [`CatalogResolver`] lives in `musocatalog`.

mod catalog;
mod controller;
mod directory;
mod engine;
mod errors;
mod events;
mod handle;
mod lifecycle;
mod metadata;
mod queue;
mod state;

pub mod host;

pub use catalog::CatalogResolver;
pub use controller::SessionController;
pub use directory::SessionDirectory;
pub use engine::{EngineEvent, EngineEventSender, EngineState, PlaybackEngine, VirtualEngine};
pub use errors::{Result, SessionError};
pub use events::{SessionEvent, SessionEventBus};
pub use handle::SessionHandle;
pub use host::{ClientAttachment, SessionHost};
pub use lifecycle::{
    LifecycleManager, LogNotifier, LogPinner, NotificationRenderer, ProcessPinner,
};
pub use metadata::PreparedMedia;
pub use queue::{Queue, QueueItem, QueueSnapshot};
pub use state::{PlaybackSnapshot, PlaybackState, TransportActions};
