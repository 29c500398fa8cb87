//! Foreground-guarantee lifecycle.
//!
//! The lifecycle manager is a purely reactive layer: it observes the
//! playback snapshots produced by the controller (on the same serialized
//! dispatch) and keeps two pieces of state in step with them:
//!
//!   - whether the hosting process currently holds the foreground-execution
//!     guarantee ("pinned"),
//!   - whether the OS-registration step has run since the guarantee was
//!     last released.
//!
//! The registration step and the guarantee acquisition are deliberately
//! separate: registration happens at most once per held period, while the
//! notification attached to the guarantee is re-rendered on every Playing
//! event. No other component may render the session notification.

use tracing::{debug, info};

use crate::handle::SessionHandle;
use crate::metadata::PreparedMedia;
use crate::state::{PlaybackSnapshot, PlaybackState};

/// Process-pinning collaborator (OS integration seam).
pub trait ProcessPinner: Send {
    /// One-time registration step, run before the first pin of a held period.
    fn register(&mut self);

    /// Acquires the foreground-execution guarantee.
    fn pin(&mut self);

    /// Releases the foreground-execution guarantee.
    fn unpin(&mut self);

    /// Invites the hosting process to terminate if nothing else is pending.
    fn request_teardown(&mut self);
}

/// Notification surface collaborator.
pub trait NotificationRenderer: Send {
    /// Renders (or re-renders) the session notification for the given state.
    fn render(
        &mut self,
        metadata: Option<&PreparedMedia>,
        snapshot: &PlaybackSnapshot,
        handle: &SessionHandle,
    );

    /// Removes the session notification.
    fn remove(&mut self);

    /// Clears any notification left over by a previous process instance.
    /// Called once at host startup.
    fn cancel_all(&mut self);
}

/// Drives [`ProcessPinner`] and [`NotificationRenderer`] from playback
/// transitions.
pub struct LifecycleManager {
    pinner: Box<dyn ProcessPinner>,
    notifier: Box<dyn NotificationRenderer>,
    pinned: bool,
    registered: bool,
}

impl LifecycleManager {
    /// Wraps the collaborators and clears stale notification state.
    pub fn new(pinner: Box<dyn ProcessPinner>, mut notifier: Box<dyn NotificationRenderer>) -> Self {
        notifier.cancel_all();
        Self {
            pinner,
            notifier,
            pinned: false,
            registered: false,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Reacts to a playback snapshot produced by the controller.
    ///
    /// Invariants kept here:
    ///   - the guarantee is never held while the state is Stopped,
    ///   - Paused never acquires the guarantee, it only refreshes the
    ///     notification of an already-pinned session,
    ///   - Stopped releases and removes unconditionally, whatever the
    ///     previous pinned state was.
    pub fn on_playback_state(
        &mut self,
        snapshot: &PlaybackSnapshot,
        metadata: Option<&PreparedMedia>,
        handle: &SessionHandle,
    ) {
        match snapshot.state {
            PlaybackState::Playing => {
                if !self.registered {
                    self.pinner.register();
                    self.registered = true;
                }
                self.notifier.render(metadata, snapshot, handle);
                if !self.pinned {
                    info!(session = handle.name(), "acquiring foreground guarantee");
                    self.pinner.pin();
                    self.pinned = true;
                }
            }
            PlaybackState::Paused => {
                // Guarantee stays as-is; only the notification changes mode.
                if self.pinned {
                    self.notifier.render(metadata, snapshot, handle);
                }
            }
            PlaybackState::Stopped => {
                self.notifier.remove();
                if self.pinned {
                    info!(session = handle.name(), "releasing foreground guarantee");
                }
                self.pinner.unpin();
                self.pinned = false;
                self.registered = false;
                self.pinner.request_teardown();
            }
            PlaybackState::Idle | PlaybackState::Prepared => {
                debug!(state = snapshot.state.as_str(), "no lifecycle reaction");
            }
        }
    }
}

/// Log-only pinner used by the demo app; a platform port would talk to the
/// OS service layer here.
#[derive(Default)]
pub struct LogPinner;

impl ProcessPinner for LogPinner {
    fn register(&mut self) {
        info!("process registered for foreground execution");
    }

    fn pin(&mut self) {
        info!("process pinned");
    }

    fn unpin(&mut self) {
        info!("process unpinned");
    }

    fn request_teardown(&mut self) {
        info!("process teardown requested");
    }
}

/// Log-only notification renderer used by the demo app.
#[derive(Default)]
pub struct LogNotifier;

impl NotificationRenderer for LogNotifier {
    fn render(
        &mut self,
        metadata: Option<&PreparedMedia>,
        snapshot: &PlaybackSnapshot,
        handle: &SessionHandle,
    ) {
        let title = metadata.map(|m| m.title.as_str()).unwrap_or("<unknown>");
        info!(
            session = handle.name(),
            state = snapshot.state.as_str(),
            title = title,
            "notification rendered"
        );
    }

    fn remove(&mut self) {
        info!("notification removed");
    }

    fn cancel_all(&mut self) {
        debug!("stale notifications cleared");
    }
}
