//! Logical playback state published by the session controller.
//!
//! The controller is the only producer of [`PlaybackSnapshot`] values:
//! engine events and explicit transitions are folded into a snapshot, the
//! lifecycle manager reacts to it, and the same value is broadcast to every
//! connected listener. Clients never derive state on their own.

use std::fmt;
use std::ops::BitOr;
use std::time::Duration;

/// High-level playback phase of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing prepared yet; fresh session.
    Idle,
    /// Metadata for the cursor item has been resolved, playback not started.
    Prepared,
    Playing,
    Paused,
    Stopped,
}

impl PlaybackState {
    /// Human-readable label, stable across releases (used in logs).
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "IDLE",
            PlaybackState::Prepared => "PREPARED",
            PlaybackState::Playing => "PLAYING",
            PlaybackState::Paused => "PAUSED",
            PlaybackState::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bitmask of transport actions currently valid on the session.
///
/// The UI is expected to gate its controls on this mask; the controller
/// stays safe even when a caller ignores it (guarded no-ops).
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportActions(u32);

impl TransportActions {
    pub const NONE: TransportActions = TransportActions(0);
    pub const PLAY: TransportActions = TransportActions(1 << 0);
    pub const PAUSE: TransportActions = TransportActions(1 << 1);
    pub const STOP: TransportActions = TransportActions(1 << 2);
    pub const SEEK: TransportActions = TransportActions(1 << 3);
    pub const SKIP_NEXT: TransportActions = TransportActions(1 << 4);
    pub const SKIP_PREVIOUS: TransportActions = TransportActions(1 << 5);
    pub const PREPARE: TransportActions = TransportActions(1 << 6);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: TransportActions) -> bool {
        self.0 & other.0 == other.0
    }

    /// Computes the valid actions for the given queue shape.
    ///
    /// Skip actions are advertised as soon as the queue is non-empty:
    /// navigation wraps around, so they are meaningful even with one item.
    pub fn for_queue(len: usize, cursor: Option<usize>, prepared: bool) -> Self {
        let mut actions = TransportActions::PAUSE | TransportActions::STOP;
        if len > 0 {
            actions = actions
                | TransportActions::PLAY
                | TransportActions::SKIP_NEXT
                | TransportActions::SKIP_PREVIOUS;
        }
        if cursor.is_some() {
            actions = actions | TransportActions::PREPARE;
        }
        if prepared {
            actions = actions | TransportActions::SEEK;
        }
        actions
    }
}

impl BitOr for TransportActions {
    type Output = TransportActions;

    fn bitor(self, rhs: TransportActions) -> TransportActions {
        TransportActions(self.0 | rhs.0)
    }
}

impl fmt::Debug for TransportActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(TransportActions, &str); 7] = [
            (TransportActions::PLAY, "PLAY"),
            (TransportActions::PAUSE, "PAUSE"),
            (TransportActions::STOP, "STOP"),
            (TransportActions::SEEK, "SEEK"),
            (TransportActions::SKIP_NEXT, "SKIP_NEXT"),
            (TransportActions::SKIP_PREVIOUS, "SKIP_PREVIOUS"),
            (TransportActions::PREPARE, "PREPARE"),
        ];
        let mut first = true;
        write!(f, "TransportActions(")?;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        if first {
            write!(f, "NONE")?;
        }
        write!(f, ")")
    }
}

/// State unit broadcast to listeners and fed to the lifecycle manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    /// Position inside the current item, as last reported by the engine.
    pub position: Duration,
    pub actions: TransportActions,
}

impl PlaybackSnapshot {
    /// Initial snapshot of a freshly created session.
    pub fn idle() -> Self {
        Self {
            state: PlaybackState::Idle,
            position: Duration::ZERO,
            actions: TransportActions::NONE,
        }
    }
}
