use thiserror::Error;

/// Errors surfaced by the session core.
///
/// Guarded no-ops (play on an empty queue, prepare with an unset cursor,
/// removal of an absent item) are NOT errors; they return `Ok(())` and are
/// only visible at debug log level.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session has been destroyed")]
    SessionDestroyed,
    #[error("Playback engine failure: {0}")]
    EngineFailure(String),
}

/// Result type specialized for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
