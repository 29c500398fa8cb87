use thiserror::Error;

use musosession::SessionError;

/// Client-side connection errors.
///
/// A failed connection attempt is fatal for that attempt: the manager goes
/// back to Disconnected and never retries on its own. A later `start()` is
/// the caller's policy.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Session not found in directory: {0}")]
    SessionNotFound(String),
    #[error("Connection attempt failed: {0}")]
    ConnectFailed(String),
    #[error("Not connected to a session")]
    NotConnected,
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result type specialized for musoclient.
pub type Result<T> = std::result::Result<T, ClientError>;
