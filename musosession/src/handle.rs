//! Addressable session identity.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

/// Opaque, versioned token identifying a live session instance.
///
/// Created once per host lifetime and invalidated at teardown. Clients bind
/// their connection to a handle; every transport call made through a handle
/// that has been invalidated fails cleanly with a session-gone error.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    name: String,
    token: Uuid,
    valid: AtomicBool,
}

impl SessionHandle {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                name: name.into(),
                token: Uuid::new_v4(),
                valid: AtomicBool::new(true),
            }),
        }
    }

    /// Discovery name of the session (stable across the host lifetime).
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Instance token; a restarted host gets a fresh one.
    pub fn token(&self) -> Uuid {
        self.inner.token
    }

    pub fn is_valid(&self) -> bool {
        self.inner.valid.load(Ordering::Acquire)
    }

    pub(crate) fn invalidate(&self) {
        self.inner.valid.store(false, Ordering::Release);
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("name", &self.inner.name)
            .field("token", &self.inner.token)
            .field("valid", &self.is_valid())
            .finish()
    }
}
