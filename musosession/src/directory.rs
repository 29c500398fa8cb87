//! Session discovery.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::host::SessionHost;

/// Process-wide map of discoverable sessions, keyed by name.
///
/// This is the addressable surface clients connect through: a name resolves
/// to the live host, and the host's handle token tells stale clients apart
/// from current ones. A torn-down host unregisters itself; looking up a
/// name that is gone is a connect-time failure on the client side.
#[derive(Default)]
pub struct SessionDirectory {
    sessions: RwLock<HashMap<String, Arc<SessionHost>>>,
}

impl SessionDirectory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(&self, host: Arc<SessionHost>) {
        let mut sessions = self.sessions.write().unwrap();
        if sessions.insert(host.name().to_string(), host).is_some() {
            warn!("session re-registered under an existing name, previous entry replaced");
        }
    }

    pub fn unregister(&self, name: &str) {
        let mut sessions = self.sessions.write().unwrap();
        sessions.remove(name);
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<SessionHost>> {
        let sessions = self.sessions.read().unwrap();
        sessions.get(name).cloned()
    }

    /// Names of the currently registered sessions, unordered.
    pub fn names(&self) -> Vec<String> {
        let sessions = self.sessions.read().unwrap();
        sessions.keys().cloned().collect()
    }
}
