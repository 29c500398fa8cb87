//! Control handle bound to a live session.

use std::sync::Arc;
use std::time::Duration;

use musosession::{QueueItem, Result, SessionController, SessionError, SessionHandle};

/// Transport commands and queue mutations, addressed to the session the
/// handle was bound to.
///
/// The handle stays bound to one session instance: once the host tears the
/// session down, every call fails cleanly with
/// [`SessionError::SessionDestroyed`] instead of reaching a dead session.
#[derive(Clone)]
pub struct TransportHandle {
    controller: Arc<SessionController>,
    handle: SessionHandle,
}

impl TransportHandle {
    pub(crate) fn new(controller: Arc<SessionController>, handle: SessionHandle) -> Self {
        Self { controller, handle }
    }

    pub fn session_handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn add_item(&self, item: QueueItem) -> Result<()> {
        self.guard()?;
        self.controller.add_item(item)
    }

    pub fn remove_item(&self, item: &QueueItem) -> Result<()> {
        self.guard()?;
        self.controller.remove_item(item)
    }

    pub fn prepare(&self) -> Result<()> {
        self.guard()?;
        self.controller.prepare()
    }

    pub fn play(&self) -> Result<()> {
        self.guard()?;
        self.controller.play()
    }

    pub fn pause(&self) -> Result<()> {
        self.guard()?;
        self.controller.pause()
    }

    pub fn stop(&self) -> Result<()> {
        self.guard()?;
        self.controller.stop()
    }

    pub fn skip_to_next(&self) -> Result<()> {
        self.guard()?;
        self.controller.skip_to_next()
    }

    pub fn skip_to_previous(&self) -> Result<()> {
        self.guard()?;
        self.controller.skip_to_previous()
    }

    pub fn seek_to(&self, position: Duration) -> Result<()> {
        self.guard()?;
        self.controller.seek_to(position)
    }

    fn guard(&self) -> Result<()> {
        if self.handle.is_valid() {
            Ok(())
        } else {
            Err(SessionError::SessionDestroyed)
        }
    }
}
