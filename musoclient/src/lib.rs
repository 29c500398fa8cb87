//! Client side of a Muso session.
//!
//! [`ConnectionManager`] handles connecting to a named session,
//! re-synchronizing every registered [`SessionListener`] on (re)connect,
//! and pumping live broadcasts from the host. Transport commands go through
//! the [`TransportHandle`] bound at connect time.

mod connection;
mod error;
mod listener;
mod transport;

pub use connection::ConnectionManager;
pub use error::{ClientError, Result};
pub use listener::{ListenerRegistry, SessionListener};
pub use transport::TransportHandle;
