//! Bridge Runtime
//!
//! The pieces driven by [`ValveBridge::tick`], in the order a tick runs them:
//!
//! - [`Connection`] reconnects with back-off and re-subscribes to the command
//!   branch after every successful connect.
//! - The session is polled once; inbound commands reach the [`Dispatcher`],
//!   which writes them into the valve model.
//! - The [`Scheduler`] picks one unit of publish work and the [`Publisher`]
//!   carries it out.
//!
//! Nothing here blocks. Each tick does a bounded amount of work, so the bridge
//! can share a cooperative executor with the radio protocol.

pub(crate) mod connection;
pub(crate) mod dispatcher;
pub(crate) mod event_loop;
pub(crate) mod publisher;
pub(crate) mod scheduler;

pub use connection::Connection;
pub use dispatcher::Dispatcher;
pub use event_loop::{Tick, ValveBridge};
pub use publisher::{Outcome, Publisher};
pub use scheduler::{Cursor, FREQUENT_SLOTS, Phase, Scheduler, Step};
