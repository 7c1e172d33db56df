//! # MQTT Bridge for Radiator-Valve Fleets
//!
//! `myrtio-valve-mqtt` connects the device model of a fleet of addressable
//! radiator-valve controllers to an MQTT broker. It is `no_std` and allocation
//! free, and it runs from a single cooperative tick.
//!
//! ## Core Features
//!
//! - **Topic codec:** maps `<prefix>/[set/]<address>/<topic>[/<day>/<slot>/<mode|time>]`
//!   to a compact [`Path`] and back, inside fixed-capacity `heapless` buffers.
//! - **Incremental publishing:** per-device change flags are walked one attribute
//!   (or one timer slot) per tick, round-robin across the fleet.
//! - **Command dispatch:** messages under `<prefix>/set/#` are parsed and routed to
//!   the valve model's setters.
//! - **Reconnect with back-off:** the session is re-established at most once per
//!   configured interval and the command branch re-subscribed.
//!
//! ## Usage
//!
//! The application provides an [`MqttSession`] implementation for its MQTT client
//! and a [`ValveModel`] for its devices, then ticks the bridge:
//!
//! ```ignore
//! static CHANGES: ChangeInbox<CriticalSectionRawMutex, 32> = ChangeInbox::new();
//!
//! let options = BridgeOptions::new("hr20-master", "hr20")
//!     .with_credentials("user", "secret");
//! let mut bridge = ValveBridge::<_, 32>::new(session, options)?;
//!
//! loop {
//!     bridge.absorb(&CHANGES);
//!     bridge.tick(Instant::now(), &mut model);
//!     Timer::after_secs(1).await;
//! }
//! ```
//!
//! The radio protocol reports changes through the inbox from its own task:
//!
//! ```ignore
//! CHANGES.raise(address, Change::Frequent.into());
//! CHANGES.raise(address, ChangeSet::timer_day(3));
//! ```
//!
//! ## Logging
//!
//! Enable the `log` or `defmt` feature to route diagnostics to the respective
//! crate. Every publish and command is logged with [`Path::as_uint`] as
//! correlation code.

#![no_std]
#![warn(missing_docs)]

mod fmt;

pub mod changes;
pub mod config;
pub mod error;
pub mod model;
pub mod runtime;
pub mod topic;
pub mod transport;
pub mod util;

// Re-export key types for easier access at the crate root.
pub use changes::{Change, ChangeInbox, ChangeMasks, ChangeSet};
pub use config::BridgeOptions;
pub use error::{DispatchError, InvalidValue, TopicError};
pub use model::{CachedValue, Payload, Reading, Setting, TimerEntry, Valve, ValveModel};
pub use runtime::{Tick, ValveBridge};
pub use topic::{Path, TimerTopic, Topic, TopicCodec};
pub use transport::{Credentials, InboundMessage, MessageHandler, MqttSession};
