//! The bridge event loop.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Instant;

use super::connection::Connection;
use super::dispatcher::Dispatcher;
use super::publisher::{Outcome, Publisher};
use super::scheduler::{Scheduler, Step};
use crate::changes::{ChangeInbox, ChangeSet};
use crate::config::BridgeOptions;
use crate::error::TopicError;
use crate::model::{Valve, ValveModel};
use crate::topic::{Path, TimerTopic, TopicCodec};
use crate::transport::MqttSession;

/// What a call to [`ValveBridge::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Not connected and the reconnect interval has not elapsed, or the
    /// connection attempt failed. No other work was done.
    NotReady,
    /// The session was polled and the scheduler performed `Step`.
    Worked(Step, Outcome),
}

/// Bridges a fleet of `N` valve addresses to an MQTT session.
///
/// Drive it from a periodic task, roughly once per second:
///
/// ```ignore
/// let options = BridgeOptions::new("hr20-master", "hr20");
/// let mut bridge = ValveBridge::<_, 32>::new(session, options)?;
///
/// loop {
///     bridge.absorb(&CHANGES);
///     bridge.tick(Instant::now(), &mut model);
///     Timer::after_secs(1).await;
/// }
/// ```
pub struct ValveBridge<'a, S, const N: usize> {
    session: S,
    options: BridgeOptions<'a>,
    codec: TopicCodec<'a>,
    connection: Connection,
    scheduler: Scheduler<N>,
}

impl<'a, S: MqttSession, const N: usize> ValveBridge<'a, S, N> {
    /// Creates a bridge. Fails if the configured topic prefix is empty.
    pub fn new(session: S, options: BridgeOptions<'a>) -> Result<Self, TopicError> {
        let codec = TopicCodec::new(options.topic_prefix)?;
        Ok(Self {
            session,
            codec,
            connection: Connection::new(options.reconnect_interval),
            scheduler: Scheduler::new(options.publish_state),
            options,
        })
    }

    /// The wrapped MQTT session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Mutable access to the session, e.g. to close it on shutdown.
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Codec for the configured topic prefix.
    pub fn codec(&self) -> &TopicCodec<'a> {
        &self.codec
    }

    /// Publish cursor and pending changes.
    pub fn scheduler(&self) -> &Scheduler<N> {
        &self.scheduler
    }

    /// Reconnect state.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Marks `changes` pending for `address`. Called by the radio protocol
    /// whenever it learns that a device attribute changed.
    pub fn raise(&mut self, address: u8, changes: ChangeSet) -> bool {
        let accepted = self.scheduler.raise(address, changes);
        if !accepted {
            warn!("change for address {} outside the fleet", address);
        }
        accepted
    }

    /// Takes over every change raised through `inbox` since the last call.
    pub fn absorb<M: RawMutex>(&mut self, inbox: &ChangeInbox<M, N>) {
        inbox.drain_into(self.scheduler.changes_mut());
    }

    /// Runs one cooperative step: connection upkeep, one session poll (which
    /// dispatches inbound commands into `model`), then one unit of publish work.
    pub fn tick<V: ValveModel>(&mut self, now: Instant, model: &mut V) -> Tick {
        if !self
            .connection
            .ensure(&mut self.session, now, &self.options, &self.codec)
        {
            return Tick::NotReady;
        }

        self.session.poll(&mut Dispatcher::new(&self.codec, model));

        let step = self.scheduler.advance();
        let outcome = self.perform(step, model);
        Tick::Worked(step, outcome)
    }

    fn perform<V: ValveModel>(&mut self, step: Step, model: &mut V) -> Outcome {
        let address = match step {
            Step::Reading { address, .. } | Step::TimerSlot { address, .. } => address,
            _ => return Outcome::Skipped,
        };

        let Some(valve) = model.valve_mut(address) else {
            error!("no device at address {}, dropping its changes", address);
            self.scheduler.drop_address(address);
            return Outcome::Skipped;
        };

        let mut publisher = Publisher::new(&mut self.session, &self.codec, self.options.retain);
        match step {
            Step::Reading { reading, .. } => {
                let path = Path::new(address, reading.topic());
                match valve.reading(reading) {
                    Some(value) => publisher.publish_value(&path, value),
                    None => Outcome::Skipped,
                }
            }
            Step::TimerSlot { day, slot, .. } => {
                let path = Path::timer(address, day, slot, TimerTopic::None);
                match valve.timer(day, slot) {
                    Some(entry) => publisher.publish_timer(&path, entry),
                    None => Outcome::Skipped,
                }
            }
            _ => Outcome::Skipped,
        }
    }
}
