//! Inbound command dispatch.
//!
//! Commands arrive on `<prefix>/set/<address>/<topic>[...]` while the session
//! is polled. The dispatcher parses the topic, looks the device up and hands the
//! raw payload to the matching setter. Malformed input never escapes as a panic
//! or an error to the caller: [`MessageHandler::on_message`] logs and drops it.

use crate::error::DispatchError;
use crate::model::{Setting, Valve, ValveModel};
use crate::topic::{Path, TimerTopic, Topic, TopicCodec};
use crate::transport::{InboundMessage, MessageHandler};

/// Routes inbound commands into a valve model.
pub struct Dispatcher<'d, 'c, M> {
    codec: &'d TopicCodec<'c>,
    model: &'d mut M,
}

impl<'d, 'c, M: ValveModel> Dispatcher<'d, 'c, M> {
    /// Borrows the codec and model for the duration of one poll.
    pub fn new(codec: &'d TopicCodec<'c>, model: &'d mut M) -> Self {
        Self { codec, model }
    }

    /// Applies one command, returning the parsed path on success.
    ///
    /// Every command whose topic parsed is logged with its correlation code,
    /// accepted or not.
    pub fn dispatch(&mut self, topic: &str, payload: &[u8]) -> Result<Path, DispatchError> {
        let path = self.codec.try_parse(topic)?;
        let result = self.route(&path, payload);
        match result {
            Ok(()) => info!("command {} for {}", path.as_uint(), path.address),
            Err(err) => warn!("command {} dropped: {}", path.as_uint(), err),
        }
        result.map(|()| path)
    }

    fn route(&mut self, path: &Path, payload: &[u8]) -> Result<(), DispatchError> {
        if !path.setter {
            return Err(DispatchError::NotSetter);
        }
        let valve = self
            .model
            .valve_mut(path.address)
            .ok_or(DispatchError::UnknownDevice(path.address))?;
        apply::<M>(valve, path, payload)
    }
}

fn apply<M: ValveModel>(
    valve: &mut M::Valve,
    path: &Path,
    payload: &[u8],
) -> Result<(), DispatchError> {
    let invalid = |_| DispatchError::InvalidValue(path.as_uint());

    if let Some(setting) = Setting::from_topic(path.topic) {
        return valve.set_requested(setting, payload).map_err(invalid);
    }

    if path.topic != Topic::Timer {
        return Err(DispatchError::InvalidTopic);
    }
    if path.day >= M::TIMER_DAYS {
        return Err(DispatchError::DayOutOfRange(path.day));
    }
    if path.slot >= M::TIMER_SLOTS {
        return Err(DispatchError::SlotOutOfRange(path.slot));
    }

    match path.timer_topic {
        TimerTopic::Mode => valve
            .set_timer_mode(path.day, path.slot, payload)
            .map_err(invalid),
        TimerTopic::Time => valve
            .set_timer_time(path.day, path.slot, payload)
            .map_err(invalid),
        TimerTopic::None | TimerTopic::Invalid => Err(DispatchError::InvalidTopic),
    }
}

impl<M: ValveModel> MessageHandler for Dispatcher<'_, '_, M> {
    fn on_message(&mut self, msg: &InboundMessage<'_>) {
        match self.dispatch(msg.topic, msg.payload) {
            Ok(_) => {}
            Err(err @ DispatchError::InvalidValue(_)) => {
                error!("invalid topic value {}", err.code());
            }
            Err(DispatchError::Topic(err)) => warn!("command topic dropped: {}", err),
            // logged by dispatch with the correlation code
            Err(_) => {}
        }
    }
}
