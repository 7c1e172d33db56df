//! Publishing of cached valve values.
//!
//! Carries out the publish work the scheduler decides on: compose the topic,
//! render the value into a fixed payload buffer and hand both to the session.
//! A value is marked published once it was attempted, whether or not the
//! session accepted it.

use crate::model::{CachedValue, Payload, TimerEntry};
use crate::topic::{Path, TimerTopic, TopicBuf, TopicCodec};
use crate::transport::MqttSession;

/// Result of a publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// The value was already published or is not known yet.
    Skipped,
    /// Every message was accepted by the session.
    Published,
    /// At least one message could not be composed, rendered or sent.
    Failed,
}

/// Publishes values through a borrowed session.
pub struct Publisher<'s, 'c, S> {
    session: &'s mut S,
    codec: &'s TopicCodec<'c>,
    retain: bool,
}

impl<'s, 'c, S: MqttSession> Publisher<'s, 'c, S> {
    /// Borrows the session for one unit of publish work.
    pub fn new(session: &'s mut S, codec: &'s TopicCodec<'c>, retain: bool) -> Self {
        Self {
            session,
            codec,
            retain,
        }
    }

    /// Publishes `value` under `path` unless it is already published or unknown.
    pub fn publish_value(&mut self, path: &Path, value: &mut dyn CachedValue) -> Outcome {
        if value.is_published() || !value.is_known() {
            return Outcome::Skipped;
        }

        let hint = path.as_uint();
        let mut payload = Payload::new();
        let outcome = if value.format(&mut payload).is_err() {
            error!("value {} does not fit the payload buffer", hint);
            Outcome::Failed
        } else {
            self.send(path, payload.as_bytes())
        };

        value.mark_published();
        outcome
    }

    /// Publishes the mode and time of one timer slot as two messages.
    ///
    /// Both topics share the `<...>/timer/<day>/<slot>/` composition; only the
    /// trailing sub-topic differs.
    pub fn publish_timer(&mut self, path: &Path, entry: &mut dyn TimerEntry) -> Outcome {
        if entry.is_published() || !entry.is_known() {
            return Outcome::Skipped;
        }

        let hint = path.as_uint();
        let mut topic = TopicBuf::new();
        let outcome = match self.codec.compose_timer_base(path, &mut topic) {
            Ok(base_len) => {
                let mut payload = Payload::new();
                let mode = entry.format_mode(&mut payload).is_ok()
                    && self.send_sub(&mut topic, base_len, TimerTopic::Mode, &payload);

                payload.clear();
                let time = entry.format_time(&mut payload).is_ok()
                    && self.send_sub(&mut topic, base_len, TimerTopic::Time, &payload);

                if mode && time {
                    Outcome::Published
                } else {
                    Outcome::Failed
                }
            }
            Err(err) => {
                error!("cannot compose timer topic {}: {}", hint, err);
                Outcome::Failed
            }
        };

        match outcome {
            Outcome::Published => debug!("published timer {} {}/{}", hint, path.day, path.slot),
            _ => error!("cannot publish timer {} {}/{}", hint, path.day, path.slot),
        }

        entry.mark_published();
        outcome
    }

    /// Publishes a ready-made payload under `path`.
    pub fn send(&mut self, path: &Path, payload: &[u8]) -> Outcome {
        let hint = path.as_uint();
        let mut topic = TopicBuf::new();
        let topic = match self.codec.compose(path, &mut topic) {
            Ok(topic) => topic,
            Err(err) => {
                error!("cannot compose topic {}: {}", hint, err);
                return Outcome::Failed;
            }
        };

        match self.session.publish(topic, payload, self.retain) {
            Ok(()) => {
                debug!("published {}", hint);
                Outcome::Published
            }
            Err(_) => {
                error!("cannot publish {}", hint);
                Outcome::Failed
            }
        }
    }

    fn send_sub(
        &mut self,
        topic: &mut TopicBuf,
        base_len: usize,
        sub: TimerTopic,
        payload: &Payload,
    ) -> bool {
        topic.truncate(base_len);
        let Some(name) = sub.name() else {
            return false;
        };
        if topic.push_str(name).is_err() {
            return false;
        }
        self.session
            .publish(topic.as_str(), payload.as_bytes(), self.retain)
            .is_ok()
    }
}
