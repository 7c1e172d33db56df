//! Broker connection upkeep.

use embassy_time::{Duration, Instant};

use crate::config::BridgeOptions;
use crate::topic::{TopicBuf, TopicCodec};
use crate::transport::MqttSession;

/// Reconnects with back-off and re-subscribes to the command branch.
#[derive(Debug, Clone)]
pub struct Connection {
    last_attempt: Option<Instant>,
    retry_interval: Duration,
}

impl Connection {
    /// Starts disconnected with no attempt recorded.
    pub fn new(retry_interval: Duration) -> Self {
        Self {
            last_attempt: None,
            retry_interval,
        }
    }

    /// Time of the last connection attempt, if any.
    pub fn last_attempt(&self) -> Option<Instant> {
        self.last_attempt
    }

    /// Makes sure the session is connected.
    ///
    /// Returns `true` when the session is usable this tick. While disconnected,
    /// a new attempt is made at most once per retry interval; the attempt time
    /// is recorded whether or not it succeeds.
    pub fn ensure<S: MqttSession>(
        &mut self,
        session: &mut S,
        now: Instant,
        options: &BridgeOptions<'_>,
        codec: &TopicCodec<'_>,
    ) -> bool {
        if session.is_connected() {
            return true;
        }

        if let Some(last) = self.last_attempt {
            let waited = now
                .checked_duration_since(last)
                .is_none_or(|elapsed| elapsed >= self.retry_interval);
            if !waited {
                return false;
            }
        }
        self.last_attempt = Some(now);

        debug!("connecting as {}", options.client_id);
        if session
            .connect(options.client_id, options.connect_credentials())
            .is_err()
        {
            error!("cannot connect as {}", options.client_id);
            return false;
        }
        info!("connected as {}", options.client_id);

        let mut topic = TopicBuf::new();
        match codec.compose_set_wildcard(&mut topic) {
            Ok(filter) => {
                if session.subscribe(filter).is_err() {
                    error!("cannot subscribe to {}", filter);
                }
            }
            Err(err) => error!("cannot compose command filter: {}", err),
        }

        true
    }
}
