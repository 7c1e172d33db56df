//! Bridge configuration.

use embassy_time::Duration;

use crate::transport::Credentials;

/// Default minimum time between connection attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Options controlling how the bridge connects and publishes.
///
/// ```ignore
/// let options = BridgeOptions::new("hr20-master", "hr20")
///     .with_credentials("user", "secret")
///     .with_reconnect_interval(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BridgeOptions<'a> {
    /// MQTT client identifier.
    pub client_id: &'a str,
    /// Root of every published and subscribed topic.
    pub topic_prefix: &'a str,
    /// Broker credentials, anonymous by default.
    pub credentials: Credentials<'a>,
    /// Minimum time between connection attempts.
    pub reconnect_interval: Duration,
    /// Publish values as retained messages.
    pub retain: bool,
    /// Include the composite state document in the frequent walk.
    pub publish_state: bool,
}

impl<'a> BridgeOptions<'a> {
    /// Anonymous options with every other setting at its default.
    pub fn new(client_id: &'a str, topic_prefix: &'a str) -> Self {
        Self {
            client_id,
            topic_prefix,
            credentials: Credentials::default(),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            retain: true,
            publish_state: false,
        }
    }

    /// Sets the broker credentials. An empty user name keeps the connection anonymous.
    pub fn with_credentials(mut self, username: &'a str, password: &'a str) -> Self {
        self.credentials = Credentials::new(username, password);
        self
    }

    /// Sets the minimum time between connection attempts.
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Publishes values with or without the retain flag.
    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    /// Adds the composite state document to the frequent walk.
    pub fn with_state_document(mut self, enabled: bool) -> Self {
        self.publish_state = enabled;
        self
    }

    /// Credentials to pass on connect, `None` when anonymous.
    pub fn connect_credentials(&self) -> Option<Credentials<'a>> {
        (!self.credentials.is_anonymous()).then_some(self.credentials)
    }
}
