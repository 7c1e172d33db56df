//! # MQTT Session Abstraction
//!
//! This module defines the `MqttSession` trait, which abstracts the MQTT client
//! the bridge talks through. The bridge is driven from a single cooperative
//! tick, so every method must return without blocking: `publish` hands the
//! message to the client's send buffer, and `poll` services the connection once
//! and delivers whatever inbound messages are already waiting.

/// An inbound PUBLISH, borrowed from the session's receive buffer.
#[derive(Debug, Clone, Copy)]
pub struct InboundMessage<'a> {
    /// The topic the message was published to
    pub topic: &'a str,
    /// The payload bytes
    pub payload: &'a [u8],
}

/// Receives inbound messages while the session is polled.
pub trait MessageHandler {
    /// Handle one inbound message. Must not block.
    fn on_message(&mut self, msg: &InboundMessage<'_>);
}

/// Credentials passed on connect. An empty user name connects anonymously.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Credentials<'a> {
    /// User name, empty for anonymous access.
    pub username: &'a str,
    /// Password, ignored when anonymous.
    pub password: &'a str,
}

impl<'a> Credentials<'a> {
    /// Credentials for `username`. An empty name means anonymous.
    pub const fn new(username: &'a str, password: &'a str) -> Self {
        Self { username, password }
    }

    /// True when the user name is empty.
    pub fn is_anonymous(&self) -> bool {
        self.username.is_empty()
    }
}

/// A non-blocking MQTT client session.
pub trait MqttSession {
    /// The error type returned by the session.
    type Error: core::fmt::Debug;

    /// Opens the broker connection. `credentials` is `None` for anonymous access.
    fn connect(
        &mut self,
        client_id: &str,
        credentials: Option<Credentials<'_>>,
    ) -> Result<(), Self::Error>;

    /// True while the broker connection is up.
    fn is_connected(&self) -> bool;

    /// Subscribes to a topic filter.
    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error>;

    /// Queues a message for sending. Success means the client accepted it, not
    /// that the broker acknowledged it.
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error>;

    /// Services the connection once, passing each received message to `handler`.
    fn poll(&mut self, handler: &mut dyn MessageHandler);
}

/// Blanket implementation for mutable references, so a session can stay owned
/// by the caller.
impl<S: MqttSession + ?Sized> MqttSession for &mut S {
    type Error = S::Error;

    fn connect(
        &mut self,
        client_id: &str,
        credentials: Option<Credentials<'_>>,
    ) -> Result<(), Self::Error> {
        (**self).connect(client_id, credentials)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error> {
        (**self).subscribe(topic)
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error> {
        (**self).publish(topic, payload, retain)
    }

    fn poll(&mut self, handler: &mut dyn MessageHandler) {
        (**self).poll(handler)
    }
}
