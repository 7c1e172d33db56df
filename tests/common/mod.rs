//! Test doubles: a recording MQTT session and an in-memory valve fleet.

#![allow(dead_code)]

use core::fmt::Write;

use myrtio_valve_mqtt::{
    CachedValue, Credentials, InboundMessage, InvalidValue, MessageHandler, MqttSession, Payload,
    Reading, Setting, TimerEntry, Valve, ValveModel,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

/// Session that records everything and replays queued inbound messages on poll.
#[derive(Default)]
pub struct RecordingSession {
    pub connected: bool,
    pub refuse_connect: bool,
    pub refuse_publish: bool,
    /// Refuses only topics ending in this suffix.
    pub refuse_suffix: Option<&'static str>,
    pub connects: usize,
    pub polls: usize,
    pub credentials: Option<(String, String)>,
    pub client_id: String,
    pub subscriptions: Vec<String>,
    pub published: Vec<Sent>,
    pub inbound: Vec<(String, Vec<u8>)>,
}

impl RecordingSession {
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn queue(&mut self, topic: &str, payload: &str) {
        self.inbound.push((topic.into(), payload.as_bytes().to_vec()));
    }

    pub fn topics(&self) -> Vec<&str> {
        self.published.iter().map(|s| s.topic.as_str()).collect()
    }
}

impl MqttSession for RecordingSession {
    type Error = ();

    fn connect(
        &mut self,
        client_id: &str,
        credentials: Option<Credentials<'_>>,
    ) -> Result<(), ()> {
        self.connects += 1;
        self.client_id = client_id.into();
        self.credentials = credentials.map(|c| (c.username.into(), c.password.into()));
        if self.refuse_connect {
            return Err(());
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), ()> {
        self.subscriptions.push(topic.into());
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), ()> {
        self.published.push(Sent {
            topic: topic.into(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            retain,
        });
        let refused = self.refuse_publish
            || self.refuse_suffix.is_some_and(|suffix| topic.ends_with(suffix));
        if refused { Err(()) } else { Ok(()) }
    }

    fn poll(&mut self, handler: &mut dyn MessageHandler) {
        self.polls += 1;
        for (topic, payload) in self.inbound.drain(..) {
            handler.on_message(&InboundMessage {
                topic: &topic,
                payload: &payload,
            });
        }
    }
}

/// A cached value rendering fixed text.
#[derive(Debug, Clone, Default)]
pub struct Value {
    pub text: String,
    pub known: bool,
    pub published: bool,
}

impl Value {
    pub fn known(text: &str) -> Self {
        Self {
            text: text.into(),
            known: true,
            published: false,
        }
    }
}

impl CachedValue for Value {
    fn is_published(&self) -> bool {
        self.published
    }

    fn mark_published(&mut self) {
        self.published = true;
    }

    fn is_known(&self) -> bool {
        self.known
    }

    fn format(&self, out: &mut Payload) -> core::fmt::Result {
        out.write_str(&self.text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Slot {
    pub mode: String,
    pub time: String,
    pub known: bool,
    pub published: bool,
}

impl TimerEntry for Slot {
    fn is_published(&self) -> bool {
        self.published
    }

    fn mark_published(&mut self) {
        self.published = true;
    }

    fn is_known(&self) -> bool {
        self.known
    }

    fn format_mode(&self, out: &mut Payload) -> core::fmt::Result {
        out.write_str(&self.mode)
    }

    fn format_time(&self, out: &mut Payload) -> core::fmt::Result {
        out.write_str(&self.time)
    }
}

/// Valve whose setters accept decimal text only.
#[derive(Debug, Clone)]
pub struct TestValve {
    pub readings: [Value; 10],
    pub timers: [[Slot; 8]; 8],
    pub requested: Vec<(Setting, String)>,
    pub timer_writes: Vec<(u8, u8, &'static str, String)>,
}

impl TestValve {
    pub fn new() -> Self {
        Self {
            readings: Default::default(),
            timers: Default::default(),
            requested: Vec::new(),
            timer_writes: Vec::new(),
        }
    }

    /// A valve with every reading and timer slot known and unpublished.
    pub fn populated() -> Self {
        let mut valve = Self::new();
        for (i, value) in valve.readings.iter_mut().enumerate() {
            *value = Value::known(&format!("{}", i * 10));
        }
        for (day, slots) in valve.timers.iter_mut().enumerate() {
            for (slot, entry) in slots.iter_mut().enumerate() {
                *entry = Slot {
                    mode: format!("{}", slot % 2),
                    time: format!("{:02}:{:02}", day + 6, slot * 5),
                    known: true,
                    published: false,
                };
            }
        }
        valve
    }

    pub fn value(&self, reading: Reading) -> &Value {
        let index = Reading::ORDER.iter().position(|r| *r == reading).unwrap();
        &self.readings[index]
    }

    pub fn value_mut(&mut self, reading: Reading) -> &mut Value {
        let index = Reading::ORDER.iter().position(|r| *r == reading).unwrap();
        &mut self.readings[index]
    }
}

fn decimal(text: &[u8]) -> Result<String, InvalidValue> {
    let text = core::str::from_utf8(text).map_err(|_| InvalidValue)?;
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return Err(InvalidValue);
    }
    Ok(text.into())
}

impl Valve for TestValve {
    fn reading(&mut self, reading: Reading) -> Option<&mut dyn CachedValue> {
        Some(self.value_mut(reading))
    }

    fn timer(&mut self, day: u8, slot: u8) -> Option<&mut dyn TimerEntry> {
        self.timers
            .get_mut(day as usize)?
            .get_mut(slot as usize)
            .map(|s| s as &mut dyn TimerEntry)
    }

    fn set_requested(&mut self, setting: Setting, text: &[u8]) -> Result<(), InvalidValue> {
        let text = decimal(text)?;
        self.requested.push((setting, text));
        Ok(())
    }

    fn set_timer_mode(&mut self, day: u8, slot: u8, text: &[u8]) -> Result<(), InvalidValue> {
        let text = decimal(text)?;
        self.timer_writes.push((day, slot, "mode", text));
        Ok(())
    }

    fn set_timer_time(&mut self, day: u8, slot: u8, text: &[u8]) -> Result<(), InvalidValue> {
        let text = decimal(text)?;
        self.timer_writes.push((day, slot, "time", text));
        Ok(())
    }
}

/// 32 addresses with `DAYS` timer days per valve.
pub struct Valves<const DAYS: u8> {
    pub valves: Vec<Option<TestValve>>,
}

impl<const DAYS: u8> Valves<DAYS> {
    pub fn empty() -> Self {
        Self {
            valves: vec![None; 32],
        }
    }

    pub fn with(addresses: &[u8]) -> Self {
        let mut fleet = Self::empty();
        for &address in addresses {
            fleet.valves[address as usize] = Some(TestValve::populated());
        }
        fleet
    }

    pub fn valve(&self, address: u8) -> &TestValve {
        self.valves[address as usize].as_ref().unwrap()
    }
}

impl<const DAYS: u8> ValveModel for Valves<DAYS> {
    type Valve = TestValve;

    const TIMER_DAYS: u8 = DAYS;

    fn valve_mut(&mut self, address: u8) -> Option<&mut TestValve> {
        self.valves.get_mut(address as usize)?.as_mut()
    }
}

/// The usual fleet: a full week plus the extra timer day.
pub type Fleet = Valves<8>;
