//! # Valve Model Interface
//!
//! The bridge does not own device state. The application's valve model exposes
//! each controller through the traits below: readings with a "published" flag,
//! timer slots, and setters that take raw payload text.
//!
//! Rendering values as text is the model's business; the bridge hands out a
//! fixed-capacity [`Payload`] buffer and publishes whatever ends up in it.

use heapless::String;

use crate::error::InvalidValue;
use crate::topic::Topic;

/// Maximum length of a published payload, large enough for the state document.
pub const MAX_PAYLOAD_LEN: usize = 160;

/// Buffer receiving a formatted value.
pub type Payload = String<MAX_PAYLOAD_LEN>;

/// Attributes published by the frequent walk, in walk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Operating mode, manual or automatic.
    Mode,
    /// Keypad lock.
    Lock,
    /// Open-window detection.
    Window,
    /// Measured room temperature.
    AverageTemp,
    /// Battery voltage.
    Battery,
    /// Target temperature.
    RequestedTemp,
    /// Valve position the controller aims for.
    ValveWanted,
    /// Device error flags.
    Error,
    /// Time the device was last heard from.
    LastSeen,
    /// Composite status document.
    State,
}

impl Reading {
    /// Walk order. The state document is only walked when enabled.
    pub const ORDER: [Reading; 10] = [
        Reading::Mode,
        Reading::Lock,
        Reading::Window,
        Reading::AverageTemp,
        Reading::Battery,
        Reading::RequestedTemp,
        Reading::ValveWanted,
        Reading::Error,
        Reading::LastSeen,
        Reading::State,
    ];

    /// Topic the reading is published under.
    pub fn topic(self) -> Topic {
        match self {
            Reading::Mode => Topic::Mode,
            Reading::Lock => Topic::Lock,
            Reading::Window => Topic::Window,
            Reading::AverageTemp => Topic::AverageTemp,
            Reading::Battery => Topic::Battery,
            Reading::RequestedTemp => Topic::RequestedTemp,
            Reading::ValveWanted => Topic::ValveWanted,
            Reading::Error => Topic::Error,
            Reading::LastSeen => Topic::LastSeen,
            Reading::State => Topic::State,
        }
    }
}

/// Attributes writable through the `set` branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Setting {
    /// Target temperature.
    RequestedTemp,
    /// Operating mode.
    Mode,
    /// Keypad lock.
    Lock,
}

impl Setting {
    /// The setting written through `topic`, if it is writable.
    pub fn from_topic(topic: Topic) -> Option<Setting> {
        match topic {
            Topic::RequestedTemp => Some(Setting::RequestedTemp),
            Topic::Mode => Some(Setting::Mode),
            Topic::Lock => Some(Setting::Lock),
            _ => None,
        }
    }
}

/// A locally cached device value.
pub trait CachedValue {
    /// True once the current value went out on the bus.
    fn is_published(&self) -> bool;

    /// Records that the current value went out.
    fn mark_published(&mut self);

    /// True if the value was received from the device.
    fn is_known(&self) -> bool;

    /// Renders the value as payload text.
    fn format(&self, out: &mut Payload) -> core::fmt::Result;
}

/// One timer slot of a device schedule.
pub trait TimerEntry {
    /// True once mode and time of the slot went out.
    fn is_published(&self) -> bool;

    /// Records that the slot went out.
    fn mark_published(&mut self);

    /// True if the slot was read from the device.
    fn is_known(&self) -> bool;

    /// Renders the slot's mode.
    fn format_mode(&self, out: &mut Payload) -> core::fmt::Result;

    /// Renders the slot's switching time.
    fn format_time(&self, out: &mut Payload) -> core::fmt::Result;
}

/// A single radiator-valve controller.
pub trait Valve {
    /// Cached value for `reading`, or `None` if this device does not provide it.
    fn reading(&mut self, reading: Reading) -> Option<&mut dyn CachedValue>;

    /// Timer slot `slot` of day `day`.
    fn timer(&mut self, day: u8, slot: u8) -> Option<&mut dyn TimerEntry>;

    /// Stores a requested value parsed from `text`.
    fn set_requested(&mut self, setting: Setting, text: &[u8]) -> Result<(), InvalidValue>;

    /// Stores the mode of a timer slot parsed from `text`.
    fn set_timer_mode(&mut self, day: u8, slot: u8, text: &[u8]) -> Result<(), InvalidValue>;

    /// Stores the switching time of a timer slot parsed from `text`.
    fn set_timer_time(&mut self, day: u8, slot: u8, text: &[u8]) -> Result<(), InvalidValue>;
}

/// The fleet of valves, looked up by bus address.
pub trait ValveModel {
    /// The device type.
    type Valve: Valve;

    /// Number of timer days a device schedule holds.
    const TIMER_DAYS: u8 = 8;

    /// Number of timer slots per day.
    const TIMER_SLOTS: u8 = 8;

    /// The device at `address`, if provisioned.
    fn valve_mut(&mut self, address: u8) -> Option<&mut Self::Valve>;
}
