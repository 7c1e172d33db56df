//! # Error Types
//!
//! Errors produced while parsing or composing topics and while dispatching
//! inbound commands to the valve model. None of them is fatal: the runtime logs
//! them and carries on with the next message or tick.

use core::fmt;

/// Failure to parse or compose a bus topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopicError {
    /// The configured prefix is empty.
    EmptyPrefix,
    /// The topic does not start with the configured prefix.
    PrefixMismatch,
    /// The topic ended before all mandatory segments were read.
    Truncated,
    /// A `/` was expected after a numeric segment.
    MissingSeparator,
    /// The address segment is not a number in `1..=31`.
    InvalidAddress,
    /// A day or slot segment holds no digits.
    MissingNumber,
    /// The attribute segment names no known topic.
    UnknownTopic,
    /// The trailing timer segment is neither `mode` nor `time`.
    UnknownTimerTopic,
    /// The path carries no wire name for its topic or timer topic.
    UnresolvedTopic,
    /// The output buffer cannot hold the composed topic.
    BufferTooSmall,
}

impl fmt::Display for TopicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicError::EmptyPrefix => write!(f, "empty topic prefix"),
            TopicError::PrefixMismatch => write!(f, "prefix mismatch"),
            TopicError::Truncated => write!(f, "topic truncated"),
            TopicError::MissingSeparator => write!(f, "missing separator"),
            TopicError::InvalidAddress => write!(f, "invalid address"),
            TopicError::MissingNumber => write!(f, "missing number"),
            TopicError::UnknownTopic => write!(f, "unknown topic"),
            TopicError::UnknownTimerTopic => write!(f, "unknown timer topic"),
            TopicError::UnresolvedTopic => write!(f, "unresolved topic"),
            TopicError::BufferTooSmall => write!(f, "topic buffer too small"),
        }
    }
}

/// Returned by model setters when the payload text does not convert to the
/// attribute's type. The device state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidValue;

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value")
    }
}

/// Reasons an inbound command was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// The topic could not be parsed.
    Topic(TopicError),
    /// The topic lives under the status branch, not under `set`.
    NotSetter,
    /// No device is provisioned at this address.
    UnknownDevice(u8),
    /// Timer day beyond the model's configured days.
    DayOutOfRange(u8),
    /// Timer slot beyond the model's configured slots per day.
    SlotOutOfRange(u8),
    /// The topic is not writable.
    InvalidTopic,
    /// The setter rejected the payload. Carries the path's correlation code.
    InvalidValue(u16),
}

impl DispatchError {
    /// Diagnostic argument logged next to the error.
    ///
    /// Out-of-range errors tag the offending value so day and slot failures stay
    /// distinguishable in the log: `0x10 | day` and `0x20 | slot`.
    pub fn code(&self) -> u16 {
        match *self {
            DispatchError::UnknownDevice(addr) => addr as u16,
            DispatchError::DayOutOfRange(day) => 0x10 | day as u16,
            DispatchError::SlotOutOfRange(slot) => 0x20 | slot as u16,
            DispatchError::InvalidValue(hint) => hint,
            _ => 0,
        }
    }
}

impl From<TopicError> for DispatchError {
    fn from(err: TopicError) -> Self {
        DispatchError::Topic(err)
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Topic(err) => write!(f, "invalid topic: {}", err),
            DispatchError::NotSetter => write!(f, "not a set topic"),
            DispatchError::UnknownDevice(addr) => write!(f, "unknown device {}", addr),
            DispatchError::DayOutOfRange(day) => write!(f, "timer day {} out of range", day),
            DispatchError::SlotOutOfRange(slot) => {
                write!(f, "timer slot {} out of range", slot)
            }
            DispatchError::InvalidTopic => write!(f, "topic not writable"),
            DispatchError::InvalidValue(hint) => write!(f, "invalid topic value ({})", hint),
        }
    }
}
