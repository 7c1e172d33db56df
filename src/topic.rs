//! # Topic Path Codec
//!
//! Maps bus topics to structured [`Path`]s and back:
//!
//! ```text
//! <prefix>/[set/]<address>/<topic>[/<day>/<slot>/<mode|time>]
//! ```
//!
//! The status branch lives directly under the prefix; inbound commands use the
//! `set` sub-tree with the same suffix grammar. Each topic name starts with a
//! distinct letter, so the parser dispatches on the leading byte before
//! comparing the whole segment.
//!
//! Parsing works on `(offset, len)` tokens over the input slice and composing
//! writes into caller-supplied `heapless::String` buffers, so the codec never
//! allocates.

use heapless::String;

use crate::error::TopicError;
use crate::util::{
    SEPARATOR, read_decimal, read_token, skip_leading_separator, skip_token, write_decimal,
    write_separator, write_str,
};

/// Maximum length of a composed topic.
pub const MAX_TOPIC_LEN: usize = 128;

/// Buffer large enough for any composed topic.
pub type TopicBuf = String<MAX_TOPIC_LEN>;

/// Highest device address. Addresses occupy five bits of [`Path::as_uint`].
pub const MAX_ADDRESS: u8 = 31;

/// Segment marking the inbound command sub-tree.
pub const SET_SEGMENT: &str = "set";

const WILDCARD: &str = "#";

/// Attribute addressed by a topic. Discriminants are part of the diagnostic code
/// returned by [`Path::as_uint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Topic {
    /// `average_temp`
    AverageTemp = 1,
    /// `battery`
    Battery = 2,
    /// `error`
    Error = 3,
    /// `lock`
    Lock = 4,
    /// `mode`
    Mode = 5,
    /// `requested_temp`
    RequestedTemp = 6,
    /// `valve_wanted`
    ValveWanted = 7,
    /// `window`
    Window = 8,
    /// `last_seen`
    LastSeen = 9,
    /// `timer`, followed by day, slot and sub-topic
    Timer = 10,
    /// `state`
    State = 11,
    /// Unknown segment.
    Invalid = 255,
}

impl Topic {
    /// Wire name of the topic segment.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Topic::AverageTemp => Some("average_temp"),
            Topic::Battery => Some("battery"),
            Topic::Error => Some("error"),
            Topic::Lock => Some("lock"),
            Topic::Mode => Some("mode"),
            Topic::RequestedTemp => Some("requested_temp"),
            Topic::ValveWanted => Some("valve_wanted"),
            Topic::Window => Some("window"),
            Topic::LastSeen => Some("last_seen"),
            Topic::Timer => Some("timer"),
            Topic::State => Some("state"),
            Topic::Invalid => None,
        }
    }

    /// Resolves a topic segment. The leading byte selects the candidates.
    pub fn from_segment(segment: &[u8]) -> Topic {
        let candidates: &[Topic] = match segment.first() {
            Some(b'a') => &[Topic::AverageTemp],
            Some(b'b') => &[Topic::Battery],
            Some(b'e') => &[Topic::Error],
            Some(b'l') => &[Topic::Lock, Topic::LastSeen],
            Some(b'm') => &[Topic::Mode],
            Some(b'r') => &[Topic::RequestedTemp],
            Some(b's') => &[Topic::State],
            Some(b't') => &[Topic::Timer],
            Some(b'v') => &[Topic::ValveWanted],
            Some(b'w') => &[Topic::Window],
            _ => &[],
        };
        candidates
            .iter()
            .copied()
            .find(|t| t.name().is_some_and(|n| n.as_bytes() == segment))
            .unwrap_or(Topic::Invalid)
    }
}

/// Sub-attribute of a timer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TimerTopic {
    /// Not a timer path.
    None = 0,
    /// `time`
    Time = 1,
    /// `mode`
    Mode = 2,
    /// Unknown segment.
    Invalid = 255,
}

impl TimerTopic {
    /// Wire name of the trailing timer segment.
    pub fn name(self) -> Option<&'static str> {
        match self {
            TimerTopic::Time => Some("time"),
            TimerTopic::Mode => Some("mode"),
            TimerTopic::None | TimerTopic::Invalid => None,
        }
    }

    /// Resolves the trailing timer segment.
    pub fn from_segment(segment: &[u8]) -> TimerTopic {
        match segment {
            b"time" => TimerTopic::Time,
            b"mode" => TimerTopic::Mode,
            _ => TimerTopic::Invalid,
        }
    }
}

/// Structured form of a topic.
///
/// `address == 0` marks an invalid path. `timer_topic`, `day` and `slot` only
/// carry meaning for [`Topic::Timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Path {
    /// Device address, `1..=31` when valid.
    pub address: u8,
    /// Attribute.
    pub topic: Topic,
    /// Timer sub-attribute.
    pub timer_topic: TimerTopic,
    /// Timer day.
    pub day: u8,
    /// Timer slot within the day.
    pub slot: u8,
    /// True under the `set` sub-tree.
    pub setter: bool,
}

impl Path {
    /// The result of every failed parse.
    pub const INVALID: Path = Path {
        address: 0,
        topic: Topic::Invalid,
        timer_topic: TimerTopic::None,
        day: 0,
        slot: 0,
        setter: false,
    };

    /// A status path for a non-timer attribute.
    pub const fn new(address: u8, topic: Topic) -> Self {
        Path {
            address,
            topic,
            ..Path::INVALID
        }
    }

    /// A status path for one timer slot.
    pub const fn timer(address: u8, day: u8, slot: u8, timer_topic: TimerTopic) -> Self {
        Path {
            address,
            topic: Topic::Timer,
            timer_topic,
            day,
            slot,
            setter: false,
        }
    }

    /// Moves the path into the `set` sub-tree.
    pub const fn into_setter(mut self) -> Self {
        self.setter = true;
        self
    }

    /// False for [`Path::INVALID`] and anything else with address 0.
    pub fn is_valid(&self) -> bool {
        self.address != 0
    }

    /// Compressed code for log correlation: address in bits 0..5, topic from
    /// bit 5, timer topic from bit 9. Timer day and slot are not included.
    pub fn as_uint(&self) -> u16 {
        let code = self.address as u32
            | (self.topic as u32) << 5
            | (self.timer_topic as u32) << 9;
        code as u16
    }
}

impl Default for Path {
    fn default() -> Self {
        Path::INVALID
    }
}

/// Parses and composes topics below a configured prefix.
#[derive(Debug, Clone, Copy)]
pub struct TopicCodec<'a> {
    prefix: &'a str,
}

impl<'a> TopicCodec<'a> {
    /// Creates a codec for `prefix`. A single trailing separator is dropped.
    pub fn new(prefix: &'a str) -> Result<Self, TopicError> {
        let prefix = prefix.strip_suffix(SEPARATOR as char).unwrap_or(prefix);
        let bare = prefix.strip_prefix(SEPARATOR as char).unwrap_or(prefix);
        if bare.is_empty() {
            return Err(TopicError::EmptyPrefix);
        }
        Ok(Self { prefix })
    }

    /// The prefix without its trailing separator.
    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    /// Writes `<prefix>/set/#` into `out`.
    pub fn compose_set_wildcard<'b, const N: usize>(
        &self,
        out: &'b mut String<N>,
    ) -> Result<&'b str, TopicError> {
        out.clear();
        write_str(out, self.prefix)?;
        write_separator(out)?;
        write_str(out, SET_SEGMENT)?;
        write_separator(out)?;
        write_str(out, WILDCARD)?;
        Ok(out.as_str())
    }

    /// Writes the topic for `path` into `out`.
    pub fn compose<'b, const N: usize>(
        &self,
        path: &Path,
        out: &'b mut String<N>,
    ) -> Result<&'b str, TopicError> {
        if path.topic == Topic::Timer {
            let sub = path.timer_topic.name().ok_or(TopicError::UnresolvedTopic)?;
            self.compose_timer_base(path, out)?;
            write_str(out, sub)?;
        } else {
            self.compose_head(path, out)?;
        }
        Ok(out.as_str())
    }

    /// Writes `<prefix>/[set/]<address>/timer/<day>/<slot>/` into `out`.
    ///
    /// The timer sub-topic is left for the caller to append, so the mode and
    /// time messages of one slot share a single composition.
    pub fn compose_timer_base<const N: usize>(
        &self,
        path: &Path,
        out: &mut String<N>,
    ) -> Result<usize, TopicError> {
        if path.topic != Topic::Timer {
            return Err(TopicError::UnresolvedTopic);
        }
        self.compose_head(path, out)?;
        write_separator(out)?;
        write_decimal(out, path.day)?;
        write_separator(out)?;
        write_decimal(out, path.slot)?;
        write_separator(out)?;
        Ok(out.len())
    }

    fn compose_head<const N: usize>(
        &self,
        path: &Path,
        out: &mut String<N>,
    ) -> Result<(), TopicError> {
        let name = path.topic.name().ok_or(TopicError::UnresolvedTopic)?;
        out.clear();
        write_str(out, self.prefix)?;
        write_separator(out)?;
        if path.setter {
            write_str(out, SET_SEGMENT)?;
            write_separator(out)?;
        }
        write_decimal(out, path.address)?;
        write_separator(out)?;
        write_str(out, name)
    }

    /// Parses `topic`, yielding [`Path::INVALID`] on any failure.
    pub fn parse(&self, topic: &str) -> Path {
        self.try_parse(topic).unwrap_or(Path::INVALID)
    }

    /// Parses `topic`, naming the step that failed.
    pub fn try_parse(&self, topic: &str) -> Result<Path, TopicError> {
        let buf = topic.as_bytes();
        let mut pos = self.skip_prefix(buf)?;

        let mut token = read_token(buf, pos);
        let mut setter = false;
        if token.matches(buf, SET_SEGMENT.as_bytes()) {
            setter = true;
            pos = skip_token(buf, token).ok_or(TopicError::Truncated)?;
            token = read_token(buf, pos);
        }

        let address = read_decimal(buf, &mut pos, token.len).unwrap_or(0);
        pos = expect_separator(buf, pos)?;
        if address == 0 || address > MAX_ADDRESS {
            return Err(TopicError::InvalidAddress);
        }

        let token = read_token(buf, pos);
        let topic = Topic::from_segment(token.bytes(buf));
        match topic {
            Topic::Invalid => Err(TopicError::UnknownTopic),
            Topic::Timer => {
                pos = expect_separator(buf, token.end())?;
                let day = read_number(buf, &mut pos)?;
                pos = expect_separator(buf, pos)?;
                let slot = read_number(buf, &mut pos)?;
                pos = expect_separator(buf, pos)?;

                let tail = buf.get(pos..).unwrap_or(&[]);
                match TimerTopic::from_segment(tail) {
                    TimerTopic::Invalid => Err(TopicError::UnknownTimerTopic),
                    timer_topic => Ok(Path {
                        address,
                        topic,
                        timer_topic,
                        day,
                        slot,
                        setter,
                    }),
                }
            }
            // a plain attribute must be the last segment
            _ if token.end() != buf.len() => Err(TopicError::UnknownTopic),
            _ => Ok(Path {
                setter,
                ..Path::new(address, topic)
            }),
        }
    }

    /// Consumes the prefix token by token, returning the offset just past it.
    fn skip_prefix(&self, buf: &[u8]) -> Result<usize, TopicError> {
        let prefix = self.prefix.as_bytes();
        let mut p = skip_leading_separator(buf);
        let mut pfx = skip_leading_separator(prefix);

        while let (Some(at), Some(pfx_at)) = (p, pfx) {
            let token = read_token(buf, at);
            let pfx_token = read_token(prefix, pfx_at);
            if token.bytes(buf) != pfx_token.bytes(prefix) {
                return Err(TopicError::PrefixMismatch);
            }
            p = skip_token(buf, token);
            pfx = skip_token(prefix, pfx_token);
        }

        match (p, pfx) {
            (_, Some(_)) => Err(TopicError::PrefixMismatch),
            (None, None) => Err(TopicError::Truncated),
            (Some(at), None) => Ok(at),
        }
    }
}

fn expect_separator(buf: &[u8], at: usize) -> Result<usize, TopicError> {
    match buf.get(at) {
        Some(&SEPARATOR) => Ok(at + 1),
        Some(_) => Err(TopicError::MissingSeparator),
        None => Err(TopicError::Truncated),
    }
}

fn read_number(buf: &[u8], pos: &mut usize) -> Result<u8, TopicError> {
    let token = read_token(buf, *pos);
    read_decimal(buf, pos, token.len).ok_or(TopicError::MissingNumber)
}
