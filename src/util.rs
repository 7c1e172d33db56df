//! # Topic Scanning and Writing Utilities
//!
//! Helpers for walking a `/`-delimited topic in place and for appending topic
//! segments to fixed-capacity buffers. Scanning never copies: a [`Token`] is an
//! `(offset, len)` view into the caller's slice, and every access is bounds
//! checked through `get`.

use core::fmt::Write;

use heapless::String;

use crate::error::TopicError;

/// Topic level separator.
pub const SEPARATOR: u8 = b'/';

/// A segment of a topic, located by offset and length in the scanned slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Index of the first byte.
    pub offset: usize,
    /// Length in bytes, zero for an empty segment.
    pub len: usize,
}

impl Token {
    /// Offset one past the last byte of the token.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// The bytes of the token within `buf`.
    pub fn bytes<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        buf.get(self.offset..self.end()).unwrap_or(&[])
    }

    /// True if the token's bytes equal `other`.
    pub fn matches(&self, buf: &[u8], other: &[u8]) -> bool {
        self.bytes(buf) == other
    }
}

/// Reads the token starting at `at`, up to the next separator or the end of `buf`.
pub fn read_token(buf: &[u8], at: usize) -> Token {
    let rest = buf.get(at..).unwrap_or(&[]);
    let len = rest
        .iter()
        .position(|&b| b == SEPARATOR)
        .unwrap_or(rest.len());
    Token { offset: at, len }
}

/// Steps over the separator at `at`.
///
/// Returns `None` if there is no separator at `at` or nothing follows it.
pub fn skip_separator(buf: &[u8], at: usize) -> Option<usize> {
    match buf.get(at) {
        Some(&SEPARATOR) if at + 1 < buf.len() => Some(at + 1),
        _ => None,
    }
}

/// Steps over a single leading separator, if present.
pub fn skip_leading_separator(buf: &[u8]) -> Option<usize> {
    match buf.first() {
        Some(&SEPARATOR) => skip_separator(buf, 0),
        Some(_) => Some(0),
        None => None,
    }
}

/// Moves past `token` and the separator that follows it.
pub fn skip_token(buf: &[u8], token: Token) -> Option<usize> {
    skip_separator(buf, token.end())
}

/// Reads an unsigned decimal number at `*cursor`, advancing the cursor.
///
/// At most `max_len` bytes are considered and reading stops at the first
/// non-digit. Values that do not fit `u8` saturate. Returns `None` when no digit
/// was read.
pub fn read_decimal(buf: &[u8], cursor: &mut usize, max_len: usize) -> Option<u8> {
    let mut value: u8 = 0;
    let mut digits = 0;
    while digits < max_len {
        match buf.get(*cursor) {
            Some(&b) if b.is_ascii_digit() => {
                value = value.saturating_mul(10).saturating_add(b - b'0');
                *cursor += 1;
                digits += 1;
            }
            _ => break,
        }
    }
    (digits > 0).then_some(value)
}

/// Appends `s` to `out`.
pub fn write_str<const N: usize>(out: &mut String<N>, s: &str) -> Result<(), TopicError> {
    out.push_str(s).map_err(|_| TopicError::BufferTooSmall)
}

/// Appends a single separator to `out`.
pub fn write_separator<const N: usize>(out: &mut String<N>) -> Result<(), TopicError> {
    out.push(SEPARATOR as char)
        .map_err(|_| TopicError::BufferTooSmall)
}

/// Appends `value` in decimal to `out`.
pub fn write_decimal<const N: usize>(out: &mut String<N>, value: u8) -> Result<(), TopicError> {
    write!(out, "{}", value).map_err(|_| TopicError::BufferTooSmall)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_stop_at_separator() {
        let buf = b"hr20/12/mode";
        let t = read_token(buf, 0);
        assert_eq!(t, Token { offset: 0, len: 4 });
        assert!(t.matches(buf, b"hr20"));
        let next = skip_token(buf, t).unwrap();
        assert_eq!(read_token(buf, next).bytes(buf), b"12");
    }

    #[test]
    fn last_token_runs_to_end() {
        let buf = b"a/mode";
        let t = read_token(buf, 2);
        assert_eq!(t.bytes(buf), b"mode");
        assert_eq!(skip_token(buf, t), None);
    }

    #[test]
    fn trailing_separator_yields_nothing() {
        assert_eq!(skip_separator(b"abc/", 3), None);
        assert_eq!(skip_separator(b"abc/d", 3), Some(4));
        assert_eq!(skip_separator(b"abc", 1), None);
    }

    #[test]
    fn leading_separator_is_optional() {
        assert_eq!(skip_leading_separator(b"/x"), Some(1));
        assert_eq!(skip_leading_separator(b"x"), Some(0));
        assert_eq!(skip_leading_separator(b"/"), None);
        assert_eq!(skip_leading_separator(b""), None);
    }

    #[test]
    fn decimal_stops_at_non_digit() {
        let buf = b"42x";
        let mut cursor = 0;
        assert_eq!(read_decimal(buf, &mut cursor, 3), Some(42));
        assert_eq!(cursor, 2);
    }

    #[test]
    fn decimal_honours_length_bound() {
        let buf = b"1234";
        let mut cursor = 0;
        assert_eq!(read_decimal(buf, &mut cursor, 2), Some(12));
        assert_eq!(cursor, 2);
    }

    #[test]
    fn decimal_requires_a_digit_and_saturates() {
        let mut cursor = 0;
        assert_eq!(read_decimal(b"/5", &mut cursor, 2), None);
        assert_eq!(cursor, 0);
        assert_eq!(read_decimal(b"999", &mut cursor, 3), Some(u8::MAX));
    }

    #[test]
    fn writers_report_overflow() {
        let mut out: String<4> = String::new();
        write_str(&mut out, "ab").unwrap();
        write_separator(&mut out).unwrap();
        assert_eq!(write_decimal(&mut out, 12), Err(TopicError::BufferTooSmall));
    }
}
