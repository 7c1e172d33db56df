//! Logging shims.
//!
//! Forwards to `defmt` when the `defmt` feature is enabled, otherwise to `log`
//! when the `log` feature is enabled. Without either feature the macros expand
//! to nothing but still consume their arguments.
#![macro_use]
#![allow(unused_macros)]

#[cfg(feature = "defmt")]
macro_rules! trace { ($($arg:tt)*) => { ::defmt::trace!($($arg)*) }; }
#[cfg(feature = "defmt")]
macro_rules! debug { ($($arg:tt)*) => { ::defmt::debug!($($arg)*) }; }
#[cfg(feature = "defmt")]
macro_rules! info { ($($arg:tt)*) => { ::defmt::info!($($arg)*) }; }
#[cfg(feature = "defmt")]
macro_rules! warn { ($($arg:tt)*) => { ::defmt::warn!($($arg)*) }; }
#[cfg(feature = "defmt")]
macro_rules! error { ($($arg:tt)*) => { ::defmt::error!($($arg)*) }; }

#[cfg(all(not(feature = "defmt"), feature = "log"))]
macro_rules! trace { ($($arg:tt)*) => { ::log::trace!($($arg)*) }; }
#[cfg(all(not(feature = "defmt"), feature = "log"))]
macro_rules! debug { ($($arg:tt)*) => { ::log::debug!($($arg)*) }; }
#[cfg(all(not(feature = "defmt"), feature = "log"))]
macro_rules! info { ($($arg:tt)*) => { ::log::info!($($arg)*) }; }
#[cfg(all(not(feature = "defmt"), feature = "log"))]
macro_rules! warn { ($($arg:tt)*) => { ::log::warn!($($arg)*) }; }
#[cfg(all(not(feature = "defmt"), feature = "log"))]
macro_rules! error { ($($arg:tt)*) => { ::log::error!($($arg)*) }; }

#[cfg(all(not(feature = "defmt"), not(feature = "log")))]
macro_rules! trace { ($($arg:tt)*) => { { let _ = ($($arg)*,); } }; }
#[cfg(all(not(feature = "defmt"), not(feature = "log")))]
macro_rules! debug { ($($arg:tt)*) => { { let _ = ($($arg)*,); } }; }
#[cfg(all(not(feature = "defmt"), not(feature = "log")))]
macro_rules! info { ($($arg:tt)*) => { { let _ = ($($arg)*,); } }; }
#[cfg(all(not(feature = "defmt"), not(feature = "log")))]
macro_rules! warn { ($($arg:tt)*) => { { let _ = ($($arg)*,); } }; }
#[cfg(all(not(feature = "defmt"), not(feature = "log")))]
macro_rules! error { ($($arg:tt)*) => { { let _ = ($($arg)*,); } }; }
