//! Interrupt-driven DHT22 Sensor Driver for Embedded Rust
//!
//! This crate decodes the single-wire, pulse-width encoded protocol of the
//! DHT22 (AM2302) temperature and humidity sensor from a stream of
//! time-stamped edge notifications, instead of busy-waiting on the pin.
//!
//! A reading cycle works like this:
//! 1. [`Dht22::trigger`] pulls the line low for 17 ms, releases it to the
//!    sensor and arms a 200 ms watchdog.
//! 2. The platform's GPIO interrupt feeds every edge and the watchdog
//!    expiry to [`Dht22::handle`]. Pulse widths are classified into bits
//!    and assembled into a 40-bit frame.
//! 3. A frame with a valid checksum is published to the [`ReadingStore`].
//!    Bad checksums, short and missing messages only bump counters, and a
//!    sensor that stays silent is power-cycled.
//!
//! # Features
//! - `no_std`, allocation-free notification handling
//! - [`ReadingStore`] shared between interrupt and thread mode through
//!   `critical-section`
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`OutputPin`] for the data line, supply switch and indicator
//! - [`DelayNs`] for the start signal and power-cycle waits
//!
//! Edge delivery and the watchdog are platform specific and come in
//! through [`EdgeMonitor`].
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and logs cycle outcomes
//!
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod dht22;
pub mod error;
pub mod frame;
pub mod gpio;
pub mod policy;
pub mod pulse;
pub mod reading;
pub mod store;

pub use config::Config;
pub use dht22::{Dht22, Outcome, PowerControl};
pub use error::DhtError;
pub use gpio::{Clock, DataLine, Edge, EdgeMonitor, Event, NoPin};
pub use reading::Reading;
pub use store::{Counters, ReadingStore, Snapshot};
