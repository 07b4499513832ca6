//! Interfaces of the GPIO subsystem the decoder is driven by.
//!
//! The decoder never touches hardware registers itself. The platform
//! delivers edge and watchdog notifications as [`Event`]s and provides the
//! line, monitor and clock through the traits below.

use core::convert::Infallible;
use core::time::Duration;

use embedded_hal::digital::{ErrorType, OutputPin};

/// Direction of a level change on the data line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Low to high.
    Rising,
    /// High to low.
    Falling,
}

/// A notification for the monitored line, delivered in arrival order.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// The line changed level.
    Edge {
        /// Which way the line moved.
        edge: Edge,
        /// Monotonic timestamp in microseconds, wrapping at `2^32`.
        tick: u32,
    },
    /// The watchdog expired without an edge.
    Timeout,
}

impl Event {
    /// A rising edge seen at `tick`.
    pub const fn rising(tick: u32) -> Self {
        Event::Edge {
            edge: Edge::Rising,
            tick,
        }
    }

    /// A falling edge seen at `tick`.
    pub const fn falling(tick: u32) -> Self {
        Event::Edge {
            edge: Edge::Falling,
            tick,
        }
    }
}

/// The sensor's data line.
///
/// Driving it low starts a transmission; releasing it hands the line to
/// the sensor. The defaults suit an open-drain pin with an external
/// pull-up, where releasing is the same as setting the output high.
pub trait DataLine: OutputPin {
    /// Switches the line to input so the sensor can drive it.
    fn release(&mut self) -> Result<(), Self::Error> {
        self.set_high()
    }

    /// Disables internal pull-up and pull-down resistors.
    fn disable_pull(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Edge subscription and watchdog for one line.
///
/// `unsubscribe` and `disarm_watchdog` must be safe to call when nothing
/// is registered or armed.
pub trait EdgeMonitor: ErrorType {
    /// Starts delivering rising and falling edges for the line.
    fn subscribe(&mut self) -> Result<(), Self::Error>;

    /// Stops delivering edges. No notification may arrive afterwards.
    fn unsubscribe(&mut self);

    /// Fires [`Event::Timeout`] if no edge occurs within `timeout_ms`.
    fn arm_watchdog(&mut self, timeout_ms: u32) -> Result<(), Self::Error>;

    /// Cancels a pending watchdog.
    fn disarm_watchdog(&mut self);
}

/// Monotonic time source used to stamp validated readings.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed point, usually boot.
    fn now(&self) -> Duration;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Duration {
        T::now(self)
    }
}

/// Stand-in for an optional power or indicator pin that is not wired.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
