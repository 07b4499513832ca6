use embedded_hal::digital::ErrorKind;

/// Possible errors from the DHT22 driver.
///
/// Protocol failures (bad checksum, short or missing messages) are not
/// errors: they are counted by the [`ReadingStore`](crate::ReadingStore).
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// Error from the data line or the edge monitor.
    PinError(E),
    /// Error switching the sensor's power pin.
    Power(ErrorKind),
    /// Error switching the activity indicator.
    Indicator(ErrorKind),
    /// The previous reading cycle is still waiting for its watchdog.
    Busy,
    /// The driver was cancelled and no longer receives edges.
    Detached,
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for DhtError<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DhtError::PinError(e) => defmt::write!(fmt, "PinError({})", e),
            DhtError::Power(kind) => {
                defmt::write!(fmt, "Power({})", defmt::Debug2Format(kind))
            }
            DhtError::Indicator(kind) => {
                defmt::write!(fmt, "Indicator({})", defmt::Debug2Format(kind))
            }
            DhtError::Busy => defmt::write!(fmt, "Busy"),
            DhtError::Detached => defmt::write!(fmt, "Detached"),
        }
    }
}
