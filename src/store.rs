//! The most recent valid reading and the decoder's error counters.
//!
//! A [`ReadingStore`] is written from the notification handler and read by
//! polling code, possibly on another core or in thread mode while an
//! interrupt fires. Every access goes through a critical section and
//! copies the whole [`Snapshot`], so a reader never pairs humidity from
//! one cycle with the temperature or timestamp of another.

use core::cell::Cell;
use core::time::Duration;

use critical_section::Mutex;

use crate::reading::Reading;

/// Cumulative failure counts. They only ever grow.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Frames that completed but failed validation.
    pub bad_checksum: u32,
    /// Timeouts after part of a frame was received.
    pub short_message: u32,
    /// Timeouts with almost nothing received.
    pub missing_message: u32,
    /// Power cycles triggered by repeated missing messages.
    pub sensor_resets: u32,
}

impl Counters {
    const ZERO: Counters = Counters {
        bad_checksum: 0,
        short_message: 0,
        missing_message: 0,
        sensor_resets: 0,
    };
}

/// A reading together with the time it was validated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedReading {
    /// The decoded values.
    pub reading: Reading,
    /// [`Clock`](crate::gpio::Clock) time at which the frame was validated.
    pub time_of_value: Duration,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimedReading {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "TimedReading(reading: {}, time_of_value: {=u64} ms)",
            self.reading,
            self.time_of_value.as_millis() as u64
        )
    }
}

/// Everything the store holds, copied out in one piece.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    /// Latest valid reading, `None` until the first frame validates.
    pub latest: Option<TimedReading>,
    /// Error counters.
    pub counters: Counters,
}

impl Snapshot {
    const EMPTY: Snapshot = Snapshot {
        latest: None,
        counters: Counters::ZERO,
    };

    /// Time since the latest valid reading, given the current clock time.
    pub fn staleness(&self, now: Duration) -> Option<Duration> {
        self.latest.map(|latest| now.saturating_sub(latest.time_of_value))
    }
}

/// Which counter a failed cycle bumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Fault {
    BadChecksum,
    ShortMessage,
    MissingMessage,
    SensorReset,
}

/// Shared, interrupt-safe holder of the latest reading and counters.
///
/// Usually placed in a `static`:
///
/// ```
/// use dht22_edge::ReadingStore;
///
/// static STORE: ReadingStore = ReadingStore::new();
///
/// assert_eq!(STORE.humidity(), None);
/// ```
pub struct ReadingStore {
    state: Mutex<Cell<Snapshot>>,
}

impl Default for ReadingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingStore {
    /// Creates an empty store.
    pub const fn new() -> Self {
        ReadingStore {
            state: Mutex::new(Cell::new(Snapshot::EMPTY)),
        }
    }

    /// Copies the whole state.
    pub fn snapshot(&self) -> Snapshot {
        critical_section::with(|cs| self.state.borrow(cs).get())
    }

    /// Latest relative humidity in percent.
    pub fn humidity(&self) -> Option<f32> {
        self.snapshot()
            .latest
            .map(|latest| latest.reading.relative_humidity)
    }

    /// Latest temperature in degrees Celsius.
    pub fn temperature(&self) -> Option<f32> {
        self.snapshot().latest.map(|latest| latest.reading.temperature)
    }

    /// Time since the latest valid reading, `None` if there never was one.
    pub fn staleness(&self, now: Duration) -> Option<Duration> {
        self.snapshot().staleness(now)
    }

    /// Error counters.
    pub fn counters(&self) -> Counters {
        self.snapshot().counters
    }

    /// Frames received with a bad checksum.
    pub fn bad_checksum(&self) -> u32 {
        self.counters().bad_checksum
    }

    /// Short messages received.
    pub fn short_message(&self) -> u32 {
        self.counters().short_message
    }

    /// Messages that never arrived.
    pub fn missing_message(&self) -> u32 {
        self.counters().missing_message
    }

    /// Power cycles because of sensor hangs.
    pub fn sensor_resets(&self) -> u32 {
        self.counters().sensor_resets
    }

    pub(crate) fn publish(&self, reading: Reading, time_of_value: Duration) {
        self.update(|snapshot| {
            snapshot.latest = Some(TimedReading {
                reading,
                time_of_value,
            });
        });
    }

    pub(crate) fn record(&self, fault: Fault) {
        self.update(|snapshot| {
            let counters = &mut snapshot.counters;
            let counter = match fault {
                Fault::BadChecksum => &mut counters.bad_checksum,
                Fault::ShortMessage => &mut counters.short_message,
                Fault::MissingMessage => &mut counters.missing_message,
                Fault::SensorReset => &mut counters.sensor_resets,
            };
            *counter = counter.saturating_add(1);
        });
    }

    fn update(&self, f: impl FnOnce(&mut Snapshot)) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut snapshot = cell.get();
            f(&mut snapshot);
            cell.set(snapshot);
        });
    }
}
