use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, OutputPin},
};

use crate::config::Config;
use crate::error::DhtError;
use crate::frame::{Frame, FrameAssembler, Step};
use crate::gpio::{Clock, DataLine, EdgeMonitor, Event, NoPin};
use crate::policy::{RecoveryPolicy, Verdict};
use crate::reading::{ChecksumMismatch, Reading};
use crate::store::{Fault, ReadingStore};

/// Optional pins around the sensor: a supply switch used to power-cycle a
/// hung sensor, and an indicator lit while a reading is in flight.
#[derive(Debug)]
pub struct PowerControl<PWR = NoPin, LED = NoPin> {
    /// Drives the sensor's power. High means powered.
    pub supply: PWR,
    /// Lit from trigger until the cycle ends.
    pub indicator: LED,
}

impl PowerControl {
    /// Neither pin is wired.
    pub const fn none() -> Self {
        PowerControl {
            supply: NoPin,
            indicator: NoPin,
        }
    }
}

impl<PWR, LED> PowerControl<PWR, LED> {
    /// Wraps a supply switch and an indicator.
    pub const fn new(supply: PWR, indicator: LED) -> Self {
        PowerControl { supply, indicator }
    }
}

/// How a reading cycle ended, as seen by [`Dht22::handle`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    /// A frame validated and was published to the store.
    Reading(Reading),
    /// A frame completed but its checksum did not match.
    BadChecksum(ChecksumMismatch),
    /// The watchdog fired part way through a frame.
    ShortMessage,
    /// The watchdog fired with almost nothing received.
    MissingMessage {
        /// The sensor was switched off and will be powered back on by the next trigger.
        power_cycle: bool,
    },
    /// The watchdog fired after the frame was already complete.
    Received,
}

/// Interrupt-driven driver for the DHT22 temperature and humidity sensor.
///
/// Instead of busy-waiting on the data line, the driver consumes the edge
/// and watchdog notifications of the platform's GPIO subsystem through
/// [`handle`](Self::handle). The caller delivers them in arrival order and
/// serialises them with [`trigger`](Self::trigger).
///
/// `trigger` blocks for the 17 ms start signal, and for several seconds
/// while power is being restored. Do not call it inside a critical section
/// on a single-core target: with interrupts masked, the release and
/// response edges are delivered late and their widths are misread. Share
/// the driver through a lock that leaves the GPIO interrupt enabled, or
/// only take a `critical_section::Mutex` around `handle`.
pub struct Dht22<'a, LINE, MON, D, CLK, PWR = NoPin, LED = NoPin>
where
    LINE: DataLine,
    MON: EdgeMonitor,
    D: DelayNs,
    CLK: Clock,
    PWR: OutputPin,
    LED: OutputPin,
{
    line: LINE,
    monitor: MON,
    delay: D,
    clock: CLK,
    power: PowerControl<PWR, LED>,
    store: &'a ReadingStore,
    config: Config,
    assembler: FrameAssembler,
    policy: RecoveryPolicy,
    armed: bool,
    attached: bool,
    power_cycle_pending: bool,
}

impl<'a, LINE, MON, D, CLK, PWR, LED, E> Dht22<'a, LINE, MON, D, CLK, PWR, LED>
where
    LINE: DataLine<Error = E>,
    MON: EdgeMonitor<Error = E>,
    D: DelayNs,
    CLK: Clock,
    PWR: OutputPin,
    LED: OutputPin,
{
    /// Creates the driver and subscribes to the line's edges.
    ///
    /// # Arguments
    ///
    /// * `line` - The GPIO pin connected to the DHT22 data line.
    /// * `monitor` - Edge subscription and watchdog for that pin.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `clock` - Time source used to stamp readings.
    /// * `power` - Optional supply switch and indicator, see [`PowerControl::none`].
    /// * `store` - Where readings and counters are published.
    /// * `config` - Trigger and recovery timing.
    ///
    /// # Errors
    ///
    /// Returns an error if the pulls cannot be disabled, the sensor cannot
    /// be powered, or the edge subscription fails.
    pub fn new(
        line: LINE,
        monitor: MON,
        delay: D,
        clock: CLK,
        power: PowerControl<PWR, LED>,
        store: &'a ReadingStore,
        config: Config,
    ) -> Result<Self, DhtError<E>> {
        let mut dht = Dht22 {
            line,
            monitor,
            delay,
            clock,
            power,
            store,
            config,
            assembler: FrameAssembler::new(),
            policy: RecoveryPolicy::new(config.max_no_response),
            armed: false,
            attached: false,
            power_cycle_pending: false,
        };
        dht.attach()?;
        Ok(dht)
    }

    fn attach(&mut self) -> Result<(), DhtError<E>> {
        self.line.disable_pull()?;
        // Kill any watchdog left over from a previous owner of the pin.
        self.monitor.disarm_watchdog();
        self.power
            .supply
            .set_high()
            .map_err(|e| DhtError::Power(e.kind()))?;
        self.monitor.subscribe()?;
        self.attached = true;
        Ok(())
    }

    /// Starts one reading cycle.
    ///
    /// Holds the line low for [`Config::start_hold_ms`], blocking the
    /// caller, then releases it to the sensor and arms the watchdog. The
    /// result arrives later through [`handle`](Self::handle) and the store.
    ///
    /// If the previous cycle switched the sensor off, power is restored
    /// first, which blocks for [`Config::power_off_ms`] plus
    /// [`Config::power_settle_ms`].
    ///
    /// # Errors
    ///
    /// * `DhtError::Busy` if the previous cycle has not ended yet.
    /// * `DhtError::Detached` after [`cancel`](Self::cancel).
    /// * Any pin or monitor error.
    pub fn trigger(&mut self) -> Result<(), DhtError<E>> {
        if !self.attached {
            return Err(DhtError::Detached);
        }
        if self.armed {
            return Err(DhtError::Busy);
        }
        if self.power_cycle_pending {
            self.restore_power()?;
        }

        if let Err(e) = self.send_start_signal() {
            // Never leave the sensor stuck in a start request.
            if self.line.release().is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("failed to release data line");
            }
            self.indicator_off();
            return Err(e);
        }
        self.armed = true;
        Ok(())
    }

    fn send_start_signal(&mut self) -> Result<(), DhtError<E>> {
        self.power
            .indicator
            .set_high()
            .map_err(|e| DhtError::Indicator(e.kind()))?;

        // MCU sends start request
        self.line.set_low()?;
        self.delay.delay_ms(self.config.start_hold_ms);
        self.line.release()?;

        self.monitor.arm_watchdog(self.config.watchdog_ms)?;
        Ok(())
    }

    fn restore_power(&mut self) -> Result<(), DhtError<E>> {
        #[cfg(feature = "defmt")]
        defmt::info!("restoring sensor power");

        self.delay.delay_ms(self.config.power_off_ms);
        self.power
            .supply
            .set_high()
            .map_err(|e| DhtError::Power(e.kind()))?;
        self.delay.delay_ms(self.config.power_settle_ms);
        self.power_cycle_pending = false;
        Ok(())
    }

    /// Processes one edge or watchdog notification.
    ///
    /// Never blocks or allocates. Returns how the cycle ended when this
    /// event ended it, `None` otherwise or after [`cancel`](Self::cancel).
    pub fn handle(&mut self, event: Event) -> Option<Outcome> {
        if !self.attached {
            return None;
        }

        match self.assembler.step(event) {
            Step::Pending => None,
            Step::Complete(frame) => {
                self.end_cycle();
                self.policy.on_frame();
                Some(self.validate(&frame))
            }
            Step::Stalled(position) => {
                self.end_cycle();
                Some(self.recover(position))
            }
        }
    }

    fn end_cycle(&mut self) {
        self.monitor.disarm_watchdog();
        self.armed = false;
        self.indicator_off();
    }

    fn validate(&mut self, frame: &Frame) -> Outcome {
        match Reading::from_frame(frame) {
            Ok(reading) => {
                self.store.publish(reading, self.clock.now());
                #[cfg(feature = "defmt")]
                defmt::debug!("reading: {}", reading);
                Outcome::Reading(reading)
            }
            Err(mismatch) => {
                self.store.record(Fault::BadChecksum);
                #[cfg(feature = "defmt")]
                defmt::warn!("bad checksum: {}", mismatch);
                Outcome::BadChecksum(mismatch)
            }
        }
    }

    fn recover(&mut self, position: i8) -> Outcome {
        match self.policy.on_timeout(position) {
            Verdict::MissingMessage { power_cycle } => {
                self.store.record(Fault::MissingMessage);
                #[cfg(feature = "defmt")]
                defmt::warn!("missing message, no-response streak {}", self.policy.streak());
                if power_cycle {
                    self.switch_off();
                }
                Outcome::MissingMessage { power_cycle }
            }
            Verdict::ShortMessage => {
                self.store.record(Fault::ShortMessage);
                #[cfg(feature = "defmt")]
                defmt::warn!("short message, {} bits", position);
                Outcome::ShortMessage
            }
            Verdict::Received => Outcome::Received,
        }
    }

    fn switch_off(&mut self) {
        self.store.record(Fault::SensorReset);
        self.power_cycle_pending = true;
        #[cfg(feature = "defmt")]
        defmt::warn!("sensor not responding, power cycling");
        if self.power.supply.set_low().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("failed to switch sensor power off");
        }
    }

    /// Time since the latest valid reading, `None` if there never was one.
    pub fn staleness(&self) -> Option<core::time::Duration> {
        self.store.staleness(self.clock.now())
    }
}

impl<'a, LINE, MON, D, CLK, PWR, LED> Dht22<'a, LINE, MON, D, CLK, PWR, LED>
where
    LINE: DataLine,
    MON: EdgeMonitor,
    D: DelayNs,
    CLK: Clock,
    PWR: OutputPin,
    LED: OutputPin,
{
    /// The store this driver publishes to.
    pub fn store(&self) -> &'a ReadingStore {
        self.store
    }

    /// Returns `true` while a cycle's watchdog is armed.
    pub fn is_busy(&self) -> bool {
        self.armed
    }

    /// Disarms the watchdog and drops the edge subscription.
    ///
    /// Safe to call any number of times. Also runs on drop.
    pub fn cancel(&mut self) {
        if self.armed {
            self.monitor.disarm_watchdog();
            self.armed = false;
            self.indicator_off();
        }
        if self.attached {
            self.monitor.unsubscribe();
            self.attached = false;
        }
    }

    fn indicator_off(&mut self) {
        if self.power.indicator.set_low().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("failed to switch indicator off");
        }
    }
}

impl<LINE, MON, D, CLK, PWR, LED> Drop for Dht22<'_, LINE, MON, D, CLK, PWR, LED>
where
    LINE: DataLine,
    MON: EdgeMonitor,
    D: DelayNs,
    CLK: Clock,
    PWR: OutputPin,
    LED: OutputPin,
{
    fn drop(&mut self) {
        self.cancel();
    }
}
