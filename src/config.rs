/// Timing of the trigger and recovery path.
///
/// The defaults follow the sensor's datasheet and a conservative power-cycle
/// schedule. Readings taken more often than about every two seconds
/// eventually hang the sensor; pace [`trigger`](crate::Dht22::trigger)
/// calls accordingly.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// How long the host holds the line low to request a reading.
    pub start_hold_ms: u32,
    /// Watchdog armed after releasing the line.
    pub watchdog_ms: u32,
    /// Consecutive missing messages tolerated before power-cycling the sensor.
    pub max_no_response: u8,
    /// Minimum time the sensor stays unpowered during a power cycle.
    pub power_off_ms: u32,
    /// Time the sensor is given to boot after power returns.
    pub power_settle_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            start_hold_ms: 17,
            watchdog_ms: 200,
            max_no_response: 2,
            power_off_ms: 2_000,
            power_settle_ms: 2_000,
        }
    }
}
