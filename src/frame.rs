use crate::gpio::{Edge, Event};
use crate::pulse::Pulse;

/// Bit position meaning "no frame in progress".
pub const IDLE: i8 = 40;

/// Bit position right after a start condition. The sensor's two response
/// pulses are consumed at positions `-2` and `-1` before data begins.
pub const HEADER: i8 = -2;

/// Time since the previous rising edge (in microseconds) that marks the
/// start of a new transmission.
pub const START_IDLE_US: u32 = 250_000;

/// Checksum accumulator value no valid checksum byte can equal.
pub const POISONED: u16 = 256;

/// One 40-bit message: four data bytes and the transmitted checksum.
///
/// `checksum` is wider than a byte so a corrupt pulse can push it out of
/// the `0..=255` range.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    /// Humidity, high byte.
    pub humidity_high: u8,
    /// Humidity, low byte.
    pub humidity_low: u8,
    /// Temperature, high byte. Bit 7 is the sign.
    pub temperature_high: u8,
    /// Temperature, low byte.
    pub temperature_low: u8,
    /// Checksum accumulator.
    pub checksum: u16,
}

impl Frame {
    /// A frame with every field cleared.
    pub const EMPTY: Frame = Frame {
        humidity_high: 0,
        humidity_low: 0,
        temperature_high: 0,
        temperature_low: 0,
        checksum: 0,
    };

    /// Whether a corrupt pulse was seen while assembling this frame.
    pub const fn is_poisoned(&self) -> bool {
        self.checksum >= POISONED
    }
}

/// What the caller must do after feeding an event to the assembler.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Nothing to do yet.
    Pending,
    /// The 40th bit arrived: disarm the watchdog and validate the frame.
    Complete(Frame),
    /// The watchdog fired at the given bit position. The frame was abandoned.
    Stalled(i8),
}

/// Edge-synchronous state machine that turns pulse widths into a [`Frame`].
///
/// Every call to [`step`](Self::step) runs in constant time and never
/// allocates, so it can be driven straight from an interrupt handler.
#[derive(Clone, Debug)]
pub struct FrameAssembler {
    frame: Frame,
    position: i8,
    high_tick: u32,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Creates an idle assembler.
    pub const fn new() -> Self {
        FrameAssembler {
            frame: Frame::EMPTY,
            position: IDLE,
            high_tick: 0,
        }
    }

    /// Current bit position, in `HEADER..=IDLE`.
    pub const fn position(&self) -> i8 {
        self.position
    }

    /// Returns `true` while a frame is being received.
    pub const fn in_progress(&self) -> bool {
        self.position < IDLE
    }

    /// Feeds one notification into the state machine.
    pub fn step(&mut self, event: Event) -> Step {
        match event {
            Event::Edge {
                edge: Edge::Rising,
                tick,
            } => {
                self.on_rising(tick);
                Step::Pending
            }
            Event::Edge {
                edge: Edge::Falling,
                tick,
            } => self.on_falling(tick.wrapping_sub(self.high_tick)),
            Event::Timeout => {
                let position = self.position;
                self.position = IDLE;
                Step::Stalled(position)
            }
        }
    }

    fn on_rising(&mut self, tick: u32) {
        let since_last_rise = tick.wrapping_sub(self.high_tick);
        self.high_tick = tick;

        if since_last_rise > START_IDLE_US {
            self.frame = Frame::EMPTY;
            self.position = HEADER;
        }
    }

    fn on_falling(&mut self, width_us: u32) -> Step {
        if self.position >= IDLE {
            self.position = IDLE;
            return Step::Pending;
        }

        let pulse = Pulse::classify(width_us);
        if pulse == Pulse::Corrupt {
            self.frame.checksum = POISONED;
        }

        let bit = pulse.bit();
        let frame = &mut self.frame;
        match self.position {
            0..=7 => frame.humidity_high = (frame.humidity_high << 1) | bit,
            8..=15 => frame.humidity_low = (frame.humidity_low << 1) | bit,
            16..=23 => frame.temperature_high = (frame.temperature_high << 1) | bit,
            24..=31 => frame.temperature_low = (frame.temperature_low << 1) | bit,
            32..=39 if !frame.is_poisoned() => {
                frame.checksum = (frame.checksum << 1) | u16::from(bit);
            }
            // Sensor response pulses, or a checksum already poisoned.
            _ => {}
        }

        self.position += 1;
        if self.position == IDLE {
            Step::Complete(self.frame)
        } else {
            Step::Pending
        }
    }
}
