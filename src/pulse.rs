/// Pulses shorter than this (in microseconds) encode a `0`.
pub const ONE_THRESHOLD_US: u32 = 50;

/// Pulses at least this long (in microseconds) cannot be a legitimate `1`.
pub const CORRUPT_THRESHOLD_US: u32 = 200;

/// Classification of one high pulse.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pulse {
    /// ~26-28 us high.
    Zero,
    /// ~70 us high.
    One,
    /// Far longer than a `1`. Advances the frame like a `1` but poisons its checksum.
    Corrupt,
}

impl Pulse {
    /// Classifies a pulse by its width in microseconds.
    pub const fn classify(width_us: u32) -> Self {
        if width_us < ONE_THRESHOLD_US {
            Pulse::Zero
        } else if width_us < CORRUPT_THRESHOLD_US {
            Pulse::One
        } else {
            Pulse::Corrupt
        }
    }

    /// The bit shifted into the frame for this pulse.
    pub const fn bit(self) -> u8 {
        match self {
            Pulse::Zero => 0,
            Pulse::One | Pulse::Corrupt => 1,
        }
    }
}
