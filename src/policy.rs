/// Timeouts before this bit position count as a missing message.
pub const MISSING_BELOW: i8 = 8;

/// Timeouts before this bit position (and past [`MISSING_BELOW`]) count as
/// a short message.
pub const SHORT_BELOW: i8 = 39;

/// How a watchdog timeout is classified.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Almost nothing was received; the sensor is probably silent.
    MissingMessage {
        /// The silence streak passed its limit and the sensor should be power-cycled.
        power_cycle: bool,
    },
    /// A substantial part of the frame arrived before the line went quiet.
    ShortMessage,
    /// The frame was already complete.
    Received,
}

/// Tracks consecutive missing messages and decides when to escalate.
#[derive(Clone, Debug)]
pub struct RecoveryPolicy {
    streak: u8,
    max_no_response: u8,
}

impl RecoveryPolicy {
    /// Creates a policy that escalates once more than `max_no_response`
    /// consecutive messages are missing.
    pub const fn new(max_no_response: u8) -> Self {
        RecoveryPolicy {
            streak: 0,
            max_no_response,
        }
    }

    /// Current number of consecutive missing messages.
    pub const fn streak(&self) -> u8 {
        self.streak
    }

    /// A complete frame arrived, whatever its checksum.
    pub fn on_frame(&mut self) {
        self.streak = 0;
    }

    /// Classifies a timeout that fired at bit `position`.
    pub fn on_timeout(&mut self, position: i8) -> Verdict {
        if position < MISSING_BELOW {
            self.streak = self.streak.saturating_add(1);
            let power_cycle = self.streak > self.max_no_response;
            if power_cycle {
                self.streak = 0;
            }
            Verdict::MissingMessage { power_cycle }
        } else if position < SHORT_BELOW {
            self.streak = 0;
            Verdict::ShortMessage
        } else {
            self.streak = 0;
            Verdict::Received
        }
    }
}
