use crate::frame::Frame;

/// Reading decoded from a validated frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub relative_humidity: f32,
}

/// A completed frame whose checksum byte did not match its data.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChecksumMismatch {
    /// Low byte of the sum of the four data bytes.
    pub computed: u8,
    /// What was received, or a value above 255 if a pulse was corrupt.
    pub received: u16,
}

impl Reading {
    /// Validates `frame` and converts it into a reading.
    ///
    /// The checksum is the low 8 bits of the sum of the four data bytes.
    pub fn from_frame(frame: &Frame) -> Result<Self, ChecksumMismatch> {
        let computed = frame
            .humidity_high
            .wrapping_add(frame.humidity_low)
            .wrapping_add(frame.temperature_high)
            .wrapping_add(frame.temperature_low);

        if u16::from(computed) != frame.checksum {
            return Err(ChecksumMismatch {
                computed,
                received: frame.checksum,
            });
        }

        Ok(Self::parse_data([
            frame.humidity_high,
            frame.humidity_low,
            frame.temperature_high,
            frame.temperature_low,
        ]))
    }

    /// Converts the 4 data bytes into a `Reading`.
    fn parse_data(data: [u8; 4]) -> Self {
        let [hum_hi, hum_lo, temp_hi, temp_lo] = data;

        let joined_humidity = u16::from_be_bytes([hum_hi, hum_lo]);
        let relative_humidity = f32::from(joined_humidity) / 10.0;

        let is_temp_negative = (temp_hi >> 7) != 0;
        let temp_hi = temp_hi & 0b0111_1111;
        let joined_temp = u16::from_be_bytes([temp_hi, temp_lo]);
        let mut temperature = f32::from(joined_temp) / 10.0;
        if is_temp_negative {
            temperature = -temperature;
        }

        Reading {
            temperature,
            relative_humidity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::POISONED;

    fn frame(data: [u8; 4], checksum: u16) -> Frame {
        let [humidity_high, humidity_low, temperature_high, temperature_low] = data;
        Frame {
            humidity_high,
            humidity_low,
            temperature_high,
            temperature_low,
            checksum,
        }
    }

    #[test]
    fn test_valid_frame_positive_temp() {
        // Humidity: 60.2% -> [0x02, 0x5A] => 602
        // Temperature: 30.0C -> [0x01, 0x2C] => 300
        let checksum = (0x02u16 + 0x5A + 0x01 + 0x2C) % 256;
        let reading = Reading::from_frame(&frame([0x02, 0x5A, 0x01, 0x2C], checksum)).unwrap();

        assert_eq!(
            reading,
            Reading {
                relative_humidity: 60.2,
                temperature: 30.0,
            }
        );
    }

    #[test]
    fn test_tenths_resolution() {
        // Humidity: 59.8% -> [0x02, 0x56] => 598
        // Temperature: 29.6C -> [0x01, 0x28] => 296
        let reading = Reading::from_frame(&frame([0x02, 0x56, 0x01, 0x28], 0x81)).unwrap();
        assert_eq!(reading.relative_humidity, 59.8);
        assert_eq!(reading.temperature, 29.6);

        let reading = Reading::from_frame(&frame([0x02, 0x56, 0x81, 0x28], 0x01)).unwrap();
        assert_eq!(reading.temperature, -29.6);
    }

    #[test]
    fn test_valid_frame_negative_temp() {
        // Checksum is computed over the raw byte, sign bit included.
        let checksum = (0x02u16 + 0x5A + 0x81 + 0x2C) % 256;
        let reading = Reading::from_frame(&frame([0x02, 0x5A, 0x81, 0x2C], checksum)).unwrap();

        assert_eq!(
            reading,
            Reading {
                relative_humidity: 60.2,
                temperature: -30.0,
            }
        );
    }

    #[test]
    fn test_checksum_wraps() {
        // 0xFF + 0xFF + 0x7F + 0xFF = 0x37C, low byte 0x7C.
        let reading = Reading::from_frame(&frame([0xFF, 0xFF, 0x7F, 0xFF], 0x7C)).unwrap();
        assert_eq!(reading.relative_humidity, 6553.5);
        assert_eq!(reading.temperature, 3276.7);

        assert!(Reading::from_frame(&frame([0xFF, 0xFF, 0xFF, 0xFF], 0xFC)).is_ok());
    }

    #[test]
    fn test_mismatch() {
        assert_eq!(
            Reading::from_frame(&frame([0x01, 0x90, 0x00, 0xF6], 0x81)),
            Err(ChecksumMismatch {
                computed: 0x87,
                received: 0x81,
            })
        );
    }

    #[test]
    fn test_poisoned_frame_never_validates() {
        // All-zero data sums to zero, and a poisoned checksum must still fail.
        let result = Reading::from_frame(&frame([0, 0, 0, 0], POISONED));
        assert!(matches!(
            result,
            Err(ChecksumMismatch {
                computed: 0,
                received: POISONED
            })
        ));
    }

    #[test]
    fn test_parse_data_negative_temp() {
        // Temperature: -1.0C -> [0x80, 0x0A]
        // Bit 7 of temp_hi is 1 => negative
        // Clear sign bit: 0x80 & 0x7F = 0x00, so [0x00, 0x0A] = 10 => 1.0 then negated
        let reading = Reading::parse_data([0x01, 0x90, 0x80, 0x0A]);

        assert_eq!(
            reading,
            Reading {
                relative_humidity: 40.0,
                temperature: -1.0,
            }
        );
    }
}
