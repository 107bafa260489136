//! # Line Configuration
//!
//! Baud rate arithmetic for the SCIF in asynchronous mode with the undivided
//! peripheral clock and 32x sampling.

use rzf_hal::{HalError, HalResult};

/// Default console rate
pub const DEFAULT_BAUD: u32 = 115_200;

// =============================================================================
// RATE ARITHMETIC
// =============================================================================

/// Bit rate register value for `clock_hz` and `baud`
///
/// `clock / (32 * baud) - 1`, truncating. `None` if the result does not fit
/// the 8-bit register or would be negative.
pub const fn divisor_for(clock_hz: u64, baud: u32) -> Option<u8> {
    if baud == 0 {
        return None;
    }
    let quotient = clock_hz / (32 * baud as u64);
    if quotient == 0 || quotient - 1 > u8::MAX as u64 {
        return None;
    }
    Some((quotient - 1) as u8)
}

static_assertions::const_assert_eq!(
    match divisor_for(100_000_000, DEFAULT_BAUD) {
        Some(divisor) => divisor,
        None => 0,
    },
    0x1A
);

/// Modulation duty register value
///
/// `round(256 * 32 * baud * (divisor + 1) / clock)`, held to the 128..=255
/// range the hardware accepts.
pub const fn modulation_duty_for(clock_hz: u64, baud: u32, divisor: u8) -> u8 {
    if clock_hz == 0 {
        return u8::MAX;
    }
    let numerator = 256 * 32 * baud as u64 * (divisor as u64 + 1);
    let duty = (numerator + clock_hz / 2) / clock_hz;
    if duty < 128 {
        128
    } else if duty > 255 {
        255
    } else {
        duty as u8
    }
}

// =============================================================================
// UART CONFIG
// =============================================================================

/// Validated controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    base: usize,
    clock_hz: u64,
    baud: u32,
    divisor: u8,
    modulation: bool,
}

impl UartConfig {
    /// Configuration for the controller at `base`
    ///
    /// Fails with [`HalError::InvalidBaudRate`] when the divisor does not fit.
    pub fn new(base: usize, clock_hz: u64, baud: u32) -> HalResult<Self> {
        let divisor = divisor_for(clock_hz, baud).ok_or(HalError::InvalidBaudRate { clock_hz, baud })?;
        Ok(Self { base, clock_hz, baud, divisor, modulation: true })
    }

    /// Enable or disable bit rate modulation
    pub const fn with_modulation(mut self, enabled: bool) -> Self {
        self.modulation = enabled;
        self
    }

    /// Register block base
    pub const fn base(&self) -> usize {
        self.base
    }

    /// Input clock
    pub const fn clock_hz(&self) -> u64 {
        self.clock_hz
    }

    /// Line rate
    pub const fn baud(&self) -> u32 {
        self.baud
    }

    /// Bit rate register value
    pub const fn divisor(&self) -> u8 {
        self.divisor
    }

    /// Check if bit rate modulation is used
    pub const fn modulation(&self) -> bool {
        self.modulation
    }

    /// Modulation duty register value
    pub const fn modulation_duty(&self) -> u8 {
        modulation_duty_for(self.clock_hz, self.baud, self.divisor)
    }

    /// Wait after programming the rate, at least one bit period
    pub const fn settle_delay_us(&self) -> u64 {
        1_000_000 / self.baud as u64 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_divisor() {
        let config = UartConfig::new(0x1004_B800, 100_000_000, 115_200).unwrap();
        assert_eq!(config.divisor(), 0x1A);
        assert_eq!(config.modulation_duty(), 0xFF);
        assert_eq!(config.settle_delay_us(), 9);
    }

    #[test]
    fn test_settle_delay_covers_bit_period() {
        for baud in [19_200u32, 38_400, 57_600, 115_200, 460_800] {
            let config = UartConfig::new(0, 100_000_000, baud).unwrap();
            // one bit period is 1e6 / baud microseconds
            assert!(config.settle_delay_us() * baud as u64 >= 1_000_000);
        }
    }

    #[test]
    fn test_divisor_out_of_range() {
        // clock too slow: quotient is zero
        assert_eq!(
            UartConfig::new(0, 1_000_000, 115_200),
            Err(HalError::InvalidBaudRate { clock_hz: 1_000_000, baud: 115_200 })
        );
        // clock too fast: divisor above 255
        assert!(UartConfig::new(0, 100_000_000, 19_200).is_ok());
        assert!(UartConfig::new(0, 100_000_000, 9_600).is_err());
        assert!(UartConfig::new(0, 100_000_000, 1_200).is_err());
        assert!(UartConfig::new(0, 100_000_000, 0).is_err());
    }

    #[test]
    fn test_duty_is_clamped() {
        assert_eq!(modulation_duty_for(100_000_000, 115_200, 0x1A), 0xFF);
        assert_eq!(modulation_duty_for(100_000_000, 1, 0), 128);
    }
}
