//! # Firmware Time Source
//!
//! Microsecond time base used for settle delays and bounded waits.

// ============================================================================
// Constants
// ============================================================================

/// Microseconds per second
pub const US_PER_SEC: u64 = 1_000_000;

// ============================================================================
// Timer Trait
// ============================================================================

/// Monotonic microsecond clock
pub trait Timer {
    /// Microseconds since an arbitrary fixed origin
    fn now_us(&self) -> u64;

    /// Busy-wait for at least `us` microseconds
    fn udelay(&self, us: u64) {
        let start = self.now_us();
        while self.now_us().wrapping_sub(start) < us {
            core::hint::spin_loop();
        }
    }
}

impl<T: Timer + ?Sized> Timer for &T {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }

    fn udelay(&self, us: u64) {
        (**self).udelay(us)
    }
}

// ============================================================================
// Time Conversion
// ============================================================================

/// Convert counter ticks at `freq_hz` to microseconds
#[inline]
pub const fn ticks_to_us(ticks: u64, freq_hz: u64) -> u64 {
    if freq_hz == 0 {
        return 0;
    }
    (ticks as u128 * US_PER_SEC as u128 / freq_hz as u128) as u64
}

/// Convert microseconds to counter ticks at `freq_hz`
#[inline]
pub const fn us_to_ticks(us: u64, freq_hz: u64) -> u64 {
    (us as u128 * freq_hz as u128 / US_PER_SEC as u128) as u64
}
