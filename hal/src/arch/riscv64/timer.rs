//! # `time` Counter Timer
//!
//! Microsecond clock built on the `time` CSR. In M-mode on the AX45MP the
//! read is served by the PLMT, which ticks at the platform timebase.

use crate::timer::{ticks_to_us, Timer};

/// Read the `time` counter
#[inline(always)]
pub fn read_time() -> u64 {
    let time: u64;
    unsafe {
        core::arch::asm!(
            "rdtime {}",
            out(reg) time,
            options(nomem, nostack, preserves_flags)
        );
    }
    time
}

/// Timer backed by the `time` counter
#[derive(Debug, Clone, Copy)]
pub struct CsrTimer {
    freq_hz: u64,
}

impl CsrTimer {
    /// Create a timer for a counter running at `freq_hz`
    pub const fn new(freq_hz: u64) -> Self {
        Self { freq_hz }
    }

    /// Counter frequency
    pub const fn frequency(&self) -> u64 {
        self.freq_hz
    }
}

impl Timer for CsrTimer {
    #[inline]
    fn now_us(&self) -> u64 {
        ticks_to_us(read_time(), self.freq_hz)
    }
}
