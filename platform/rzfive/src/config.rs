//! # Platform Configuration
//!
//! Addresses, clocks and wait budgets of the RZ/Five SMARC board. Fixed at
//! build time; nothing is parsed at runtime.

use rzf_hal::Timeout;

/// Board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformConfig {
    /// SCIF register block
    pub scif_base: usize,
    /// SCIF input clock (P0)
    pub scif_clock_hz: u64,
    /// Console line rate
    pub console_baud: u32,
    /// SCIF channel, selects the CPG clock and reset bits
    pub scif_channel: u8,
    /// Use bit rate modulation for the console
    pub scif_modulation: bool,
    /// Clock Pulse Generator
    pub cpg_base: usize,
    /// GPIO / pin function controller
    pub gpio_base: usize,
    /// One-time programmable fuses
    pub otp_base: usize,
    /// L2 cache controller
    pub l2c_base: usize,
    /// Frequency of the `time` counter
    pub timebase_hz: u64,
    /// Number of harts
    pub hart_count: u32,
    /// Budget for the clock and reset monitor handshakes
    pub handshake_timeout: Timeout,
}

impl PlatformConfig {
    /// RZ/Five SMARC defaults
    pub const RZFIVE: Self = Self {
        scif_base: 0x1004_B800,
        scif_clock_hz: 100_000_000,
        console_baud: 115_200,
        scif_channel: 0,
        scif_modulation: true,
        cpg_base: 0x1101_0000,
        gpio_base: 0x1103_0000,
        otp_base: 0x1186_0000,
        l2c_base: 0x1340_0000,
        timebase_hz: 12_000_000,
        hart_count: 1,
        handshake_timeout: Timeout::Micros(10_000),
    };
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self::RZFIVE
    }
}
