//! # SCIF Register File
//!
//! Serial Communication Interface with FIFO, as found on the RZ/Five.
//! Registers are 16 bits wide except the four byte-wide data/rate registers.

use rzf_hal::{RegisterLayout, Width};

// =============================================================================
// REGISTER OFFSETS
// =============================================================================

/// Serial Mode Register
pub const SMR: usize = 0x00;
/// Bit Rate Register (Modulation Duty Register when `SEMR.MDDRS` is set)
pub const BRR: usize = 0x02;
/// Serial Control Register
pub const SCR: usize = 0x04;
/// Transmit FIFO Data Register
pub const FTDR: usize = 0x06;
/// Serial Status Register
pub const FSR: usize = 0x08;
/// Receive FIFO Data Register
pub const FRDR: usize = 0x0A;
/// FIFO Control Register
pub const FCR: usize = 0x0C;
/// FIFO Data Count Register
pub const FDR: usize = 0x0E;
/// Serial Port Register
pub const SPTR: usize = 0x10;
/// Line Status Register
pub const LSR: usize = 0x12;
/// Serial Extended Mode Register
pub const SEMR: usize = 0x14;
/// FIFO Trigger Control Register
pub const FTCR: usize = 0x16;

/// Width table of the SCIF block
pub const SCIF_LAYOUT: RegisterLayout = RegisterLayout::new(&[BRR, FTDR, FRDR, SEMR], Width::Half);

static_assertions::const_assert!(matches!(SCIF_LAYOUT.width_of(FTDR), Width::Byte));
static_assertions::const_assert!(matches!(SCIF_LAYOUT.width_of(FSR), Width::Half));

/// `SMR`: asynchronous, 8 data bits, no parity, 1 stop bit, P0 clock
pub const SMR_ASYNC_8N1: u32 = 0x0000;

// =============================================================================
// REGISTER BITS
// =============================================================================

bitflags::bitflags! {
    /// `FSR` flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Fsr: u32 {
        /// Receive error
        const ER = 0x80;
        /// Transmit end
        const TEND = 0x40;
        /// Transmit FIFO data empty
        const TDFE = 0x20;
        /// Break detect
        const BRK = 0x10;
        /// Receive FIFO data full
        const RDF = 0x02;
        /// Receive data ready
        const DR = 0x01;
    }
}

impl Fsr {
    /// Both flags that must be set before the next byte is written
    pub const TX_READY: Self = Self::TEND.union(Self::TDFE);

    /// Check if the transmitter can take a byte
    pub const fn tx_ready(self) -> bool {
        self.contains(Self::TX_READY)
    }
}

bitflags::bitflags! {
    /// `SCR` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Scr: u32 {
        /// Transmit enable
        const TE = 0x20;
        /// Receive enable
        const RE = 0x10;
        /// Clock enable 1 (external clock)
        const CKE1 = 0x02;
        /// Clock enable 0 (SCK output)
        const CKE0 = 0x01;
    }
}

bitflags::bitflags! {
    /// `FCR` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Fcr: u32 {
        /// Transmit FIFO reset
        const TFRST = 0x04;
        /// Receive FIFO reset
        const RFRST = 0x02;
    }
}

bitflags::bitflags! {
    /// `SEMR` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Semr: u32 {
        /// Bit rate modulation enable
        const BRME = 0x20;
        /// `BRR` address selects the modulation duty register
        const MDDRS = 0x10;
    }
}

bitflags::bitflags! {
    /// `LSR` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Lsr: u32 {
        /// Overrun error
        const ORER = 0x01;
    }
}
