//! # Machine-Mode Control and Status Registers
//!
//! The CSRs this firmware reads or writes, and the [`CsrBank`] seam that
//! stands between register sequences and the `csrr`/`csrw` instructions.
//!
//! CSR numbers are encoded in the instruction, so a real bank can only reach
//! the registers named here. Besides `misa`, all of them are Andes V5
//! extensions found on the AX45MP core.

// ============================================================================
// CSR Address Constants
// ============================================================================

/// Machine ISA
pub const MISA: u16 = 0x301;
/// Andes: machine cache control
pub const MCACHE_CTL: u16 = 0x7CA;
/// Andes: machine cache control command
pub const MCCTLCOMMAND: u16 = 0x7CC;
/// Andes: machine miscellaneous control
pub const MMISC_CTL: u16 = 0x7D0;
/// Andes: PMA configuration 0 (entries 0-7 on RV64)
pub const PMACFG0: u16 = 0xBC0;
/// Andes: PMA address 0
pub const PMAADDR0: u16 = 0xBD0;
/// Andes: instruction cache/memory configuration
pub const MICM_CFG: u16 = 0xFC0;
/// Andes: data cache/memory configuration
pub const MDCM_CFG: u16 = 0xFC1;
/// Andes: miscellaneous configuration
pub const MMSC_CFG: u16 = 0xFC2;

/// Number of PMA entries
pub const PMA_ENTRIES: usize = 16;

/// PMA entries per `pmacfg` register on RV64
pub const PMA_ENTRIES_PER_CFG: usize = 8;

static_assertions::const_assert_eq!(PMA_ENTRIES % PMA_ENTRIES_PER_CFG, 0);

/// `mcctlcommand`: write back and invalidate the whole L1 data cache
pub const CCTL_L1D_WBINVAL_ALL: usize = 6;

// ============================================================================
// Register Bits
// ============================================================================

bitflags::bitflags! {
    /// `mcache_ctl` fields
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MCacheCtl: usize {
        /// Instruction cache enable
        const IC_EN = 1 << 0;
        /// Data cache enable
        const DC_EN = 1 << 1;
        /// CCTL operations allowed from S/U-mode
        const CCTL_SUEN = 1 << 8;
        /// L1 instruction prefetch
        const L1I_PREFETCH = 1 << 9;
        /// L1 data prefetch
        const L1D_PREFETCH = 1 << 10;
        /// Data cache write-around threshold, low bit
        const DC_WAROUND_1 = 1 << 13;
        /// Data cache write-around threshold, high bit
        const DC_WAROUND_2 = 1 << 14;
    }
}

impl MCacheCtl {
    /// Both write-around threshold bits
    pub const DC_WAROUND_MASK: Self = Self::DC_WAROUND_1.union(Self::DC_WAROUND_2);
}

bitflags::bitflags! {
    /// `mmisc_ctl` fields
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MMiscCtl: usize {
        /// Misaligned access handled in hardware
        const MSA_OR_UNA_EN = 1 << 6;
        /// Non-blocking load
        const NON_BLOCKING_EN = 1 << 8;
    }
}

bitflags::bitflags! {
    /// `mmsc_cfg` capability bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MmscCfg: usize {
        /// Programmable PMA present
        const PPMA = 1 << 30;
    }
}

// ============================================================================
// CSR Selector
// ============================================================================

/// A CSR reachable by the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Csr {
    /// `misa`
    Misa,
    /// `mcache_ctl`
    MCacheCtl,
    /// `mcctlcommand`
    MCctlCommand,
    /// `mmisc_ctl`
    MMiscCtl,
    /// `micm_cfg`
    MicmCfg,
    /// `mdcm_cfg`
    MdcmCfg,
    /// `mmsc_cfg`
    MmscCfg,
    /// `pmacfgN`; only even N exists on RV64
    PmaCfg(u8),
    /// `pmaaddrN`
    PmaAddr(u8),
}

impl Csr {
    /// CSR number
    pub const fn number(self) -> u16 {
        match self {
            Csr::Misa => MISA,
            Csr::MCacheCtl => MCACHE_CTL,
            Csr::MCctlCommand => MCCTLCOMMAND,
            Csr::MMiscCtl => MMISC_CTL,
            Csr::MicmCfg => MICM_CFG,
            Csr::MdcmCfg => MDCM_CFG,
            Csr::MmscCfg => MMSC_CFG,
            Csr::PmaCfg(n) => PMACFG0 + n as u16,
            Csr::PmaAddr(n) => PMAADDR0 + n as u16,
        }
    }

    /// `pmacfg` register holding the configuration byte of PMA `entry`
    pub const fn pma_cfg_for(entry: usize) -> Self {
        Csr::PmaCfg(((entry / PMA_ENTRIES_PER_CFG) * 2) as u8)
    }

    /// Bit shift of PMA `entry` inside its `pmacfg` register
    pub const fn pma_cfg_shift(entry: usize) -> u32 {
        ((entry % PMA_ENTRIES_PER_CFG) * 8) as u32
    }

    /// Read-only CSRs (the configuration/identification registers)
    pub const fn is_read_only(self) -> bool {
        matches!(self, Csr::MicmCfg | Csr::MdcmCfg | Csr::MmscCfg)
    }
}

// ============================================================================
// CSR Bank
// ============================================================================

/// Access to the machine CSRs of the current hart
pub trait CsrBank {
    /// Read a CSR
    fn read(&self, csr: Csr) -> usize;

    /// Write a CSR
    fn write(&self, csr: Csr, value: usize);

    /// Set bits in a CSR
    fn set_bits(&self, csr: Csr, bits: usize) {
        let value = self.read(csr);
        self.write(csr, value | bits);
    }

    /// Clear bits in a CSR
    fn clear_bits(&self, csr: Csr, bits: usize) {
        let value = self.read(csr);
        self.write(csr, value & !bits);
    }

    /// Synchronise instruction fetch with prior stores (`fence.i`)
    fn fence_i(&self) {}
}

impl<C: CsrBank + ?Sized> CsrBank for &C {
    fn read(&self, csr: Csr) -> usize {
        (**self).read(csr)
    }

    fn write(&self, csr: Csr, value: usize) {
        (**self).write(csr, value)
    }

    fn set_bits(&self, csr: Csr, bits: usize) {
        (**self).set_bits(csr, bits)
    }

    fn clear_bits(&self, csr: Csr, bits: usize) {
        (**self).clear_bits(csr, bits)
    }

    fn fence_i(&self) {
        (**self).fence_i()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csr_numbers() {
        assert_eq!(Csr::MCacheCtl.number(), 0x7CA);
        assert_eq!(Csr::MMiscCtl.number(), 0x7D0);
        assert_eq!(Csr::PmaCfg(2).number(), 0xBC2);
        assert_eq!(Csr::PmaAddr(15).number(), 0xBDF);
    }

    #[test]
    fn test_pma_cfg_placement() {
        assert_eq!(Csr::pma_cfg_for(0), Csr::PmaCfg(0));
        assert_eq!(Csr::pma_cfg_for(7), Csr::PmaCfg(0));
        assert_eq!(Csr::pma_cfg_for(8), Csr::PmaCfg(2));
        assert_eq!(Csr::pma_cfg_shift(9), 8);
        assert_eq!(Csr::pma_cfg_shift(7), 56);
    }

    #[test]
    fn test_cache_ctl_bits() {
        assert_eq!(MCacheCtl::DC_WAROUND_MASK.bits(), 0x6000);
        assert_eq!((MCacheCtl::IC_EN | MCacheCtl::DC_EN).bits(), 0x3);
        assert_eq!(MMiscCtl::NON_BLOCKING_EN.bits(), 0x100);
        assert!(Csr::MmscCfg.is_read_only());
        assert!(!Csr::MCacheCtl.is_read_only());
    }
}
