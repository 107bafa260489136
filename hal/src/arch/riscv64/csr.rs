//! # CSR Instructions
//!
//! The CSR number is an immediate in `csrr`/`csrw`, so every reachable
//! register gets its own match arm. A [`Csr`] value with no arm (an odd
//! `pmacfg` index, a PMA entry past 15) reads as zero and ignores writes.

use core::arch::asm;

use crate::csr::{Csr, CsrBank};

// ============================================================================
// Instruction Macros
// ============================================================================

macro_rules! csrr {
    ($num:literal) => {{
        let value: usize;
        unsafe {
            asm!(
                concat!("csrr {0}, ", stringify!($num)),
                out(reg) value,
                options(nomem, nostack, preserves_flags)
            );
        }
        value
    }};
}

macro_rules! csrw {
    ($num:literal, $value:expr) => {{
        unsafe {
            asm!(
                concat!("csrw ", stringify!($num), ", {0}"),
                in(reg) $value,
                options(nostack)
            );
        }
    }};
}

macro_rules! csrs {
    ($num:literal, $bits:expr) => {{
        unsafe {
            asm!(
                concat!("csrs ", stringify!($num), ", {0}"),
                in(reg) $bits,
                options(nostack)
            );
        }
    }};
}

macro_rules! csrc {
    ($num:literal, $bits:expr) => {{
        unsafe {
            asm!(
                concat!("csrc ", stringify!($num), ", {0}"),
                in(reg) $bits,
                options(nostack)
            );
        }
    }};
}

/// Expand `$op!` with the immediate CSR number of `$csr`
macro_rules! on_csr {
    ($csr:expr, $op:ident $(, $value:expr)? ; else $fallback:expr) => {
        match $csr {
            Csr::Misa => $op!(0x301 $(, $value)?),
            Csr::MCacheCtl => $op!(0x7CA $(, $value)?),
            Csr::MCctlCommand => $op!(0x7CC $(, $value)?),
            Csr::MMiscCtl => $op!(0x7D0 $(, $value)?),
            Csr::MicmCfg => $op!(0xFC0 $(, $value)?),
            Csr::MdcmCfg => $op!(0xFC1 $(, $value)?),
            Csr::MmscCfg => $op!(0xFC2 $(, $value)?),
            Csr::PmaCfg(0) => $op!(0xBC0 $(, $value)?),
            Csr::PmaCfg(2) => $op!(0xBC2 $(, $value)?),
            Csr::PmaAddr(0) => $op!(0xBD0 $(, $value)?),
            Csr::PmaAddr(1) => $op!(0xBD1 $(, $value)?),
            Csr::PmaAddr(2) => $op!(0xBD2 $(, $value)?),
            Csr::PmaAddr(3) => $op!(0xBD3 $(, $value)?),
            Csr::PmaAddr(4) => $op!(0xBD4 $(, $value)?),
            Csr::PmaAddr(5) => $op!(0xBD5 $(, $value)?),
            Csr::PmaAddr(6) => $op!(0xBD6 $(, $value)?),
            Csr::PmaAddr(7) => $op!(0xBD7 $(, $value)?),
            Csr::PmaAddr(8) => $op!(0xBD8 $(, $value)?),
            Csr::PmaAddr(9) => $op!(0xBD9 $(, $value)?),
            Csr::PmaAddr(10) => $op!(0xBDA $(, $value)?),
            Csr::PmaAddr(11) => $op!(0xBDB $(, $value)?),
            Csr::PmaAddr(12) => $op!(0xBDC $(, $value)?),
            Csr::PmaAddr(13) => $op!(0xBDD $(, $value)?),
            Csr::PmaAddr(14) => $op!(0xBDE $(, $value)?),
            Csr::PmaAddr(15) => $op!(0xBDF $(, $value)?),
            other => {
                log::error!("csr: no instruction encoding for {:?}", other);
                $fallback
            },
        }
    };
}

// ============================================================================
// Machine CSR Bank
// ============================================================================

/// CSRs of the hart executing the call
#[derive(Debug, Clone, Copy)]
pub struct MachineCsrs {
    _private: (),
}

impl MachineCsrs {
    /// Create the bank
    ///
    /// # Safety
    /// Must only be used in M-mode: every access traps otherwise.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl CsrBank for MachineCsrs {
    #[inline]
    fn read(&self, csr: Csr) -> usize {
        on_csr!(csr, csrr; else 0)
    }

    #[inline]
    fn write(&self, csr: Csr, value: usize) {
        on_csr!(csr, csrw, value; else ())
    }

    #[inline]
    fn set_bits(&self, csr: Csr, bits: usize) {
        on_csr!(csr, csrs, bits; else ())
    }

    #[inline]
    fn clear_bits(&self, csr: Csr, bits: usize) {
        on_csr!(csr, csrc, bits; else ())
    }

    #[inline]
    fn fence_i(&self) {
        unsafe {
            asm!("fence.i", options(nostack, preserves_flags));
        }
    }
}
