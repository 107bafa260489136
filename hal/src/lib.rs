//! # RZ/Five Firmware Hardware Access
//!
//! The seams every RZ/Five boot driver is written against:
//!
//! | Module      | Provides                                                 |
//! |-------------|----------------------------------------------------------|
//! | [`mmio`]    | [`RegisterBus`], [`RegisterMap`], per-block width tables |
//! | [`timer`]   | [`Timer`], microsecond clock and delays                  |
//! | [`poll`]    | [`poll_until`], bounded or unbounded handshake waits     |
//! | [`csr`]     | [`CsrBank`], Andes machine CSRs and their bit fields     |
//! | [`error`]   | [`HalError`] and its SBI status mapping                  |
//! | [`arch`]    | `csrr`/`rdtime` backends, RISC-V 64 only                 |
//! | `sim`       | Host register file, clock and CSR bank (tests, `sim`)    |
//!
//! Drivers hold a bus and a timer by value; on hardware those are
//! [`VolatileBus`] and `CsrTimer`, on the build machine the `sim` types.

#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "sim", not(test)))]
extern crate std;

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

pub mod arch;
pub mod csr;
pub mod error;
pub mod mmio;
pub mod poll;
pub mod timer;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use crate::csr::{Csr, CsrBank, MCacheCtl, MMiscCtl, MmscCfg};
pub use crate::error::{sbi_code, status_code, HalError, HalResult};
pub use crate::mmio::{RegisterBus, RegisterLayout, RegisterMap, VolatileBus, Width};
pub use crate::poll::{poll_until, Timeout};
pub use crate::timer::Timer;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "riscv64")] {
        pub use crate::arch::riscv64::{CsrTimer, MachineCsrs};
    }
}
