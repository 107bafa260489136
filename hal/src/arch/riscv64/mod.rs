//! # RISC-V 64 Machine-Mode Backends
//!
//! - [`csr`]: [`MachineCsrs`], the `csrr`/`csrw` implementation of [`CsrBank`]
//! - [`timer`]: [`CsrTimer`], microseconds from the `time` counter
//!
//! [`CsrBank`]: crate::csr::CsrBank

pub mod csr;
pub mod timer;

pub use csr::MachineCsrs;
pub use timer::CsrTimer;
