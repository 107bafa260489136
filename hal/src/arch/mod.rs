//! # Architecture Backends
//!
//! Instruction-level implementations of the HAL traits. Only compiled for the
//! architecture they target; host builds use the `sim` module instead.

#[cfg(target_arch = "riscv64")]
pub mod riscv64;
