//! # Hardware Handshake Polling
//!
//! One busy-wait helper for every "write, then wait for the hardware to
//! acknowledge" sequence: transmit ready, clock monitor, reset monitor.
//!
//! [`Timeout::Forever`] reproduces the historical behaviour of spinning until
//! the bit shows up. [`Timeout::Micros`] bounds the wait and turns a stuck
//! handshake into [`HalError::HardwareTimeout`]. Both return at the same
//! moment on the success path.

use crate::error::{HalError, HalResult};
use crate::timer::Timer;

/// Deadline for a hardware handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Spin until the condition holds
    Forever,
    /// Give up after this many microseconds
    Micros(u64),
}

/// Spin until `ready` returns true or `timeout` expires
///
/// `what` names the handshake in the timeout error. Never logs: the console
/// transmit path polls through here.
pub fn poll_until<T, F>(timer: &T, timeout: Timeout, what: &'static str, mut ready: F) -> HalResult<()>
where
    T: Timer + ?Sized,
    F: FnMut() -> bool,
{
    match timeout {
        Timeout::Forever => {
            while !ready() {
                core::hint::spin_loop();
            }
            Ok(())
        },
        Timeout::Micros(limit) => {
            let start = timer.now_us();
            loop {
                if ready() {
                    return Ok(());
                }
                let waited_us = timer.now_us().wrapping_sub(start);
                if waited_us >= limit {
                    return Err(HalError::HardwareTimeout { what, waited_us });
                }
                core::hint::spin_loop();
            }
        },
    }
}
