//! # RZ/Five SCIF Serial Console
//!
//! Polled console driver for the SCIF controller:
//!
//! - [`scif`]: register offsets and bit definitions
//! - [`config`]: [`UartConfig`], divisor and modulation arithmetic
//! - [`uart`]: [`ScifUart`], bring-up state machine and transmit
//! - [`console`]: [`ConsoleDevice`], [`ActiveConsole`], formatted output
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = UartConfig::new(0x1004_B800, 100_000_000, 115_200)?;
//! let mut uart = ScifUart::new(bus, timer, config);
//! uart.init(&cpg, &pfc)?;
//! uart.put_str("hello\n");
//! ```

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod console;
pub mod scif;
pub mod uart;

pub use crate::config::{UartConfig, DEFAULT_BAUD};
pub use crate::console::{ActiveConsole, ConsoleDevice, ConsoleWriter};
pub use crate::uart::{PinRouting, PowerControl, ScifUart, UartState};
