//! # HAL Errors
//!
//! Error type shared by every register sequence in the firmware.
//!
//! Each variant has a fixed SBI status code so it can be returned straight to
//! the caller of an `ecall`.

use core::fmt;

// ============================================================================
// SBI Status Codes
// ============================================================================

/// SBI status codes returned in `a0`
pub mod sbi_code {
    /// Completed successfully
    pub const SUCCESS: isize = 0;
    /// Failed
    pub const FAILED: isize = -1;
    /// Not supported
    pub const NOT_SUPPORTED: isize = -2;
    /// Invalid parameter(s)
    pub const INVALID_PARAM: isize = -3;
    /// Denied or not allowed
    pub const DENIED: isize = -4;
    /// Invalid address(s)
    pub const INVALID_ADDRESS: isize = -5;
    /// Already available
    pub const ALREADY_AVAILABLE: isize = -6;
}

// ============================================================================
// Error Type
// ============================================================================

/// Result alias used across the firmware crates
pub type HalResult<T> = Result<T, HalError>;

/// Hardware enablement errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// A bounded wait exceeded its deadline
    HardwareTimeout {
        /// Which handshake was being waited on
        what: &'static str,
        /// Microseconds spent waiting before giving up
        waited_us: u64,
    },
    /// Vendor function id with no table entry, or an extension id this
    /// firmware does not serve
    UnsupportedCapability {
        /// The rejected function (or extension) id
        function_id: usize,
    },
    /// Baud rate divisor does not fit the 8-bit bit-rate register
    InvalidBaudRate {
        /// Input clock in Hz
        clock_hz: u64,
        /// Requested baud rate
        baud: u32,
    },
    /// Controller already brought up
    AlreadyInitialized,
    /// Malformed operand
    InvalidParameter(&'static str),
}

impl HalError {
    /// SBI status code for this error
    pub const fn sbi_code(&self) -> isize {
        match self {
            Self::HardwareTimeout { .. } => sbi_code::FAILED,
            Self::UnsupportedCapability { .. } => sbi_code::NOT_SUPPORTED,
            Self::InvalidBaudRate { .. } => sbi_code::INVALID_PARAM,
            Self::AlreadyInitialized => sbi_code::ALREADY_AVAILABLE,
            Self::InvalidParameter(_) => sbi_code::INVALID_PARAM,
        }
    }

    /// Check if this is a timeout
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::HardwareTimeout { .. })
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardwareTimeout { what, waited_us } => {
                write!(f, "Hardware timeout waiting for {} after {} us", what, waited_us)
            },
            Self::UnsupportedCapability { function_id } => {
                write!(f, "Unsupported vendor capability: {:#x}", function_id)
            },
            Self::InvalidBaudRate { clock_hz, baud } => {
                write!(f, "Invalid baud rate {} for input clock {} Hz", baud, clock_hz)
            },
            Self::AlreadyInitialized => write!(f, "Controller already initialized"),
            Self::InvalidParameter(what) => write!(f, "Invalid parameter: {}", what),
        }
    }
}

/// Collapse a unit result into an SBI status code
pub fn status_code(result: HalResult<()>) -> isize {
    match result {
        Ok(()) => sbi_code::SUCCESS,
        Err(err) => err.sbi_code(),
    }
}
