//! # Device Identification Fuses
//!
//! `OTPTMPA1[3:0]` holds the device id programmed at the factory. It decides
//! which package pins carry the console.

use rzf_hal::{RegisterLayout, Width};

/// Fuse word holding the device id
pub const OTPTMPA1: usize = 0x1178;
/// Device id field
pub const DEVICE_ID_MASK: u32 = 0xF;
/// Device id of the RZ/Five-2 package
pub const DEVICE_ID_RZFIVE2: u32 = 0x1;

/// OTP registers are 32 bits wide
pub const OTP_LAYOUT: RegisterLayout = RegisterLayout::new(&[], Width::Word);

/// Package variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareVariant {
    /// RZ/Five-2
    RzFive2,
    /// Any other device id
    Other(u32),
}

impl HardwareVariant {
    /// Decode the device id field
    pub const fn from_device_id(id: u32) -> Self {
        match id & DEVICE_ID_MASK {
            DEVICE_ID_RZFIVE2 => Self::RzFive2,
            other => Self::Other(other),
        }
    }

    /// Raw device id
    pub const fn device_id(self) -> u32 {
        match self {
            Self::RzFive2 => DEVICE_ID_RZFIVE2,
            Self::Other(id) => id,
        }
    }
}
