//! # Renesas RZ/Five Platform
//!
//! Board bring-up for the RZ/Five (single AX45MP hart):
//!
//! | Module     | Block                                          |
//! |------------|------------------------------------------------|
//! | [`cpg`]    | SCIF clock gate and reset                      |
//! | [`otp`]    | Device id fuse                                 |
//! | [`pfc`]    | Console pin routing                            |
//! | [`l2c`]    | L2 cache controller                            |
//! | [`vendor`] | Andes vendor SBI extension (cache, PMA)        |
//! | [`platform`] | [`RzFivePlatform`], the SBI platform hooks   |

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod cpg;
pub mod l2c;
pub mod otp;
pub mod pfc;
pub mod platform;
pub mod vendor;

pub use crate::config::PlatformConfig;
pub use crate::cpg::ClockPowerSequencer;
pub use crate::otp::HardwareVariant;
pub use crate::pfc::{PinGroup, PinMuxConfigurator};
pub use crate::platform::{PlatformDescriptor, RzFivePlatform};
pub use crate::vendor::{VendorCommand, VendorDispatch, VendorRet, ANDES_EXT_ID};

cfg_if::cfg_if! {
    if #[cfg(target_arch = "riscv64")] {
        use rzf_hal::{CsrTimer, MachineCsrs, VolatileBus};

        /// The platform on real hardware
        pub type Board = RzFivePlatform<VolatileBus, CsrTimer, MachineCsrs>;

        /// Platform with the board defaults and the hardware backends
        ///
        /// # Safety
        /// Must run in M-mode on an RZ/Five, where every address in
        /// [`PlatformConfig::RZFIVE`] is a device register.
        pub unsafe fn board() -> Board {
            let config = PlatformConfig::RZFIVE;
            unsafe {
                RzFivePlatform::new(
                    config,
                    VolatileBus::new(),
                    CsrTimer::new(config.timebase_hz),
                    MachineCsrs::new(),
                )
            }
        }
    }
}
