//! # Pin Function Controller
//!
//! Routes SCIF0 RX/TX to package pins. Which port carries them depends on the
//! package, read once from the OTP fuses:
//!
//! | Variant   | Port | PMC          | PFC                   |
//! |-----------|------|--------------|-----------------------|
//! | RZ/Five-2 | P6   | 0x216 / 0x18 | 0x458 / 0x0006_6000   |
//! | other     | P38  | 0x236 / 0x03 | 0x4D8 / 0x0000_0011   |
//!
//! PFC registers are write protected by `PWPR`: clear `B0WI`, then set
//! `PFCWE`. Protection is restored afterwards in the reverse order.

use rzf_hal::{HalResult, RegisterBus, RegisterLayout, RegisterMap, Width};
use rzf_serial::PinRouting;

use crate::otp::HardwareVariant;

// =============================================================================
// REGISTERS
// =============================================================================

/// Port mode control, port 6 (8-bit)
pub const PMC16: usize = 0x216;
/// Port mode control, port 38 (8-bit)
pub const PMC36: usize = 0x236;
/// Port function control, port 6
pub const PFC16: usize = 0x458;
/// Port function control, port 38
pub const PFC36: usize = 0x4D8;
/// Write protect
pub const PWPR: usize = 0x3014;

/// GPIO block: PMC registers are byte wide, the rest 32-bit
pub const GPIO_LAYOUT: RegisterLayout = RegisterLayout::new(&[PMC16, PMC36], Width::Word);

bitflags::bitflags! {
    /// `PWPR` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Pwpr: u32 {
        /// Blocks writes to `PFCWE`
        const B0WI = 0x80;
        /// Allows writes to the PFC registers
        const PFCWE = 0x40;
    }
}

// =============================================================================
// PIN GROUPS
// =============================================================================

/// PMC/PFC register pair routing the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinGroup {
    /// Port mode control register
    pub pmc: usize,
    /// Pins switched to peripheral mode
    pub pmc_mask: u32,
    /// Port function control register
    pub pfc: usize,
    /// Function select value
    pub pfc_value: u32,
}

/// P6_3/P6_4 (RZ/Five-2)
pub const PIN_GROUP_A: PinGroup = PinGroup { pmc: PMC16, pmc_mask: 0x18, pfc: PFC16, pfc_value: 0x0006_6000 };

/// P38_0/P38_1
pub const PIN_GROUP_B: PinGroup = PinGroup { pmc: PMC36, pmc_mask: 0x03, pfc: PFC36, pfc_value: 0x0000_0011 };

impl HardwareVariant {
    /// Console pins of this package
    pub const fn pin_group(self) -> PinGroup {
        match self {
            HardwareVariant::RzFive2 => PIN_GROUP_A,
            HardwareVariant::Other(_) => PIN_GROUP_B,
        }
    }
}

// =============================================================================
// CONFIGURATOR
// =============================================================================

/// Console pin routing
#[derive(Debug)]
pub struct PinMuxConfigurator<B> {
    gpio: RegisterMap<B>,
    otp: RegisterMap<B>,
}

impl<B: RegisterBus + Clone> PinMuxConfigurator<B> {
    /// Configurator for the GPIO block at `gpio_base`, reading fuses at `otp_base`
    pub fn new(bus: B, gpio_base: usize, otp_base: usize) -> Self {
        Self {
            gpio: RegisterMap::new(bus.clone(), gpio_base, GPIO_LAYOUT),
            otp: RegisterMap::new(bus, otp_base, crate::otp::OTP_LAYOUT),
        }
    }

    /// Package variant from the fuses
    pub fn variant(&self) -> HardwareVariant {
        HardwareVariant::from_device_id(self.otp.read(crate::otp::OTPTMPA1))
    }

    /// Unlock, route the console pins of this package, lock again
    pub fn configure(&self) -> HalResult<()> {
        self.gpio.write_two_step(PWPR, 0, Pwpr::PFCWE.bits());

        let variant = self.variant();
        let group = variant.pin_group();
        log::debug!("pfc: {:?} -> PMC {:#x}, PFC {:#x}", variant, group.pmc, group.pfc);

        self.gpio.write(group.pfc, group.pfc_value);
        self.gpio.modify(group.pmc, 0, group.pmc_mask);

        self.gpio.write_two_step(PWPR, 0, Pwpr::B0WI.bits());
        log::info!("pfc: console pins routed");
        Ok(())
    }
}

impl<B: RegisterBus + Clone> PinRouting for PinMuxConfigurator<B> {
    fn configure(&self) -> HalResult<()> {
        PinMuxConfigurator::configure(self)
    }
}
