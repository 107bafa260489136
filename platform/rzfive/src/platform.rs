//! # RZ/Five Platform
//!
//! Bring-up hooks called by the SBI runtime, in this order:
//!
//! 1. [`early_init`](RzFivePlatform::early_init): misaligned accesses trap
//! 2. [`console_init`](RzFivePlatform::console_init): SCIF clock, reset, pins,
//!    line setup; the controller becomes the active console
//! 3. [`final_init`](RzFivePlatform::final_init): L1/L2 caches, PMA table
//!
//! after which [`vendor_ext_provider`](RzFivePlatform::vendor_ext_provider)
//! serves the Andes vendor extension.

use rzf_hal::{status_code, Csr, CsrBank, HalError, HalResult, MMiscCtl, RegisterBus, Timer};
use rzf_serial::{ActiveConsole, ConsoleDevice, ScifUart, UartConfig};

use crate::config::PlatformConfig;
use crate::cpg::ClockPowerSequencer;
use crate::l2c;
use crate::pfc::PinMuxConfigurator;
use crate::vendor::{cache, VendorDispatch, VendorRet};

// =============================================================================
// DESCRIPTOR
// =============================================================================

/// Identity reported to the SBI runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDescriptor {
    /// Platform name
    pub name: &'static str,
    /// Major/minor packed as `major << 16 | minor`
    pub version: u32,
    /// Number of harts
    pub hart_count: u32,
}

impl PlatformDescriptor {
    /// Pack a version number
    pub const fn version(major: u16, minor: u16) -> u32 {
        (major as u32) << 16 | minor as u32
    }
}

// =============================================================================
// PLATFORM
// =============================================================================

/// The RZ/Five SoC as seen by boot firmware
#[derive(Debug)]
pub struct RzFivePlatform<B, T, C> {
    config: PlatformConfig,
    descriptor: PlatformDescriptor,
    bus: B,
    timer: T,
    console: ActiveConsole<ScifUart<B, T>>,
    vendor: VendorDispatch<C>,
}

impl<B, T, C> RzFivePlatform<B, T, C>
where
    B: RegisterBus + Clone,
    T: Timer + Clone,
    C: CsrBank,
{
    /// Platform over `bus`, `timer` and `csrs`; nothing is touched yet
    pub fn new(config: PlatformConfig, bus: B, timer: T, csrs: C) -> Self {
        Self {
            descriptor: PlatformDescriptor {
                name: "Renesas RZ/Five",
                version: PlatformDescriptor::version(0, 1),
                hart_count: config.hart_count,
            },
            config,
            bus,
            timer,
            console: ActiveConsole::new(),
            vendor: VendorDispatch::new(csrs),
        }
    }

    /// Board configuration
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Platform identity
    pub fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    /// Console slot
    pub fn console(&self) -> &ActiveConsole<ScifUart<B, T>> {
        &self.console
    }

    /// Vendor extension handler
    pub fn vendor(&self) -> &VendorDispatch<C> {
        &self.vendor
    }

    /// Make misaligned accesses trap instead of being split in hardware
    pub fn early_init(&self, cold_boot: bool) -> HalResult<()> {
        self.vendor.csrs().clear_bits(Csr::MMiscCtl, MMiscCtl::MSA_OR_UNA_EN.bits());
        log::debug!("platform: early init (cold boot: {})", cold_boot);
        Ok(())
    }

    /// Bring up the console from the board configuration
    pub fn console_init(&mut self) -> HalResult<()> {
        let PlatformConfig { scif_base, scif_clock_hz, console_baud, .. } = self.config;
        self.console_init_with(scif_base, scif_clock_hz, console_baud)
    }

    /// [`console_init`](Self::console_init) as an SBI status code
    pub fn console_init_status(&mut self) -> isize {
        status_code(self.console_init())
    }

    /// Bring up the SCIF at `base` with `clock_hz` input and `baud` line rate
    ///
    /// Powers the channel, routes its pins, runs the controller init and makes
    /// it the active console.
    pub fn console_init_with(&mut self, base: usize, clock_hz: u64, baud: u32) -> HalResult<()> {
        if self.console.is_active() {
            return Err(HalError::AlreadyInitialized);
        }

        let uart_config = UartConfig::new(base, clock_hz, baud)?.with_modulation(self.config.scif_modulation);
        let cpg = ClockPowerSequencer::new(
            self.bus.clone(),
            self.config.cpg_base,
            self.timer.clone(),
            self.config.scif_channel,
            self.config.handshake_timeout,
        );
        let pfc = PinMuxConfigurator::new(self.bus.clone(), self.config.gpio_base, self.config.otp_base);

        let mut uart = ScifUart::new(self.bus.clone(), self.timer.clone(), uart_config);
        uart.init(&cpg, &pfc)?;

        self.console.set(uart);
        log::info!("platform: console on {}", self.console.get().map_or("none", |uart| uart.name()));
        Ok(())
    }

    /// [`console_init_with`](Self::console_init_with) as an SBI status code
    pub fn console_init_with_status(&mut self, base: usize, clock_hz: u64, baud: u32) -> isize {
        status_code(self.console_init_with(base, clock_hz, baud))
    }

    /// Enable the L1 and L2 caches; on cold boot also clear the PMA table
    pub fn final_init(&self, cold_boot: bool) -> HalResult<()> {
        cache::enable_for_boot(self.vendor.csrs());
        l2c::enable(self.bus.clone(), self.config.l2c_base);

        if cold_boot {
            self.vendor.reset_pma();
        }
        log::info!("platform: {} ready", self.descriptor.name);
        Ok(())
    }

    /// Serve an `ecall` to a vendor extension
    pub fn vendor_ext_provider(&self, ext_id: usize, function_id: usize, args: &[usize; 4]) -> VendorRet {
        self.vendor.handle(ext_id, function_id, args)
    }
}
