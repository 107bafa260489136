//! # L2 Cache Controller

use rzf_hal::{RegisterBus, RegisterLayout, RegisterMap, Width};

/// Control register
pub const L2C_CTL: usize = 0x8;
/// `L2C_CTL` enable bit
pub const L2C_CTL_ENABLE: u32 = 1 << 0;

/// L2C registers are 32 bits wide
pub const L2C_LAYOUT: RegisterLayout = RegisterLayout::new(&[], Width::Word);

/// Enable the L2 cache of the controller at `base`; no-op if already on
pub fn enable<B: RegisterBus>(bus: B, base: usize) {
    let l2c = RegisterMap::new(bus, base, L2C_LAYOUT);
    if l2c.read(L2C_CTL) & L2C_CTL_ENABLE == 0 {
        l2c.modify(L2C_CTL, 0, L2C_CTL_ENABLE);
        log::info!("l2c@{:#x}: enabled", base);
    }
}
