//! # Memory-Mapped Register Access
//!
//! Typed access to a block of device registers.
//!
//! Every register block on this SoC mixes register widths: the SCIF has 8-bit
//! and 16-bit registers, the pin controller has 8-bit PMC and 32-bit PFC
//! registers. The width of each offset is fixed by a static [`RegisterLayout`],
//! never chosen at the call site, so a caller cannot issue a 16-bit access to
//! an 8-bit register by mistake.
//!
//! ## Guarded Writes
//!
//! Clock, reset and pin-function registers ignore a write unless a companion
//! "write-enable" bit is present in the same write, or unless a write-protect
//! register has first been unlocked. Both sequences are expressed once here:
//!
//! - [`RegisterMap::write_guarded`]: value bits and guard bit in one access
//! - [`RegisterMap::write_two_step`]: unlock value then enable value, in order

use core::ptr::{read_volatile, write_volatile};

// ============================================================================
// Register Width
// ============================================================================

/// Access width of a register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 8-bit access
    Byte,
    /// 16-bit access
    Half,
    /// 32-bit access
    Word,
}

impl Width {
    /// Size of the access in bytes
    pub const fn bytes(self) -> usize {
        match self {
            Width::Byte => 1,
            Width::Half => 2,
            Width::Word => 4,
        }
    }
}

// ============================================================================
// Register Layout
// ============================================================================

/// Static width table of a register block
///
/// Offsets listed in `byte_offsets` are accessed 8 bits wide; every other
/// offset uses the block's `word` width.
#[derive(Debug, Clone, Copy)]
pub struct RegisterLayout {
    /// Offsets of the byte-wide registers
    pub byte_offsets: &'static [usize],
    /// Width of every other register
    pub word: Width,
}

impl RegisterLayout {
    /// Create a layout
    pub const fn new(byte_offsets: &'static [usize], word: Width) -> Self {
        Self { byte_offsets, word }
    }

    /// Width of the register at `offset`
    pub const fn width_of(&self, offset: usize) -> Width {
        let mut i = 0;
        while i < self.byte_offsets.len() {
            if self.byte_offsets[i] == offset {
                return Width::Byte;
            }
            i += 1;
        }
        self.word
    }
}

// ============================================================================
// Register Bus
// ============================================================================

/// Raw bus access at absolute physical addresses
///
/// Implementations perform exactly one uncached, non-reordered access per
/// call. Side effects of the access (flags clearing on read, FIFO pops) are
/// the device's business.
pub trait RegisterBus {
    /// 8-bit read
    fn read8(&self, addr: usize) -> u8;
    /// 16-bit read
    fn read16(&self, addr: usize) -> u16;
    /// 32-bit read
    fn read32(&self, addr: usize) -> u32;
    /// 8-bit write
    fn write8(&self, addr: usize, value: u8);
    /// 16-bit write
    fn write16(&self, addr: usize, value: u16);
    /// 32-bit write
    fn write32(&self, addr: usize, value: u32);
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    fn read8(&self, addr: usize) -> u8 {
        (**self).read8(addr)
    }

    fn read16(&self, addr: usize) -> u16 {
        (**self).read16(addr)
    }

    fn read32(&self, addr: usize) -> u32 {
        (**self).read32(addr)
    }

    fn write8(&self, addr: usize, value: u8) {
        (**self).write8(addr, value)
    }

    fn write16(&self, addr: usize, value: u16) {
        (**self).write16(addr, value)
    }

    fn write32(&self, addr: usize, value: u32) {
        (**self).write32(addr, value)
    }
}

/// Volatile pointer access to device memory
#[derive(Debug, Clone, Copy)]
pub struct VolatileBus {
    _private: (),
}

impl VolatileBus {
    /// Create the bus
    ///
    /// # Safety
    /// Every address later passed to this bus must be a mapped device register
    /// that tolerates an access of the requested width.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for VolatileBus {
    #[inline]
    fn read8(&self, addr: usize) -> u8 {
        unsafe { read_volatile(addr as *const u8) }
    }

    #[inline]
    fn read16(&self, addr: usize) -> u16 {
        unsafe { read_volatile(addr as *const u16) }
    }

    #[inline]
    fn read32(&self, addr: usize) -> u32 {
        unsafe { read_volatile(addr as *const u32) }
    }

    #[inline]
    fn write8(&self, addr: usize, value: u8) {
        unsafe { write_volatile(addr as *mut u8, value) }
    }

    #[inline]
    fn write16(&self, addr: usize, value: u16) {
        unsafe { write_volatile(addr as *mut u16, value) }
    }

    #[inline]
    fn write32(&self, addr: usize, value: u32) {
        unsafe { write_volatile(addr as *mut u32, value) }
    }
}

// ============================================================================
// Register Map
// ============================================================================

/// A register block: base address, width table and the bus behind it
#[derive(Debug, Clone)]
pub struct RegisterMap<B> {
    bus: B,
    base: usize,
    layout: RegisterLayout,
}

impl<B: RegisterBus> RegisterMap<B> {
    /// Bind a register block at `base`
    pub const fn new(bus: B, base: usize, layout: RegisterLayout) -> Self {
        Self { bus, base, layout }
    }

    /// Base address of the block
    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    /// Width table of the block
    #[inline]
    pub fn layout(&self) -> &RegisterLayout {
        &self.layout
    }

    /// Underlying bus
    #[inline]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Read the register at `offset`, zero-extended
    #[inline]
    pub fn read(&self, offset: usize) -> u32 {
        let addr = self.base + offset;
        match self.layout.width_of(offset) {
            Width::Byte => self.bus.read8(addr) as u32,
            Width::Half => self.bus.read16(addr) as u32,
            Width::Word => self.bus.read32(addr),
        }
    }

    /// Write the register at `offset`, truncated to its width
    #[inline]
    pub fn write(&self, offset: usize, value: u32) {
        let addr = self.base + offset;
        match self.layout.width_of(offset) {
            Width::Byte => self.bus.write8(addr, value as u8),
            Width::Half => self.bus.write16(addr, value as u16),
            Width::Word => self.bus.write32(addr, value),
        }
    }

    /// Read-modify-write: clear `clear`, then set `set`
    #[inline]
    pub fn modify(&self, offset: usize, clear: u32, set: u32) {
        let value = self.read(offset);
        self.write(offset, (value & !clear) | set);
    }

    /// Write `bits` together with their write-enable `guard` in one access
    ///
    /// The hardware drops the value bits unless the guard bit arrives in the
    /// same write.
    #[inline]
    pub fn write_guarded(&self, offset: usize, bits: u32, guard: u32) {
        self.write(offset, bits | guard);
    }

    /// Two-phase protected write: `first` unlocks, `second` enables
    #[inline]
    pub fn write_two_step(&self, offset: usize, first: u32, second: u32) {
        self.write(offset, first);
        self.write(offset, second);
    }
}
