//! # Host Simulation Backends
//!
//! Stand-ins for the hardware seams so register sequences can run under
//! `cargo test` on the build machine:
//!
//! - [`SimBus`]: byte-addressed register file with an access log and per-address
//!   hooks that play the part of the device (set a monitor bit when the enable
//!   register is written, raise a status flag after N polls, ...)
//! - [`SimTimer`]: microsecond clock that advances on every read
//! - [`SimCsrs`]: CSR bank with a write log
//!
//! Compiled for this crate's own tests and behind the `sim` feature.

use std::boxed::Box;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::vec::Vec;

use crate::csr::{Csr, CsrBank};
use crate::mmio::{RegisterBus, Width};
use crate::timer::Timer;

// ============================================================================
// Register File
// ============================================================================

/// A logged bus write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    /// Absolute address
    pub addr: usize,
    /// Access width
    pub width: Width,
    /// Value written
    pub value: u32,
}

/// Little-endian sparse memory; unset bytes read as zero
#[derive(Debug, Default)]
pub struct SimMemory {
    bytes: HashMap<usize, u8>,
}

impl SimMemory {
    /// Read `width` bytes at `addr`
    pub fn peek(&self, addr: usize, width: Width) -> u32 {
        (0..width.bytes()).fold(0u32, |acc, i| {
            let byte = self.bytes.get(&(addr + i)).copied().unwrap_or(0);
            acc | (byte as u32) << (8 * i)
        })
    }

    /// Store `width` bytes at `addr`
    pub fn poke(&mut self, addr: usize, width: Width, value: u32) {
        for i in 0..width.bytes() {
            self.bytes.insert(addr + i, (value >> (8 * i)) as u8);
        }
    }

    /// Set bits at `addr` without touching the others
    pub fn set_bits(&mut self, addr: usize, width: Width, bits: u32) {
        let value = self.peek(addr, width);
        self.poke(addr, width, value | bits);
    }

    /// Clear bits at `addr` without touching the others
    pub fn clear_bits(&mut self, addr: usize, width: Width, bits: u32) {
        let value = self.peek(addr, width);
        self.poke(addr, width, value & !bits);
    }
}

/// Device behaviour on read: gets the memory and the number of earlier
/// reads of this address; may change memory before the value is sampled
pub type ReadHook = Box<dyn FnMut(&mut SimMemory, usize) + Send>;

/// Device behaviour on write: gets the memory (already holding the written
/// value) and the value itself
pub type WriteHook = Box<dyn FnMut(&mut SimMemory, u32) + Send>;

#[derive(Default)]
struct SimState {
    mem: SimMemory,
    writes: Vec<Access>,
    read_counts: HashMap<usize, usize>,
    read_hooks: HashMap<usize, ReadHook>,
    write_hooks: HashMap<usize, WriteHook>,
}

/// Simulated register bus
#[derive(Default)]
pub struct SimBus {
    state: Mutex<SimState>,
}

impl core::fmt::Debug for SimBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimBus").finish_non_exhaustive()
    }
}

impl SimBus {
    /// Empty register file
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Read memory without logging or hooks
    pub fn peek(&self, addr: usize, width: Width) -> u32 {
        self.state().mem.peek(addr, width)
    }

    /// Store into memory without logging or hooks
    pub fn poke(&self, addr: usize, width: Width, value: u32) {
        self.state().mem.poke(addr, width, value);
    }

    /// Set bits without logging or hooks
    pub fn set_bits(&self, addr: usize, width: Width, bits: u32) {
        self.state().mem.set_bits(addr, width, bits);
    }

    /// Install the read behaviour of `addr`
    pub fn on_read(&self, addr: usize, hook: impl FnMut(&mut SimMemory, usize) + Send + 'static) {
        self.state().read_hooks.insert(addr, Box::new(hook));
    }

    /// Install the write behaviour of `addr`
    pub fn on_write(&self, addr: usize, hook: impl FnMut(&mut SimMemory, u32) + Send + 'static) {
        self.state().write_hooks.insert(addr, Box::new(hook));
    }

    /// All writes, in order
    pub fn writes(&self) -> Vec<Access> {
        self.state().writes.clone()
    }

    /// Values written to `addr`, in order
    pub fn writes_to(&self, addr: usize) -> Vec<u32> {
        self.state()
            .writes
            .iter()
            .filter(|access| access.addr == addr)
            .map(|access| access.value)
            .collect()
    }

    /// Number of reads of `addr`
    pub fn read_count(&self, addr: usize) -> usize {
        self.state().read_counts.get(&addr).copied().unwrap_or(0)
    }

    /// Forget logged accesses
    pub fn clear_log(&self) {
        let mut state = self.state();
        state.writes.clear();
        state.read_counts.clear();
    }

    fn read(&self, addr: usize, width: Width) -> u32 {
        let mut guard = self.state();
        let state = &mut *guard;
        let count = state.read_counts.entry(addr).or_insert(0);
        let earlier = *count;
        *count += 1;
        if let Some(hook) = state.read_hooks.get_mut(&addr) {
            hook(&mut state.mem, earlier);
        }
        state.mem.peek(addr, width)
    }

    fn write(&self, addr: usize, width: Width, value: u32) {
        let mut guard = self.state();
        let state = &mut *guard;
        state.mem.poke(addr, width, value);
        state.writes.push(Access { addr, width, value });
        if let Some(hook) = state.write_hooks.get_mut(&addr) {
            hook(&mut state.mem, value);
        }
    }
}

impl RegisterBus for SimBus {
    fn read8(&self, addr: usize) -> u8 {
        self.read(addr, Width::Byte) as u8
    }

    fn read16(&self, addr: usize) -> u16 {
        self.read(addr, Width::Half) as u16
    }

    fn read32(&self, addr: usize) -> u32 {
        self.read(addr, Width::Word)
    }

    fn write8(&self, addr: usize, value: u8) {
        self.write(addr, Width::Byte, value as u32)
    }

    fn write16(&self, addr: usize, value: u16) {
        self.write(addr, Width::Half, value as u32)
    }

    fn write32(&self, addr: usize, value: u32) {
        self.write(addr, Width::Word, value)
    }
}

// ============================================================================
// Timer
// ============================================================================

/// Clock that advances one microsecond per read and by the full amount on
/// `udelay`, so bounded waits terminate without real time passing
#[derive(Debug, Default)]
pub struct SimTimer {
    now: AtomicU64,
    delays: Mutex<Vec<u64>>,
}

impl SimTimer {
    /// Clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time without advancing
    pub fn elapsed_us(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    /// Every `udelay` request, in order
    pub fn delays(&self) -> Vec<u64> {
        self.delays.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl Timer for SimTimer {
    fn now_us(&self) -> u64 {
        self.now.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn udelay(&self, us: u64) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(us);
        }
        self.now.fetch_add(us, Ordering::SeqCst);
    }
}

// ============================================================================
// CSR Bank
// ============================================================================

/// CSR bank backed by a map; unset CSRs read as zero
#[derive(Debug, Default)]
pub struct SimCsrs {
    regs: Mutex<HashMap<Csr, usize>>,
    writes: Mutex<Vec<(Csr, usize)>>,
    fences: AtomicUsize,
}

impl SimCsrs {
    /// All CSRs zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a CSR without logging
    pub fn poke(&self, csr: Csr, value: usize) {
        if let Ok(mut regs) = self.regs.lock() {
            regs.insert(csr, value);
        }
    }

    /// Current value of a CSR without logging
    pub fn peek(&self, csr: Csr) -> usize {
        self.regs
            .lock()
            .ok()
            .and_then(|regs| regs.get(&csr).copied())
            .unwrap_or(0)
    }

    /// Every write, in order
    pub fn writes(&self) -> Vec<(Csr, usize)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Number of `fence.i` executed
    pub fn fence_count(&self) -> usize {
        self.fences.load(Ordering::SeqCst)
    }
}

impl CsrBank for SimCsrs {
    fn read(&self, csr: Csr) -> usize {
        self.peek(csr)
    }

    fn write(&self, csr: Csr, value: usize) {
        self.poke(csr, value);
        if let Ok(mut writes) = self.writes.lock() {
            writes.push((csr, value));
        }
    }

    fn fence_i(&self) {
        self.fences.fetch_add(1, Ordering::SeqCst);
    }
}
