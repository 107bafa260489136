//! # Clock Pulse Generator
//!
//! SCIF clock gate and reset line. Each control register carries a
//! write-enable bit 16 places above the bit it unlocks; a write without it is
//! ignored. Each control register has a monitor register that shows when the
//! change has taken effect.

use rzf_hal::{poll_until, HalError, HalResult, RegisterBus, RegisterLayout, RegisterMap, Timeout, Timer, Width};
use rzf_serial::PowerControl;

// =============================================================================
// REGISTERS
// =============================================================================

/// SCIF clock on/off
pub const CLKON_SCIF: usize = 0x584;
/// SCIF clock monitor, bit set when the clock runs
pub const CLKMON_SCIF: usize = 0x704;
/// SCIF reset control, bit set releases reset
pub const RST_SCIF: usize = 0x884;
/// SCIF reset monitor, bit clear when reset is released
pub const RSTMON_SCIF: usize = 0xA04;

/// All CPG registers are 32 bits wide
pub const CPG_LAYOUT: RegisterLayout = RegisterLayout::new(&[], Width::Word);

/// Control bit of `channel`
pub const fn unit_bit(channel: u8) -> u32 {
    1 << channel
}

/// Write-enable guard for the control bit of `channel`
pub const fn write_enable(channel: u8) -> u32 {
    0x1_0000 << channel
}

// =============================================================================
// SEQUENCER
// =============================================================================

/// Clock and reset sequencing for one SCIF channel
#[derive(Debug)]
pub struct ClockPowerSequencer<B, T> {
    regs: RegisterMap<B>,
    timer: T,
    channel: u8,
    timeout: Timeout,
}

impl<B: RegisterBus, T: Timer> ClockPowerSequencer<B, T> {
    /// Sequencer for `channel` of the CPG at `base`
    pub fn new(bus: B, base: usize, timer: T, channel: u8, timeout: Timeout) -> Self {
        Self { regs: RegisterMap::new(bus, base, CPG_LAYOUT), timer, channel, timeout }
    }

    /// SCIF channel
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Enable the clock, then wait for the monitor to show it running
    pub fn power_on(&self) -> HalResult<()> {
        let bit = unit_bit(self.channel);
        self.regs.write_guarded(CLKON_SCIF, bit, write_enable(self.channel));
        poll_until(&self.timer, self.timeout, "scif clock monitor", || {
            self.regs.read(CLKMON_SCIF) & bit != 0
        })
        .map_err(|err| self.stalled(err))?;
        log::info!("cpg: scif{} clock on", self.channel);
        Ok(())
    }

    /// Release reset, then wait for the monitor to show it released
    pub fn reset_off(&self) -> HalResult<()> {
        let bit = unit_bit(self.channel);
        self.regs.write_guarded(RST_SCIF, bit, write_enable(self.channel));
        poll_until(&self.timer, self.timeout, "scif reset monitor", || {
            self.regs.read(RSTMON_SCIF) & bit == 0
        })
        .map_err(|err| self.stalled(err))?;
        log::info!("cpg: scif{} reset released", self.channel);
        Ok(())
    }

    fn stalled(&self, err: HalError) -> HalError {
        log::warn!("cpg: scif{}: {}", self.channel, err);
        err
    }
}

impl<B: RegisterBus, T: Timer> PowerControl for ClockPowerSequencer<B, T> {
    fn power_on(&self) -> HalResult<()> {
        ClockPowerSequencer::power_on(self)
    }

    fn reset_off(&self) -> HalResult<()> {
        ClockPowerSequencer::reset_off(self)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use rzf_hal::sim::{SimBus, SimTimer};

    use super::*;

    const BASE: usize = 0x1101_0000;

    #[test]
    fn test_guard_bit_travels_with_enable_bit() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        bus.on_write(BASE + CLKON_SCIF, |mem, value| {
            if value & 0x1_0000 != 0 {
                mem.set_bits(BASE + CLKMON_SCIF, Width::Word, value & 0x1);
            }
        });
        let cpg = ClockPowerSequencer::new(&bus, BASE, &timer, 0, Timeout::Micros(100));

        assert_eq!(cpg.power_on(), Ok(()));
        assert_eq!(bus.writes_to(BASE + CLKON_SCIF), vec![0x0001_0001]);
    }

    #[test]
    fn test_channel_selects_bits() {
        assert_eq!(unit_bit(2), 0x4);
        assert_eq!(write_enable(2), 0x4_0000);
    }

    #[test]
    fn test_reset_monitor_timeout() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        bus.poke(BASE + RSTMON_SCIF, Width::Word, 0x1);
        let cpg = ClockPowerSequencer::new(&bus, BASE, &timer, 0, Timeout::Micros(100));

        match cpg.reset_off() {
            Err(HalError::HardwareTimeout { what, .. }) => assert_eq!(what, "scif reset monitor"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_power_on_blocks_until_clock_runs() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        let cpg = ClockPowerSequencer::new(&bus, BASE, &timer, 0, Timeout::Forever);

        thread::scope(|s| {
            let waiter = s.spawn(|| cpg.power_on());

            thread::sleep(Duration::from_millis(50));
            assert!(!waiter.is_finished());

            bus.set_bits(BASE + CLKMON_SCIF, Width::Word, unit_bit(0));
            assert_eq!(waiter.join().unwrap(), Ok(()));
        });

        assert_eq!(bus.writes_to(BASE + CLKON_SCIF), vec![0x0001_0001]);
    }

    #[test]
    fn test_reset_off_blocks_until_released() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        bus.poke(BASE + RSTMON_SCIF, Width::Word, unit_bit(0));
        let cpg = ClockPowerSequencer::new(&bus, BASE, &timer, 0, Timeout::Forever);

        thread::scope(|s| {
            let waiter = s.spawn(|| cpg.reset_off());

            thread::sleep(Duration::from_millis(50));
            assert!(!waiter.is_finished());

            bus.poke(BASE + RSTMON_SCIF, Width::Word, 0);
            assert_eq!(waiter.join().unwrap(), Ok(()));
        });

        assert_eq!(bus.writes_to(BASE + RST_SCIF), vec![0x0001_0001]);
    }

    #[test]
    fn test_other_channel_bits_do_not_satisfy_monitor() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        bus.poke(BASE + CLKMON_SCIF, Width::Word, unit_bit(0));
        let cpg = ClockPowerSequencer::new(&bus, BASE, &timer, 1, Timeout::Micros(200));

        assert!(cpg.power_on().is_err());
        assert_eq!(bus.writes_to(BASE + CLKON_SCIF), vec![0x0002_0002]);
    }
}
