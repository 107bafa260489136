//! # SCIF UART Controller
//!
//! Register-sequenced bring-up and polled transmit for one SCIF channel.
//!
//! ## Bring-up
//!
//! ```text
//! Uninitialized ─▶ Disabled ─▶ Configuring ─▶ Enabled
//!   power, reset     TE/RE off     mode, rate      FIFO out of reset,
//!                    FIFO reset    settle delay    pins routed, TE/RE on
//! ```
//!
//! Clock/reset and pin routing belong to other blocks and are reached through
//! [`PowerControl`] and [`PinRouting`].
//!
//! ## Transmit
//!
//! [`ScifUart::put_char`] waits for both `TEND` and `TDFE`, writes the byte,
//! then clears exactly those two flags with a read-modify-write of `FSR`. Any
//! other flag raised by the receiver in the meantime survives. The sequence
//! runs under a per-controller lock and never logs, so the firmware logger
//! can write through this controller.

use rzf_hal::{poll_until, HalError, HalResult, RegisterBus, RegisterMap, Timeout, Timer};
use spin::Mutex;

use crate::config::UartConfig;
use crate::scif::{self, Fcr, Fsr, Scr, Semr, SCIF_LAYOUT};

// =============================================================================
// COLLABORATORS
// =============================================================================

/// Clock gate and reset line of the controller
pub trait PowerControl {
    /// Enable the module clock and wait until it runs
    fn power_on(&self) -> HalResult<()>;

    /// Release the module reset and wait until it is released
    fn reset_off(&self) -> HalResult<()>;
}

/// Routes the RX/TX signals to the controller
pub trait PinRouting {
    /// Program the pin function registers
    fn configure(&self) -> HalResult<()>;
}

// =============================================================================
// CONTROLLER STATE
// =============================================================================

/// Bring-up state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartState {
    /// Nothing programmed
    Uninitialized,
    /// Transmitter and receiver off, FIFOs held in reset
    Disabled,
    /// Framing and rate being programmed
    Configuring,
    /// Ready for `put_char`
    Enabled,
}

// =============================================================================
// SCIF UART
// =============================================================================

/// One SCIF channel
#[derive(Debug)]
pub struct ScifUart<B, T> {
    regs: RegisterMap<B>,
    timer: T,
    config: UartConfig,
    state: UartState,
    tx_lock: Mutex<()>,
}

impl<B: RegisterBus, T: Timer> ScifUart<B, T> {
    /// Controller for `config.base()`; nothing is touched until [`init`](Self::init)
    pub fn new(bus: B, timer: T, config: UartConfig) -> Self {
        Self {
            regs: RegisterMap::new(bus, config.base(), SCIF_LAYOUT),
            timer,
            config,
            state: UartState::Uninitialized,
            tx_lock: Mutex::new(()),
        }
    }

    /// Current bring-up state
    pub fn state(&self) -> UartState {
        self.state
    }

    /// Line configuration
    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    /// Register block
    pub fn registers(&self) -> &RegisterMap<B> {
        &self.regs
    }

    /// Bring the controller up
    ///
    /// A failed attempt may be retried; a second call on an enabled controller
    /// fails with [`HalError::AlreadyInitialized`].
    pub fn init<P, R>(&mut self, power: &P, pins: &R) -> HalResult<()>
    where
        P: PowerControl + ?Sized,
        R: PinRouting + ?Sized,
    {
        if self.state == UartState::Enabled {
            return Err(HalError::AlreadyInitialized);
        }

        power.power_on()?;
        power.reset_off()?;

        self.regs.write(scif::SCR, 0);
        self.regs.write(scif::FCR, (Fcr::TFRST | Fcr::RFRST).bits());
        self.state = UartState::Disabled;

        // dummy reads before clearing
        let _ = self.regs.read(scif::FSR);
        self.regs.write(scif::FSR, 0);
        let _ = self.regs.read(scif::LSR);
        self.regs.write(scif::LSR, 0);

        // internal clock, SCK unused
        self.regs.write(scif::SCR, 0);
        self.regs.write(scif::SMR, scif::SMR_ASYNC_8N1);
        self.state = UartState::Configuring;

        self.program_rate();
        self.timer.udelay(self.config.settle_delay_us());

        self.regs.write(scif::FCR, 0);
        pins.configure()?;
        self.regs.write(scif::SCR, (Scr::TE | Scr::RE).bits());
        self.state = UartState::Enabled;

        log::info!(
            "scif@{:#x}: enabled at {} baud (divisor {:#x}, modulation {})",
            self.config.base(),
            self.config.baud(),
            self.config.divisor(),
            self.config.modulation()
        );
        Ok(())
    }

    fn program_rate(&self) {
        let mut semr = self.regs.read(scif::SEMR) & !(Semr::BRME | Semr::MDDRS).bits();
        self.regs.write(scif::SEMR, semr);
        self.regs.write(scif::BRR, self.config.divisor() as u32);

        if self.config.modulation() {
            // BRR now addresses MDDR
            semr |= (Semr::BRME | Semr::MDDRS).bits();
            self.regs.write(scif::SEMR, semr);
            self.regs.write(scif::BRR, self.config.modulation_duty() as u32);
        }
        log::debug!("scif@{:#x}: BRR={:#x} SEMR={:#x}", self.config.base(), self.config.divisor(), semr);
    }

    /// Transmit one byte, waiting as long as the transmitter needs
    ///
    /// Dropped if the controller is not enabled. The transmit path never logs,
    /// so a logger may write to this controller.
    pub fn put_char(&self, byte: u8) {
        let _ = self.transmit(byte, Timeout::Forever);
    }

    /// Transmit one byte, giving up after `timeout`
    ///
    /// Fails with [`HalError::InvalidParameter`] before the controller is
    /// enabled and [`HalError::HardwareTimeout`] when the transmitter stalls.
    pub fn try_put_char(&self, byte: u8, timeout: Timeout) -> HalResult<()> {
        self.transmit(byte, timeout)
    }

    /// Transmit a string, LF sent as CR LF
    pub fn put_str(&self, s: &str) {
        crate::console::write_translated(self, s.as_bytes());
    }

    fn transmit(&self, byte: u8, timeout: Timeout) -> HalResult<()> {
        if self.state != UartState::Enabled {
            return Err(HalError::InvalidParameter("transmit on a controller that is not enabled"));
        }

        let _guard = self.tx_lock.lock();
        poll_until(&self.timer, timeout, "scif transmit ready", || {
            Fsr::from_bits_retain(self.regs.read(scif::FSR)).tx_ready()
        })?;

        self.regs.write(scif::FTDR, byte as u32);
        let fsr = self.regs.read(scif::FSR);
        self.regs.write(scif::FSR, fsr & !Fsr::TX_READY.bits());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::sync::{mpsc, Once};
    use std::thread;
    use std::time::Duration;

    use rzf_hal::sim::{SimBus, SimTimer};
    use rzf_hal::Width;

    use super::*;
    use crate::config::divisor_for;
    use crate::console::{ActiveConsole, ConsoleDevice};

    const BASE: usize = 0x1004_B800;

    type StaticUart = ScifUart<&'static SimBus, &'static SimTimer>;

    thread_local! {
        static LOG_CONSOLE: Cell<Option<&'static StaticUart>> = const { Cell::new(None) };
        static LOG_LINES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    /// Firmware-style logger: every record goes to the calling thread's console
    struct ConsoleLogger;

    impl log::Log for ConsoleLogger {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            let line = format!("{}\n", record.args());
            LOG_LINES.with(|lines| lines.borrow_mut().push(line.clone()));
            if let Some(uart) = LOG_CONSOLE.with(Cell::get) {
                uart.put_str(&line);
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: ConsoleLogger = ConsoleLogger;

    fn install_logger() {
        static INSTALL: Once = Once::new();
        INSTALL.call_once(|| {
            let _ = log::set_logger(&LOGGER);
            log::set_max_level(log::LevelFilter::Trace);
        });
    }

    fn leak<T>(value: T) -> &'static T {
        Box::leak(Box::new(value))
    }

    struct Ready;

    impl PowerControl for Ready {
        fn power_on(&self) -> HalResult<()> {
            Ok(())
        }

        fn reset_off(&self) -> HalResult<()> {
            Ok(())
        }
    }

    impl PinRouting for Ready {
        fn configure(&self) -> HalResult<()> {
            Ok(())
        }
    }

    fn enabled_uart<'a>(bus: &'a SimBus, timer: &'a SimTimer) -> ScifUart<&'a SimBus, &'a SimTimer> {
        let config = UartConfig::new(BASE, 100_000_000, 115_200).unwrap();
        let mut uart = ScifUart::new(bus, timer, config);
        uart.init(&Ready, &Ready).unwrap();
        uart
    }

    fn fsr(bus: &SimBus) -> Fsr {
        Fsr::from_bits_retain(bus.peek(BASE + scif::FSR, Width::Half))
    }

    #[test]
    fn test_init_sequence_ends_enabled() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        let uart = enabled_uart(&bus, &timer);

        assert_eq!(uart.state(), UartState::Enabled);
        assert_eq!(bus.peek(BASE + scif::SCR, Width::Half), 0x30);
        assert_eq!(bus.peek(BASE + scif::FCR, Width::Half), 0);
        assert_eq!(bus.writes_to(BASE + scif::FCR), vec![0x06, 0x00]);
        assert_eq!(bus.writes_to(BASE + scif::BRR), vec![0x1A, 0xFF]);
        assert_eq!(timer.delays(), vec![9]);
    }

    #[test]
    fn test_init_without_modulation() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        let config = UartConfig::new(BASE, 100_000_000, 115_200).unwrap().with_modulation(false);
        let mut uart = ScifUart::new(&bus, &timer, config);

        uart.init(&Ready, &Ready).unwrap();

        assert_eq!(bus.writes_to(BASE + scif::BRR), vec![0x1A]);
        assert_eq!(bus.peek(BASE + scif::SEMR, Width::Byte), 0);
    }

    #[test]
    fn test_init_across_line_configurations() {
        // divisor 0 and 255 at the ends, bit periods of 8.68 us and 26.04 us
        assert_eq!(divisor_for(3_686_400, 115_200), Some(0));
        assert_eq!(divisor_for(100_000_000, 12_207), Some(255));
        let cases = [
            (0x1004_B800, 100_000_000, 115_200),
            (0x1004_BC00, 3_686_400, 115_200),
            (0x1004_C000, 100_000_000, 12_207),
            (0x1004_C400, 66_000_000, 38_400),
            (0x1004_C800, 100_000_000, 921_600),
        ];

        for (base, clock_hz, baud) in cases {
            let bus = SimBus::new();
            let timer = SimTimer::new();
            let config = UartConfig::new(base, clock_hz, baud).unwrap();
            let mut uart = ScifUart::new(&bus, &timer, config);

            uart.init(&Ready, &Ready).unwrap();

            assert_eq!(uart.state(), UartState::Enabled);
            assert_eq!(bus.peek(base + scif::SCR, Width::Half), (Scr::TE | Scr::RE).bits(), "{} baud", baud);
            assert_eq!(bus.writes_to(base + scif::FCR).last(), Some(&0), "{} baud", baud);
            assert_eq!(
                bus.writes_to(base + scif::BRR).first().copied(),
                divisor_for(clock_hz, baud).map(u32::from),
                "{} baud",
                baud
            );
            let delays = timer.delays();
            assert_eq!(delays.len(), 1);
            assert!(delays[0] * baud as u64 >= 1_000_000, "{} us at {} baud", delays[0], baud);
        }
    }

    #[test]
    fn test_rate_log_reports_programmed_semr() {
        install_logger();
        LOG_LINES.with(|lines| lines.borrow_mut().clear());
        let bus = SimBus::new();
        let timer = SimTimer::new();

        let _uart = enabled_uart(&bus, &timer);

        let semr = bus.peek(BASE + scif::SEMR, Width::Byte);
        assert_eq!(semr, (Semr::BRME | Semr::MDDRS).bits());
        let expected = format!("SEMR={:#x}", semr);
        LOG_LINES.with(|lines| {
            assert!(lines.borrow().iter().any(|line| line.contains("BRR=") && line.contains(&expected)));
        });
    }

    #[test]
    fn test_init_twice_is_rejected() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        let mut uart = enabled_uart(&bus, &timer);
        assert_eq!(uart.init(&Ready, &Ready), Err(HalError::AlreadyInitialized));
    }

    #[test]
    fn test_put_char_before_init_writes_nothing() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        let config = UartConfig::new(BASE, 100_000_000, 115_200).unwrap();
        let uart = ScifUart::new(&bus, &timer, config);

        uart.put_char(b'x');

        assert_eq!(uart.state(), UartState::Uninitialized);
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn test_put_char_clears_only_transmit_flags() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        let uart = enabled_uart(&bus, &timer);
        bus.clear_log();
        bus.poke(BASE + scif::FSR, Width::Half, (Fsr::TX_READY | Fsr::DR).bits());

        uart.put_char(b'A');

        assert_eq!(bus.writes_to(BASE + scif::FTDR), vec![b'A' as u32]);
        assert_eq!(bus.writes_to(BASE + scif::FSR), vec![Fsr::DR.bits()]);
        assert_eq!(fsr(&bus), Fsr::DR);
    }

    #[test]
    fn test_flag_raised_during_transmit_survives() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        let uart = enabled_uart(&bus, &timer);
        bus.poke(BASE + scif::FSR, Width::Half, Fsr::TX_READY.bits());
        // receiver fills up while the byte goes out
        bus.on_write(BASE + scif::FTDR, |mem, _| {
            mem.set_bits(BASE + scif::FSR, Width::Half, Fsr::RDF.bits())
        });

        uart.put_char(b'B');

        assert_eq!(fsr(&bus), Fsr::RDF);
    }

    #[test]
    fn test_put_char_waits_for_both_flags() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        let uart = enabled_uart(&bus, &timer);
        bus.poke(BASE + scif::FSR, Width::Half, (Fsr::TDFE | Fsr::DR).bits());

        thread::scope(|s| {
            let sender = s.spawn(|| uart.put_char(b'C'));

            thread::sleep(Duration::from_millis(50));
            assert!(!sender.is_finished());
            assert!(bus.writes_to(BASE + scif::FTDR).is_empty());

            bus.set_bits(BASE + scif::FSR, Width::Half, Fsr::TEND.bits());
            sender.join().unwrap();
        });

        assert_eq!(bus.writes_to(BASE + scif::FTDR), vec![b'C' as u32]);
        assert_eq!(fsr(&bus), Fsr::DR);
    }

    #[test]
    fn test_bounded_transmit_times_out() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        let uart = enabled_uart(&bus, &timer);
        bus.poke(BASE + scif::FSR, Width::Half, Fsr::TDFE.bits());

        let result = uart.try_put_char(b'a', Timeout::Micros(100));

        assert!(matches!(result, Err(HalError::HardwareTimeout { .. })));
        assert!(bus.writes_to(BASE + scif::FTDR).is_empty());
    }

    #[test]
    fn test_bounded_transmit_returns_under_console_logger() {
        install_logger();
        let bus = leak(SimBus::new());
        let timer = leak(SimTimer::new());
        let uart: &'static StaticUart = leak(enabled_uart(bus, timer));
        // buffer empty but the previous frame never completes
        bus.poke(BASE + scif::FSR, Width::Half, Fsr::TDFE.bits());

        let (done, finished) = mpsc::channel();
        thread::spawn(move || {
            LOG_CONSOLE.with(|console| console.set(Some(uart)));
            let _ = done.send(uart.try_put_char(b'a', Timeout::Micros(100)));
        });

        let result = finished.recv_timeout(Duration::from_secs(5)).expect("bounded transmit did not return");
        assert!(matches!(result, Err(HalError::HardwareTimeout { .. })));
        assert!(bus.writes_to(BASE + scif::FTDR).is_empty());
    }

    #[test]
    fn test_put_char_before_init_under_console_logger() {
        install_logger();
        let bus = leak(SimBus::new());
        let timer = leak(SimTimer::new());
        let config = UartConfig::new(BASE, 100_000_000, 115_200).unwrap();
        let uart: &'static StaticUart = leak(ScifUart::new(bus, timer, config));

        let (done, finished) = mpsc::channel();
        thread::spawn(move || {
            LOG_CONSOLE.with(|console| console.set(Some(uart)));
            uart.put_char(b'x');
            let _ = done.send(uart.try_put_char(b'y', Timeout::Micros(100)));
        });

        let result = finished
            .recv_timeout(Duration::from_secs(5))
            .expect("put_char on a disabled controller did not return");
        assert!(matches!(result, Err(HalError::InvalidParameter(_))));
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn test_concurrent_writers_each_complete() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        let uart = enabled_uart(&bus, &timer);
        // transmitter drains instantly
        bus.on_read(BASE + scif::FSR, |mem, _| {
            mem.set_bits(BASE + scif::FSR, Width::Half, Fsr::TX_READY.bits())
        });

        thread::scope(|s| {
            for byte in [b'x', b'y', b'z'] {
                let uart = &uart;
                s.spawn(move || {
                    for _ in 0..10 {
                        uart.put_char(byte);
                    }
                });
            }
        });

        let sent = bus.writes_to(BASE + scif::FTDR);
        assert_eq!(sent.len(), 30);
        assert_eq!(sent.iter().filter(|&&b| b == b'y' as u32).count(), 10);
    }

    #[test]
    fn test_console_output_translates_newlines() {
        let bus = SimBus::new();
        let timer = SimTimer::new();
        bus.on_read(BASE + scif::FSR, |mem, _| {
            mem.set_bits(BASE + scif::FSR, Width::Half, Fsr::TX_READY.bits())
        });

        let mut console = ActiveConsole::new();
        console.set(enabled_uart(&bus, &timer));
        assert_eq!(console.get().map(|d| d.name()), Some("scif"));

        let mut writer = console.writer().unwrap();
        core::fmt::Write::write_str(&mut writer, "hi\n").unwrap();
        console.get().unwrap().put_str("\n");

        assert_eq!(
            bus.writes_to(BASE + scif::FTDR),
            vec![b'h' as u32, b'i' as u32, b'\r' as u32, b'\n' as u32, b'\r' as u32, b'\n' as u32]
        );
    }
}
