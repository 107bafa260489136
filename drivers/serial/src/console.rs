//! # Console Capability
//!
//! The firmware console is a single "write one byte" operation bound to one
//! device. [`ActiveConsole`] holds at most one such device and is owned by
//! whoever brings the platform up; there is no global registry.

use core::convert::Infallible;
use core::fmt;

use rzf_hal::{RegisterBus, Timer};

use crate::uart::ScifUart;

// =============================================================================
// CONSOLE DEVICE
// =============================================================================

/// A byte sink usable as the firmware console
pub trait ConsoleDevice {
    /// Device name
    fn name(&self) -> &'static str;

    /// Write one byte, blocking until the device accepts it
    fn write_byte(&self, byte: u8);

    /// Write a string, LF sent as CR LF
    fn write_str(&self, s: &str) {
        write_translated(self, s.as_bytes());
    }
}

impl<D: ConsoleDevice + ?Sized> ConsoleDevice for &D {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn write_byte(&self, byte: u8) {
        (**self).write_byte(byte)
    }
}

impl<B: RegisterBus, T: Timer> ConsoleDevice for ScifUart<B, T> {
    fn name(&self) -> &'static str {
        "scif"
    }

    fn write_byte(&self, byte: u8) {
        self.put_char(byte)
    }
}

/// Send `bytes` to `device`, inserting CR before every LF
pub fn write_translated<D: ConsoleDevice + ?Sized>(device: &D, bytes: &[u8]) {
    for &byte in bytes {
        if byte == b'\n' {
            device.write_byte(b'\r');
        }
        device.write_byte(byte);
    }
}

// =============================================================================
// ACTIVE CONSOLE
// =============================================================================

/// Holder of the one active console device
#[derive(Debug)]
pub struct ActiveConsole<D> {
    device: Option<D>,
}

impl<D> Default for ActiveConsole<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> ActiveConsole<D> {
    /// No console
    pub const fn new() -> Self {
        Self { device: None }
    }

    /// Make `device` the console, returning the one it replaces
    pub fn set(&mut self, device: D) -> Option<D> {
        self.device.replace(device)
    }

    /// Remove the console
    pub fn take(&mut self) -> Option<D> {
        self.device.take()
    }

    /// The active device
    pub fn get(&self) -> Option<&D> {
        self.device.as_ref()
    }

    /// Check if a console is active
    pub fn is_active(&self) -> bool {
        self.device.is_some()
    }
}

impl<D: ConsoleDevice> ActiveConsole<D> {
    /// Write one byte; discarded when no console is active
    pub fn putc(&self, byte: u8) {
        if let Some(device) = &self.device {
            device.write_byte(byte);
        }
    }

    /// Formatter over the active console
    pub fn writer(&self) -> Option<ConsoleWriter<'_, D>> {
        self.device.as_ref().map(ConsoleWriter::new)
    }
}

// =============================================================================
// CONSOLE WRITER
// =============================================================================

/// `fmt::Write` and `embedded_io::Write` adapter over a console device
#[derive(Debug)]
pub struct ConsoleWriter<'a, D: ?Sized> {
    device: &'a D,
}

impl<'a, D: ConsoleDevice + ?Sized> ConsoleWriter<'a, D> {
    /// Wrap `device`
    pub fn new(device: &'a D) -> Self {
        Self { device }
    }
}

impl<D: ConsoleDevice + ?Sized> fmt::Write for ConsoleWriter<'_, D> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_translated(self.device, s.as_bytes());
        Ok(())
    }
}

impl<D: ConsoleDevice + ?Sized> embedded_io::ErrorType for ConsoleWriter<'_, D> {
    type Error = Infallible;
}

impl<D: ConsoleDevice + ?Sized> embedded_io::Write for ConsoleWriter<'_, D> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        write_translated(self.device, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;
    use core::fmt::Write as _;

    use super::*;

    #[derive(Default)]
    struct Capture {
        name: &'static str,
        bytes: RefCell<Vec<u8>>,
    }

    impl ConsoleDevice for Capture {
        fn name(&self) -> &'static str {
            self.name
        }

        fn write_byte(&self, byte: u8) {
            self.bytes.borrow_mut().push(byte);
        }
    }

    #[test]
    fn test_set_replaces_previous() {
        let mut console = ActiveConsole::new();
        assert!(console.set(Capture { name: "first", ..Default::default() }).is_none());

        let previous = console.set(Capture { name: "second", ..Default::default() });

        assert_eq!(previous.map(|d| d.name), Some("first"));
        assert_eq!(console.get().map(|d| d.name()), Some("second"));
    }

    #[test]
    fn test_writer_translates_newlines() {
        let device = Capture::default();
        let mut writer = ConsoleWriter::new(&device);

        writeln!(writer, "ok {}", 1).unwrap();
        embedded_io::Write::write_all(&mut writer, b"a\nb").unwrap();

        assert_eq!(device.bytes.borrow().as_slice(), b"ok 1\r\na\r\nb");
    }

    #[test]
    fn test_putc_without_console_is_discarded() {
        let console: ActiveConsole<Capture> = ActiveConsole::new();
        console.putc(b'x');
        assert!(console.writer().is_none());
        assert!(!console.is_active());
    }
}
