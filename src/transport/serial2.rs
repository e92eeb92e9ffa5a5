//! Trait implementation using the `serial2` crate.

use std::path::Path;
use std::time::Duration;

use crate::ReadError;

/// Open a serial port with the settings shared by all supported devices.
///
/// The port is configured in raw mode with 8 data bits, no parity, 1 stop bit and [`crate::BAUD_RATE`].
pub fn open(path: impl AsRef<Path>) -> std::io::Result<serial2::SerialPort> {
	serial2::SerialPort::open(path, crate::BAUD_RATE)
}

impl crate::Transport for serial2::SerialPort {
	type Error = std::io::Error;

	fn discard_input_buffer(&mut self) -> Result<(), Self::Error> {
		serial2::SerialPort::discard_input_buffer(self)
	}

	fn read(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<usize, ReadError<Self::Error>> {
		self.set_read_timeout(timeout).map_err(ReadError::Io)?;
		match serial2::SerialPort::read(self, buffer) {
			Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(ReadError::Timeout),
			Err(e) => Err(ReadError::Io(e)),
			Ok(count) => Ok(count),
		}
	}

	fn write_all(&mut self, buffer: &[u8]) -> Result<(), Self::Error> {
		serial2::SerialPort::write_all(self, buffer)
	}
}
