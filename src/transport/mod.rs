//! [`Transport`] trait to support reading/writing over different serial port implementations.

use std::time::Duration;

use crate::ReadError;

#[cfg(feature = "serial2")]
pub mod serial2;

/// Transports carry raw bytes between a session and a device.
///
/// The implementor of the trait must configure the serial line for 8 bits characters, 1 stop bit,
/// no parity and no flow control, at the baud rate used by the device ([`crate::BAUD_RATE`]).
///
/// A transport is owned by exactly one session.
pub trait Transport {
	/// The error type returned by the transport when reading or writing.
	type Error: std::fmt::Debug + std::fmt::Display;

	/// Discard the input buffer of the transport. Maybe a no-op on some platforms.
	fn discard_input_buffer(&mut self) -> Result<(), Self::Error>;

	/// Returns available bytes to read, blocking until at least one byte is available or the timeout expires.
	///
	/// Must return [`ReadError::Timeout`] if no data arrived before the timeout.
	fn read(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<usize, ReadError<Self::Error>>;

	/// Write all bytes in the buffer to the transport.
	fn write_all(&mut self, buffer: &[u8]) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
	type Error = T::Error;

	fn discard_input_buffer(&mut self) -> Result<(), Self::Error> {
		(**self).discard_input_buffer()
	}

	fn read(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<usize, ReadError<Self::Error>> {
		(**self).read(buffer, timeout)
	}

	fn write_all(&mut self, buffer: &[u8]) -> Result<(), Self::Error> {
		(**self).write_all(buffer)
	}
}
