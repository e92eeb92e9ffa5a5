//! Frame-level communication over a [`Transport`].

use log::{debug, trace, warn};
use std::time::{Duration, Instant};

use crate::framing::{ChecksumPolicy, Frame, FrameDecoder, FrameFormat};
use crate::{MissingSync, ReadError, TransferError, Transport, Truncated, WriteError};

const READ_CHUNK_SIZE: usize = 256;

/// A serial connection that speaks one frame format.
///
/// The bus owns the transport and is the only thing that reads from or writes to it.
/// Requests and responses strictly alternate:
/// writing a frame discards any unread input, so a stale response can never be mistaken for the answer to a new request.
pub struct Bus<T> {
	/// The underlying transport (normally a serial port).
	transport: T,

	/// The framing rules of the protocol.
	format: FrameFormat,

	/// The timeout for reading a single frame.
	read_timeout: Duration,

	/// What to do with frames that have a bad checksum.
	checksum_policy: ChecksumPolicy,

	/// The buffer for raw data read from the transport.
	read_buffer: Vec<u8>,

	/// The total number of valid bytes in the read buffer.
	read_len: usize,

	/// The number of leading bytes in the read buffer that have already been decoded.
	used_bytes: usize,

	/// The decoder holding any partially received frame.
	decoder: FrameDecoder,

	/// The buffer for outgoing frames.
	write_buffer: Vec<u8>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Bus<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Bus")
			.field("transport", &self.transport)
			.field("format", &self.format)
			.field("read_timeout", &self.read_timeout)
			.field("checksum_policy", &self.checksum_policy)
			.finish_non_exhaustive()
	}
}

impl<T> Bus<T>
where
	T: Transport,
{
	/// Create a new bus for an open transport.
	pub fn new(transport: T, format: FrameFormat, read_timeout: Duration, checksum_policy: ChecksumPolicy) -> Self {
		Self {
			transport,
			format,
			read_timeout,
			checksum_policy,
			read_buffer: vec![0; READ_CHUNK_SIZE],
			read_len: 0,
			used_bytes: 0,
			decoder: FrameDecoder::new(format),
			write_buffer: Vec::with_capacity(128),
		}
	}

	/// Get a reference to the underlying transport.
	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Consume the bus to get ownership of the transport.
	///
	/// Any partially received data is discarded.
	pub fn into_transport(self) -> T {
		self.transport
	}

	/// The frame format used by the bus.
	pub fn format(&self) -> &FrameFormat {
		&self.format
	}

	/// The timeout for reading a single frame.
	pub fn read_timeout(&self) -> Duration {
		self.read_timeout
	}

	/// Set the timeout for reading a single frame.
	pub fn set_read_timeout(&mut self, read_timeout: Duration) {
		self.read_timeout = read_timeout;
	}

	/// The checksum policy of the bus.
	pub fn checksum_policy(&self) -> ChecksumPolicy {
		self.checksum_policy
	}

	/// Write a frame body and read a single frame in response.
	pub fn transfer(&mut self, body: &[u8]) -> Result<Frame, TransferError<T::Error>> {
		self.write_frame(body)?;
		Ok(self.read_frame()?)
	}

	/// Encode and write a single frame.
	///
	/// The body is everything between the SYNC byte and the checksum.
	/// This does not wait for a response.
	pub fn write_frame(&mut self, body: &[u8]) -> Result<(), WriteError<T::Error>> {
		// Throw away old data in the read buffer and the kernel read buffer.
		self.read_len = 0;
		self.used_bytes = 0;
		self.decoder.reset();
		self.transport.discard_input_buffer().map_err(WriteError::DiscardBuffer)?;

		self.format.encode(body, &mut self.write_buffer);
		trace!("sending frame: {:02X?}", self.write_buffer);
		self.transport.write_all(&self.write_buffer).map_err(WriteError::Write)?;
		Ok(())
	}

	/// Read a single frame using the configured read timeout.
	pub fn read_frame(&mut self) -> Result<Frame, ReadError<T::Error>> {
		self.read_frame_timeout(self.read_timeout)
	}

	/// Read a single frame with the given timeout.
	///
	/// Leading garbage is skipped.
	/// A frame that arrives split over multiple reads is accumulated until it is complete.
	/// Any data after the frame is kept for the next call.
	pub fn read_frame_timeout(&mut self, timeout: Duration) -> Result<Frame, ReadError<T::Error>> {
		let deadline = Instant::now() + timeout;
		loop {
			// Decode data left over from a previous read first.
			let (frame, used) = self.decoder.push_slice(&self.read_buffer[self.used_bytes..self.read_len]);
			self.used_bytes += used;
			if let Some(frame) = frame {
				return self.finish_frame(frame);
			}
			self.read_len = 0;
			self.used_bytes = 0;

			let remaining = match deadline.checked_duration_since(Instant::now()) {
				Some(remaining) if !remaining.is_zero() => remaining,
				_ => return Err(self.incomplete_read()),
			};

			match self.transport.read(&mut self.read_buffer, remaining) {
				Ok(0) => continue,
				Ok(count) => self.read_len = count,
				Err(ReadError::Timeout) => return Err(self.incomplete_read()),
				Err(e) => {
					self.decoder.reset();
					return Err(e);
				},
			}
		}
	}

	fn finish_frame(&mut self, frame: Frame) -> Result<Frame, ReadError<T::Error>> {
		if self.decoder.discarded() > 0 {
			debug!("skipped {} bytes of leading garbage", self.decoder.discarded());
		}
		self.decoder.reset();
		trace!("read frame: {:02X?}", frame.as_bytes());

		if let Err(e) = frame.verify(&self.format) {
			match self.checksum_policy {
				ChecksumPolicy::Warn => warn!("{}, using frame anyway: {:02X?}", e, frame.as_bytes()),
				ChecksumPolicy::Reject => return Err(e.into()),
			}
		}
		Ok(frame)
	}

	/// Build the error for a read that ended without a complete frame.
	fn incomplete_read(&mut self) -> ReadError<T::Error> {
		let error = if self.decoder.in_frame() {
			trace!("timeout while reading frame, have {} bytes", self.decoder.partial_len());
			Truncated {
				expected: self.decoder.expected_len(),
				actual: self.decoder.partial_len(),
			}
			.into()
		} else if self.decoder.discarded() > 0 {
			debug!("received {} bytes without a SYNC byte", self.decoder.discarded());
			MissingSync {
				discarded: self.decoder.discarded(),
			}
			.into()
		} else {
			ReadError::Timeout
		};
		self.decoder.reset();
		error
	}
}
