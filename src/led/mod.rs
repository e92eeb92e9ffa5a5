//! Addressable LED strip board.
//!
//! Requests look like `[0xE0, destination, source, len, command, arguments..., checksum]`.
//! Responses look like `[0xE0, destination, source, len, status, command, report, data..., checksum]`.
//! The checksum is the sum of all bytes after SYNC.
//!
//! After the handshake the board is driven with fire-and-forget pixel pushes:
//! responses are disabled, so [`LedBoard::write_pixels()`] never waits for the board.

use log::{debug, info, trace, warn};
#[cfg(feature = "serial2")]
use std::path::Path;
use std::time::Duration;

use crate::checksum::ChecksumKind;
use crate::{
	Bus, ChecksumPolicy, DeviceInfo, FrameFormat, HandshakeError, InvalidAddress, InvalidPixelCount, PixelColor,
	ReadError, RetryPolicy, TransferError, Transport, UnknownReport, WriteError,
};

mod command;
mod response;
mod surface;

pub use command::{command_id, Command, RESET_MAGIC};
pub use response::{Response, ResponseHeader, STATUS_OK};
pub use surface::{LedSurface, AIR_TOWER_COUNT, PIXELS_PER_STRIP};

/// The frame format of the LED board protocol.
pub const FORMAT: FrameFormat = FrameFormat {
	sync: 0xE0,
	escape: 0xD0,
	checksum: ChecksumKind::Sum,
	checksum_covers_sync: false,
	length_index: 3,
	length_offset: 5,
};

/// The default address of the board.
pub const BOARD_ADDRESS: u8 = 0x02;

/// The default address of the host.
pub const HOST_ADDRESS: u8 = 0x01;

/// The highest number of LEDs whose pixel data fits in a single frame.
pub const MAX_LED_COUNT: usize = (FrameFormat::MAX_LENGTH_FIELD - 1) / 3;

/// Settings for an LED board session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LedBoardConfig {
	/// The number of LEDs connected to the board.
	pub led_count: usize,

	/// The timeout for reading a single response.
	pub read_timeout: Duration,

	/// The retry budget for the reset handshake.
	pub retry: RetryPolicy,

	/// What to do with responses that have a bad checksum.
	pub checksum_policy: ChecksumPolicy,

	/// The address of the board, used as destination of requests.
	pub board_address: u8,

	/// The address of the host, used as source of requests.
	pub host_address: u8,
}

impl LedBoardConfig {
	/// Create a configuration for a board with the given number of LEDs.
	pub fn new(led_count: usize) -> Self {
		Self {
			led_count,
			read_timeout: Duration::from_secs(3),
			retry: RetryPolicy::fixed(30, Duration::from_secs(1)),
			checksum_policy: ChecksumPolicy::Warn,
			board_address: BOARD_ADDRESS,
			host_address: HOST_ADDRESS,
		}
	}

	/// Set the timeout for reading a single response.
	#[must_use]
	pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
		self.read_timeout = read_timeout;
		self
	}

	/// Set the retry budget for the reset handshake.
	#[must_use]
	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	/// Set the checksum policy.
	#[must_use]
	pub fn with_checksum_policy(mut self, checksum_policy: ChecksumPolicy) -> Self {
		self.checksum_policy = checksum_policy;
		self
	}

	/// Set the addresses of the board and the host.
	#[must_use]
	pub fn with_addresses(mut self, board_address: u8, host_address: u8) -> Self {
		self.board_address = board_address;
		self.host_address = host_address;
		self
	}
}

/// A connected LED board.
#[derive(Debug)]
pub struct LedBoard<T> {
	bus: Bus<T>,
	config: LedBoardConfig,
	body: Vec<u8>,
}

#[cfg(feature = "serial2")]
impl LedBoard<serial2::SerialPort> {
	/// Open a serial port and connect to the LED board.
	pub fn open(path: impl AsRef<Path>, config: LedBoardConfig) -> Result<Self, crate::ConnectError<std::io::Error>> {
		let serial_port = crate::transport::serial2::open(path).map_err(crate::ConnectError::Open)?;
		Ok(Self::connect(serial_port, config)?)
	}
}

impl<T> LedBoard<T>
where
	T: Transport,
{
	/// Connect to an LED board over an open transport.
	///
	/// This resets the board until it reports that it is ready,
	/// disables responses and sets the pixel count.
	///
	/// Fails with [`WriteError::PayloadTooLarge`] before anything is written
	/// if the board has more than [`MAX_LED_COUNT`] LEDs.
	pub fn connect(transport: T, config: LedBoardConfig) -> Result<Self, HandshakeError<T::Error>> {
		// The length field of a pixel push counts the command byte and three bytes per LED.
		let pixel_data_len = config.led_count.saturating_mul(3).saturating_add(1);
		FORMAT
			.check_length_field(pixel_data_len)
			.map_err(WriteError::<T::Error>::from)?;

		let bus = Bus::new(transport, FORMAT, config.read_timeout, config.checksum_policy);
		let mut board = Self {
			bus,
			config,
			body: Vec::with_capacity(256),
		};
		board.reset()?;

		// The board still answers this one, but the answer carries nothing of interest.
		board.send_command(&Command::SetResponse { enabled: false })?;
		match board.receive_response() {
			Ok(response) => trace!("response to set response: {:?}", response),
			Err(ReadError::Io(e)) => return Err(ReadError::Io(e).into()),
			Err(e) => debug!("no valid response to set response: {}", e),
		}

		board.send_command(&Command::SetPixelCount {
			count: board.config.led_count as u16,
		})?;
		info!("LED board ready with {} LEDs", board.config.led_count);
		Ok(board)
	}

	fn reset(&mut self) -> Result<(), HandshakeError<T::Error>> {
		let retry = self.config.retry.clone();
		retry.run(|attempt| {
			debug!("pinging LED board, attempt {}", attempt);
			match self.transfer(&Command::Reset) {
				Ok(Response::Ready) => Ok(Some(())),
				Ok(other) => {
					debug!("unexpected response to reset: {:?}", other);
					Ok(None)
				},
				Err(TransferError::ReadError(e)) if !matches!(e, ReadError::Io(_)) => {
					debug!("no valid response to reset: {}", e);
					Ok(None)
				},
				Err(e) => Err(e),
			}
		})?;
		info!("LED board connected");
		Ok(())
	}

	/// The configuration of the session.
	pub fn config(&self) -> &LedBoardConfig {
		&self.config
	}

	/// The number of LEDs connected to the board.
	pub fn led_count(&self) -> usize {
		self.config.led_count
	}

	/// Get a reference to the underlying transport.
	pub fn transport(&self) -> &T {
		self.bus.transport()
	}

	/// Encode and write a single command.
	///
	/// This does not wait for a response.
	pub fn send_command(&mut self, command: &Command) -> Result<(), WriteError<T::Error>> {
		command.encode_body(self.config.board_address, self.config.host_address, &mut self.body)?;
		self.bus.write_frame(&self.body)
	}

	/// Read and decode a single response.
	///
	/// Unexpected addresses are logged but do not fail the read.
	pub fn receive_response(&mut self) -> Result<Response, ReadError<T::Error>> {
		let frame = self.bus.read_frame()?;
		let header = ResponseHeader::parse(&frame)?;
		if let Err(e) = InvalidAddress::check(header.destination, self.config.host_address) {
			warn!("LED board response has unexpected destination: {}", e);
		}
		if let Err(e) = InvalidAddress::check(header.source, self.config.board_address) {
			warn!("LED board response has unexpected source: {}", e);
		}
		Ok(Response::decode(&frame)?)
	}

	/// Send a command and read the response.
	///
	/// Only useful for commands the board answers even with responses disabled, such as [`Command::GetInfo`].
	pub fn transfer(&mut self, command: &Command) -> Result<Response, TransferError<T::Error>> {
		self.send_command(command)?;
		Ok(self.receive_response()?)
	}

	/// Request the device information.
	pub fn device_info(&mut self) -> Result<DeviceInfo, TransferError<T::Error>> {
		match self.transfer(&Command::GetInfo)? {
			Response::Info(info) => Ok(info),
			other => Err(UnknownReport {
				report: other.command_id(),
			}
			.into()),
		}
	}

	/// Set the timeout after which the board turns the LEDs off if it receives no pixel data.
	pub fn set_timeout(&mut self, ms: u16) -> Result<(), WriteError<T::Error>> {
		self.send_command(&Command::SetTimeout { ms })
	}

	/// Set the color of every LED.
	///
	/// The buffer must have exactly one color for each LED.
	pub fn write_pixels(&mut self, colors: &[PixelColor]) -> Result<(), WriteError<T::Error>> {
		InvalidPixelCount::check(colors.len(), self.config.led_count)?;
		self.send_command(&Command::SetPixelData(colors))
	}

	/// Turn off all LEDs.
	pub fn clear(&mut self) -> Result<(), WriteError<T::Error>> {
		let colors = vec![PixelColor::BLACK; self.config.led_count];
		self.write_pixels(&colors)
	}

	/// Turn off all LEDs, close the session and get back the transport.
	///
	/// A failure to turn off the LEDs is logged.
	pub fn close(mut self) -> T {
		if let Err(e) = self.clear() {
			warn!("failed to turn off LEDs: {}", e);
		}
		self.bus.into_transport()
	}
}
