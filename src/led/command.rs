use super::FORMAT;
use crate::{PayloadTooLarge, PixelColor};

/// Command IDs of the LED board protocol.
#[rustfmt::skip]
#[allow(missing_docs)]
pub mod command_id {
	pub const RESET           : u8 = 0x10;
	pub const SET_TIMEOUT     : u8 = 0x11;
	pub const SET_RESPONSE    : u8 = 0x14;
	pub const SET_PIXEL_DATA  : u8 = 0x82;
	pub const SET_PIXEL_COUNT : u8 = 0x86;
	pub const GET_INFO        : u8 = 0xF0;
	pub const GET_STATUS      : u8 = 0xF1;
}

/// The argument of the reset command.
pub const RESET_MAGIC: u8 = 0xD9;

/// A request sent to the LED board.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command<'a> {
	/// Reset the board. The board answers with a ready response.
	Reset,

	/// Request the device information.
	GetInfo,

	/// Set the timeout after which the board turns the LEDs off if it receives no data.
	SetTimeout {
		/// The timeout in milliseconds.
		ms: u16,
	},

	/// Request the board status.
	GetStatus,

	/// Enable or disable responses to pixel data.
	SetResponse {
		/// If true, the board acknowledges each request.
		enabled: bool,
	},

	/// Set the color of every LED.
	SetPixelData(&'a [PixelColor]),

	/// Set the number of LEDs on the strip.
	///
	/// Only the low byte of the count is sent.
	SetPixelCount {
		/// The number of LEDs.
		count: u16,
	},
}

impl Command<'_> {
	/// The command ID byte of the request.
	pub fn command_id(&self) -> u8 {
		match self {
			Self::Reset => command_id::RESET,
			Self::GetInfo => command_id::GET_INFO,
			Self::SetTimeout { .. } => command_id::SET_TIMEOUT,
			Self::GetStatus => command_id::GET_STATUS,
			Self::SetResponse { .. } => command_id::SET_RESPONSE,
			Self::SetPixelData(_) => command_id::SET_PIXEL_DATA,
			Self::SetPixelCount { .. } => command_id::SET_PIXEL_COUNT,
		}
	}

	/// Append the argument bytes of the request to a buffer.
	///
	/// Pixel data is sent as `[r, g, b]` for each LED.
	pub fn encode_arguments(&self, buffer: &mut Vec<u8>) {
		match self {
			Self::Reset => buffer.push(RESET_MAGIC),
			Self::SetTimeout { ms } => buffer.extend_from_slice(&ms.to_be_bytes()),
			Self::SetResponse { enabled } => buffer.push(u8::from(*enabled)),
			Self::SetPixelData(colors) => {
				buffer.reserve(colors.len() * 3);
				for color in colors.iter() {
					buffer.extend_from_slice(&[color.r, color.g, color.b]);
				}
			},
			Self::SetPixelCount { count } => buffer.push(*count as u8),
			Self::GetInfo | Self::GetStatus => (),
		}
	}

	/// Encode the frame body of the request into a buffer: `[destination, source, len, command, arguments...]`.
	///
	/// The length field counts the command byte and the arguments.
	/// The buffer is cleared first.
	pub fn encode_body(&self, destination: u8, source: u8, buffer: &mut Vec<u8>) -> Result<(), PayloadTooLarge> {
		buffer.clear();
		buffer.extend_from_slice(&[destination, source, 0, self.command_id()]);
		self.encode_arguments(buffer);
		buffer[2] = FORMAT.check_length_field(buffer.len() - 3)?;
		Ok(())
	}
}
