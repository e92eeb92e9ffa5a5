use super::{LedState, FORMAT};
use crate::PayloadTooLarge;

/// Command IDs of the slider protocol.
#[rustfmt::skip]
#[allow(missing_docs)]
pub mod command_id {
	pub const SINGLE_REPORT  : u8 = 0x01;
	pub const LED            : u8 = 0x02;
	pub const ENABLE_REPORT  : u8 = 0x03;
	pub const DISABLE_REPORT : u8 = 0x04;
	pub const PING_PONG      : u8 = 0x05;
	pub const RESET          : u8 = 0x10;
	pub const EXCEPTION      : u8 = 0xEE;
	pub const GET_INFO       : u8 = 0xF0;
}

/// A request sent to the slider.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
	/// Request a single touch report.
	SingleReport,

	/// Set the LEDs without requesting a report.
	Led(LedState),

	/// Start sending touch reports continuously.
	EnableReport,

	/// Stop sending touch reports.
	DisableReport,

	/// Set the LEDs and request a single touch report in one exchange.
	PingPong(LedState),

	/// Reset the slider. The slider answers with a ready response.
	Reset,

	/// Request the device information.
	GetInfo,
}

impl Command {
	/// The command ID byte of the request.
	pub fn command_id(&self) -> u8 {
		match self {
			Self::SingleReport => command_id::SINGLE_REPORT,
			Self::Led(_) => command_id::LED,
			Self::EnableReport => command_id::ENABLE_REPORT,
			Self::DisableReport => command_id::DISABLE_REPORT,
			Self::PingPong(_) => command_id::PING_PONG,
			Self::Reset => command_id::RESET,
			Self::GetInfo => command_id::GET_INFO,
		}
	}

	/// Append the argument bytes of the request to a buffer.
	///
	/// LED colors are sent as `[brightness]` followed by `[b, r, g]` for each LED.
	pub fn encode_arguments(&self, buffer: &mut Vec<u8>) {
		match self {
			Self::Led(leds) | Self::PingPong(leds) => {
				buffer.push(leds.brightness);
				for color in &leds.colors {
					buffer.extend_from_slice(&[color.b, color.r, color.g]);
				}
			},
			Self::SingleReport | Self::EnableReport | Self::DisableReport | Self::Reset | Self::GetInfo => (),
		}
	}

	/// Encode the frame body of the request into a buffer: `[command, argc, arguments...]`.
	///
	/// The buffer is cleared first.
	pub fn encode_body(&self, buffer: &mut Vec<u8>) -> Result<(), PayloadTooLarge> {
		buffer.clear();
		buffer.push(self.command_id());
		buffer.push(0);
		self.encode_arguments(buffer);
		buffer[1] = FORMAT.check_length_field(buffer.len() - 2)?;
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::PixelColor;
	use assert2::assert;

	#[test]
	fn test_encode_reset() {
		let mut body = Vec::new();
		assert!(let Ok(()) = Command::Reset.encode_body(&mut body));
		assert!(body == [0x10, 0x00]);
	}

	#[test]
	fn test_encode_ping_pong() {
		let mut leds = LedState::new(0xFE);
		leds.colors[0] = PixelColor::new(0x11, 0x22, 0x33);
		leds.colors[30] = PixelColor::new(0x44, 0x55, 0x66);

		let mut body = Vec::new();
		assert!(let Ok(()) = Command::PingPong(leds).encode_body(&mut body));
		assert!(body.len() == 2 + 1 + 31 * 3);
		assert!(body[0..6] == [0x05, 94, 0xFE, 0x33, 0x11, 0x22]);
		assert!(body[93..] == [0x66, 0x44, 0x55]);
	}
}
