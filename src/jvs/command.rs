use super::FORMAT;
use crate::PayloadTooLarge;

/// Command IDs of the JVS protocol.
#[rustfmt::skip]
#[allow(missing_docs)]
pub mod command_id {
	pub const IDENTIFY      : u8 = 0x10;
	pub const READ_SWITCHES : u8 = 0x20;
	pub const RESET         : u8 = 0xF0;
	pub const SET_ADDRESS   : u8 = 0xF1;
}

/// The argument of the reset command.
pub const RESET_MAGIC: u8 = 0xD9;

/// A request sent to a JVS node.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
	/// Reset all nodes. Nodes forget their address. There is no response.
	Reset,

	/// Assign an address to the first node without one.
	SetAddress(u8),

	/// Request the identification string of a node.
	Identify,

	/// Read the switch inputs.
	ReadSwitches {
		/// The number of players to read.
		players: u8,

		/// The number of bytes to read for each player.
		bytes_per_player: u8,
	},
}

impl Command {
	/// The command ID byte of the request.
	pub fn command_id(&self) -> u8 {
		match self {
			Self::Reset => command_id::RESET,
			Self::SetAddress(_) => command_id::SET_ADDRESS,
			Self::Identify => command_id::IDENTIFY,
			Self::ReadSwitches { .. } => command_id::READ_SWITCHES,
		}
	}

	/// Append the argument bytes of the request to a buffer.
	pub fn encode_arguments(&self, buffer: &mut Vec<u8>) {
		match self {
			Self::Reset => buffer.push(RESET_MAGIC),
			Self::SetAddress(address) => buffer.push(*address),
			Self::Identify => (),
			Self::ReadSwitches {
				players,
				bytes_per_player,
			} => buffer.extend_from_slice(&[*players, *bytes_per_player]),
		}
	}

	/// Encode the frame body of the request into a buffer: `[destination, len, command, arguments...]`.
	///
	/// The length field counts the command byte, the arguments and the checksum.
	/// The buffer is cleared first.
	pub fn encode_body(&self, destination: u8, buffer: &mut Vec<u8>) -> Result<(), PayloadTooLarge> {
		buffer.clear();
		buffer.extend_from_slice(&[destination, 0, self.command_id()]);
		self.encode_arguments(buffer);
		buffer[1] = FORMAT.check_length_field(buffer.len() - 1)?;
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::framing::encode;
	use assert2::{assert, let_assert};

	fn body(destination: u8, command: &Command) -> Vec<u8> {
		let mut buffer = Vec::new();
		let_assert!(Ok(()) = command.encode_body(destination, &mut buffer));
		buffer
	}

	#[test]
	fn test_encode_body() {
		assert!(body(0xFF, &Command::Reset) == [0xFF, 0x03, 0xF0, 0xD9]);
		assert!(body(0xFF, &Command::SetAddress(1)) == [0xFF, 0x03, 0xF1, 0x01]);
		assert!(body(0x01, &Command::Identify) == [0x01, 0x02, 0x10]);
		let read = Command::ReadSwitches {
			players: 2,
			bytes_per_player: 2,
		};
		assert!(body(0x01, &read) == [0x01, 0x04, 0x20, 0x02, 0x02]);
	}

	#[test]
	fn test_encode_frame() {
		// Sum of the body is 0x2CB, the checksum is 0xCB.
		let frame = encode(&FORMAT, &body(0xFF, &Command::Reset));
		assert!(frame == [0xE0, 0xFF, 0x03, 0xF0, 0xD9, 0xCB]);
	}
}
