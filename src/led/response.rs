use super::command_id;
use crate::{DeviceInfo, Frame, InvalidLength, InvalidMessage, InvalidStatus, UnknownReport};

/// The status byte of a successful response.
pub const STATUS_OK: u8 = 0x01;

/// The decoded length of the smallest valid response.
const MIN_LEN: usize = 8;

/// A response decoded from an LED board frame.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Response {
	/// The board finished a reset and is ready for commands.
	Ready,

	/// The device information.
	Info(DeviceInfo),

	/// The board acknowledged pixel data.
	PixelAck,

	/// The board acknowledged another command.
	Ack {
		/// The command that was acknowledged.
		command: u8,

		/// The report byte.
		report: u8,

		/// Any data following the report byte.
		data: Vec<u8>,
	},
}

/// The header fields of a response frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ResponseHeader {
	/// The destination address (the host).
	pub destination: u8,

	/// The source address (the board).
	pub source: u8,

	/// The status byte.
	pub status: u8,

	/// The command the response belongs to.
	pub command: u8,

	/// The report byte.
	pub report: u8,
}

impl ResponseHeader {
	/// Read the header of a response frame: `[SYNC, destination, source, len, status, command, report, data..., checksum]`.
	pub fn parse(frame: &Frame) -> Result<Self, InvalidLength> {
		let data = frame.as_bytes();
		InvalidLength::check(data.len(), MIN_LEN)?;
		Ok(Self {
			destination: data[1],
			source: data[2],
			status: data[4],
			command: data[5],
			report: data[6],
		})
	}
}

impl Response {
	/// Decode a response from a frame.
	///
	/// The addresses are not checked here.
	/// A status other than [`STATUS_OK`] is reported as an [`InvalidStatus`] error.
	pub fn decode(frame: &Frame) -> Result<Self, InvalidMessage> {
		let header = ResponseHeader::parse(frame)?;
		InvalidStatus::check(header.status, STATUS_OK)?;
		let bytes = frame.as_bytes();
		let data = &bytes[7..bytes.len() - 1];

		match header.command {
			command_id::RESET => Ok(Self::Ready),
			command_id::GET_INFO => Ok(Self::Info(DeviceInfo::parse(data)?)),
			command_id::SET_PIXEL_DATA => Ok(Self::PixelAck),
			command_id::SET_TIMEOUT | command_id::SET_RESPONSE | command_id::SET_PIXEL_COUNT | command_id::GET_STATUS => {
				Ok(Self::Ack {
					command: header.command,
					report: header.report,
					data: data.to_vec(),
				})
			},
			report => Err(UnknownReport { report }.into()),
		}
	}

	/// The command ID of the request the response belongs to.
	pub fn command_id(&self) -> u8 {
		match self {
			Self::Ready => command_id::RESET,
			Self::Info(_) => command_id::GET_INFO,
			Self::PixelAck => command_id::SET_PIXEL_DATA,
			Self::Ack { command, .. } => *command,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::framing::{decode, encode};
	use crate::led::FORMAT;
	use assert2::{assert, let_assert};

	fn frame(body: &[u8]) -> Frame {
		let_assert!(Some(frame) = decode(&FORMAT, &encode(&FORMAT, body)));
		frame
	}

	#[test]
	fn test_decode_ready() {
		let frame = frame(&[0x01, 0x02, 0x03, 0x01, 0x10, 0x01]);
		let_assert!(Ok(header) = ResponseHeader::parse(&frame));
		assert!(header.destination == 0x01);
		assert!(header.source == 0x02);
		assert!(let Ok(Response::Ready) = Response::decode(&frame));
	}

	#[test]
	fn test_decode_bad_status() {
		let_assert!(Err(InvalidMessage::InvalidStatus(e)) = Response::decode(&frame(&[0x01, 0x02, 0x03, 0x02, 0x10, 0x01])));
		assert!(e.status == 0x02);
	}

	#[test]
	fn test_decode_info() {
		let mut body = vec![0x01, 0x02, 0x15, 0x01, 0xF0, 0x01];
		body.extend_from_slice(b"15093-06\x0A6710 \xFF\x00\x00\x00");
		let_assert!(Ok(Response::Info(info)) = Response::decode(&frame(&body)));
		assert!(info.model == "15093-06");
		assert!(info.class == 0x0A);
		assert!(info.chip == "6710");
		assert!(info.firmware_version == 0xFF);
	}

	#[test]
	fn test_decode_ack() {
		let_assert!(Ok(response) = Response::decode(&frame(&[0x01, 0x02, 0x04, 0x01, 0x14, 0x01, 0x00])));
		assert!(response == Response::Ack { command: 0x14, report: 0x01, data: vec![0x00] });
		let_assert!(Ok(Response::PixelAck) = Response::decode(&frame(&[0x01, 0x02, 0x03, 0x01, 0x82, 0x01])));
	}

	#[test]
	fn test_frame_escapes_in_header() {
		// Both addresses collide with SYNC and ESCAPE.
		let body = [0xE0, 0xD0, 0x03, 0xE0, 0xD0, 0x10];
		let encoded = encode(&FORMAT, &body);
		assert!(encoded == [0xE0, 0xD0, 0xDF, 0xD0, 0xCF, 0x03, 0xD0, 0xDF, 0xD0, 0xCF, 0x10, 0x73]);
		let_assert!(Some(frame) = decode(&FORMAT, &encoded));
		assert!(frame.body() == body);
		assert!(let Ok(()) = frame.verify(&FORMAT));
		let_assert!(Ok(header) = ResponseHeader::parse(&frame));
		assert!(header.destination == 0xE0);
		assert!(header.source == 0xD0);
		assert!(header.report == 0x10);
	}

	#[test]
	fn test_frame_escapes_in_length_and_data() {
		for len in [0xE0u8, 0xD0] {
			let mut body = vec![0x01, 0x02, len, STATUS_OK, command_id::GET_STATUS, 0x01];
			let data: Vec<u8> = (0..usize::from(len) - 3).map(|i| if i % 2 == 0 { 0xE0 } else { 0xD0 }).collect();
			body.extend_from_slice(&data);

			let encoded = encode(&FORMAT, &body);
			let_assert!(Some(frame) = decode(&FORMAT, &encoded));
			assert!(frame.body() == body);
			assert!(frame.len() == usize::from(len) + 5);
			assert!(let Ok(()) = frame.verify(&FORMAT));
			let_assert!(Ok(response) = Response::decode(&frame));
			assert!(response == Response::Ack { command: command_id::GET_STATUS, report: 0x01, data });
		}
	}

	#[test]
	fn test_decode_short_and_unknown() {
		let_assert!(Err(InvalidMessage::InvalidLength(_)) = Response::decode(&frame(&[0x01, 0x02, 0x01, 0x01])));
		let_assert!(Err(InvalidMessage::UnknownReport(e)) = Response::decode(&frame(&[0x01, 0x02, 0x03, 0x01, 0x42, 0x01])));
		assert!(e.report == 0x42);
	}
}
