use crate::{Frame, InvalidAddress, InvalidLength, InvalidMessage, InvalidStatus, UnknownReport};

/// The address of the host on the JVS bus.
pub const HOST_ADDRESS: u8 = 0x00;

/// The status byte of a successful response.
pub const STATUS_OK: u8 = 0x01;

/// The report byte of a successful response.
pub const REPORT_OK: u8 = 0x01;

/// The decoded length of the smallest valid response.
const MIN_LEN: usize = 6;

/// A successful response from a JVS node.
///
/// Responses look like `[0xE0, destination, len, status, report, data..., checksum]`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Response {
	/// The data after the report byte.
	pub data: Vec<u8>,
}

impl Response {
	/// Decode and validate a response frame.
	///
	/// The response must be addressed to the host and carry a success status and report.
	pub fn decode(frame: &Frame) -> Result<Self, InvalidMessage> {
		let bytes = frame.as_bytes();
		InvalidLength::check(bytes.len(), MIN_LEN)?;
		InvalidAddress::check(bytes[1], HOST_ADDRESS)?;
		InvalidStatus::check(bytes[3], STATUS_OK)?;
		if bytes[4] != REPORT_OK {
			return Err(UnknownReport { report: bytes[4] }.into());
		}
		Ok(Self {
			data: bytes[5..bytes.len() - 1].to_vec(),
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::framing::{decode, encode};
	use crate::jvs::FORMAT;
	use assert2::{assert, let_assert};

	fn frame(body: &[u8]) -> Frame {
		let_assert!(Some(frame) = decode(&FORMAT, &encode(&FORMAT, body)));
		frame
	}

	#[test]
	fn test_decode_ok() {
		let_assert!(Ok(response) = Response::decode(&frame(&[0x00, 0x06, 0x01, 0x01, 0x80, 0x00, 0x40])));
		assert!(response.data == [0x80, 0x00, 0x40]);

		let_assert!(Ok(response) = Response::decode(&frame(&[0x00, 0x03, 0x01, 0x01])));
		assert!(response.data.is_empty());
	}

	#[test]
	fn test_frame_escapes_in_length_and_data() {
		for len in [0xE0u8, 0xD0] {
			let mut body = vec![HOST_ADDRESS, len, STATUS_OK, REPORT_OK];
			let data: Vec<u8> = (0..usize::from(len) - 3).map(|i| if i % 2 == 0 { 0xD0 } else { 0xE0 }).collect();
			body.extend_from_slice(&data);

			let encoded = encode(&FORMAT, &body);
			let_assert!(Some(frame) = decode(&FORMAT, &encoded));
			assert!(frame.body() == body);
			assert!(frame.len() == usize::from(len) + 3);
			assert!(let Ok(()) = frame.verify(&FORMAT));
			let_assert!(Ok(response) = Response::decode(&frame));
			assert!(response.data == data);
		}
	}

	#[test]
	fn test_frame_escapes_in_address() {
		// Checksum: 0xE0 + 0x03 + 0xF0 + 0xD0 = 0x2A3 -> 0xA3.
		let body = [0xE0, 0x03, 0xF0, 0xD0];
		let encoded = encode(&FORMAT, &body);
		assert!(encoded == [0xE0, 0xD0, 0xDF, 0x03, 0xF0, 0xD0, 0xCF, 0xA3]);
		let_assert!(Some(frame) = decode(&FORMAT, &encoded));
		assert!(frame.body() == body);
		assert!(let Ok(()) = frame.verify(&FORMAT));
	}

	#[test]
	fn test_decode_errors() {
		let_assert!(Err(InvalidMessage::InvalidAddress(e)) = Response::decode(&frame(&[0x01, 0x03, 0x01, 0x01])));
		assert!(e.actual == 0x01);
		assert!(e.expected == 0x00);

		let_assert!(Err(InvalidMessage::InvalidStatus(e)) = Response::decode(&frame(&[0x00, 0x03, 0x02, 0x01])));
		assert!(e.status == 0x02);

		let_assert!(Err(InvalidMessage::UnknownReport(e)) = Response::decode(&frame(&[0x00, 0x03, 0x01, 0x02])));
		assert!(e.report == 0x02);

		let_assert!(Err(InvalidMessage::InvalidLength(_)) = Response::decode(&frame(&[0x00, 0x01])));
	}
}
