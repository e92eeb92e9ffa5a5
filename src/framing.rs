//! Frame encoding and decoding.
//!
//! Every frame on the wire starts with an unescaped SYNC byte.
//! All following bytes, including the trailing checksum, are escaped:
//! a byte equal to SYNC or ESCAPE is sent as `[ESCAPE, byte - 1]`.
//! The receiver adds 1 back to any byte that follows an ESCAPE byte.
//!
//! The protocols only differ in the SYNC and ESCAPE values,
//! the checksum kind and the position and meaning of the length field.
//! Those differences are captured by [`FrameFormat`].

use log::debug;

use crate::checksum::ChecksumKind;
use crate::{InvalidChecksum, PayloadTooLarge};

/// The framing rules of a protocol.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameFormat {
	/// The byte that starts every frame.
	pub sync: u8,

	/// The byte that marks the next byte as escaped.
	pub escape: u8,

	/// The way the checksum byte is calculated.
	pub checksum: ChecksumKind,

	/// If true, the SYNC byte is included in the checksum.
	pub checksum_covers_sync: bool,

	/// The index of the length field in the decoded frame (SYNC is at index 0).
	pub length_index: usize,

	/// The total decoded frame length (SYNC and checksum included) minus the value of the length field.
	pub length_offset: usize,
}

/// What to do with a received frame that has a wrong checksum.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ChecksumPolicy {
	/// Log a warning and use the frame anyway.
	Warn,

	/// Discard the frame and report an [`InvalidChecksum`] error.
	Reject,
}

impl FrameFormat {
	/// The maximum value of the length field.
	pub const MAX_LENGTH_FIELD: usize = 0xFF;

	/// The decoded length of a frame with the given length field.
	pub fn frame_len(&self, length_field: u8) -> usize {
		usize::from(length_field) + self.length_offset
	}

	/// Check if a byte must be escaped on the wire.
	pub fn needs_escape(&self, byte: u8) -> bool {
		byte == self.sync || byte == self.escape
	}

	/// Calculate the checksum of a frame body.
	///
	/// The body is everything between the SYNC byte and the checksum.
	pub fn checksum(&self, body: &[u8]) -> u8 {
		let initial = if self.checksum_covers_sync { self.sync } else { 0 };
		self.checksum.update(initial, body)
	}

	/// Encode a frame body into `buffer`.
	///
	/// The buffer is cleared first.
	/// Afterwards, it holds the SYNC byte, the escaped body and the escaped checksum.
	pub fn encode(&self, body: &[u8], buffer: &mut Vec<u8>) {
		let checksum = self.checksum(body);
		buffer.clear();
		buffer.reserve(body.len() + 2);
		buffer.push(self.sync);
		for &byte in body.iter().chain(std::iter::once(&checksum)) {
			if self.needs_escape(byte) {
				buffer.push(self.escape);
				buffer.push(byte.wrapping_sub(1));
			} else {
				buffer.push(byte);
			}
		}
	}

	/// Check that a length field value can be encoded.
	pub fn check_length_field(&self, value: usize) -> Result<u8, PayloadTooLarge> {
		PayloadTooLarge::check(value, Self::MAX_LENGTH_FIELD)?;
		Ok(value as u8)
	}
}

/// A decoded frame.
///
/// The frame holds the unescaped bytes as they were sent:
/// the SYNC byte, the body and the checksum.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Frame {
	data: Vec<u8>,
}

impl Frame {
	/// Get the raw bytes of the decoded frame, including SYNC and checksum.
	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	/// The frame body, excluding SYNC and checksum.
	pub fn body(&self) -> &[u8] {
		&self.data[1..self.data.len() - 1]
	}

	/// The checksum byte from the frame.
	pub fn checksum(&self) -> u8 {
		self.data[self.data.len() - 1]
	}

	/// The decoded length of the frame, including SYNC and checksum.
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Check if the frame holds no bytes at all.
	///
	/// Frames produced by the decoder always hold at least the SYNC and checksum bytes.
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Get a decoded byte by index (SYNC is at index 0).
	pub fn get(&self, index: usize) -> Option<u8> {
		self.data.get(index).copied()
	}

	/// Verify the checksum of the frame.
	pub fn verify(&self, format: &FrameFormat) -> Result<(), InvalidChecksum> {
		InvalidChecksum::check(self.checksum(), format.checksum(self.body()))
	}

	/// Consume the frame and return the decoded bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.data
	}
}

/// Incremental frame decoder.
///
/// Bytes can be pushed one at a time as they arrive from the transport.
/// A frame may span any number of reads: the decoder keeps the partial frame and the escape state between calls.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
	format: FrameFormat,
	buffer: Vec<u8>,
	in_frame: bool,
	escaped: bool,
	discarded: usize,
}

impl FrameDecoder {
	/// Create a new decoder for the given frame format.
	pub fn new(format: FrameFormat) -> Self {
		Self {
			format,
			buffer: Vec::with_capacity(64),
			in_frame: false,
			escaped: false,
			discarded: 0,
		}
	}

	/// The frame format of the decoder.
	pub fn format(&self) -> &FrameFormat {
		&self.format
	}

	/// Check if the decoder is in the middle of a frame.
	pub fn in_frame(&self) -> bool {
		self.in_frame
	}

	/// The number of decoded bytes of the current partial frame.
	pub fn partial_len(&self) -> usize {
		if self.in_frame {
			self.buffer.len()
		} else {
			0
		}
	}

	/// The expected decoded length of the current frame, if the length field has been received.
	pub fn expected_len(&self) -> Option<usize> {
		if !self.in_frame {
			return None;
		}
		self.buffer
			.get(self.format.length_index)
			.map(|&length| self.format.frame_len(length))
	}

	/// The number of bytes discarded while searching for a SYNC byte since the last reset.
	pub fn discarded(&self) -> usize {
		self.discarded
	}

	/// Drop any partial frame and reset all counters.
	pub fn reset(&mut self) {
		self.buffer.clear();
		self.in_frame = false;
		self.escaped = false;
		self.discarded = 0;
	}

	/// Push a single raw byte into the decoder.
	///
	/// Returns a frame when the byte completes one.
	pub fn push(&mut self, byte: u8) -> Option<Frame> {
		if byte == self.format.sync {
			// SYNC is never escaped, so it always starts a new frame.
			if self.in_frame {
				debug!("discarding partial frame on SYNC: {:02X?}", self.buffer);
			}
			self.buffer.clear();
			self.buffer.push(byte);
			self.in_frame = true;
			self.escaped = false;
			return None;
		}

		if !self.in_frame {
			self.discarded += 1;
			return None;
		}

		if byte == self.format.escape {
			self.escaped = true;
			return None;
		}

		self.buffer.push(byte.wrapping_add(self.escaped as u8));
		self.escaped = false;

		match self.expected_len() {
			Some(expected) if self.buffer.len() >= expected => {
				self.in_frame = false;
				Some(Frame {
					data: std::mem::take(&mut self.buffer),
				})
			},
			_ => None,
		}
	}

	/// Push multiple raw bytes into the decoder.
	///
	/// Returns the first completed frame and the number of bytes consumed.
	/// Bytes after the completed frame are not consumed.
	pub fn push_slice(&mut self, data: &[u8]) -> (Option<Frame>, usize) {
		for (i, &byte) in data.iter().enumerate() {
			if let Some(frame) = self.push(byte) {
				return (Some(frame), i + 1);
			}
		}
		(None, data.len())
	}
}

/// Decode the first complete frame from a buffer.
///
/// Returns `None` if the buffer does not contain a complete frame.
pub fn decode(format: &FrameFormat, data: &[u8]) -> Option<Frame> {
	FrameDecoder::new(*format).push_slice(data).0
}

/// Encode a frame body into a new buffer.
pub fn encode(format: &FrameFormat, body: &[u8]) -> Vec<u8> {
	let mut buffer = Vec::new();
	format.encode(body, &mut buffer);
	buffer
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::{assert, let_assert};

	const FORMAT_A: FrameFormat = FrameFormat {
		sync: 0xFF,
		escape: 0xFD,
		checksum: ChecksumKind::NegatedSum,
		checksum_covers_sync: true,
		length_index: 2,
		length_offset: 4,
	};

	const FORMAT_B: FrameFormat = FrameFormat {
		sync: 0xE0,
		escape: 0xD0,
		checksum: ChecksumKind::Sum,
		checksum_covers_sync: false,
		length_index: 2,
		length_offset: 3,
	};

	#[test]
	fn test_encode_plain() {
		// [cmd, argc, args...]
		let encoded = encode(&FORMAT_A, &[0x10, 0x00]);
		assert!(encoded == [0xFF, 0x10, 0x00, 0xF1]);

		// [dest, len, cmd, args...]
		let encoded = encode(&FORMAT_B, &[0x01, 0x03, 0x10, 0x05]);
		assert!(encoded == [0xE0, 0x01, 0x03, 0x10, 0x05, 0x19]);
	}

	#[test]
	fn test_encode_escapes() {
		let encoded = encode(&FORMAT_B, &[0xFF, 0x04, 0xE0, 0xD0]);
		// Checksum is 0xFF + 0x04 + 0xE0 + 0xD0 = 0x2B3 -> 0xB3.
		assert!(encoded == [0xE0, 0xFF, 0x04, 0xD0, 0xDF, 0xD0, 0xCF, 0xB3]);

		let encoded = encode(&FORMAT_A, &[0x01, 0x02, 0xFF, 0xFD]);
		// Sum including SYNC: 0xFF + 0x01 + 0x02 + 0xFF + 0xFD = 0x2FE -> 0xFE, negated: 0x02.
		assert!(encoded == [0xFF, 0x01, 0x02, 0xFD, 0xFE, 0xFD, 0xFC, 0x02]);
	}

	#[test]
	fn test_encode_escapes_checksum() {
		// Sum is 0xE0, which collides with SYNC.
		let encoded = encode(&FORMAT_B, &[0x01, 0x02, 0xDD]);
		assert!(encoded == [0xE0, 0x01, 0x02, 0xDD, 0xD0, 0xDF]);
	}

	#[test]
	fn test_decode_round_trip() {
		let bodies: [&[u8]; 4] = [
			&[0x05, 0x02, 0xFF, 0xFD],
			&[0xFD, 0x01, 0xFF],
			&[0x01, 0x00],
			&[0xFE, 0x03, 0xFC, 0xFD, 0xFF],
		];
		for body in bodies {
			let encoded = encode(&FORMAT_A, body);
			let_assert!(Some(frame) = decode(&FORMAT_A, &encoded));
			assert!(frame.body() == body);
			assert!(let Ok(()) = frame.verify(&FORMAT_A));
		}

		let bodies: [&[u8]; 3] = [&[0x01, 0x03, 0xE0, 0xD0], &[0xE0, 0x02, 0xD0], &[0xD0, 0x04, 0xE0, 0xE0, 0xD0]];
		for body in bodies {
			let encoded = encode(&FORMAT_B, body);
			let_assert!(Some(frame) = decode(&FORMAT_B, &encoded));
			assert!(frame.body() == body);
			assert!(let Ok(()) = frame.verify(&FORMAT_B));
		}
	}

	#[test]
	fn test_decode_skips_garbage() {
		let mut decoder = FrameDecoder::new(FORMAT_B);
		let (frame, used) = decoder.push_slice(&[0x00, 0x12, 0x34]);
		assert!(frame.is_none());
		assert!(used == 3);
		assert!(decoder.discarded() == 3);
		assert!(!decoder.in_frame());

		let_assert!((Some(frame), 6) = decoder.push_slice(&[0xE0, 0x01, 0x03, 0x10, 0x05, 0x19, 0xE0]));
		assert!(frame.as_bytes() == [0xE0, 0x01, 0x03, 0x10, 0x05, 0x19]);
		assert!(decoder.discarded() == 3);
		decoder.reset();
		assert!(decoder.discarded() == 0);
	}

	#[test]
	fn test_decode_partial() {
		let encoded = encode(&FORMAT_B, &[0x00, 0x04, 0x01, 0xE0, 0x02]);
		let mut decoder = FrameDecoder::new(FORMAT_B);
		for (i, &byte) in encoded[..encoded.len() - 1].iter().enumerate() {
			assert!(decoder.push(byte).is_none(), "frame completed early at byte {}", i);
		}
		assert!(decoder.in_frame());
		assert!(decoder.expected_len() == Some(7));
		let_assert!(Some(frame) = decoder.push(encoded[encoded.len() - 1]));
		assert!(frame.body() == [0x00, 0x04, 0x01, 0xE0, 0x02]);
	}

	#[test]
	fn test_decode_escape_split_over_reads() {
		let encoded = encode(&FORMAT_A, &[0x01, 0x01, 0xFF]);
		let split = encoded.iter().position(|&b| b == 0xFD).unwrap() + 1;
		let mut decoder = FrameDecoder::new(FORMAT_A);
		let (frame, _) = decoder.push_slice(&encoded[..split]);
		assert!(frame.is_none());
		let_assert!((Some(frame), _) = decoder.push_slice(&encoded[split..]));
		assert!(frame.body() == [0x01, 0x01, 0xFF]);
	}

	#[test]
	fn test_decode_resync_on_sync() {
		let mut decoder = FrameDecoder::new(FORMAT_B);
		let (frame, _) = decoder.push_slice(&[0xE0, 0x01, 0x09, 0x10]);
		assert!(frame.is_none());
		let_assert!((Some(frame), _) = decoder.push_slice(&[0xE0, 0x01, 0x03, 0x10, 0x05, 0x19]));
		assert!(frame.body() == [0x01, 0x03, 0x10, 0x05]);
	}

	#[test]
	fn test_verify_detects_bad_checksum() {
		let mut encoded = encode(&FORMAT_B, &[0x00, 0x03, 0x01, 0x01]);
		*encoded.last_mut().unwrap() ^= 0x01;
		let_assert!(Some(frame) = decode(&FORMAT_B, &encoded));
		let_assert!(Err(e) = frame.verify(&FORMAT_B));
		assert!(e.message == 0x04);
		assert!(e.computed == 0x05);
	}
}
