//! Checksum calculation.
//!
//! All supported protocols use a single checksum byte derived from the byte sum of the frame.

/// The way a checksum byte is derived from the frame contents.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ChecksumKind {
	/// The sum of all bytes modulo 256.
	Sum,

	/// The two's complement of the sum of all bytes: `(256 - sum) mod 256`.
	///
	/// Adding the checksum to the sum of the covered bytes gives zero.
	NegatedSum,
}

impl ChecksumKind {
	/// Calculate the checksum of the given bytes.
	pub fn calculate(self, data: &[u8]) -> u8 {
		self.update(0, data)
	}

	/// Calculate the checksum of a message split over multiple buffers.
	///
	/// The `sum` argument is the plain byte sum of the preceding data (see [`sum()`]).
	pub fn update(self, sum: u8, data: &[u8]) -> u8 {
		let sum = data.iter().fold(sum, |sum, &byte| sum.wrapping_add(byte));
		match self {
			Self::Sum => sum,
			Self::NegatedSum => sum.wrapping_neg(),
		}
	}
}

/// Calculate the byte sum modulo 256.
pub fn sum(data: &[u8]) -> u8 {
	ChecksumKind::Sum.calculate(data)
}

/// Calculate the two's complement of the byte sum modulo 256.
pub fn negated_sum(data: &[u8]) -> u8 {
	ChecksumKind::NegatedSum.calculate(data)
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn test_sum() {
		assert!(sum(&[]) == 0);
		assert!(sum(&[1, 2, 3]) == 6);
		assert!(sum(&[0xFF, 0x01]) == 0);
		assert!(sum(&[0x80, 0x80, 0x05]) == 0x05);
		assert!(sum(&[0x02, 0x01, 0x02, 0x10, 0xD9]) == 0xEE);
	}

	#[test]
	fn test_negated_sum() {
		assert!(negated_sum(&[]) == 0);
		assert!(negated_sum(&[0x01]) == 0xFF);
		assert!(negated_sum(&[0xFF]) == 0x01);
		assert!(negated_sum(&[0xFF, 0x10, 0x00]) == 0xF1);

		// Adding the checksum to the covered bytes always gives zero.
		let cases: [&[u8]; 3] = [&[0xFF, 0x01, 0x02, 0x03], &[0x80; 33], &[0xFF, 0xF0, 0x00]];
		for data in cases {
			assert!(sum(data).wrapping_add(negated_sum(data)) == 0);
		}
	}

	#[test]
	fn test_split_update() {
		let data = [0xFF, 0x05, 0x03, 0xFE, 0x10, 0x20];
		let (head, tail) = data.split_at(2);
		assert!(ChecksumKind::Sum.update(sum(head), tail) == sum(&data));
		assert!(ChecksumKind::NegatedSum.update(sum(head), tail) == negated_sum(&data));
	}
}
