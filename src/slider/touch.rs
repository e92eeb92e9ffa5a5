use crate::InvalidParameterCount;

/// The number of touch rows of the slider.
pub const ROWS: usize = 2;

/// The number of touch columns of the slider.
pub const COLUMNS: usize = 16;

/// A touch sensor position, with column 0 at the left side of the slider.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TouchCoordinate {
	/// The row, 0 or 1.
	pub row: usize,

	/// The column, from 0 (left) to 15 (right).
	pub column: usize,
}

/// A snapshot of all touch pressures.
///
/// The slider reports its columns from right to left.
/// The report stores them left to right, so column 0 is the leftmost key.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct TouchReport {
	pressure: [[u8; COLUMNS]; ROWS],
}

impl TouchReport {
	/// The number of raw values in a single report.
	pub const RAW_LEN: usize = ROWS * COLUMNS;

	/// Convert the raw values of a single report to a touch report.
	///
	/// The raw values come in pairs per column, starting at the rightmost column:
	/// `values[2 * i]` is row 0 and `values[2 * i + 1]` is row 1 of column `15 - i`.
	pub fn from_raw(values: &[u8]) -> Result<Self, InvalidParameterCount> {
		InvalidParameterCount::check(values.len(), Self::RAW_LEN)?;
		let mut pressure = [[0; COLUMNS]; ROWS];
		for (i, pair) in values.chunks_exact(2).enumerate() {
			let column = COLUMNS - 1 - i;
			pressure[0][column] = pair[0];
			pressure[1][column] = pair[1];
		}
		Ok(Self { pressure })
	}

	/// Get the pressure of a single sensor.
	pub fn pressure(&self, row: usize, column: usize) -> Option<u8> {
		self.pressure.get(row)?.get(column).copied()
	}

	/// Get the mean pressure of both rows of a column.
	pub fn column_pressure(&self, column: usize) -> Option<u8> {
		let top = self.pressure(0, column)?;
		let bottom = self.pressure(1, column)?;
		Some(((u16::from(top) + u16::from(bottom)) / 2) as u8)
	}

	/// Iterate over all sensors, row by row, left to right.
	pub fn iter(&self) -> impl Iterator<Item = (TouchCoordinate, u8)> + '_ {
		self.pressure.iter().enumerate().flat_map(|(row, columns)| {
			columns
				.iter()
				.enumerate()
				.map(move |(column, &pressure)| (TouchCoordinate { row, column }, pressure))
		})
	}

	/// Iterate over the sensors with a pressure of at least `threshold`.
	pub fn touched(&self, threshold: u8) -> impl Iterator<Item = TouchCoordinate> + '_ {
		self.iter()
			.filter(move |&(_, pressure)| pressure >= threshold)
			.map(|(coordinate, _)| coordinate)
	}
}
