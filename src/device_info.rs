use crate::InvalidParameterCount;

/// The self-description of a slider or LED board, as returned by the `GetInfo` command.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeviceInfo {
	/// The model number of the device.
	pub model: String,

	/// The device class.
	pub class: u8,

	/// The chip number of the controller.
	pub chip: String,

	/// The firmware version.
	pub firmware_version: u8,
}

impl DeviceInfo {
	/// The minimum number of data bytes in a `GetInfo` response.
	pub const MIN_LEN: usize = 0x12;

	/// Parse the data bytes of a `GetInfo` response.
	///
	/// The layout is an 8 byte model string, a class byte, a 5 byte chip string and a firmware version byte.
	/// Strings are decoded lossily and padding is trimmed.
	pub fn parse(data: &[u8]) -> Result<Self, InvalidParameterCount> {
		InvalidParameterCount::check_min(data.len(), Self::MIN_LEN)?;
		Ok(Self {
			model: decode_text(&data[0..8]),
			class: data[8],
			chip: decode_text(&data[9..14]),
			firmware_version: data[14],
		})
	}
}

impl std::fmt::Display for DeviceInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"model {:?}, class {}, chip {:?}, firmware version {}",
			self.model, self.class, self.chip, self.firmware_version
		)
	}
}

/// Decode a fixed-width text field, dropping NUL and space padding.
pub(crate) fn decode_text(data: &[u8]) -> String {
	String::from_utf8_lossy(data)
		.trim_matches(|c: char| c == '\0' || c.is_whitespace())
		.to_owned()
}
