/// An RGB color for a single LED.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct PixelColor {
	/// The red channel.
	pub r: u8,

	/// The green channel.
	pub g: u8,

	/// The blue channel.
	pub b: u8,
}

impl PixelColor {
	/// All channels off.
	pub const BLACK: Self = Self::new(0, 0, 0);

	/// All channels at full intensity.
	pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF);

	/// Create a color from its channels.
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// Scale all channels by a brightness factor.
	///
	/// Each channel is clamped to `0..=255`, so factors above 1 saturate and negative factors produce black.
	#[must_use]
	pub fn scale(self, brightness: f64) -> Self {
		let channel = |value: u8| (brightness * f64::from(value)).clamp(0.0, 255.0) as u8;
		Self {
			r: channel(self.r),
			g: channel(self.g),
			b: channel(self.b),
		}
	}
}

impl From<[u8; 3]> for PixelColor {
	fn from([r, g, b]: [u8; 3]) -> Self {
		Self { r, g, b }
	}
}
