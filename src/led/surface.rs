use super::LedBoard;
use crate::{PixelColor, Transport, WriteError};

/// The number of pixels on each strip of a surface.
pub const PIXELS_PER_STRIP: usize = 10;

/// The number of air tower LEDs after the strips.
pub const AIR_TOWER_COUNT: usize = 3;

/// A grid of LED strips followed by the air tower LEDs.
///
/// The strips are wired in a serpentine pattern:
/// every other strip runs in the opposite direction.
/// The surface hides that, so pixel 0 of every strip is at the same end of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LedSurface {
	strips: Vec<[PixelColor; PIXELS_PER_STRIP]>,
	air_towers: [PixelColor; AIR_TOWER_COUNT],
	inverse_phase: bool,
	brightness: f64,
}

impl LedSurface {
	/// The brightness of a new surface.
	pub const DEFAULT_BRIGHTNESS: f64 = 0.6;

	/// Create a surface with all pixels off.
	///
	/// Normally the odd strips are reversed.
	/// If `inverse_phase` is true, the even strips are reversed instead.
	pub fn new(strip_count: usize, inverse_phase: bool) -> Self {
		Self {
			strips: vec![[PixelColor::BLACK; PIXELS_PER_STRIP]; strip_count],
			air_towers: [PixelColor::BLACK; AIR_TOWER_COUNT],
			inverse_phase,
			brightness: Self::DEFAULT_BRIGHTNESS,
		}
	}

	/// The number of strips.
	pub fn strip_count(&self) -> usize {
		self.strips.len()
	}

	/// The number of LEDs the board must drive for this surface.
	pub fn led_count(&self) -> usize {
		self.strips.len() * PIXELS_PER_STRIP + AIR_TOWER_COUNT
	}

	/// The brightness applied to the strip pixels.
	pub fn brightness(&self) -> f64 {
		self.brightness
	}

	/// Set the brightness applied to the strip pixels.
	///
	/// The air tower colors are not affected.
	pub fn set_brightness(&mut self, brightness: f64) {
		self.brightness = brightness;
	}

	/// Get the color of a pixel.
	pub fn pixel(&self, strip: usize, index: usize) -> Option<PixelColor> {
		self.strips.get(strip)?.get(index).copied()
	}

	/// Set the color of a pixel.
	///
	/// Returns false if the pixel is outside the grid.
	pub fn set_pixel(&mut self, strip: usize, index: usize, color: PixelColor) -> bool {
		match self.strips.get_mut(strip).and_then(|strip| strip.get_mut(index)) {
			Some(pixel) => {
				*pixel = color;
				true
			},
			None => false,
		}
	}

	/// Get mutable access to the pixels of a strip.
	pub fn strip_mut(&mut self, strip: usize) -> Option<&mut [PixelColor; PIXELS_PER_STRIP]> {
		self.strips.get_mut(strip)
	}

	/// Set all strip pixels to the same color.
	pub fn fill(&mut self, color: PixelColor) {
		for strip in &mut self.strips {
			*strip = [color; PIXELS_PER_STRIP];
		}
	}

	/// Turn off all strip pixels and air tower LEDs.
	pub fn clear(&mut self) {
		self.fill(PixelColor::BLACK);
		self.air_towers = [PixelColor::BLACK; AIR_TOWER_COUNT];
	}

	/// The colors of the air tower LEDs.
	pub fn air_towers(&self) -> &[PixelColor; AIR_TOWER_COUNT] {
		&self.air_towers
	}

	/// Set all air tower LEDs to the same color.
	pub fn set_air_tower_color(&mut self, color: PixelColor) {
		self.air_towers = [color; AIR_TOWER_COUNT];
	}

	/// Set the color of each air tower LED.
	pub fn set_air_tower_colors(&mut self, colors: [PixelColor; AIR_TOWER_COUNT]) {
		self.air_towers = colors;
	}

	fn is_reversed(&self, strip: usize) -> bool {
		(strip % 2 == 0) == self.inverse_phase
	}

	/// Flatten the surface to the LED order of the board.
	pub fn to_pixels(&self) -> Vec<PixelColor> {
		let mut pixels = Vec::with_capacity(self.led_count());
		for (i, strip) in self.strips.iter().enumerate() {
			let scaled = strip.iter().map(|color| color.scale(self.brightness));
			if self.is_reversed(i) {
				pixels.extend(scaled.rev());
			} else {
				pixels.extend(scaled);
			}
		}
		pixels.extend_from_slice(&self.air_towers);
		pixels
	}

	/// Send the surface to an LED board.
	///
	/// Fails with [`crate::InvalidPixelCount`] if the LED count of the board does not match the surface.
	pub fn push<T: Transport>(&self, board: &mut LedBoard<T>) -> Result<(), WriteError<T::Error>> {
		board.write_pixels(&self.to_pixels())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	const RED: PixelColor = PixelColor::new(200, 0, 0);
	const BLUE: PixelColor = PixelColor::new(0, 0, 100);

	#[test]
	fn test_led_count() {
		assert!(LedSurface::new(6, false).led_count() == 63);
		assert!(LedSurface::new(0, false).led_count() == 3);
	}

	#[test]
	fn test_serpentine() {
		let mut surface = LedSurface::new(2, false);
		surface.set_brightness(1.0);
		assert!(surface.set_pixel(0, 0, RED));
		assert!(surface.set_pixel(1, 0, BLUE));
		assert!(!surface.set_pixel(2, 0, BLUE));

		let pixels = surface.to_pixels();
		assert!(pixels.len() == 23);
		assert!(pixels[0] == RED);
		assert!(pixels[19] == BLUE);
		assert!(pixels[10] == PixelColor::BLACK);
	}

	#[test]
	fn test_serpentine_inverse_phase() {
		let mut surface = LedSurface::new(2, true);
		surface.set_brightness(1.0);
		surface.set_pixel(0, 0, RED);
		surface.set_pixel(1, 0, BLUE);

		let pixels = surface.to_pixels();
		assert!(pixels[9] == RED);
		assert!(pixels[10] == BLUE);
	}

	#[test]
	fn test_brightness_skips_air_towers() {
		let mut surface = LedSurface::new(1, false);
		assert!(surface.brightness() == LedSurface::DEFAULT_BRIGHTNESS);
		surface.set_brightness(0.5);
		surface.fill(RED);
		surface.set_air_tower_color(BLUE);

		let pixels = surface.to_pixels();
		assert!(pixels[..10].iter().all(|&c| c == PixelColor::new(100, 0, 0)));
		assert!(pixels[10..] == [BLUE; 3]);

		surface.clear();
		assert!(surface.to_pixels().iter().all(|&c| c == PixelColor::BLACK));
	}
}
