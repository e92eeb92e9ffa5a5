use std::sync::mpsc;

use crate::PixelColor;

/// The number of LEDs on the slider.
///
/// There is one LED under each key and one between each pair of neighbouring keys.
pub const LED_COUNT: usize = 31;

/// The brightness and colors of all slider LEDs.
///
/// LED 0 is the rightmost LED, as seen from the player.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LedState {
	/// The global brightness.
	pub brightness: u8,

	/// The color of each LED, from right to left.
	pub colors: [PixelColor; LED_COUNT],
}

impl LedState {
	/// All LEDs off, with the given brightness.
	pub fn new(brightness: u8) -> Self {
		Self {
			brightness,
			colors: [PixelColor::BLACK; LED_COUNT],
		}
	}

	/// Turn off all LEDs.
	pub fn clear(&mut self) {
		self.colors = [PixelColor::BLACK; LED_COUNT];
	}

	/// Paint a segment of keys, given in left-to-right key columns.
	///
	/// A segment of `width` keys covers `2 * width - 1` LEDs: one per key and the dividers between them.
	/// The colors are repeated if there are fewer colors than LEDs in the segment.
	/// LEDs that fall outside the slider are ignored.
	pub fn paint_segment(&mut self, left: usize, width: usize, colors: &[PixelColor]) {
		if colors.is_empty() {
			return;
		}
		for i in 0..(width * 2).saturating_sub(1) {
			let Some(index) = (LED_COUNT - 1).checked_sub(i + left * 2) else {
				break;
			};
			self.colors[index] = colors[i % colors.len()];
		}
	}
}

/// A handle to update the slider LEDs while the slider is reporting.
///
/// Each touch report exchange sends the most recent state.
/// The handle can be cloned and sent to other threads.
#[derive(Debug, Clone)]
pub struct SliderLeds {
	sender: mpsc::Sender<LedState>,
}

impl SliderLeds {
	pub(crate) fn new(sender: mpsc::Sender<LedState>) -> Self {
		Self { sender }
	}

	/// Set the state to send with the next exchange.
	///
	/// Returns false if the reporter has stopped.
	pub fn set(&self, state: LedState) -> bool {
		self.sender.send(state).is_ok()
	}
}
