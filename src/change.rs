//! Suppression of repeated reports.

/// Remembers the last report and tells whether a new one differs from it.
///
/// Polling loops read reports at a fixed rate, but consumers only want to hear about changes.
/// The detector sits between the two.
#[derive(Debug, Clone)]
pub struct ChangeDetector<T> {
	previous: Option<T>,
}

impl<T> Default for ChangeDetector<T> {
	fn default() -> Self {
		Self { previous: None }
	}
}

impl<T: PartialEq> ChangeDetector<T> {
	/// Create a detector without a previous report.
	///
	/// The first report is always considered a change.
	pub fn new() -> Self {
		Self { previous: None }
	}

	/// Create a detector that compares the first report against `initial`.
	pub fn with_initial(initial: T) -> Self {
		Self { previous: Some(initial) }
	}

	/// The last report passed to the detector.
	pub fn previous(&self) -> Option<&T> {
		self.previous.as_ref()
	}

	/// Record a new report and return true if it differs from the previous one.
	///
	/// The new report always replaces the remembered one, even if they compare equal.
	pub fn update(&mut self, report: T) -> bool {
		let changed = self.previous.as_ref() != Some(&report);
		self.previous = Some(report);
		changed
	}

	/// Forget the previous report.
	pub fn reset(&mut self) {
		self.previous = None;
	}
}

impl<T: PartialEq + Clone> ChangeDetector<T> {
	/// Record a new report and return a copy of it if it differs from the previous one.
	pub fn changed(&mut self, report: T) -> Option<T> {
		if self.update(report) {
			self.previous.clone()
		} else {
			None
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn test_first_report_is_a_change() {
		let mut detector = ChangeDetector::new();
		assert!(detector.update(vec![1, 2]));
		assert!(!detector.update(vec![1, 2]));
		assert!(detector.update(vec![1, 3]));
		assert!(!detector.update(vec![1, 3]));
	}

	#[test]
	fn test_seeded_detector() {
		let mut detector = ChangeDetector::with_initial(0u8);
		assert!(!detector.update(0));
		assert!(detector.update(1));
		assert!(detector.previous() == Some(&1));
	}

	#[test]
	fn test_same_report_twice() {
		let mut detector = ChangeDetector::with_initial([0u8; 4]);
		let report = [0, 0x80, 0, 0];
		let notifications = [report, report].into_iter().filter_map(|r| detector.changed(r)).count();
		assert!(notifications == 1);
	}

	#[test]
	fn test_reset() {
		let mut detector = ChangeDetector::new();
		assert!(detector.update('a'));
		detector.reset();
		assert!(detector.previous().is_none());
		assert!(detector.update('a'));
	}
}
