//! Retry budgets for connection handshakes.

use log::debug;
use std::time::Duration;

use crate::{HandshakeError, TransferError};

/// How often and how fast a handshake is retried while the device is not ready.
///
/// Devices may still be booting when the serial port is opened,
/// so each session keeps asking until the device answers.
/// The policy bounds how long that takes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RetryPolicy {
	/// The maximum number of attempts, or `None` to retry forever.
	pub max_attempts: Option<u32>,

	/// The pause after the first failed attempt.
	pub initial_delay: Duration,

	/// The factor by which the pause grows after each failed attempt.
	pub backoff_factor: u32,

	/// The upper limit for the pause between attempts.
	pub max_delay: Duration,
}

impl Default for RetryPolicy {
	/// Up to 30 attempts with a fixed pause of one second.
	fn default() -> Self {
		Self::fixed(30, Duration::from_secs(1))
	}
}

impl RetryPolicy {
	/// Retry up to `max_attempts` times with a fixed pause.
	pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
		Self {
			max_attempts: Some(max_attempts),
			initial_delay: delay,
			backoff_factor: 1,
			max_delay: delay,
		}
	}

	/// Retry forever with a fixed pause.
	///
	/// The handshake only ends when the device answers or the transport fails.
	pub fn forever(delay: Duration) -> Self {
		Self {
			max_attempts: None,
			initial_delay: delay,
			backoff_factor: 1,
			max_delay: delay,
		}
	}

	/// Use exponential back-off: multiply the pause by `factor` after each attempt, up to `max_delay`.
	#[must_use]
	pub fn with_backoff(mut self, factor: u32, max_delay: Duration) -> Self {
		self.backoff_factor = factor.max(1);
		self.max_delay = max_delay.max(self.initial_delay);
		self
	}

	/// Change the maximum number of attempts.
	#[must_use]
	pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
		self.max_attempts = max_attempts;
		self
	}

	/// The pause after the given failed attempt (counting from 1).
	pub fn delay_after(&self, attempt: u32) -> Duration {
		let mut delay = self.initial_delay;
		for _ in 1..attempt {
			if delay >= self.max_delay {
				break;
			}
			delay = delay.saturating_mul(self.backoff_factor);
		}
		delay.min(self.max_delay)
	}

	/// Check if another attempt is allowed after `attempts` attempts have been made.
	pub fn allows(&self, attempts: u32) -> bool {
		match self.max_attempts {
			Some(max) => attempts < max,
			None => true,
		}
	}

	/// Run `attempt` until it produces a value.
	///
	/// The closure receives the attempt number (counting from 1).
	/// It returns `Ok(Some(value))` when the device is ready, `Ok(None)` to try again after a pause,
	/// or an error to abort the handshake immediately.
	pub fn run<T, E, F>(&self, mut attempt: F) -> Result<T, HandshakeError<E>>
	where
		F: FnMut(u32) -> Result<Option<T>, TransferError<E>>,
	{
		let mut attempts = 0;
		loop {
			attempts += 1;
			if let Some(value) = attempt(attempts)? {
				return Ok(value);
			}
			if !self.allows(attempts) {
				return Err(HandshakeError::NotReady { attempts });
			}
			let delay = self.delay_after(attempts);
			debug!("device not ready after attempt {}, retrying in {:?}", attempts, delay);
			std::thread::sleep(delay);
		}
	}
}
