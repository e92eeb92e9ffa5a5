//! Cancellable periodic background jobs.
//!
//! A [`PollTask`] runs an iteration function on a dedicated thread until it is stopped.
//! Stopping is cooperative: the current iteration always runs to completion,
//! but a pause between iterations is cut short as soon as a stop is requested.

use log::debug;
use std::ops::ControlFlow;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

/// A stop was requested while waiting.
///
/// This is the normal way for a poll loop to end, not a failure.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Cancelled;

impl std::error::Error for Cancelled {}

impl std::fmt::Display for Cancelled {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "cancelled")
	}
}

/// The receiving side of a stop request.
#[derive(Debug)]
pub struct StopToken {
	receiver: mpsc::Receiver<()>,
}

impl StopToken {
	/// Create a new token and the handle that can trigger it.
	///
	/// Dropping the returned sender requests the stop.
	pub fn new() -> (mpsc::Sender<()>, Self) {
		let (sender, receiver) = mpsc::channel();
		(sender, Self { receiver })
	}

	/// Check if a stop has been requested.
	pub fn is_stopped(&self) -> bool {
		!matches!(self.receiver.try_recv(), Err(mpsc::TryRecvError::Empty))
	}

	/// Sleep for the given duration, or until a stop is requested.
	pub fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
		match self.receiver.recv_timeout(duration) {
			Err(mpsc::RecvTimeoutError::Timeout) => Ok(()),
			_ => Err(Cancelled),
		}
	}
}

/// The pacing of a poll loop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PollSchedule {
	/// The pause after a successful iteration.
	pub interval: Duration,

	/// The pause after a failed iteration.
	pub error_delay: Duration,
}

/// A poll loop running on its own thread.
///
/// The loop owns its state while it runs.
/// [`Self::stop()`] hands the state back when the loop has finished.
/// Dropping the task also requests a stop, but does not wait for the thread:
/// the loop ends after its current iteration and the state is dropped on the loop thread.
#[derive(Debug)]
pub struct PollTask<S> {
	stop: mpsc::Sender<()>,
	thread: JoinHandle<S>,
}

impl<S: Send + 'static> PollTask<S> {
	/// Spawn a named thread that calls `iteration` until stopped.
	///
	/// After each iteration the loop sleeps for [`PollSchedule::interval`],
	/// or for [`PollSchedule::error_delay`] if the iteration failed.
	/// Errors are logged and otherwise ignored.
	/// The loop ends when a stop is requested or when the iteration returns [`ControlFlow::Break`].
	pub fn spawn<F, E>(name: &str, state: S, schedule: PollSchedule, iteration: F) -> std::io::Result<Self>
	where
		F: FnMut(&mut S) -> Result<ControlFlow<()>, E> + Send + 'static,
		E: std::fmt::Display,
	{
		let (stop, token) = StopToken::new();
		let thread = std::thread::Builder::new()
			.name(name.to_owned())
			.spawn(move || run(state, token, schedule, iteration))?;
		Ok(Self { stop, thread })
	}

	/// Check if the loop has already ended on its own.
	pub fn is_finished(&self) -> bool {
		self.thread.is_finished()
	}

	/// Stop the loop, wait for the current iteration to finish and return the state.
	///
	/// If the loop panicked, the panic is resumed on the calling thread.
	pub fn stop(self) -> S {
		let Self { stop, thread } = self;
		drop(stop);
		match thread.join() {
			Ok(state) => state,
			Err(panic) => std::panic::resume_unwind(panic),
		}
	}
}

fn run<S, F, E>(mut state: S, token: StopToken, schedule: PollSchedule, mut iteration: F) -> S
where
	F: FnMut(&mut S) -> Result<ControlFlow<()>, E>,
	E: std::fmt::Display,
{
	debug!("poll loop started");
	while !token.is_stopped() {
		let delay = match iteration(&mut state) {
			Ok(ControlFlow::Continue(())) => schedule.interval,
			Ok(ControlFlow::Break(())) => {
				debug!("poll loop ended by iteration");
				return state;
			},
			Err(e) => {
				debug!("poll iteration failed: {}", e);
				schedule.error_delay
			},
		};
		if !delay.is_zero() && token.sleep(delay).is_err() {
			break;
		}
	}
	debug!("poll loop stopped");
	state
}
