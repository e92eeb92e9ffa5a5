//! Capacitive touch slider with per-key LEDs.
//!
//! Frames look like `[0xFF, command, argc, arguments..., checksum]`,
//! where the checksum makes the sum of all bytes (SYNC included) zero.
//!
//! A [`Slider`] performs the connection handshake when it is created.
//! Touch reports can then be polled one at a time with [`Slider::read_touch()`],
//! or continuously on a background thread with [`Slider::start_reporting()`].

use log::{debug, info, trace, warn};
use std::ops::ControlFlow;
#[cfg(feature = "serial2")]
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use crate::checksum::ChecksumKind;
use crate::poll::{PollSchedule, PollTask};
use crate::{
	Bus, ChangeDetector, ChecksumPolicy, DeviceInfo, FrameFormat, HandshakeError, ReadError, RetryPolicy,
	TransferError, Transport, UnknownReport, WriteError,
};

mod command;
mod leds;
mod response;
mod touch;

pub use command::{command_id, Command};
pub use leds::{LedState, SliderLeds, LED_COUNT};
pub use response::Response;
pub use touch::{TouchCoordinate, TouchReport, COLUMNS, ROWS};

/// The frame format of the slider protocol.
pub const FORMAT: FrameFormat = FrameFormat {
	sync: 0xFF,
	escape: 0xFD,
	checksum: ChecksumKind::NegatedSum,
	checksum_covers_sync: true,
	length_index: 2,
	length_offset: 4,
};

/// Settings for a slider session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SliderConfig {
	/// The timeout for reading a single response.
	pub read_timeout: Duration,

	/// The retry budget for the reset handshake.
	pub retry: RetryPolicy,

	/// What to do with responses that have a bad checksum.
	pub checksum_policy: ChecksumPolicy,

	/// The LED brightness sent with each touch report request.
	pub brightness: u8,

	/// The pause after a failed exchange while reporting.
	pub error_delay: Duration,
}

impl Default for SliderConfig {
	fn default() -> Self {
		Self {
			read_timeout: Duration::from_secs(3),
			retry: RetryPolicy::default(),
			checksum_policy: ChecksumPolicy::Warn,
			brightness: 0xFE,
			error_delay: Duration::from_millis(100),
		}
	}
}

impl SliderConfig {
	/// Set the timeout for reading a single response.
	#[must_use]
	pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
		self.read_timeout = read_timeout;
		self
	}

	/// Set the retry budget for the reset handshake.
	#[must_use]
	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	/// Set the checksum policy.
	#[must_use]
	pub fn with_checksum_policy(mut self, checksum_policy: ChecksumPolicy) -> Self {
		self.checksum_policy = checksum_policy;
		self
	}

	/// Set the LED brightness.
	#[must_use]
	pub fn with_brightness(mut self, brightness: u8) -> Self {
		self.brightness = brightness;
		self
	}

	/// Set the pause after a failed exchange while reporting.
	#[must_use]
	pub fn with_error_delay(mut self, error_delay: Duration) -> Self {
		self.error_delay = error_delay;
		self
	}
}

/// A connected slider.
#[derive(Debug)]
pub struct Slider<T> {
	bus: Bus<T>,
	config: SliderConfig,
	info: Option<DeviceInfo>,
	body: Vec<u8>,
}

#[cfg(feature = "serial2")]
impl Slider<serial2::SerialPort> {
	/// Open a serial port and connect to the slider.
	pub fn open(path: impl AsRef<Path>, config: SliderConfig) -> Result<Self, crate::ConnectError<std::io::Error>> {
		let serial_port = crate::transport::serial2::open(path).map_err(crate::ConnectError::Open)?;
		Ok(Self::connect(serial_port, config)?)
	}
}

impl<T> Slider<T>
where
	T: Transport,
{
	/// Connect to a slider over an open transport.
	///
	/// This resets the slider until it reports that it is ready, and then requests the device information.
	/// A failure to get the device information is logged but does not fail the connection.
	pub fn connect(transport: T, config: SliderConfig) -> Result<Self, HandshakeError<T::Error>> {
		let bus = Bus::new(transport, FORMAT, config.read_timeout, config.checksum_policy);
		let mut slider = Self {
			bus,
			config,
			info: None,
			body: Vec::with_capacity(128),
		};
		slider.reset()?;
		slider.info = slider.read_info()?;
		Ok(slider)
	}

	fn reset(&mut self) -> Result<(), HandshakeError<T::Error>> {
		let retry = self.config.retry.clone();
		retry.run(|attempt| {
			debug!("pinging slider, attempt {}", attempt);
			match self.transfer(&Command::Reset) {
				Ok(Response::Ready) => Ok(Some(())),
				Ok(other) => {
					debug!("unexpected response to reset: {:?}", other);
					Ok(None)
				},
				Err(TransferError::ReadError(e)) if !matches!(e, ReadError::Io(_)) => {
					debug!("no valid response to reset: {}", e);
					Ok(None)
				},
				Err(e) => Err(e),
			}
		})?;
		info!("slider connected");
		Ok(())
	}

	fn read_info(&mut self) -> Result<Option<DeviceInfo>, TransferError<T::Error>> {
		match self.transfer(&Command::GetInfo) {
			Ok(Response::Info(info)) => {
				info!("found slider: {}", info);
				Ok(Some(info))
			},
			Ok(Response::Exception { context, error }) => {
				warn!("slider rejected get info: context {:#04X}, error {:#04X}", context, error);
				Ok(None)
			},
			Ok(other) => {
				warn!("unexpected response to get info: {:?}", other);
				Ok(None)
			},
			Err(TransferError::ReadError(e)) if !matches!(e, ReadError::Io(_)) => {
				warn!("failed to get slider info: {}", e);
				Ok(None)
			},
			Err(e) => Err(e),
		}
	}

	/// The device information reported during the handshake, if the slider sent it.
	pub fn device_info(&self) -> Option<&DeviceInfo> {
		self.info.as_ref()
	}

	/// The configuration of the session.
	pub fn config(&self) -> &SliderConfig {
		&self.config
	}

	/// Get a reference to the underlying transport.
	pub fn transport(&self) -> &T {
		self.bus.transport()
	}

	/// Encode and write a single command.
	///
	/// This does not wait for a response.
	pub fn send_command(&mut self, command: &Command) -> Result<(), WriteError<T::Error>> {
		command.encode_body(&mut self.body)?;
		trace!("sending slider command {:#04X}", command.command_id());
		self.bus.write_frame(&self.body)
	}

	/// Read and decode a single response.
	pub fn receive_response(&mut self) -> Result<Response, ReadError<T::Error>> {
		let frame = self.bus.read_frame()?;
		Ok(Response::decode(&frame)?)
	}

	/// Send a command and read the response.
	pub fn transfer(&mut self, command: &Command) -> Result<Response, TransferError<T::Error>> {
		self.send_command(command)?;
		Ok(self.receive_response()?)
	}

	/// Update the LEDs and read a single touch report.
	pub fn read_touch(&mut self, leds: &LedState) -> Result<TouchReport, TransferError<T::Error>> {
		match self.transfer(&Command::PingPong(*leds))? {
			Response::SingleReport { values } => Ok(TouchReport::from_raw(&values)?),
			other => Err(UnknownReport {
				report: other.command_id(),
			}
			.into()),
		}
	}

	/// Close the session and get back the transport.
	pub fn close(self) -> T {
		self.bus.into_transport()
	}
}

impl<T> Slider<T>
where
	T: Transport + Send + 'static,
{
	/// Start reporting touch changes on a background thread.
	///
	/// The thread first enables reporting on the slider.
	/// It then keeps exchanging the current LED state for a touch report,
	/// and publishes each report that differs from the previous one.
	/// Failed exchanges are logged and retried after [`SliderConfig::error_delay`].
	pub fn start_reporting(self) -> std::io::Result<SliderReporter<T>> {
		let (update_sender, updates) = mpsc::channel();
		let (led_sender, led_receiver) = mpsc::channel();
		let schedule = PollSchedule {
			interval: Duration::ZERO,
			error_delay: self.config.error_delay,
		};
		let state = ReporterState {
			leds: LedState::new(self.config.brightness),
			slider: self,
			led_updates: led_receiver,
			updates: update_sender,
			detector: ChangeDetector::new(),
			reporting: false,
		};
		let task = PollTask::spawn("slider-reporter", state, schedule, ReporterState::iteration)?;
		Ok(SliderReporter {
			task,
			updates,
			leds: SliderLeds::new(led_sender),
		})
	}
}

/// A slider reporting touch changes from a background thread.
#[derive(Debug)]
pub struct SliderReporter<T> {
	task: PollTask<ReporterState<T>>,
	updates: mpsc::Receiver<TouchReport>,
	leds: SliderLeds,
}

impl<T> SliderReporter<T>
where
	T: Transport + Send + 'static,
{
	/// The channel that receives each changed touch report.
	pub fn updates(&self) -> &mpsc::Receiver<TouchReport> {
		&self.updates
	}

	/// Get a handle to update the slider LEDs.
	pub fn leds(&self) -> SliderLeds {
		self.leds.clone()
	}

	/// Check if the background thread is still running.
	pub fn is_running(&self) -> bool {
		!self.task.is_finished()
	}

	/// Stop reporting and get back the slider.
	///
	/// The current exchange is finished before the thread stops.
	pub fn stop(self) -> Slider<T> {
		self.task.stop().slider
	}
}

#[derive(Debug)]
struct ReporterState<T> {
	slider: Slider<T>,
	leds: LedState,
	led_updates: mpsc::Receiver<LedState>,
	updates: mpsc::Sender<TouchReport>,
	detector: ChangeDetector<TouchReport>,
	reporting: bool,
}

impl<T: Transport> ReporterState<T> {
	fn iteration(&mut self) -> Result<ControlFlow<()>, TransferError<T::Error>> {
		if !self.reporting {
			self.slider.send_command(&Command::EnableReport)?;
			self.reporting = true;
		}

		// Only the most recent LED state matters.
		while let Ok(leds) = self.led_updates.try_recv() {
			self.leds = leds;
		}

		let report = self.slider.read_touch(&self.leds)?;
		if let Some(report) = self.detector.changed(report) {
			if self.updates.send(report).is_err() {
				debug!("touch report receiver is gone, stopping");
				return Ok(ControlFlow::Break(()));
			}
		}
		Ok(ControlFlow::Continue(()))
	}
}
