//! JVS I/O board, reached through a serial bridge.
//!
//! Requests look like `[0xE0, destination, len, command, arguments..., checksum]`.
//! Responses look like `[0xE0, destination, len, status, report, data..., checksum]`.
//! The checksum is the sum of all bytes after SYNC.
//!
//! A [`JvsIo`] resets the bus and claims an address for the I/O board when it is created.
//! The switches can then be read once with [`JvsIo::read_switches()`],
//! or polled on a background thread with [`JvsIo::start_polling()`].

use log::{debug, info, warn};
use std::ops::ControlFlow;
#[cfg(feature = "serial2")]
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use crate::checksum::ChecksumKind;
use crate::device_info::decode_text;
use crate::poll::{PollSchedule, PollTask};
use crate::{
	Bus, ChangeDetector, ChecksumPolicy, FrameFormat, HandshakeError, ReadError, RetryPolicy, TransferError,
	Transport, WriteError,
};

mod command;
mod response;
mod switches;

pub use command::{command_id, Command, RESET_MAGIC};
pub use response::{Response, HOST_ADDRESS, REPORT_OK, STATUS_OK};
pub use switches::{AirTowers, SwitchState, TEST_BUTTON};

/// The frame format of the JVS protocol.
pub const FORMAT: FrameFormat = FrameFormat {
	sync: 0xE0,
	escape: 0xD0,
	checksum: ChecksumKind::Sum,
	checksum_covers_sync: false,
	length_index: 2,
	length_offset: 3,
};

/// The destination address that reaches all nodes.
pub const BROADCAST: u8 = 0xFF;

/// Settings for a JVS session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct JvsConfig {
	/// The timeout for reading a single response.
	pub read_timeout: Duration,

	/// The retry budget for the address handshake.
	pub retry: RetryPolicy,

	/// What to do with responses that have a bad checksum.
	pub checksum_policy: ChecksumPolicy,

	/// The address to assign to the I/O board.
	pub node_address: u8,

	/// The pause after each reset, to let the nodes settle.
	pub settle_delay: Duration,

	/// The pause between switch reads while polling.
	pub poll_interval: Duration,

	/// The number of players to read.
	pub players: u8,

	/// The number of switch bytes to read for each player.
	pub bytes_per_player: u8,

	/// The pause after a failed switch read while polling.
	pub error_delay: Duration,
}

impl Default for JvsConfig {
	fn default() -> Self {
		Self {
			read_timeout: Duration::from_secs(3),
			retry: RetryPolicy::default(),
			checksum_policy: ChecksumPolicy::Reject,
			node_address: 0x01,
			settle_delay: Duration::from_millis(500),
			poll_interval: Duration::from_nanos(1_000_000_000 / 60),
			players: 2,
			bytes_per_player: 2,
			error_delay: Duration::from_millis(100),
		}
	}
}

impl JvsConfig {
	/// Set the timeout for reading a single response.
	#[must_use]
	pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
		self.read_timeout = read_timeout;
		self
	}

	/// Set the retry budget for the address handshake.
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

	/// Set the address to assign to the I/O board.
	#[must_use]
	pub fn with_node_address(mut self, node_address: u8) -> Self {
		self.node_address = node_address;
		self
	}

	/// Set the pause after each reset.
	#[must_use]
	pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
		self.settle_delay = settle_delay;
		self
	}

	/// Set the pause between switch reads while polling.
	#[must_use]
	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	/// Set the number of players and switch bytes per player to read.
	#[must_use]
	pub fn with_switch_layout(mut self, players: u8, bytes_per_player: u8) -> Self {
		self.players = players;
		self.bytes_per_player = bytes_per_player;
		self
	}

	/// Set the pause after a failed switch read while polling.
	#[must_use]
	pub fn with_error_delay(mut self, error_delay: Duration) -> Self {
		self.error_delay = error_delay;
		self
	}
}

/// A connected JVS I/O board.
#[derive(Debug)]
pub struct JvsIo<T> {
	bus: Bus<T>,
	config: JvsConfig,
	identity: Option<String>,
	body: Vec<u8>,
}

#[cfg(feature = "serial2")]
impl JvsIo<serial2::SerialPort> {
	/// Open a serial port and connect to the I/O board.
	pub fn open(path: impl AsRef<Path>, config: JvsConfig) -> Result<Self, crate::ConnectError<std::io::Error>> {
		let serial_port = crate::transport::serial2::open(path).map_err(crate::ConnectError::Open)?;
		Ok(Self::connect(serial_port, config)?)
	}
}

impl<T> JvsIo<T>
where
	T: Transport,
{
	/// Connect to an I/O board over an open transport.
	///
	/// This resets the bus twice and assigns [`JvsConfig::node_address`] until the board confirms it.
	/// Then the board is asked to identify itself.
	/// A failure to identify is logged but does not fail the connection.
	pub fn connect(transport: T, config: JvsConfig) -> Result<Self, HandshakeError<T::Error>> {
		let bus = Bus::new(transport, FORMAT, config.read_timeout, config.checksum_policy);
		let mut io = Self {
			bus,
			config,
			identity: None,
			body: Vec::with_capacity(16),
		};
		io.assign_address()?;

		match io.identify() {
			Ok(identity) => {
				info!("found JVS I/O board: {}", identity);
				io.identity = Some(identity);
			},
			Err(TransferError::ReadError(e)) if !matches!(e, ReadError::Io(_)) => {
				warn!("failed to identify JVS I/O board: {}", e);
			},
			Err(e) => return Err(e.into()),
		}
		Ok(io)
	}

	fn assign_address(&mut self) -> Result<(), HandshakeError<T::Error>> {
		let retry = self.config.retry.clone();
		let node = self.config.node_address;
		retry.run(|attempt| {
			debug!("resetting JVS bus, attempt {}", attempt);
			for _ in 0..2 {
				self.send_command(BROADCAST, &Command::Reset)?;
				std::thread::sleep(self.config.settle_delay);
			}
			match self.transfer(BROADCAST, &Command::SetAddress(node)) {
				Ok(_) => Ok(Some(())),
				Err(TransferError::ReadError(e)) if !matches!(e, ReadError::Io(_)) => {
					debug!("no valid response to set address: {}", e);
					Ok(None)
				},
				Err(e) => Err(e),
			}
		})?;
		info!("JVS I/O board connected at address {}", node);
		Ok(())
	}

	/// The identification string reported during the handshake, if the board sent it.
	pub fn identity(&self) -> Option<&str> {
		self.identity.as_deref()
	}

	/// The configuration of the session.
	pub fn config(&self) -> &JvsConfig {
		&self.config
	}

	/// Get a reference to the underlying transport.
	pub fn transport(&self) -> &T {
		self.bus.transport()
	}

	/// Encode and write a single command.
	///
	/// This does not wait for a response.
	pub fn send_command(&mut self, destination: u8, command: &Command) -> Result<(), WriteError<T::Error>> {
		command.encode_body(destination, &mut self.body)?;
		self.bus.write_frame(&self.body)
	}

	/// Read and validate a single response.
	pub fn receive_response(&mut self) -> Result<Response, ReadError<T::Error>> {
		let frame = self.bus.read_frame()?;
		Ok(Response::decode(&frame)?)
	}

	/// Send a command and read the response.
	pub fn transfer(&mut self, destination: u8, command: &Command) -> Result<Response, TransferError<T::Error>> {
		self.send_command(destination, command)?;
		Ok(self.receive_response()?)
	}

	/// Ask the board for its identification string.
	///
	/// Trailing NUL bytes are removed.
	pub fn identify(&mut self) -> Result<String, TransferError<T::Error>> {
		let response = self.transfer(self.config.node_address, &Command::Identify)?;
		Ok(decode_text(&response.data))
	}

	/// Read the switch inputs once.
	pub fn read_switches(&mut self) -> Result<SwitchState, TransferError<T::Error>> {
		let command = Command::ReadSwitches {
			players: self.config.players,
			bytes_per_player: self.config.bytes_per_player,
		};
		let response = self.transfer(self.config.node_address, &command)?;
		let state = SwitchState::parse(
			&response.data,
			usize::from(self.config.players),
			usize::from(self.config.bytes_per_player),
		)?;
		Ok(state)
	}

	/// Close the session and get back the transport.
	pub fn close(self) -> T {
		self.bus.into_transport()
	}
}

impl<T> JvsIo<T>
where
	T: Transport + Send + 'static,
{
	/// Start polling the switches on a background thread.
	///
	/// The switches are read every [`JvsConfig::poll_interval`],
	/// and each state that differs from the previous one is published.
	/// Failed reads are logged and retried after [`JvsConfig::error_delay`].
	pub fn start_polling(self) -> std::io::Result<SwitchPoller<T>> {
		let (sender, updates) = mpsc::channel();
		let schedule = PollSchedule {
			interval: self.config.poll_interval,
			error_delay: self.config.error_delay,
		};
		let state = PollerState {
			io: self,
			updates: sender,
			detector: ChangeDetector::new(),
		};
		let task = PollTask::spawn("jvs-poller", state, schedule, PollerState::iteration)?;
		Ok(SwitchPoller { task, updates })
	}
}

/// A JVS I/O board polling its switches from a background thread.
#[derive(Debug)]
pub struct SwitchPoller<T> {
	task: PollTask<PollerState<T>>,
	updates: mpsc::Receiver<SwitchState>,
}

impl<T> SwitchPoller<T>
where
	T: Transport + Send + 'static,
{
	/// The channel that receives each changed switch state.
	pub fn updates(&self) -> &mpsc::Receiver<SwitchState> {
		&self.updates
	}

	/// Check if the background thread is still running.
	pub fn is_running(&self) -> bool {
		!self.task.is_finished()
	}

	/// Stop polling and get back the session.
	///
	/// A pending pause is cut short, but a read in progress is finished first.
	pub fn stop(self) -> JvsIo<T> {
		self.task.stop().io
	}
}

#[derive(Debug)]
struct PollerState<T> {
	io: JvsIo<T>,
	updates: mpsc::Sender<SwitchState>,
	detector: ChangeDetector<SwitchState>,
}

impl<T: Transport> PollerState<T> {
	fn iteration(&mut self) -> Result<ControlFlow<()>, TransferError<T::Error>> {
		let state = self.io.read_switches()?;
		if let Some(state) = self.detector.changed(state) {
			if self.updates.send(state).is_err() {
				debug!("switch state receiver is gone, stopping");
				return Ok(ControlFlow::Break(()));
			}
		}
		Ok(ControlFlow::Continue(()))
	}
}
