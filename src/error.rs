/// An error that can occur while connecting to a device.
#[derive(Debug)]
pub enum ConnectError<E> {
	/// The transport could not be opened.
	Open(E),

	/// The transport was opened, but the handshake with the device failed.
	Handshake(HandshakeError<E>),
}

/// An error that can occur during the connection handshake.
#[derive(Debug)]
pub enum HandshakeError<E> {
	/// The device did not report that it is ready within the retry budget.
	NotReady {
		/// The number of attempts made.
		attempts: u32,
	},

	/// A transfer failed in a way that can not be recovered by retrying.
	Transfer(TransferError<E>),
}

/// An error that can occur during a read/write transfer.
#[derive(Debug)]
pub enum TransferError<E> {
	/// The write of the request failed.
	WriteError(WriteError<E>),

	/// The read of the response failed.
	ReadError(ReadError<E>),
}

/// An error that can occur during a write transfer.
#[derive(Debug)]
pub enum WriteError<E> {
	/// The transport failed to discard the input buffer.
	DiscardBuffer(E),

	/// The transport failed to write the frame.
	Write(E),

	/// The request does not fit in a single frame.
	PayloadTooLarge(PayloadTooLarge),

	/// The number of pixels does not match the LED count of the device.
	InvalidPixelCount(InvalidPixelCount),
}

/// An error that can occur during a read transfer.
#[derive(Debug)]
pub enum ReadError<E> {
	/// The transport reported an error.
	Io(E),

	/// No complete frame was received before the read timeout expired.
	Timeout,

	/// A frame was received, but it is not valid.
	InvalidMessage(InvalidMessage),
}

/// The received message is not valid.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InvalidMessage {
	/// Data was received, but it did not contain a SYNC byte.
	MissingSync(MissingSync),

	/// A frame was started, but it ended before the declared length was reached.
	Truncated(Truncated),

	/// The frame is too short for the protocol.
	InvalidLength(InvalidLength),

	/// The checksum byte does not match the frame contents.
	InvalidChecksum(InvalidChecksum),

	/// The frame has an unexpected source or destination address.
	InvalidAddress(InvalidAddress),

	/// The device reported a status other than success.
	InvalidStatus(InvalidStatus),

	/// The device sent a report or command that is not known.
	UnknownReport(UnknownReport),

	/// The response carries an unexpected number of arguments.
	InvalidParameterCount(InvalidParameterCount),
}

/// The request payload does not fit in a frame.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PayloadTooLarge {
	/// The number of argument bytes of the request.
	pub actual: usize,

	/// The maximum number of argument bytes the protocol can encode.
	pub max: usize,
}

/// A pixel buffer does not have one color for each LED.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InvalidPixelCount {
	/// The number of colors in the buffer.
	pub actual: usize,

	/// The number of LEDs of the device.
	pub expected: usize,
}

/// Received data did not contain a SYNC byte.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MissingSync {
	/// The number of bytes that were discarded while looking for a SYNC byte.
	pub discarded: usize,
}

/// A frame ended before it was complete.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Truncated {
	/// The decoded length of the frame, if the length field was received.
	pub expected: Option<usize>,

	/// The number of decoded bytes that were received.
	pub actual: usize,
}

/// The frame is shorter than the minimum for the protocol.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InvalidLength {
	/// The decoded length of the frame.
	pub actual: usize,

	/// The minimum decoded length.
	pub minimum: usize,
}

/// The received message has an invalid checksum value.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InvalidChecksum {
	/// The checksum byte in the message.
	pub message: u8,

	/// The checksum calculated from the message contents.
	pub computed: u8,
}

/// The received message has an unexpected address.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InvalidAddress {
	/// The address found in the message.
	pub actual: u8,

	/// The address that was expected.
	pub expected: u8,
}

/// The device reported an error status.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InvalidStatus {
	/// The raw status byte.
	pub status: u8,
}

/// The device sent a report that is not supported.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UnknownReport {
	/// The raw command or report byte.
	pub report: u8,
}

/// The expected number of parameters.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ExpectedCount {
	/// Exactly this many parameters.
	Exact(usize),

	/// At least this many parameters.
	Min(usize),
}

/// The received message has an invalid or unexpected parameter count.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InvalidParameterCount {
	/// The number of parameters in the message.
	pub actual: usize,

	/// The expected number of parameters.
	pub expected: ExpectedCount,
}

impl PayloadTooLarge {
	/// Check that a payload fits in a frame.
	pub fn check(actual: usize, max: usize) -> Result<(), Self> {
		if actual <= max {
			Ok(())
		} else {
			Err(Self { actual, max })
		}
	}
}

impl InvalidPixelCount {
	/// Check that a pixel buffer has exactly one color for each LED.
	pub fn check(actual: usize, expected: usize) -> Result<(), Self> {
		if actual == expected {
			Ok(())
		} else {
			Err(Self { actual, expected })
		}
	}
}

impl InvalidLength {
	/// Check that a frame has at least the minimum length.
	pub fn check(actual: usize, minimum: usize) -> Result<(), Self> {
		if actual >= minimum {
			Ok(())
		} else {
			Err(Self { actual, minimum })
		}
	}
}

impl InvalidChecksum {
	/// Check that the checksum in a message matches the computed checksum.
	pub fn check(message: u8, computed: u8) -> Result<(), Self> {
		if message == computed {
			Ok(())
		} else {
			Err(Self { message, computed })
		}
	}
}

impl InvalidAddress {
	/// Check that an address matches the expected address.
	pub fn check(actual: u8, expected: u8) -> Result<(), Self> {
		if actual == expected {
			Ok(())
		} else {
			Err(Self { actual, expected })
		}
	}
}

impl InvalidStatus {
	/// Check that a status byte reports success.
	pub fn check(status: u8, success: u8) -> Result<(), Self> {
		if status == success {
			Ok(())
		} else {
			Err(Self { status })
		}
	}
}

impl InvalidParameterCount {
	/// Check that there are exactly `expected` parameters.
	pub fn check(actual: usize, expected: usize) -> Result<(), Self> {
		if actual == expected {
			Ok(())
		} else {
			Err(Self {
				actual,
				expected: ExpectedCount::Exact(expected),
			})
		}
	}

	/// Check that there are at least `min` parameters.
	pub fn check_min(actual: usize, min: usize) -> Result<(), Self> {
		if actual >= min {
			Ok(())
		} else {
			Err(Self {
				actual,
				expected: ExpectedCount::Min(min),
			})
		}
	}
}

impl<E> ReadError<E> {
	/// Check if the error is a read timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout)
	}
}

impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for ConnectError<E> {}
impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for HandshakeError<E> {}
impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for TransferError<E> {}
impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for WriteError<E> {}
impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for ReadError<E> {}
impl std::error::Error for InvalidMessage {}
impl std::error::Error for PayloadTooLarge {}
impl std::error::Error for InvalidPixelCount {}
impl std::error::Error for MissingSync {}
impl std::error::Error for Truncated {}
impl std::error::Error for InvalidLength {}
impl std::error::Error for InvalidChecksum {}
impl std::error::Error for InvalidAddress {}
impl std::error::Error for InvalidStatus {}
impl std::error::Error for UnknownReport {}
impl std::error::Error for InvalidParameterCount {}

impl<E> From<HandshakeError<E>> for ConnectError<E> {
	fn from(other: HandshakeError<E>) -> Self {
		Self::Handshake(other)
	}
}

impl<E> From<TransferError<E>> for HandshakeError<E> {
	fn from(other: TransferError<E>) -> Self {
		Self::Transfer(other)
	}
}

impl<E> From<WriteError<E>> for HandshakeError<E> {
	fn from(other: WriteError<E>) -> Self {
		Self::Transfer(other.into())
	}
}

impl<E> From<ReadError<E>> for HandshakeError<E> {
	fn from(other: ReadError<E>) -> Self {
		Self::Transfer(other.into())
	}
}

impl<E> From<WriteError<E>> for TransferError<E> {
	fn from(other: WriteError<E>) -> Self {
		Self::WriteError(other)
	}
}

impl<E> From<ReadError<E>> for TransferError<E> {
	fn from(other: ReadError<E>) -> Self {
		Self::ReadError(other)
	}
}

impl<E> From<PayloadTooLarge> for WriteError<E> {
	fn from(other: PayloadTooLarge) -> Self {
		Self::PayloadTooLarge(other)
	}
}

impl<E> From<PayloadTooLarge> for TransferError<E> {
	fn from(other: PayloadTooLarge) -> Self {
		Self::WriteError(other.into())
	}
}

impl<E> From<InvalidPixelCount> for WriteError<E> {
	fn from(other: InvalidPixelCount) -> Self {
		Self::InvalidPixelCount(other)
	}
}

impl<E> From<InvalidPixelCount> for TransferError<E> {
	fn from(other: InvalidPixelCount) -> Self {
		Self::WriteError(other.into())
	}
}

impl<E> From<InvalidMessage> for ReadError<E> {
	fn from(other: InvalidMessage) -> Self {
		Self::InvalidMessage(other)
	}
}

impl<E> From<InvalidMessage> for TransferError<E> {
	fn from(other: InvalidMessage) -> Self {
		Self::ReadError(other.into())
	}
}

macro_rules! impl_invalid_message_from {
	($($variant:ident),* $(,)?) => {
		$(
			impl From<$variant> for InvalidMessage {
				fn from(other: $variant) -> Self {
					Self::$variant(other)
				}
			}

			impl<E> From<$variant> for ReadError<E> {
				fn from(other: $variant) -> Self {
					Self::InvalidMessage(other.into())
				}
			}

			impl<E> From<$variant> for TransferError<E> {
				fn from(other: $variant) -> Self {
					Self::ReadError(other.into())
				}
			}
		)*
	};
}

impl_invalid_message_from!(
	MissingSync,
	Truncated,
	InvalidLength,
	InvalidChecksum,
	InvalidAddress,
	InvalidStatus,
	UnknownReport,
	InvalidParameterCount,
);

impl<E: std::fmt::Display> std::fmt::Display for ConnectError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Open(e) => write!(f, "failed to open serial port: {}", e),
			Self::Handshake(e) => write!(f, "{}", e),
		}
	}
}

impl<E: std::fmt::Display> std::fmt::Display for HandshakeError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::NotReady { attempts } => write!(f, "device did not become ready after {} attempts", attempts),
			Self::Transfer(e) => write!(f, "handshake failed: {}", e),
		}
	}
}

impl<E: std::fmt::Display> std::fmt::Display for TransferError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::WriteError(e) => write!(f, "{}", e),
			Self::ReadError(e) => write!(f, "{}", e),
		}
	}
}

impl<E: std::fmt::Display> std::fmt::Display for WriteError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::DiscardBuffer(e) => write!(f, "failed to discard input buffer: {}", e),
			Self::Write(e) => write!(f, "failed to write to serial port: {}", e),
			Self::PayloadTooLarge(e) => write!(f, "{}", e),
			Self::InvalidPixelCount(e) => write!(f, "{}", e),
		}
	}
}

impl<E: std::fmt::Display> std::fmt::Display for ReadError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Io(e) => write!(f, "failed to read from serial port: {}", e),
			Self::Timeout => write!(f, "timeout while waiting for a response"),
			Self::InvalidMessage(e) => write!(f, "{}", e),
		}
	}
}

impl std::fmt::Display for InvalidMessage {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::MissingSync(e) => write!(f, "{}", e),
			Self::Truncated(e) => write!(f, "{}", e),
			Self::InvalidLength(e) => write!(f, "{}", e),
			Self::InvalidChecksum(e) => write!(f, "{}", e),
			Self::InvalidAddress(e) => write!(f, "{}", e),
			Self::InvalidStatus(e) => write!(f, "{}", e),
			Self::UnknownReport(e) => write!(f, "{}", e),
			Self::InvalidParameterCount(e) => write!(f, "{}", e),
		}
	}
}

impl std::fmt::Display for PayloadTooLarge {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "payload too large, got {} bytes, maximum is {}", self.actual, self.max)
	}
}

impl std::fmt::Display for InvalidPixelCount {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "invalid pixel count, device has {} LEDs, got {} colors", self.expected, self.actual)
	}
}

impl std::fmt::Display for MissingSync {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "no SYNC byte found in {} received bytes", self.discarded)
	}
}

impl std::fmt::Display for Truncated {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self.expected {
			Some(expected) => write!(f, "truncated frame, expected {} bytes, got {}", expected, self.actual),
			None => write!(f, "truncated frame, got {} bytes before the length field", self.actual),
		}
	}
}

impl std::fmt::Display for InvalidLength {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "frame too short, expected at least {} bytes, got {}", self.minimum, self.actual)
	}
}

impl std::fmt::Display for InvalidChecksum {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(
			f,
			"invalid checksum, message claims {:#04X}, computed {:#04X}",
			self.message, self.computed
		)
	}
}

impl std::fmt::Display for InvalidAddress {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "invalid address, expected {:#04X}, got {:#04X}", self.expected, self.actual)
	}
}

impl std::fmt::Display for InvalidStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "device reported error status: {:#04X}", self.status)
	}
}

impl std::fmt::Display for UnknownReport {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "unknown report: {:#04X}", self.report)
	}
}

impl std::fmt::Display for ExpectedCount {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Exact(x) => write!(f, "exactly {}", x),
			Self::Min(x) => write!(f, "at least {}", x),
		}
	}
}

impl std::fmt::Display for InvalidParameterCount {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "invalid parameter count, expected {}, got {}", self.expected, self.actual)
	}
}
