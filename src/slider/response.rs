use super::command_id;
use crate::{DeviceInfo, Frame, InvalidLength, InvalidMessage, InvalidParameterCount, UnknownReport};

/// A response decoded from a slider frame.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Response {
	/// The slider finished a reset and is ready for commands.
	Ready,

	/// A touch report with the raw pressure values in slider order.
	///
	/// Use [`super::TouchReport::from_raw()`] to convert the values to left-to-right coordinates.
	SingleReport {
		/// The raw pressure values.
		values: Vec<u8>,
	},

	/// The slider rejected a request.
	Exception {
		/// The context of the failure, normally the offending command.
		context: u8,

		/// The error code.
		error: u8,
	},

	/// The device information.
	Info(DeviceInfo),
}

impl Response {
	/// Decode a response from a frame: `[SYNC, command, argc, arguments..., checksum]`.
	///
	/// The checksum is not checked here, that is up to the [`crate::Bus`].
	pub fn decode(frame: &Frame) -> Result<Self, InvalidMessage> {
		let data = frame.as_bytes();
		InvalidLength::check(data.len(), 4)?;
		let command = data[1];
		let argc = usize::from(data[2]);
		let arguments = &data[3..data.len() - 1];
		InvalidParameterCount::check(arguments.len(), argc)?;

		match command {
			command_id::RESET => Ok(Self::Ready),
			command_id::SINGLE_REPORT => Ok(Self::SingleReport {
				values: arguments.to_vec(),
			}),
			command_id::EXCEPTION => {
				InvalidParameterCount::check_min(arguments.len(), 2)?;
				Ok(Self::Exception {
					context: arguments[0],
					error: arguments[1],
				})
			},
			command_id::GET_INFO => Ok(Self::Info(DeviceInfo::parse(arguments)?)),
			report => Err(UnknownReport { report }.into()),
		}
	}

	/// The command ID of the response.
	pub fn command_id(&self) -> u8 {
		match self {
			Self::Ready => command_id::RESET,
			Self::SingleReport { .. } => command_id::SINGLE_REPORT,
			Self::Exception { .. } => command_id::EXCEPTION,
			Self::Info(_) => command_id::GET_INFO,
		}
	}
}
