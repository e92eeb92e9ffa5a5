use assert2::let_assert;
use cabinet_io::framing::decode;
use cabinet_io::{Frame, FrameFormat, ReadError, Transport};
use log::trace;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>> + Send>;

struct MockState {
	responder: Responder,
	pending: VecDeque<Vec<u8>>,
	written: Vec<Vec<u8>>,
}

/// A transport that answers each write with scripted data.
///
/// The responder gets the raw bytes of each write and returns the chunks to deliver,
/// one chunk per read.
pub struct MockTransport {
	name: String,
	state: Arc<Mutex<MockState>>,
}

/// A handle to inspect a mock transport after it has been moved into a session.
#[derive(Clone)]
pub struct MockHandle {
	state: Arc<Mutex<MockState>>,
}

impl std::fmt::Debug for MockTransport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MockTransport").field("name", &self.name).finish_non_exhaustive()
	}
}

impl MockTransport {
	pub fn new<F>(name: &str, responder: F) -> (Self, MockHandle)
	where
		F: FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static,
	{
		let state = Arc::new(Mutex::new(MockState {
			responder: Box::new(responder),
			pending: VecDeque::new(),
			written: Vec::new(),
		}));
		let transport = Self {
			name: name.to_string(),
			state: state.clone(),
		};
		(transport, MockHandle { state })
	}

	fn state(&self) -> MutexGuard<'_, MockState> {
		self.state.lock().unwrap()
	}
}

impl MockHandle {
	/// All writes so far, as raw bytes.
	pub fn written(&self) -> Vec<Vec<u8>> {
		self.state.lock().unwrap().written.clone()
	}

	/// All writes so far, decoded with the given frame format.
	pub fn written_frames(&self, format: &FrameFormat) -> Vec<Frame> {
		self.written()
			.iter()
			.map(|data| {
				let_assert!(Some(frame) = decode(format, data), "written data is not a frame: {:02X?}", data);
				frame
			})
			.collect()
	}

	/// The frame bodies of all writes so far.
	pub fn written_bodies(&self, format: &FrameFormat) -> Vec<Vec<u8>> {
		self.written_frames(format).iter().map(|frame| frame.body().to_vec()).collect()
	}
}

impl Transport for MockTransport {
	type Error = std::io::Error;

	fn discard_input_buffer(&mut self) -> Result<(), Self::Error> {
		self.state().pending.clear();
		Ok(())
	}

	fn read(&mut self, buffer: &mut [u8], _timeout: Duration) -> Result<usize, ReadError<Self::Error>> {
		let chunk = self.state().pending.pop_front().ok_or(ReadError::Timeout)?;
		assert!(chunk.len() <= buffer.len(), "read buffer is too small");
		buffer[..chunk.len()].copy_from_slice(&chunk);
		trace!("{} read: {:02X?}", self.name, chunk);
		Ok(chunk.len())
	}

	fn write_all(&mut self, buffer: &[u8]) -> Result<(), Self::Error> {
		trace!("{} written: {:02X?}", self.name, buffer);
		let mut state = self.state();
		state.written.push(buffer.to_vec());
		let reply = (state.responder)(buffer);
		state.pending.extend(reply);
		Ok(())
	}
}

/// Split data into chunks of at most `size` bytes, to exercise partial reads.
pub fn chunked(data: Vec<u8>, size: usize) -> Vec<Vec<u8>> {
	data.chunks(size).map(|chunk| chunk.to_vec()).collect()
}
