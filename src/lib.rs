//! Serial protocols for arcade cabinet peripherals.
//!
//! This crate talks to three kinds of devices over a serial line:
//!
//! * a capacitive touch slider with per-key LEDs ([`slider`]),
//! * an addressable LED strip board ([`led`]),
//! * a JVS I/O board, reached through a USB bridge ([`jvs`]).
//!
//! All three use the same family of framing rules:
//! a SYNC byte starts every frame, SYNC and ESCAPE bytes inside the frame are escaped,
//! and the frame ends with an 8-bit checksum.
//! The shared codec lives in [`framing`] and the shared request/response plumbing in [`Bus`].
//!
//! Each device has a session type that performs the connection handshake when it is created.
//! The slider and the JVS board can be switched to a background polling loop
//! that only publishes a report when it differs from the previous one.
//!
//! If the `"serial2"` feature is enabled (the default), each session can open a serial port by path.
//! Other transports can be used by implementing the [`Transport`] trait.

#![warn(missing_docs)]

pub mod bus;
pub mod change;
pub mod checksum;
pub mod color;
pub mod device_info;
pub mod framing;
pub mod jvs;
pub mod led;
pub mod poll;
pub mod retry;
pub mod slider;
pub mod transport;

mod error;

pub use bus::Bus;
pub use change::ChangeDetector;
pub use color::PixelColor;
pub use device_info::DeviceInfo;
pub use error::*;
pub use framing::{ChecksumPolicy, Frame, FrameFormat};
pub use retry::RetryPolicy;
pub use transport::Transport;

/// The baud rate used by all supported devices.
///
/// All devices use 8 data bits, no parity and 1 stop bit.
pub const BAUD_RATE: u32 = 115_200;
