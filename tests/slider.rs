use assert2::{assert, let_assert};
use cabinet_io::framing::{decode, encode};
use cabinet_io::slider::{command_id, Command, LedState, Response, Slider, SliderConfig, TouchReport, FORMAT};
use cabinet_io::{HandshakeError, PixelColor, RetryPolicy};
use std::time::Duration;
use test_log::test;

mod common;
use common::{chunked, MockTransport};

fn response(command: u8, args: &[u8]) -> Vec<u8> {
	let mut body = vec![command, args.len() as u8];
	body.extend_from_slice(args);
	encode(&FORMAT, &body)
}

fn info_args() -> Vec<u8> {
	b"15330   \xA006712\x90\x00\x00\x00".to_vec()
}

fn config() -> SliderConfig {
	SliderConfig::default()
		.with_retry(RetryPolicy::fixed(5, Duration::ZERO))
		.with_read_timeout(Duration::from_millis(100))
		.with_error_delay(Duration::from_millis(1))
}

/// Answer like a slider that reports `values` on each ping-pong.
fn slider_device(values: Vec<u8>) -> impl FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static {
	move |data| {
		let_assert!(Some(frame) = decode(&FORMAT, data));
		match frame.body()[0] {
			command_id::RESET => chunked(response(command_id::RESET, &[]), 2),
			command_id::GET_INFO => chunked(response(command_id::GET_INFO, &info_args()), 5),
			command_id::PING_PONG => chunked(response(command_id::SINGLE_REPORT, &values), 7),
			_ => vec![],
		}
	}
}

#[test]
fn test_connect() {
	let (transport, handle) = MockTransport::new("slider", slider_device(vec![0; 32]));
	let_assert!(Ok(slider) = Slider::connect(transport, config()));

	let_assert!(Some(info) = slider.device_info());
	assert!(info.model == "15330");
	assert!(info.class == 0xA0);
	assert!(info.chip == "06712");
	assert!(info.firmware_version == 0x90);

	let bodies = handle.written_bodies(&FORMAT);
	assert!(bodies == [vec![command_id::RESET, 0], vec![command_id::GET_INFO, 0]]);
}

#[test]
fn test_reset_is_retried() {
	let mut resets = 0;
	let mut device = slider_device(vec![0; 32]);
	let (transport, handle) = MockTransport::new("slider", move |data| {
		if data[1] == command_id::RESET {
			resets += 1;
			if resets < 3 {
				return vec![];
			}
		}
		device(data)
	});
	let_assert!(Ok(_slider) = Slider::connect(transport, config()));
	let bodies = handle.written_bodies(&FORMAT);
	assert!(bodies.iter().filter(|body| body[0] == command_id::RESET).count() == 3);
}

#[test]
fn test_reset_skips_garbage() {
	let (transport, _handle) = MockTransport::new("slider", |data| {
		let mut reply = vec![0x00, 0x42, 0x13];
		match data[1] {
			command_id::RESET => reply.extend(response(command_id::RESET, &[])),
			_ => reply.extend(response(command_id::GET_INFO, &info_args())),
		}
		vec![reply]
	});
	let_assert!(Ok(slider) = Slider::connect(transport, config()));
	assert!(slider.device_info().is_some());
}

#[test]
fn test_not_ready() {
	let (transport, handle) = MockTransport::new("slider", |_| vec![]);
	let_assert!(Err(HandshakeError::NotReady { attempts: 5 }) = Slider::connect(transport, config()));
	assert!(handle.written().len() == 5);
}

#[test]
fn test_missing_info_is_not_fatal() {
	let (transport, _handle) = MockTransport::new("slider", |data| match data[1] {
		command_id::RESET => vec![response(command_id::RESET, &[])],
		_ => vec![response(command_id::EXCEPTION, &[command_id::GET_INFO, 0x01])],
	});
	let_assert!(Ok(slider) = Slider::connect(transport, config()));
	assert!(slider.device_info().is_none());
}

#[test]
fn test_single_report_remap() {
	let mut values: Vec<u8> = (0..32).collect();
	values[0] = 0xC8;
	values[1] = 0xFF;
	let (transport, handle) = MockTransport::new("slider", slider_device(values.clone()));
	let_assert!(Ok(mut slider) = Slider::connect(transport, config()));

	slider.send_command(&Command::PingPong(LedState::new(0xFE))).unwrap();
	let_assert!(Ok(Response::SingleReport { values: received }) = slider.receive_response());
	assert!(received == values);

	let_assert!(Ok(report) = slider.read_touch(&LedState::new(0x80)));
	// The rightmost column on the slider is the first one it reports.
	assert!(report.pressure(0, 15) == Some(0xC8));
	assert!(report.pressure(1, 15) == Some(0xFF));
	assert!(report.pressure(0, 0) == Some(30));
	assert!(report.pressure(1, 0) == Some(31));

	let_assert!(Some(last) = handle.written_bodies(&FORMAT).pop());
	assert!(last[0..3] == [command_id::PING_PONG, 94, 0x80]);
}

#[test]
fn test_reporting_publishes_changes() {
	let idle = vec![0u8; 32];
	let mut touched = vec![0u8; 32];
	touched[30] = 200;

	let mut device = slider_device(idle);
	let mut touched_device = slider_device(touched);
	let (transport, handle) = MockTransport::new("slider", move |data| {
		let_assert!(Some(frame) = decode(&FORMAT, data));
		let body = frame.body();
		// LED 30 is under the leftmost key, sent as [b, r, g].
		if body[0] == command_id::PING_PONG && body[3 + 30 * 3..] == [0x30, 0x10, 0x20] {
			touched_device(data)
		} else {
			device(data)
		}
	});

	let_assert!(Ok(slider) = Slider::connect(transport, config()));
	let_assert!(Ok(reporter) = slider.start_reporting());
	assert!(reporter.is_running());

	let_assert!(Ok(first) = reporter.updates().recv_timeout(Duration::from_secs(5)));
	assert!(first == TouchReport::default());

	let mut leds = LedState::new(0xFE);
	leds.paint_segment(0, 1, &[PixelColor::new(0x10, 0x20, 0x30)]);
	assert!(reporter.leds().set(leds));

	let_assert!(Ok(second) = reporter.updates().recv_timeout(Duration::from_secs(5)));
	assert!(second.pressure(0, 0) == Some(200));
	assert!(second.column_pressure(0) == Some(100));

	// Unchanged reports are not published again.
	std::thread::sleep(Duration::from_millis(20));
	assert!(let Err(_) = reporter.updates().try_recv());

	let slider = reporter.stop();
	let bodies = handle.written_bodies(&FORMAT);
	assert!(bodies.iter().filter(|body| body[0] == command_id::ENABLE_REPORT).count() == 1);
	assert!(bodies.iter().filter(|body| body[0] == command_id::PING_PONG).count() >= 2);
	let _transport = slider.close();
}
