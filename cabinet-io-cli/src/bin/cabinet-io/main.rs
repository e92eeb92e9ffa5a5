use cabinet_io::jvs::{AirTowers, JvsConfig, JvsIo, SwitchState};
use cabinet_io::led::{LedBoard, LedBoardConfig, LedSurface};
use cabinet_io::slider::{LedState, Slider, SliderConfig, TouchCoordinate};
use cabinet_io::RetryPolicy;
use std::path::Path;
use std::time::{Duration, Instant};

mod logging;
mod options;

use options::{Command, Options};

fn main() {
	if let Err(()) = do_main(clap::Parser::parse()) {
		std::process::exit(1);
	}
}

fn do_main(options: Options) -> Result<(), ()> {
	logging::init(module_path!(), options.verbose);
	match &options.command {
		Command::Slider {
			brightness,
			threshold,
			color,
			count,
		} => {
			let config = SliderConfig::default()
				.with_read_timeout(read_timeout(&options))
				.with_retry(retry_policy(&options))
				.with_brightness(*brightness);
			let slider = open_slider(&options, config)?;
			let reporter = slider
				.start_reporting()
				.map_err(|e| log::error!("Failed to start slider reporter: {}", e))?;
			let leds = reporter.leds();
			let start = Instant::now();
			for (received, report) in reporter.updates().iter().enumerate() {
				let touched: Vec<_> = report.touched(*threshold).collect();
				let mut state = LedState::new(*brightness);
				for coordinate in &touched {
					state.paint_segment(coordinate.column, 1, &[color.0]);
				}
				leds.set(state);
				log::info!("{:?}: {}", start.elapsed(), format_touched(&touched));
				if count.is_some_and(|count| received + 1 >= count) {
					break;
				}
			}
			if !reporter.is_running() {
				log::error!("Slider reporter stopped unexpectedly");
			}
			reporter.stop().close();
		},
		Command::SliderInfo => {
			let config = SliderConfig::default()
				.with_read_timeout(read_timeout(&options))
				.with_retry(retry_policy(&options));
			let slider = open_slider(&options, config)?;
			match slider.device_info() {
				Some(info) => log_device_info("Slider", info),
				None => log::warn!("Slider did not report its device information"),
			}
		},
		Command::LedInfo { strips } => {
			let mut board = open_led_board(&options, LedSurface::new(*strips, false).led_count())?;
			let info = board
				.device_info()
				.map_err(|e| log::error!("Command failed: {}", e))?;
			log_device_info("LED board", &info);
		},
		Command::LedFill {
			strips,
			color,
			air_color,
			brightness,
			inverse_phase,
		} => {
			let mut surface = LedSurface::new(*strips, *inverse_phase);
			surface.set_brightness(*brightness);
			surface.fill(color.0);
			surface.set_air_tower_color(air_color.unwrap_or(*color).0);

			let mut board = open_led_board(&options, surface.led_count())?;
			log::debug!("Setting {} LEDs to {:?}", surface.led_count(), color.0);
			let start = Instant::now();
			surface.push(&mut board).map_err(|e| log::error!("Command failed: {}", e))?;
			log::info!("{:?}: Ok", start.elapsed());
			// Closing the board would turn the LEDs off again.
			drop(board);
		},
		Command::LedClear { strips } => {
			let mut board = open_led_board(&options, LedSurface::new(*strips, false).led_count())?;
			board.clear().map_err(|e| log::error!("Command failed: {}", e))?;
			log::info!("Ok");
		},
		Command::JvsSwitches {
			node_address,
			players,
			bytes_per_player,
			count,
		} => {
			let config = JvsConfig::default()
				.with_read_timeout(read_timeout(&options))
				.with_retry(retry_policy(&options))
				.with_node_address(*node_address)
				.with_switch_layout(*players, *bytes_per_player);
			let io = JvsIo::open(&options.serial_port, config)
				.map_err(|e| log::error!("Failed to connect to JVS I/O board on {}: {}", options.serial_port.display(), e))?;
			if let Some(identity) = io.identity() {
				log::info!("I/O board: {}", identity);
			}
			let poller = io
				.start_polling()
				.map_err(|e| log::error!("Failed to start switch poller: {}", e))?;
			let start = Instant::now();
			for (received, state) in poller.updates().iter().enumerate() {
				log_switch_state(&state, start.elapsed());
				if count.is_some_and(|count| received + 1 >= count) {
					break;
				}
			}
			if !poller.is_running() {
				log::error!("Switch poller stopped unexpectedly");
			}
			poller.stop().close();
		},
		Command::ShellCompletion { shell, output } => {
			write_shell_completion(*shell, output.as_deref())?;
		},
	}

	Ok(())
}

fn read_timeout(options: &Options) -> Duration {
	Duration::from_millis(options.read_timeout_ms)
}

fn retry_policy(options: &Options) -> RetryPolicy {
	let policy = RetryPolicy::default();
	match options.max_attempts {
		None => policy,
		Some(0) => policy.with_max_attempts(None),
		Some(max_attempts) => policy.with_max_attempts(Some(max_attempts)),
	}
}

fn open_slider(options: &Options, config: SliderConfig) -> Result<Slider<serial2::SerialPort>, ()> {
	let slider = Slider::open(&options.serial_port, config)
		.map_err(|e| log::error!("Failed to connect to slider on {}: {}", options.serial_port.display(), e))?;
	log::debug!("Using serial port {}", options.serial_port.display());
	Ok(slider)
}

fn open_led_board(options: &Options, led_count: usize) -> Result<LedBoard<serial2::SerialPort>, ()> {
	let config = LedBoardConfig::new(led_count)
		.with_read_timeout(read_timeout(options))
		.with_retry(retry_policy(options));
	let board = LedBoard::open(&options.serial_port, config)
		.map_err(|e| log::error!("Failed to connect to LED board on {}: {}", options.serial_port.display(), e))?;
	log::debug!("Using serial port {} for {} LEDs", options.serial_port.display(), led_count);
	Ok(board)
}

fn format_touched(touched: &[TouchCoordinate]) -> String {
	if touched.is_empty() {
		return String::from("released");
	}
	let keys: Vec<_> = touched
		.iter()
		.map(|coordinate| format!("{}{}", coordinate.column, if coordinate.row == 0 { 'a' } else { 'b' }))
		.collect();
	keys.join(" ")
}

fn log_device_info(name: &str, info: &cabinet_io::DeviceInfo) {
	log::info!("{}", name);
	log::info!(" ├─ Model: {}", info.model);
	log::info!(" ├─ Class: 0x{:02X}", info.class);
	log::info!(" ├─ Chip: {}", info.chip);
	log::info!(" └─ Firmware: 0x{:02X}", info.firmware_version);
}

fn log_switch_state(state: &SwitchState, elapsed: Duration) {
	log::info!("{:?}: system 0x{:02X}", elapsed, state.system());
	if state.test_button() {
		log::info!(" ├─ Test button pressed");
	}
	for player in 0..state.player_count() {
		if let Some(bytes) = state.player(player) {
			log::info!(" ├─ Player {}: {:02X?}", player + 1, bytes);
		}
	}
	match AirTowers::from_switches(state) {
		Some(towers) => log::info!(" └─ Air level: {} ({:.2})", towers.level(), towers.output()),
		None => log::info!(" └─ Air towers: not available"),
	}
}

fn write_shell_completion(shell: clap_complete::Shell, path: Option<&Path>) -> Result<(), ()> {
	use clap::CommandFactory;
	use std::io::Write;

	let mut buffer = Vec::with_capacity(4 * 1024);

	let mut command = Options::command();
	clap_complete::generate(shell, &mut command, env!("CARGO_BIN_NAME"), &mut buffer);
	if !buffer.ends_with(b"\n") {
		buffer.push(b'\n');
	}

	let path = path.unwrap_or_else(|| Path::new("-"));
	if path == Path::new("-") {
		log::debug!("Writing shell completion for {} to stdout", shell);
		let stdout = std::io::stdout();
		stdout
			.lock()
			.write_all(&buffer)
			.map_err(|e| log::error!("Failed to write to stdout: {}", e))?;
	} else {
		log::debug!("Writing shell completion for {} to {}", shell, path.display());
		let mut output = std::fs::File::create(path).map_err(|e| log::error!("Failed to create {}: {}", path.display(), e))?;
		output
			.write_all(&buffer)
			.map_err(|e| log::error!("Failed to write to {}: {}", path.display(), e))?;
	}

	Ok(())
}
