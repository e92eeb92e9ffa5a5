use cabinet_io::PixelColor;
use std::path::PathBuf;

/// Talk to arcade cabinet peripherals: the touch slider, the LED board and the JVS I/O board.
#[derive(clap::Parser)]
#[command(version, about)]
pub struct Options {
	#[arg(long, short, action = clap::ArgAction::Count)]
	#[arg(global = true)]
	pub verbose: u8,

	/// The serial port the device is connected to.
	#[arg(long, short)]
	#[arg(global = true)]
	#[cfg_attr(target_os = "windows", arg(default_value = "COM1"))]
	#[cfg_attr(not(target_os = "windows"), arg(default_value = "/dev/ttyUSB0"))]
	pub serial_port: PathBuf,

	/// The timeout for a single response in milliseconds.
	#[arg(long)]
	#[arg(global = true)]
	#[arg(default_value = "3000")]
	pub read_timeout_ms: u64,

	/// The number of handshake attempts before giving up (0 retries forever).
	#[arg(long)]
	#[arg(global = true)]
	pub max_attempts: Option<u32>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
	/// Show touch changes reported by the slider.
	Slider {
		/// The LED brightness sent with each exchange.
		#[arg(long)]
		#[arg(default_value = "254")]
		brightness: u8,

		/// The minimum pressure for a key to count as touched.
		#[arg(long)]
		#[arg(default_value = "32")]
		threshold: u8,

		/// The color for touched columns.
		#[arg(long)]
		#[arg(value_name = "RRGGBB")]
		#[arg(default_value = "ffffff")]
		color: Color,

		/// Stop after this many reports.
		#[arg(long)]
		count: Option<usize>,
	},

	/// Show the device information of the slider.
	SliderInfo,

	/// Show the device information of the LED board.
	LedInfo {
		/// The number of LED strips.
		#[arg(long)]
		#[arg(default_value = "6")]
		strips: usize,
	},

	/// Set all LEDs of the LED board to one color.
	LedFill {
		/// The number of LED strips.
		#[arg(long)]
		#[arg(default_value = "6")]
		strips: usize,

		/// The color for the strips.
		#[arg(value_name = "RRGGBB")]
		color: Color,

		/// The color for the air towers (defaults to the strip color).
		#[arg(long)]
		#[arg(value_name = "RRGGBB")]
		air_color: Option<Color>,

		/// The brightness of the strips, from 0.0 to 1.0.
		#[arg(long)]
		#[arg(default_value = "0.6")]
		brightness: f64,

		/// Reverse the even strips instead of the odd strips.
		#[arg(long)]
		inverse_phase: bool,
	},

	/// Turn off all LEDs of the LED board.
	LedClear {
		/// The number of LED strips.
		#[arg(long)]
		#[arg(default_value = "6")]
		strips: usize,
	},

	/// Show switch changes reported by the JVS I/O board.
	JvsSwitches {
		/// The address to assign to the I/O board.
		#[arg(long)]
		#[arg(default_value = "1")]
		node_address: u8,

		/// The number of players to read.
		#[arg(long)]
		#[arg(default_value = "2")]
		players: u8,

		/// The number of switch bytes to read for each player.
		#[arg(long)]
		#[arg(default_value = "2")]
		bytes_per_player: u8,

		/// Stop after this many switch changes.
		#[arg(long)]
		count: Option<usize>,
	},

	/// Write shell completions to a file or to stdout.
	ShellCompletion {
		/// The shell for which to generate completions.
		#[arg(long)]
		shell: clap_complete::Shell,

		/// The file to write the generated completion file to.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
}

#[derive(Copy, Clone, Debug)]
pub struct Color(pub PixelColor);

impl std::str::FromStr for Color {
	type Err = &'static str;

	fn from_str(data: &str) -> Result<Self, Self::Err> {
		const ERROR: &str = "invalid color: expected six hexadecimal digits, like \"ff8000\"";
		let data = data.strip_prefix('#').unwrap_or(data);
		if data.len() != 6 || !data.is_ascii() {
			return Err(ERROR);
		}
		let channel = |i: usize| u8::from_str_radix(&data[i..i + 2], 16).map_err(|_| ERROR);
		Ok(Self(PixelColor::new(channel(0)?, channel(2)?, channel(4)?)))
	}
}
