use env_logger::fmt::{Color, Formatter};
use std::io::Write;

/// Log to stderr, showing the library and the tool itself at the verbosity chosen with `-v`.
///
/// Messages from the slider reporter and the switch poller are tagged with the name of their thread,
/// since those loops log concurrently with the main thread.
pub fn init(root_module: &str, verbosity: u8) {
	env_logger::Builder::new()
		.format(format_record)
		.filter_level(log::LevelFilter::Warn)
		.filter_module(root_module, level_filter(verbosity))
		.filter_module("cabinet_io", level_filter(verbosity))
		.init();
}

fn level_filter(verbosity: u8) -> log::LevelFilter {
	match verbosity {
		0 => log::LevelFilter::Info,
		1 => log::LevelFilter::Debug,
		_ => log::LevelFilter::Trace,
	}
}

/// The label and color for a level, if it gets one.
fn level_label(level: log::Level) -> Option<(&'static str, Color)> {
	match level {
		log::Level::Error => Some(("Error", Color::Red)),
		log::Level::Warn => Some(("Warning", Color::Yellow)),
		log::Level::Trace => Some(("Trace", Color::Cyan)),
		log::Level::Debug | log::Level::Info => None,
	}
}

fn format_record(buffer: &mut Formatter, record: &log::Record) -> std::io::Result<()> {
	if let Some((label, color)) = level_label(record.level()) {
		let mut style = buffer.style();
		style.set_color(color).set_bold(record.level() <= log::Level::Warn);
		write!(buffer, "{}: ", style.value(label))?;
	}

	let thread = std::thread::current();
	match thread.name() {
		Some(name) if name != "main" => {
			let mut style = buffer.style();
			style.set_dimmed(true);
			writeln!(buffer, "{} {}", style.value(format!("[{}]", name)), record.args())
		},
		_ => writeln!(buffer, "{}", record.args()),
	}
}
