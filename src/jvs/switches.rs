use crate::InvalidParameterCount;

/// The bit of the system byte that is set while the test button is pressed.
pub const TEST_BUTTON: u8 = 0x80;

/// A snapshot of the switch inputs of a JVS node.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SwitchState {
	system: u8,
	player_bytes: Vec<u8>,
	bytes_per_player: usize,
}

impl SwitchState {
	/// Parse the data of a switch read: one system byte followed by the bytes of each player.
	///
	/// Any data after the requested bytes is ignored.
	pub fn parse(data: &[u8], players: usize, bytes_per_player: usize) -> Result<Self, InvalidParameterCount> {
		let len = 1 + players * bytes_per_player;
		InvalidParameterCount::check_min(data.len(), len)?;
		Ok(Self {
			system: data[0],
			player_bytes: data[1..len].to_vec(),
			bytes_per_player,
		})
	}

	/// The system byte.
	pub fn system(&self) -> u8 {
		self.system
	}

	/// Check if the test button is pressed.
	pub fn test_button(&self) -> bool {
		self.system & TEST_BUTTON != 0
	}

	/// The bytes of all players, one player after the other.
	pub fn player_bytes(&self) -> &[u8] {
		&self.player_bytes
	}

	/// The number of players in the snapshot.
	pub fn player_count(&self) -> usize {
		match self.bytes_per_player {
			0 => 0,
			n => self.player_bytes.len() / n,
		}
	}

	/// The bytes of a single player, starting at player 0.
	///
	/// Returns `None` if the player is not in the snapshot or if players have no bytes at all.
	pub fn player(&self, index: usize) -> Option<&[u8]> {
		if self.bytes_per_player == 0 {
			return None;
		}
		let start = index.checked_mul(self.bytes_per_player)?;
		let end = start.checked_add(self.bytes_per_player)?;
		self.player_bytes.get(start..end)
	}
}

/// The state of the six air tower sensors.
///
/// The sensors sit in two towers, left and right, with three sensors each.
/// The left tower is wired to the second byte of player 1 and the right tower to the second byte of player 2.
/// A sensor is active while its bit is clear.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct AirTowers {
	sensors: [bool; AirTowers::SENSOR_COUNT],
}

impl AirTowers {
	/// The number of sensors.
	pub const SENSOR_COUNT: usize = 6;

	/// The highest level.
	pub const MAX_LEVEL: u8 = 12;

	const SENSOR_BITS: [u8; 3] = [0x20, 0x10, 0x08];

	/// Decode the sensors from a switch state.
	///
	/// Returns `None` if the state has fewer than 4 player bytes.
	pub fn from_switches(state: &SwitchState) -> Option<Self> {
		let bytes = state.player_bytes();
		let left = *bytes.get(1)?;
		let right = *bytes.get(3)?;
		let mut sensors = [false; Self::SENSOR_COUNT];
		for (i, bit) in Self::SENSOR_BITS.iter().enumerate() {
			sensors[2 * i] = left & bit == 0;
			sensors[2 * i + 1] = right & bit == 0;
		}
		Some(Self { sensors })
	}

	/// The sensors from bottom to top, alternating between the left and right tower.
	pub fn sensors(&self) -> [bool; Self::SENSOR_COUNT] {
		self.sensors
	}

	/// The hand height as a level from 0 to [`Self::MAX_LEVEL`].
	///
	/// The level is derived from the lowest active sensor and the number of consecutive active sensors above it.
	pub fn level(&self) -> u8 {
		let Some(lowest) = self.sensors.iter().position(|&active| active) else {
			return 0;
		};
		let consecutive = self.sensors[lowest..].iter().take_while(|&&active| active).count();
		(lowest * 2 + consecutive).min(usize::from(Self::MAX_LEVEL)) as u8
	}

	/// The level scaled to the range 0.0 to 1.0.
	pub fn output(&self) -> f64 {
		f64::from(self.level()) / f64::from(Self::MAX_LEVEL)
	}
}
