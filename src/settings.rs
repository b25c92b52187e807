//! Configuration of the [crate::prelude::Pathfinding] coordinator
//!

use bevy::prelude::*;

/// Bitmask of the events worth logging at `info` level
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub struct LogLevel(u8);

impl LogLevel {
	/// Log nothing
	pub const NONE: LogLevel = LogLevel(0b0000_0000);
	/// Log the outcome and duration of every path query
	pub const PATH: LogLevel = LogLevel(0b0000_0001);
	/// Log graph builds
	pub const GRAPH_BUILD: LogLevel = LogLevel(0b0000_0010);
	/// Log everything
	pub const ALL: LogLevel = LogLevel(0b0000_0011);
	/// Whether every bit of `other` is set
	pub fn contains(&self, other: LogLevel) -> bool {
		self.0 & other.0 == other.0 && other.0 != 0
	}
	/// Combine two levels
	pub fn with(self, other: LogLevel) -> LogLevel {
		LogLevel(self.0 | other.0)
	}
}

/// Selects the algorithm used to answer path queries
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum ProcessorKind {
	/// A* producing the list of nodes between start and end
	Corners,
	/// Integration and flow field covering the whole graph
	#[default]
	FlowField,
}

/// Settings of a [crate::prelude::Pathfinding] instance
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq, Reflect)]
pub struct PathfindingSettings {
	/// Algorithm answering path queries
	pub processor: ProcessorKind,
	/// Events logged at `info` level
	pub log_level: LogLevel,
	/// A cloned instance is rebuilt on every build request instead of only the first
	pub clone_pathfinding: bool,
}

impl PathfindingSettings {
	/// From a `ron` file generate the [PathfindingSettings]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Self {
		let file = match std::fs::File::open(&path) {
			Ok(file) => file,
			Err(e) => panic!("Failed opening PathfindingSettings file {}: {}", path, e),
		};
		let settings: PathfindingSettings = match ron::de::from_reader(file) {
			Ok(settings) => settings,
			Err(e) => panic!("Failed deserializing PathfindingSettings: {}", e),
		};
		settings
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn log_level_bits() {
		let level = LogLevel::PATH;
		assert!(level.contains(LogLevel::PATH));
		assert!(!level.contains(LogLevel::GRAPH_BUILD));
		assert!(!level.contains(LogLevel::NONE));
		assert!(LogLevel::ALL.contains(LogLevel::GRAPH_BUILD));
		assert_eq!(LogLevel::ALL, LogLevel::PATH.with(LogLevel::GRAPH_BUILD));
	}
	#[test]
	fn default_settings() {
		let settings = PathfindingSettings::default();
		assert_eq!(ProcessorKind::FlowField, settings.processor);
		assert_eq!(LogLevel::NONE, settings.log_level);
		assert!(!settings.clone_pathfinding);
	}
	#[test]
	#[cfg(feature = "ron")]
	fn settings_file() {
		let path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/pathfinding_settings.ron";
		let settings = PathfindingSettings::from_ron(path);
		assert_eq!(ProcessorKind::Corners, settings.processor);
		assert_eq!(LogLevel::ALL, settings.log_level);
	}
}
