//! Constants and the connection slot layout shared by every graph
//!

use bevy::prelude::*;

/// Number of independent search slots. Every [crate::prelude::Node] carries one copy of its search scratch per slot so that up to this many queries can run against the same graph at once
pub const THREADS_COUNT: usize = 8;
/// Number of connection slots carried by every node
pub const CONNECTIONS_COUNT: usize = 10;
/// Scratch cost of a node that has not been reached by the current search
pub const INFINITE_COST: u32 = u32::MAX;
/// Scratch parent of a node that has no predecessor in the current search
pub const NO_PARENT: u32 = u32::MAX;
/// Areas are stored as a `u64` bitmask in [crate::prelude::Constraint] so area ids must stay below this
pub const MAX_AREAS: u32 = 64;
/// Area assigned to nodes that are not walkable
pub const UNWALKABLE_AREA: u32 = 0;
/// Lowest penalty a node can carry. Every step onto a node must raise the integrated cost so a flow field always has a strictly cheaper neighbour to point at
pub const MIN_PENALTY: u32 = 1;
/// Slots explored when building an integration field. Up/Down and the diagonals are left out so the wavefront expands orthogonally
pub const PRIMARY_SLOTS: std::ops::RangeInclusive<usize> = 2..=5;

/// Direction of a connection slot. The discriminant is the slot index and the
/// value written into a flow field, so the order must never change
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Reflect)]
#[repr(u8)]
pub enum Slot {
	/// Layer above, unused by single layer grids
	Up = 0,
	/// Layer below, unused by single layer grids
	Down = 1,
	/// `-z`
	North = 2,
	/// `+x`
	East = 3,
	/// `+z`
	South = 4,
	/// `-x`
	West = 5,
	/// `+x -z`
	NorthEast = 6,
	/// `+x +z`
	SouthEast = 7,
	/// `-x +z`
	SouthWest = 8,
	/// `-x -z`
	NorthWest = 9,
}

impl Slot {
	/// Every slot in slot index order
	pub const ALL: [Slot; CONNECTIONS_COUNT] = [
		Slot::Up,
		Slot::Down,
		Slot::North,
		Slot::East,
		Slot::South,
		Slot::West,
		Slot::NorthEast,
		Slot::SouthEast,
		Slot::SouthWest,
		Slot::NorthWest,
	];
	/// Index of the slot within a node's connections
	#[inline]
	pub fn as_index(self) -> usize {
		self as usize
	}
	/// Convert a slot index, such as a flow field entry, back into a [Slot]
	pub fn from_index(index: usize) -> Option<Slot> {
		Slot::ALL.get(index).copied()
	}
	/// Grid offset `(x, z)` of the slot, layer slots have no planar offset
	pub fn grid_offset(self) -> (i64, i64) {
		match self {
			Slot::Up | Slot::Down => (0, 0),
			Slot::North => (0, -1),
			Slot::East => (1, 0),
			Slot::South => (0, 1),
			Slot::West => (-1, 0),
			Slot::NorthEast => (1, -1),
			Slot::SouthEast => (1, 1),
			Slot::SouthWest => (-1, 1),
			Slot::NorthWest => (-1, -1),
		}
	}
	/// Returns the opposite [Slot] of the current
	pub fn inverse(&self) -> Slot {
		match self {
			Slot::Up => Slot::Down,
			Slot::Down => Slot::Up,
			Slot::North => Slot::South,
			Slot::East => Slot::West,
			Slot::South => Slot::North,
			Slot::West => Slot::East,
			Slot::NorthEast => Slot::SouthWest,
			Slot::SouthEast => Slot::NorthWest,
			Slot::SouthWest => Slot::NorthEast,
			Slot::NorthWest => Slot::SouthEast,
		}
	}
	/// Whether the slot is one of the orthogonal slots used by integration
	pub fn is_primary(&self) -> bool {
		PRIMARY_SLOTS.contains(&self.as_index())
	}
}
