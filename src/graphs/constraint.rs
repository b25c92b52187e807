//! A [Constraint] is the filter applied to nodes during nearest lookups and
//! while expanding a search
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Bundle of node filters. A node is suitable when every enabled check passes
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub struct Constraint {
	/// Enables the walkability check
	pub check_walkability: bool,
	/// Walkability a node must have when `check_walkability` is set
	pub walkable: bool,
	/// Enables the area check
	pub check_area: bool,
	/// Bitmask of accepted areas, tested against `1 << area`
	pub area_mask: u64,
	/// Bitmask of accepted graphs, tested against `1 << graph index`. Any negative value accepts every graph
	pub graph_mask: i64,
}

impl Default for Constraint {
	/// Walkable nodes of any area on any graph
	fn default() -> Self {
		Constraint {
			check_walkability: true,
			walkable: true,
			check_area: false,
			area_mask: u64::MAX,
			graph_mask: -1,
		}
	}
}

impl Constraint {
	/// A constraint that accepts every node
	pub fn any() -> Self {
		Constraint {
			check_walkability: false,
			..Default::default()
		}
	}
	/// Require walkable nodes
	pub fn with_walkable(mut self) -> Self {
		self.check_walkability = true;
		self.walkable = true;
		self
	}
	/// Enable the area check with the given mask
	pub fn with_area_mask(mut self, area_mask: u64) -> Self {
		self.check_area = true;
		self.area_mask = area_mask;
		self
	}
	/// Restrict to the graphs in the mask
	pub fn with_graph_mask(mut self, graph_mask: i64) -> Self {
		self.graph_mask = graph_mask;
		self
	}
	/// Restrict to nodes in the same area as `area`
	pub fn with_area(self, area: u32) -> Self {
		self.with_area_mask(area_bit(area))
	}
	/// Tests an area id against the mask
	pub fn accepts_area(&self, area: u32) -> bool {
		self.area_mask & area_bit(area) != 0
	}
	/// Tests a graph index against the mask
	pub fn accepts_graph(&self, graph_index: usize) -> bool {
		if self.graph_mask < 0 {
			return true;
		}
		1_i64
			.checked_shl(graph_index as u32)
			.is_some_and(|bit| self.graph_mask & bit != 0)
	}
}

/// Bit of an area within an area mask, `0` when the area cannot be represented
fn area_bit(area: u32) -> u64 {
	1_u64.checked_shl(area).unwrap_or(0)
}
