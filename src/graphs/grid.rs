//! Generates the nodes of a single layer grid graph.
//!
//! Nodes are laid out row by row from the `origin` corner, the `x` axis is a
//! column and the `z` axis is a row. A node's index is `row * columns + column`:
//!
//! ```text
//!  origin
//!    x------> +x (East)
//!    | 0 | 1 | 2 | 3 |
//!    | 4 | 5 | 6 | 7 |
//!    | 8 | 9 |10 |11 |
//!    v
//!   +z (South)
//! ```
//!
//! Connections are purely topological, a neighbour which is not walkable is
//! still connected and is filtered out by a [Constraint] during a search. This
//! means a change of walkability only ever requires the areas to be rebuilt.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Parameters of a grid graph
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct GridSettings {
	/// Number of `(columns, rows)`
	pub size: UVec2,
	/// Distance between orthogonally adjacent nodes
	pub node_size: f32,
	/// World position of the top-left corner of the grid
	pub origin: Vec3,
	/// Whether the diagonal slots are connected
	pub diagonals: bool,
	/// Penalty given to every node
	pub penalty: u32,
}

impl Default for GridSettings {
	fn default() -> Self {
		GridSettings {
			size: UVec2::new(10, 10),
			node_size: 1.0,
			origin: Vec3::ZERO,
			diagonals: true,
			penalty: 1,
		}
	}
}

impl GridSettings {
	/// Create grid settings of `columns` x `rows` nodes spaced `node_size` apart
	pub fn new(columns: u32, rows: u32, node_size: f32) -> Self {
		if columns == 0 || rows == 0 {
			panic!(
				"Grid dimensions `({}, {})` must have at least one column and one row",
				columns, rows
			);
		}
		if node_size <= 0.0 {
			panic!("Grid node size must be greater than zero, got {}", node_size);
		}
		GridSettings {
			size: UVec2::new(columns, rows),
			node_size,
			..Default::default()
		}
	}
	/// Set the origin corner
	pub fn with_origin(mut self, origin: Vec3) -> Self {
		self.origin = origin;
		self
	}
	/// Enable or disable diagonal connections
	pub fn with_diagonals(mut self, diagonals: bool) -> Self {
		self.diagonals = diagonals;
		self
	}
	/// Set the penalty of every node, values below [MIN_PENALTY] are raised when the nodes are generated
	pub fn with_penalty(mut self, penalty: u32) -> Self {
		self.penalty = penalty;
		self
	}
	/// Total number of nodes
	pub fn node_count(&self) -> usize {
		self.size.x as usize * self.size.y as usize
	}
	/// Index of the node at `(column, row)`
	pub fn index_of(&self, column: u32, row: u32) -> usize {
		row as usize * self.size.x as usize + column as usize
	}
	/// World position of the centre of the node at `(column, row)`
	pub fn world_position(&self, column: u32, row: u32) -> Vec3 {
		let half = self.node_size / 2.0;
		self.origin
			+ Vec3::new(
				column as f32 * self.node_size + half,
				0.0,
				row as f32 * self.node_size + half,
			)
	}
	/// Find the `(column, row)` of a world position if it lies on the grid
	pub fn world_to_cell(&self, position: Vec3) -> Option<(u32, u32)> {
		let local = (position - self.origin) / self.node_size;
		if local.x < 0.0 || local.z < 0.0 {
			return None;
		}
		let (column, row) = (local.x as u32, local.z as u32);
		if column < self.size.x && row < self.size.y {
			Some((column, row))
		} else {
			None
		}
	}
	/// Produce a descriptor for every node of the grid, in index order
	pub fn generate(&self) -> Vec<NodeDescriptor> {
		let mut descriptors = Vec::with_capacity(self.node_count());
		for row in 0..self.size.y {
			for column in 0..self.size.x {
				let mut descriptor = NodeDescriptor::new(self.world_position(column, row))
					.with_penalty(self.penalty);
				for slot in Slot::ALL {
					if !self.diagonals && !slot.is_primary() {
						continue;
					}
					if let Some(neighbour) = self.neighbour(column, row, slot) {
						descriptor = descriptor.with_connection(slot, neighbour);
					}
				}
				descriptors.push(descriptor);
			}
		}
		descriptors
	}
	/// Index of the node reached from `(column, row)` through `slot`, [None] when off the grid or a layer slot
	fn neighbour(&self, column: u32, row: u32, slot: Slot) -> Option<usize> {
		let (dx, dz) = slot.grid_offset();
		if (dx, dz) == (0, 0) {
			return None;
		}
		let x = column as i64 + dx;
		let z = row as i64 + dz;
		if x < 0 || z < 0 || x >= self.size.x as i64 || z >= self.size.y as i64 {
			return None;
		}
		Some(self.index_of(x as u32, z as u32))
	}
}
