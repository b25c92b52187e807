//! A [Node] is the atomic vertex of a [crate::prelude::Graph]. Besides its
//! persistent attributes (position, walkability, penalty, area and the fixed
//! set of directional connections) every node carries search scratch which is
//! multiplexed by thread index:
//!
//! ```text
//!  best_cost   [ s0 | s1 | s2 | s3 | s4 | s5 | s6 | s7 ]
//!  parent      [ s0 | s1 | s2 | s3 | s4 | s5 | s6 | s7 ]
//! ```
//!
//! A query running with thread index `t` only ever reads and writes column `t`
//! so queries with different indices never touch the same cell and no lock is
//! needed. The scratch is not part of the node's identity, cloning a node
//! produces fresh scratch.
//!

use std::sync::atomic::{AtomicU32, Ordering};

use crate::prelude::*;
use bevy::prelude::*;

/// Describes a node to be placed into a graph built from an explicit layout
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDescriptor {
	/// Position of the node in world space
	pub world_position: Vec3,
	/// Whether actors can stand on the node
	pub walkable: bool,
	/// Cost added when stepping onto the node, never less than [MIN_PENALTY] once placed in a graph
	pub penalty: u32,
	/// Neighbour node indices by [Slot]
	pub connections: [Option<usize>; CONNECTIONS_COUNT],
}

impl NodeDescriptor {
	/// Create a walkable descriptor with a penalty of `1` and no connections
	pub fn new(world_position: Vec3) -> Self {
		NodeDescriptor {
			world_position,
			walkable: true,
			penalty: 1,
			connections: [None; CONNECTIONS_COUNT],
		}
	}
	/// Set the neighbour found through `slot`
	pub fn with_connection(mut self, slot: Slot, neighbour: usize) -> Self {
		self.connections[slot.as_index()] = Some(neighbour);
		self
	}
	/// Set the penalty, raised to [MIN_PENALTY] if lower
	pub fn with_penalty(mut self, penalty: u32) -> Self {
		self.penalty = penalty.max(MIN_PENALTY);
		self
	}
	/// Set walkability
	pub fn with_walkable(mut self, walkable: bool) -> Self {
		self.walkable = walkable;
		self
	}
}

/// A vertex of a [Graph]
#[derive(Debug)]
pub struct Node {
	/// Position within the owning graph's node array
	index: usize,
	/// Index of the owning graph
	graph_index: usize,
	/// Connected component id, assigned by [Graph::build_areas]
	area: u32,
	/// Location in world space
	world_position: Vec3,
	/// Cost added when stepping onto this node
	penalty: u32,
	/// Whether actors can stand on the node
	walkable: bool,
	/// Neighbour indices ordered by [Slot]
	connections: [Option<usize>; CONNECTIONS_COUNT],
	/// Tentative cost to the search target, one per thread index
	best_cost: [AtomicU32; THREADS_COUNT],
	/// Predecessor discovered by a corner search, one per thread index
	parent: [AtomicU32; THREADS_COUNT],
}

impl Clone for Node {
	fn clone(&self) -> Self {
		Node {
			index: self.index,
			graph_index: self.graph_index,
			area: self.area,
			world_position: self.world_position,
			penalty: self.penalty,
			walkable: self.walkable,
			connections: self.connections,
			best_cost: fresh_scratch(INFINITE_COST),
			parent: fresh_scratch(NO_PARENT),
		}
	}
}

/// Scratch with every slot set to `value`
fn fresh_scratch(value: u32) -> [AtomicU32; THREADS_COUNT] {
	std::array::from_fn(|_| AtomicU32::new(value))
}

impl Node {
	/// Create a new [Node] from a descriptor. The area is unassigned until the graph builds its areas
	pub fn new(index: usize, graph_index: usize, descriptor: &NodeDescriptor) -> Self {
		Node {
			index,
			graph_index,
			area: UNWALKABLE_AREA,
			world_position: descriptor.world_position,
			penalty: descriptor.penalty.max(MIN_PENALTY),
			walkable: descriptor.walkable,
			connections: descriptor.connections,
			best_cost: fresh_scratch(INFINITE_COST),
			parent: fresh_scratch(NO_PARENT),
		}
	}
	/// Get the index of the node within its graph
	pub fn get_index(&self) -> usize {
		self.index
	}
	/// Get the index of the graph owning this node
	pub fn get_graph_index(&self) -> usize {
		self.graph_index
	}
	/// Get the area (connected component) id
	pub fn get_area(&self) -> u32 {
		self.area
	}
	/// Set the area id
	pub(crate) fn set_area(&mut self, area: u32) {
		self.area = area;
	}
	/// Get the world position
	pub fn get_world_position(&self) -> Vec3 {
		self.world_position
	}
	/// Get the traversal penalty
	pub fn get_penalty(&self) -> u32 {
		self.penalty
	}
	/// Set the traversal penalty, raised to [MIN_PENALTY] if lower
	pub fn set_penalty(&mut self, penalty: u32) {
		self.penalty = penalty.max(MIN_PENALTY);
	}
	/// Is the node walkable
	pub fn is_walkable(&self) -> bool {
		self.walkable
	}
	/// Set walkability
	pub fn set_walkable(&mut self, walkable: bool) {
		self.walkable = walkable;
	}
	/// Get the connection slots
	pub fn get_connections(&self) -> &[Option<usize>; CONNECTIONS_COUNT] {
		&self.connections
	}
	/// Get the neighbour through a slot
	pub fn get_connection(&self, slot: Slot) -> Option<usize> {
		self.connections[slot.as_index()]
	}
	/// Tests the node against every enabled check of a [Constraint]
	pub fn is_suitable(&self, constraint: &Constraint) -> bool {
		if constraint.check_walkability && self.walkable != constraint.walkable {
			return false;
		}
		if constraint.check_area && !constraint.accepts_area(self.area) {
			return false;
		}
		constraint.accepts_graph(self.graph_index)
	}
	/// Get the scratch cost for a thread index
	#[inline]
	pub fn get_best_cost(&self, thread_index: usize) -> u32 {
		self.best_cost[thread_index].load(Ordering::Relaxed)
	}
	/// Set the scratch cost for a thread index
	#[inline]
	pub(crate) fn set_best_cost(&self, thread_index: usize, cost: u32) {
		self.best_cost[thread_index].store(cost, Ordering::Relaxed);
	}
	/// Get the scratch parent for a thread index
	#[inline]
	pub(crate) fn get_parent(&self, thread_index: usize) -> Option<usize> {
		match self.parent[thread_index].load(Ordering::Relaxed) {
			NO_PARENT => None,
			p => Some(p as usize),
		}
	}
	/// Set the scratch parent for a thread index
	#[inline]
	pub(crate) fn set_parent(&self, thread_index: usize, parent: usize) {
		self.parent[thread_index].store(parent as u32, Ordering::Relaxed);
	}
	/// Return the scratch of a thread index to its neutral state
	#[inline]
	pub fn reset(&self, thread_index: usize) {
		self.best_cost[thread_index].store(INFINITE_COST, Ordering::Relaxed);
		self.parent[thread_index].store(NO_PARENT, Ordering::Relaxed);
	}
}
