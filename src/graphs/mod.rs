//! A [Graph] owns a flat array of [Node]s along with the acceleration
//! structure used to find the node nearest to a point.
//!
//! Graphs are built explicitly. [Graph::do_build] regenerates every node from
//! the [GraphLayout] and then [Graph::build_areas] labels each walkable
//! connected component with an area id:
//!
//! ```text
//!  ___________________
//! |_1_|_1_|_X_|_2_|_2_|
//! |_1_|_1_|_X_|_2_|_2_|
//! |_1_|_1_|_X_|_2_|_2_|
//! ```
//!
//! Nodes are never created or destroyed one at a time, the whole array is
//! rebuilt, so between two builds node indices are dense and stable. Queries
//! only need `&Graph` while builds need `&mut Graph` which keeps a rebuild from
//! ever overlapping a query.
//!

pub mod constraint;
pub mod grid;
pub mod node;
pub mod spatial;
pub mod utilities;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::prelude::*;
use bevy::math::{bounding::Aabb3d, Vec3A};
use bevy::prelude::*;

/// Describes how the nodes of a [Graph] are generated
#[derive(Clone, Debug, PartialEq)]
pub enum GraphLayout {
	/// A regular single layer grid
	Grid(GridSettings),
	/// Hand placed nodes, connections index into the same list
	Explicit(Vec<NodeDescriptor>),
}

impl GraphLayout {
	/// Produce the node descriptors of the layout
	fn descriptors(&self) -> Vec<NodeDescriptor> {
		match self {
			GraphLayout::Grid(settings) => settings.generate(),
			GraphLayout::Explicit(descriptors) => descriptors.clone(),
		}
	}
}

/// A graph of navigable nodes
#[derive(Debug)]
pub struct Graph {
	/// Position of the graph in a multi-graph world, used by graph masks
	index: usize,
	/// Source of the nodes
	layout: GraphLayout,
	/// Nodes, `nodes[i].get_index() == i`
	nodes: Vec<Node>,
	/// Nearest node lookup
	spatial: SpatialIndex,
	/// Marks thread indices which have a query in flight
	slots: [AtomicBool; THREADS_COUNT],
	/// Controls build logging
	log_level: LogLevel,
}

impl Clone for Graph {
	fn clone(&self) -> Self {
		Graph {
			index: self.index,
			layout: self.layout.clone(),
			nodes: self.nodes.clone(),
			spatial: self.spatial.clone(),
			slots: std::array::from_fn(|_| AtomicBool::new(false)),
			log_level: self.log_level,
		}
	}
}

impl Graph {
	/// Create a new unbuilt [Graph], it contains no nodes until [Graph::do_build] runs
	pub fn new(index: usize, layout: GraphLayout) -> Self {
		Graph {
			index,
			layout,
			nodes: Vec::new(),
			spatial: SpatialIndex::default(),
			slots: std::array::from_fn(|_| AtomicBool::new(false)),
			log_level: LogLevel::NONE,
		}
	}
	/// Create a new [Graph] and build it straight away
	pub fn new_built(index: usize, layout: GraphLayout) -> Self {
		let mut graph = Graph::new(index, layout);
		graph.do_build();
		graph
	}
	/// Get the index of the graph
	pub fn get_index(&self) -> usize {
		self.index
	}
	/// Get the layout the graph builds from
	pub fn get_layout(&self) -> &GraphLayout {
		&self.layout
	}
	/// Replace the layout, takes effect on the next [Graph::do_build]
	pub fn set_layout(&mut self, layout: GraphLayout) {
		self.layout = layout;
	}
	/// Set which build events are logged
	pub fn set_log_level(&mut self, log_level: LogLevel) {
		self.log_level = log_level;
	}
	/// Get the nodes
	pub fn get_nodes(&self) -> &[Node] {
		&self.nodes
	}
	/// Number of nodes
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}
	/// Get a node by index
	pub fn get_node(&self, index: usize) -> Option<&Node> {
		self.nodes.get(index)
	}
	/// Get a mutable node by index. Changing walkability requires [Graph::build_areas] afterwards
	pub fn get_node_mut(&mut self, index: usize) -> Option<&mut Node> {
		self.nodes.get_mut(index)
	}
	/// Regenerate every node from the layout, then rebuild the spatial index and areas
	pub fn do_build(&mut self) {
		let descriptors = self.layout.descriptors();
		let count = descriptors.len();
		self.nodes = descriptors
			.iter()
			.enumerate()
			.map(|(i, d)| {
				for neighbour in d.connections.iter().flatten() {
					if *neighbour >= count {
						panic!(
							"Node {} of graph {} connects to node {} but the layout only has {} nodes",
							i, self.index, neighbour, count
						);
					}
				}
				Node::new(i, self.index, d)
			})
			.collect();
		self.spatial = SpatialIndex::new(&self.nodes);
		self.build_areas();
		if self.log_level.contains(LogLevel::GRAPH_BUILD) {
			info!("Graph {} built with {} nodes", self.index, count);
		}
	}
	/// Label the walkable connected components, connectivity follows the primary slots only
	pub fn build_areas(&mut self) {
		for node in self.nodes.iter_mut() {
			node.set_area(UNWALKABLE_AREA);
		}
		let mut labelled = vec![false; self.nodes.len()];
		let mut queue = VecDeque::new();
		let mut components: u32 = 0;
		for start in 0..self.nodes.len() {
			if labelled[start] || !self.nodes[start].is_walkable() {
				continue;
			}
			let area = 1 + components % (MAX_AREAS - 1);
			components += 1;
			labelled[start] = true;
			queue.push_back(start);
			while let Some(current) = queue.pop_front() {
				self.nodes[current].set_area(area);
				for slot in PRIMARY_SLOTS {
					let Some(n) = self.nodes[current].get_connections()[slot] else {
						continue;
					};
					if !labelled[n] && self.nodes[n].is_walkable() {
						labelled[n] = true;
						queue.push_back(n);
					}
				}
			}
		}
		if components >= MAX_AREAS {
			warn!(
				"Graph {} has {} areas, ids above {} are reused",
				self.index,
				components,
				MAX_AREAS - 1
			);
		}
		debug!("Graph {} labelled {} areas", self.index, components);
	}
	/// Find the node nearest to `position` which satisfies `constraint`
	pub fn get_nearest(&self, position: Vec3, constraint: &Constraint) -> Option<&Node> {
		if !constraint.accepts_graph(self.index) {
			return None;
		}
		self.spatial
			.nearest(&self.nodes, position, |n| n.is_suitable(constraint))
			.map(|i| &self.nodes[i])
	}
	/// Append the index of every node within `bounds` to `result`
	pub fn get_nodes_in_bounds(&self, result: &mut Vec<usize>, bounds: Aabb3d) {
		for node in self.nodes.iter() {
			let p = Vec3A::from(node.get_world_position());
			if p.cmpge(bounds.min).all() && p.cmple(bounds.max).all() {
				result.push(node.get_index());
			}
		}
	}
	/// Claim a thread index for the duration of a query. Two in-flight queries sharing a thread index on the same graph would corrupt each other's scratch, that is a caller bug and panics
	pub fn acquire_thread_slot(&self, thread_index: usize) -> ThreadSlot<'_> {
		if thread_index >= THREADS_COUNT {
			panic!(
				"Thread index {} is out of range, it must be below {}",
				thread_index, THREADS_COUNT
			);
		}
		if self.slots[thread_index].swap(true, Ordering::Acquire) {
			panic!(
				"Thread index {} is already running a query on graph {}",
				thread_index, self.index
			);
		}
		ThreadSlot {
			graph: self,
			thread_index,
		}
	}
	/// Return the scratch of a thread index to neutral for every node
	pub fn reset_scratch(&self, thread_index: usize) {
		for node in self.nodes.iter() {
			node.reset(thread_index);
		}
	}
}

/// Exclusive claim of a thread index on a [Graph], released on drop
#[derive(Debug)]
pub struct ThreadSlot<'a> {
	/// Graph the claim was made on
	graph: &'a Graph,
	/// The claimed index
	thread_index: usize,
}

impl ThreadSlot<'_> {
	/// Get the claimed thread index
	pub fn get_thread_index(&self) -> usize {
		self.thread_index
	}
}

impl Drop for ThreadSlot<'_> {
	fn drop(&mut self) {
		self.graph.slots[self.thread_index].store(false, Ordering::Release);
	}
}
