//! A [Path] is the value produced by a processor. Depending on the processor
//! it carries a list of nodes from start to end (and optionally a reduced list
//! of corners) or a flow field with one direction per node of the graph.
//!
//! The buffers are pooled. Ownership passes to the caller who calls
//! [Path::recycle] once done, recycling again is harmless and a [Path] which
//! is dropped without being recycled still returns its buffers.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Outcome of a path query
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum PathCompleteState {
	/// The path has not been calculated
	#[default]
	NotCalculated,
	/// The path was calculated
	Complete,
	/// No suitable start or end node could be found
	NotExist,
}

/// Result of a path query
#[derive(Debug, Default)]
pub struct Path {
	/// Completion state
	result: PathCompleteState,
	/// Index of the graph the path was calculated on
	graph_index: Option<usize>,
	/// Node indices from start to end
	nodes: Option<PooledBuffer<usize>>,
	/// Node indices after a path modifier has run
	nodes_modified: Option<PooledBuffer<usize>>,
	/// Slot to follow from every node of the graph towards the target, `0` when there is none
	flow_field: Option<PooledBuffer<u8>>,
}

impl Path {
	/// A path for which no suitable start or end node exists
	pub fn not_exist() -> Self {
		Path {
			result: PathCompleteState::NotExist,
			..Default::default()
		}
	}
	/// A complete flow field path
	pub fn with_flow_field(graph_index: usize, flow_field: PooledBuffer<u8>) -> Self {
		Path {
			result: PathCompleteState::Complete,
			graph_index: Some(graph_index),
			flow_field: Some(flow_field),
			..Default::default()
		}
	}
	/// A complete node path
	pub fn with_nodes(graph_index: usize, nodes: PooledBuffer<usize>) -> Self {
		Path {
			result: PathCompleteState::Complete,
			graph_index: Some(graph_index),
			nodes: Some(nodes),
			..Default::default()
		}
	}
	/// Get the completion state
	pub fn get_result(&self) -> PathCompleteState {
		self.result
	}
	/// Whether the path was calculated successfully
	pub fn is_complete(&self) -> bool {
		self.result == PathCompleteState::Complete
	}
	/// Get the index of the graph the path belongs to
	pub fn get_graph_index(&self) -> Option<usize> {
		self.graph_index
	}
	/// Get the node indices from start to end
	pub fn get_nodes(&self) -> Option<&[usize]> {
		self.nodes.as_deref().map(|v| v.as_slice())
	}
	/// Get the node indices produced by a path modifier
	pub fn get_nodes_modified(&self) -> Option<&[usize]> {
		self.nodes_modified.as_deref().map(|v| v.as_slice())
	}
	/// Store the output of a path modifier, any previous output is recycled
	pub fn set_nodes_modified(&mut self, nodes: PooledBuffer<usize>) {
		self.nodes_modified = Some(nodes);
	}
	/// Get the flow field
	pub fn get_flow_field(&self) -> Option<&[u8]> {
		self.flow_field.as_deref().map(|v| v.as_slice())
	}
	/// Flow field direction of a node
	pub fn get_flow_direction(&self, node_index: usize) -> Option<Slot> {
		let field = self.flow_field.as_ref()?;
		field.get(node_index).and_then(|d| Slot::from_index(*d as usize))
	}
	/// Return every pooled buffer to its pool. The path keeps its result and graph but no longer has nodes or a flow field
	pub fn recycle(&mut self) {
		if let Some(nodes) = self.nodes.take() {
			nodes.recycle();
		}
		if let Some(nodes) = self.nodes_modified.take() {
			nodes.recycle();
		}
		if let Some(field) = self.flow_field.take() {
			field.recycle();
		}
	}
}
