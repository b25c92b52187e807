//! Processors answer a single path query against a single [Graph].
//!
//! Every processor resolves the endpoints the same way:
//!
//! 1. the start is the walkable node nearest to `from` which passes the caller's [Constraint]
//! 2. the end is the node nearest to `to` which passes the same checks and lies in the start's area
//!
//! If either cannot be found the query yields [PathCompleteState::NotExist]
//! without touching any scratch.
//!

pub mod corners;
pub mod flow_field;

use std::sync::Arc;

use crate::prelude::*;
use bevy::prelude::*;

/// The inputs of a path query
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathQuery {
	/// Where the actor is
	pub from: Vec3,
	/// Where the actor wants to go
	pub to: Vec3,
	/// Filter applied to the endpoints and to every node the search expands into
	pub constraint: Constraint,
}

impl PathQuery {
	/// Create a new [PathQuery]
	pub fn new(from: Vec3, to: Vec3, constraint: Constraint) -> Self {
		PathQuery {
			from,
			to,
			constraint,
		}
	}
}

/// An algorithm producing a [Path] from a [PathQuery]
pub trait PathfindingProcessor: Send + Sync + std::fmt::Debug {
	/// Calculate a path. `thread_index` selects the scratch column, it is taken modulo [THREADS_COUNT] and must not be in use by another query on the same graph
	fn run(
		&self,
		log_level: LogLevel,
		query: &PathQuery,
		graph: &Graph,
		pools: &PathPools,
		modifier: &dyn PathModifier,
		thread_index: usize,
	) -> Path;
	/// Which kind of processor this is
	fn get_kind(&self) -> ProcessorKind;
}

/// Create the processor selected by `kind`
pub fn processor_from_kind(kind: ProcessorKind) -> Arc<dyn PathfindingProcessor> {
	match kind {
		ProcessorKind::Corners => Arc::new(PathfindingCornersProcessor),
		ProcessorKind::FlowField => Arc::new(PathfindingFlowFieldProcessor),
	}
}

/// Find the `(start, end)` node indices of a query
pub(crate) fn resolve_endpoints(graph: &Graph, query: &PathQuery) -> Option<(usize, usize)> {
	let start_constraint = query.constraint.with_walkable();
	let start = graph.get_nearest(query.from, &start_constraint)?;
	let end_constraint = start_constraint.with_area(start.get_area());
	let end = graph.get_nearest(query.to, &end_constraint)?;
	Some((start.get_index(), end.get_index()))
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn kind_round_trip() {
		assert_eq!(ProcessorKind::Corners, processor_from_kind(ProcessorKind::Corners).get_kind());
		assert_eq!(ProcessorKind::FlowField, processor_from_kind(ProcessorKind::FlowField).get_kind());
	}
	#[test]
	fn endpoints_stay_in_start_area() {
		// wall down column 2 of a 5x3 grid
		let mut graph = Graph::new_built(0, GraphLayout::Grid(GridSettings::new(5, 3, 1.0)));
		for row in 0..3 {
			graph.get_node_mut(row * 5 + 2).unwrap().set_walkable(false);
		}
		graph.build_areas();
		let query = PathQuery::new(Vec3::new(0.5, 0.0, 0.5), Vec3::new(4.5, 0.0, 2.5), Constraint::any());
		// the end snaps to the closest node on the start's side of the wall
		assert_eq!(Some((0, 11)), resolve_endpoints(&graph, &query));
	}
	#[test]
	fn no_walkable_start() {
		let mut graph = Graph::new_built(0, GraphLayout::Grid(GridSettings::new(2, 2, 1.0)));
		for i in 0..4 {
			graph.get_node_mut(i).unwrap().set_walkable(false);
		}
		graph.build_areas();
		let query = PathQuery::new(Vec3::ZERO, Vec3::ONE, Constraint::any());
		assert_eq!(None, resolve_endpoints(&graph, &query));
	}
}
