//! Produces a flow field covering a whole graph from a single target.
//!
//! First an integration field is built outward from the end node. Each node
//! accumulates the penalties of the nodes stepped onto on its way to the end,
//! expanding through the orthogonal slots only:
//!
//! ```text
//!  ___________________
//! |_4_|_3_|_2_|_3_|_4_|
//! |_3_|_2_|_1_|_2_|_3_|
//! |_2_|_1_|_0_|_1_|_2_|
//! ```
//!
//! The expansion is first-in first-out with re-queueing whenever a node's
//! cost improves, with non-uniform penalties a node may be visited more than
//! once and the result is not guaranteed to be the cheapest possible route.
//!
//! Then every node of the graph records the slot of its cheapest neighbour
//! over all ten slots. The end node, and any node without a strictly cheaper
//! neighbour, records `0`. Penalties never drop below [MIN_PENALTY] so every
//! reached node other than the end has a strictly cheaper neighbour:
//!
//! ```text
//!  ___________________
//! |_↘_|_↘_|_↓_|_↙_|_↙_|
//! |_↘_|_↘_|_↓_|_↙_|_↙_|
//! |_→_|_→_|_0_|_←_|_←_|
//! ```
//!

use std::time::Instant;

use crate::prelude::*;
use bevy::prelude::*;

/// Calculates flow fields, ignores path modifiers
#[derive(Clone, Copy, Debug, Default)]
pub struct PathfindingFlowFieldProcessor;

impl PathfindingFlowFieldProcessor {
	/// Spread costs outward from `end`, every node whose cost was written is appended to `visited`
	fn create_integration_field(
		graph: &Graph,
		visited: &mut Vec<usize>,
		queue: &mut Vec<usize>,
		end: usize,
		constraint: &Constraint,
		thread_index: usize,
	) {
		let nodes = graph.get_nodes();
		nodes[end].set_best_cost(thread_index, 0);
		visited.push(end);
		queue.push(end);
		let mut cursor = 0;
		while cursor < queue.len() {
			let current = &nodes[queue[cursor]];
			cursor += 1;
			let current_cost = current.get_best_cost(thread_index);
			for slot in PRIMARY_SLOTS {
				let Some(n) = current.get_connections()[slot] else {
					continue;
				};
				let neighbour = &nodes[n];
				if !neighbour.is_suitable(constraint) {
					continue;
				}
				let candidate = neighbour.get_penalty().saturating_add(current_cost);
				if candidate < neighbour.get_best_cost(thread_index) {
					neighbour.set_best_cost(thread_index, candidate);
					queue.push(n);
					visited.push(n);
				}
			}
		}
	}
	/// Point every node at its cheapest neighbour
	fn create_flow_field(graph: &Graph, flow_field: &mut [u8], end: usize, thread_index: usize) {
		let nodes = graph.get_nodes();
		for (i, node) in nodes.iter().enumerate() {
			let mut min_cost = if i == end {
				0
			} else {
				node.get_best_cost(thread_index)
			};
			let mut direction = 0;
			for (slot, connection) in node.get_connections().iter().enumerate() {
				let Some(n) = connection else {
					continue;
				};
				let cost = nodes[*n].get_best_cost(thread_index);
				if cost < min_cost {
					min_cost = cost;
					direction = slot as u8;
				}
			}
			flow_field[i] = direction;
		}
	}
}

impl PathfindingProcessor for PathfindingFlowFieldProcessor {
	fn run(
		&self,
		log_level: LogLevel,
		query: &PathQuery,
		graph: &Graph,
		pools: &PathPools,
		_modifier: &dyn PathModifier,
		thread_index: usize,
	) -> Path {
		let thread_index = thread_index % THREADS_COUNT;
		let _slot = graph.acquire_thread_slot(thread_index);
		let Some((_start, end)) = resolve_endpoints(graph, query) else {
			if log_level.contains(LogLevel::PATH) {
				info!(
					"Path result NotExist on graph {}, thread index {}",
					graph.get_index(),
					thread_index
				);
			}
			return Path::not_exist();
		};
		let timer = log_level.contains(LogLevel::PATH).then(Instant::now);

		graph.reset_scratch(thread_index);
		let mut visited = pools.get_nodes().spawn(graph.node_count());
		let mut queue = pools.get_nodes().spawn(graph.node_count());
		Self::create_integration_field(
			graph,
			&mut visited,
			&mut queue,
			end,
			&query.constraint,
			thread_index,
		);
		let mut flow_field = pools.get_flow_fields().spawn_filled(graph.node_count(), 0);
		Self::create_flow_field(graph, &mut flow_field, end, thread_index);

		let nodes = graph.get_nodes();
		for i in visited.iter() {
			nodes[*i].reset(thread_index);
		}
		let visited_count = visited.len();
		visited.recycle();
		queue.recycle();

		let path = Path::with_flow_field(graph.get_index(), flow_field);
		if let Some(timer) = timer {
			info!(
				"Path result {:?}, built in {:?}. Visited {} nodes on graph {}, thread index {}",
				path.get_result(),
				timer.elapsed(),
				visited_count,
				graph.get_index(),
				thread_index
			);
		}
		path
	}
	fn get_kind(&self) -> ProcessorKind {
		ProcessorKind::FlowField
	}
}
