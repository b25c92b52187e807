//! Produces the list of nodes between the start and the end with an A*
//! search over every connection slot.
//!
//! Costs are integers. Stepping from `a` onto `b` costs the distance between
//! them scaled by [COST_SCALE] and rounded up, plus the penalty of `b`. The
//! heuristic is the straight line distance to the end scaled and rounded
//! down so it never overestimates.
//!

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;

use crate::prelude::*;
use bevy::prelude::*;

/// World distance to integer cost conversion
pub const COST_SCALE: f32 = 100.0;

/// Calculates node lists and runs the path modifier over them
#[derive(Clone, Copy, Debug, Default)]
pub struct PathfindingCornersProcessor;

impl PathfindingCornersProcessor {
	/// Cost of moving between two positions, excluding penalty
	fn step_cost(a: Vec3, b: Vec3) -> u32 {
		(a.distance(b) * COST_SCALE).ceil() as u32
	}
	/// Estimated cost from a position to the end
	fn heuristic(a: Vec3, end: Vec3) -> u32 {
		(a.distance(end) * COST_SCALE).floor() as u32
	}
	/// Search from `start` to `end`, returns whether `end` was reached. Every node whose scratch was written is appended to `visited`
	fn search(
		graph: &Graph,
		visited: &mut Vec<usize>,
		start: usize,
		end: usize,
		constraint: &Constraint,
		thread_index: usize,
	) -> bool {
		let nodes = graph.get_nodes();
		let end_position = nodes[end].get_world_position();
		// entries are (estimated total, index, cost so far), smallest first
		let mut open = BinaryHeap::new();
		nodes[start].set_best_cost(thread_index, 0);
		visited.push(start);
		open.push(Reverse((
			Self::heuristic(nodes[start].get_world_position(), end_position),
			start,
			0_u32,
		)));
		while let Some(Reverse((_, index, cost))) = open.pop() {
			if index == end {
				return true;
			}
			let current = &nodes[index];
			if cost > current.get_best_cost(thread_index) {
				continue;
			}
			for n in current.get_connections().iter().flatten() {
				let neighbour = &nodes[*n];
				if !neighbour.is_suitable(constraint) {
					continue;
				}
				let step = Self::step_cost(
					current.get_world_position(),
					neighbour.get_world_position(),
				)
				.saturating_add(neighbour.get_penalty());
				let tentative = cost.saturating_add(step);
				if tentative < neighbour.get_best_cost(thread_index) {
					neighbour.set_best_cost(thread_index, tentative);
					neighbour.set_parent(thread_index, index);
					visited.push(*n);
					let estimate = tentative.saturating_add(Self::heuristic(
						neighbour.get_world_position(),
						end_position,
					));
					open.push(Reverse((estimate, *n, tentative)));
				}
			}
		}
		false
	}
	/// Follow parents back from `end` and write the chain start to end
	fn write_nodes(graph: &Graph, nodes: &mut Vec<usize>, end: usize, thread_index: usize) {
		let mut current = Some(end);
		while let Some(index) = current {
			if nodes.len() > graph.node_count() {
				warn!(
					"Parent chain on graph {} does not terminate, thread index {}",
					graph.get_index(),
					thread_index
				);
				break;
			}
			nodes.push(index);
			current = graph.get_nodes()[index].get_parent(thread_index);
		}
		nodes.reverse();
	}
}

impl PathfindingProcessor for PathfindingCornersProcessor {
	fn run(
		&self,
		log_level: LogLevel,
		query: &PathQuery,
		graph: &Graph,
		pools: &PathPools,
		modifier: &dyn PathModifier,
		thread_index: usize,
	) -> Path {
		let thread_index = thread_index % THREADS_COUNT;
		let _slot = graph.acquire_thread_slot(thread_index);
		let Some((start, end)) = resolve_endpoints(graph, query) else {
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

		let mut visited = pools.get_nodes().spawn(graph.node_count());
		let found = Self::search(
			graph,
			&mut visited,
			start,
			end,
			&query.constraint,
			thread_index,
		);
		let mut path = if found {
			let mut nodes = pools.get_nodes().spawn(graph.node_count());
			Self::write_nodes(graph, &mut nodes, end, thread_index);
			Path::with_nodes(graph.get_index(), nodes)
		} else {
			Path::not_exist()
		};

		let all_nodes = graph.get_nodes();
		for i in visited.iter() {
			all_nodes[*i].reset(thread_index);
		}
		let visited_count = visited.len();
		visited.recycle();

		if path.is_complete() {
			modifier.run(&mut path, graph, pools);
		}
		if let Some(timer) = timer {
			info!(
				"Path result {:?}, built in {:?}. Path length: {} (visited: {}) on graph {}, thread index {}",
				path.get_result(),
				timer.elapsed(),
				path.get_nodes().map_or(0, |n| n.len()),
				visited_count,
				graph.get_index(),
				thread_index
			);
		}
		path
	}
	fn get_kind(&self) -> ProcessorKind {
		ProcessorKind::Corners
	}
}
