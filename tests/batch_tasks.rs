//! Batches of path tasks spread over the worker thread indices
//!

use bevy::prelude::*;
use bevy_graph_pathfinding::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Two graphs, a grid with scattered walls and a smaller open grid off to the side
fn world(settings: PathfindingSettings, rng: &mut StdRng) -> Pathfinding {
	let mut pathfinding = Pathfinding::new(settings)
		.with_graph(GraphLayout::Grid(GridSettings::new(30, 30, 1.0)))
		.with_graph(GraphLayout::Grid(
			GridSettings::new(10, 10, 2.0).with_origin(Vec3::new(40.0, 0.0, 0.0)),
		));
	pathfinding.build_all();
	let graph = pathfinding.graph_mut(0).unwrap();
	for i in 0..graph.node_count() {
		if rng.random_bool(0.15) {
			graph.get_node_mut(i).unwrap().set_walkable(false);
		}
	}
	pathfinding.build_areas();
	pathfinding
}

/// Random tasks over both graphs, every fifth one invalid
fn tasks(pathfinding: &Pathfinding, rng: &mut StdRng, count: usize, corners: bool) -> Vec<PathTask> {
	(0..count)
		.map(|i| {
			let x = rng.random_range(0.0..60.0);
			let z = rng.random_range(0.0..20.0);
			let from = Vec3::new(x, 0.0, z);
			let to = Vec3::new(rng.random_range(0.0..60.0), 0.0, rng.random_range(0.0..30.0));
			let modifier = corners.then_some(PathCornersModifier);
			let mut task = pathfinding.calculate_path_task(from, to, Constraint::default(), modifier);
			task.is_valid = i % 5 != 4;
			task
		})
		.collect()
}

#[test]
fn flow_field_batch() {
	let mut rng = StdRng::seed_from_u64(21);
	let pathfinding = world(PathfindingSettings::default(), &mut rng);
	let tasks = tasks(&pathfinding, &mut rng, 45, false);
	let results = pathfinding.run_tasks(&tasks);
	assert_eq!(tasks.len(), results.len());
	let mut graphs_used = [false; 2];
	for (task, result) in tasks.iter().zip(results.iter()) {
		if !task.is_valid {
			assert_eq!(PathCompleteState::NotCalculated, result.get_result());
			continue;
		}
		let expected =
			pathfinding.calculate_path(task.from, task.to, task.constraint, &PathModifierEmpty, 0);
		assert_eq!(expected.get_result(), result.get_result());
		assert_eq!(expected.get_graph_index(), result.get_graph_index());
		assert_eq!(expected.get_flow_field(), result.get_flow_field());
		if let Some(g) = result.get_graph_index() {
			graphs_used[g] = true;
		}
	}
	assert_eq!([true, true], graphs_used);
}

#[test]
fn corners_batch() {
	let mut rng = StdRng::seed_from_u64(5);
	let settings = PathfindingSettings {
		processor: ProcessorKind::Corners,
		..Default::default()
	};
	let pathfinding = world(settings, &mut rng);
	let tasks = tasks(&pathfinding, &mut rng, 30, true);
	let mut results = pathfinding.run_tasks(&tasks);
	for (task, result) in tasks.iter().zip(results.iter()) {
		if !task.is_valid {
			assert_eq!(PathCompleteState::NotCalculated, result.get_result());
			continue;
		}
		let expected =
			pathfinding.calculate_path(task.from, task.to, task.constraint, &PathCornersModifier, 0);
		assert_eq!(expected.get_nodes(), result.get_nodes());
		assert_eq!(expected.get_nodes_modified(), result.get_nodes_modified());
		if let (Some(nodes), Some(corners)) = (result.get_nodes(), result.get_nodes_modified()) {
			assert_eq!(nodes.first(), corners.first());
			assert_eq!(nodes.last(), corners.last());
			assert!(corners.len() <= nodes.len());
		}
	}
	for result in results.iter_mut() {
		result.recycle();
	}
	assert_eq!(0, pathfinding.get_pools().get_outstanding());
}

#[test]
fn fewer_tasks_than_workers() {
	let mut rng = StdRng::seed_from_u64(1);
	let pathfinding = world(PathfindingSettings::default(), &mut rng);
	let tasks = tasks(&pathfinding, &mut rng, 3, false);
	let results = pathfinding.run_tasks(&tasks);
	assert_eq!(3, results.len());
	assert!(results.iter().all(|r| r.get_result() != PathCompleteState::NotCalculated));
}
