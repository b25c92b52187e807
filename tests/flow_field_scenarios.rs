//! Flow field queries through the [Pathfinding] coordinator
//!

use bevy::prelude::*;
use bevy_graph_pathfinding::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A square grid with random penalties and roughly a fifth of the nodes blocked
fn random_world(rng: &mut StdRng, size: u32) -> Pathfinding {
	let mut pathfinding =
		Pathfinding::default().with_graph(GraphLayout::Grid(GridSettings::new(size, size, 1.0)));
	pathfinding.build_all();
	let graph = pathfinding.graph_mut(0).unwrap();
	for i in 0..graph.node_count() {
		let node = graph.get_node_mut(i).unwrap();
		// zero is raised to the minimum penalty
		node.set_penalty(rng.random_range(0..10));
		node.set_walkable(!rng.random_bool(0.2));
	}
	pathfinding.build_areas();
	pathfinding
}

/// Pick a walkable start and an end in the same area
fn random_query(rng: &mut StdRng, graph: &Graph) -> (usize, usize) {
	loop {
		let start = rng.random_range(0..graph.node_count());
		let start_node = graph.get_node(start).unwrap();
		if !start_node.is_walkable() {
			continue;
		}
		let same_area: Vec<usize> = graph
			.get_nodes()
			.iter()
			.filter(|n| n.is_walkable() && n.get_area() == start_node.get_area())
			.map(|n| n.get_index())
			.collect();
		let end = same_area[rng.random_range(0..same_area.len())];
		return (start, end);
	}
}

/// Follow the field from `from` until a node without a direction, returns that node or [None] if it takes too long
fn follow(graph: &Graph, path: &Path, from: usize) -> Option<usize> {
	let mut current = from;
	for _ in 0..=graph.node_count() {
		let direction = path.get_flow_direction(current)?;
		if direction.as_index() == 0 {
			return Some(current);
		}
		current = graph.get_node(current)?.get_connection(direction)?;
	}
	None
}

#[test]
fn line_of_three() {
	let layout = GraphLayout::Explicit(vec![
		NodeDescriptor::new(Vec3::new(0.0, 0.0, 0.0)).with_connection(Slot::East, 1),
		NodeDescriptor::new(Vec3::new(1.0, 0.0, 0.0))
			.with_connection(Slot::West, 0)
			.with_connection(Slot::East, 2),
		NodeDescriptor::new(Vec3::new(2.0, 0.0, 0.0)).with_connection(Slot::West, 1),
	]);
	let mut pathfinding = Pathfinding::default().with_graph(layout);
	pathfinding.build_all();
	let path = pathfinding.calculate_path(
		Vec3::ZERO,
		Vec3::new(2.0, 0.0, 0.0),
		Constraint::default(),
		&PathModifierEmpty,
		0,
	);
	assert_eq!(PathCompleteState::Complete, path.get_result());
	assert_eq!(Some(Slot::East), path.get_flow_direction(0));
	assert_eq!(Some(Slot::East), path.get_flow_direction(1));
	assert_eq!(Some(0), path.get_flow_field().map(|f| f[2]));
}

#[test]
fn everything_blocked() {
	let mut pathfinding =
		Pathfinding::default().with_graph(GraphLayout::Grid(GridSettings::new(4, 4, 1.0)));
	pathfinding.build_all();
	let graph = pathfinding.graph_mut(0).unwrap();
	for i in 0..16 {
		graph.get_node_mut(i).unwrap().set_walkable(false);
	}
	pathfinding.build_areas();
	assert!(pathfinding
		.get_nearest(Vec3::ONE, &Constraint::default())
		.is_none());
	let path = pathfinding.calculate_path(
		Vec3::ONE,
		Vec3::new(3.0, 0.0, 3.0),
		Constraint::default(),
		&PathModifierEmpty,
		0,
	);
	assert_eq!(PathCompleteState::NotExist, path.get_result());
}

#[test]
fn greedy_following_reaches_target() {
	let mut rng = StdRng::seed_from_u64(7);
	let pathfinding = random_world(&mut rng, 24);
	let graph = pathfinding.graph(0).unwrap();
	for _ in 0..20 {
		let (start, end) = random_query(&mut rng, graph);
		let mut path = pathfinding.calculate_path_on_graph(
			0,
			graph.get_node(start).unwrap().get_world_position(),
			graph.get_node(end).unwrap().get_world_position(),
			Constraint::default(),
			&PathModifierEmpty,
			0,
		);
		assert!(path.is_complete());
		assert_eq!(Some(0), path.get_flow_field().map(|f| f[end]));
		for node in graph.get_nodes() {
			let i = node.get_index();
			let Some(direction) = path.get_flow_direction(i) else {
				panic!("Flow field is shorter than the graph");
			};
			if direction.as_index() == 0 {
				continue;
			}
			assert_eq!(Some(end), follow(graph, &path, i), "node {} does not lead to {}", i, end);
		}
		// the start always has a way to the end unless it is the end
		if start != end {
			assert_ne!(0, path.get_flow_field().unwrap()[start]);
		}
		path.recycle();
	}
	assert_eq!(0, pathfinding.get_pools().get_outstanding());
}

#[test]
fn repeated_queries_are_identical() {
	let mut rng = StdRng::seed_from_u64(11);
	let pathfinding = random_world(&mut rng, 16);
	let graph = pathfinding.graph(0).unwrap();
	for _ in 0..10 {
		let (start, end) = random_query(&mut rng, graph);
		let from = graph.get_node(start).unwrap().get_world_position();
		let to = graph.get_node(end).unwrap().get_world_position();
		let a = pathfinding.calculate_path(from, to, Constraint::default(), &PathModifierEmpty, 0);
		let b = pathfinding.calculate_path(from, to, Constraint::default(), &PathModifierEmpty, 5);
		assert_eq!(a.get_flow_field(), b.get_flow_field());
	}
}

#[test]
fn concurrent_queries_match_sequential() {
	let mut rng = StdRng::seed_from_u64(3);
	let pathfinding = random_world(&mut rng, 20);
	let graph = pathfinding.graph(0).unwrap();
	let queries: Vec<(Vec3, Vec3)> = (0..THREADS_COUNT)
		.map(|_| {
			let (start, end) = random_query(&mut rng, graph);
			(
				graph.get_node(start).unwrap().get_world_position(),
				graph.get_node(end).unwrap().get_world_position(),
			)
		})
		.collect();
	let sequential: Vec<Vec<u8>> = queries
		.iter()
		.map(|(from, to)| {
			let path =
				pathfinding.calculate_path(*from, *to, Constraint::default(), &PathModifierEmpty, 0);
			path.get_flow_field().unwrap().to_vec()
		})
		.collect();
	let concurrent: Vec<Vec<u8>> = std::thread::scope(|s| {
		let handles: Vec<_> = queries
			.iter()
			.enumerate()
			.map(|(t, (from, to))| {
				let pathfinding = &pathfinding;
				s.spawn(move || {
					let mut total = Vec::new();
					// repeat to overlap with the other threads
					for _ in 0..5 {
						let path = pathfinding.calculate_path(
							*from,
							*to,
							Constraint::default(),
							&PathModifierEmpty,
							t,
						);
						total = path.get_flow_field().unwrap().to_vec();
					}
					total
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});
	assert_eq!(sequential, concurrent);
}

#[test]
fn modifier_splits_area() {
	let mut pathfinding =
		Pathfinding::default().with_graph(GraphLayout::Grid(GridSettings::new(6, 3, 1.0)));
	pathfinding.build_all();
	// wall across column 3
	let wall = bevy::math::bounding::Aabb3d::new(Vec3::new(3.5, 0.0, 1.5), Vec3::new(0.25, 1.0, 1.5));
	let id = ModifierId::new(1);
	assert!(pathfinding.register_dynamic(Box::new(
		BoundsModifier::new(0, wall).with_walkable(false).with_id(id)
	)));
	// the far side is another area so the end snaps to this side of the wall
	let path = pathfinding.calculate_path(
		Vec3::new(0.5, 0.0, 1.5),
		Vec3::new(5.5, 0.0, 1.5),
		Constraint::default(),
		&PathModifierEmpty,
		0,
	);
	let field = path.get_flow_field().unwrap();
	assert_eq!(0, field[8]);
	assert_eq!(0, field[11]);
	assert!(pathfinding.unregister_dynamic(id));
	let path = pathfinding.calculate_path(
		Vec3::new(0.5, 0.0, 1.5),
		Vec3::new(5.5, 0.0, 1.5),
		Constraint::default(),
		&PathModifierEmpty,
		0,
	);
	let field = path.get_flow_field().unwrap();
	assert_eq!(0, field[11]);
	assert_eq!(Slot::East.as_index() as u8, field[8]);
}
