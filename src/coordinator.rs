//! [Pathfinding] is the entry point of the crate. It owns every [Graph], the
//! active processor, the buffer pools and the registered dynamic modifiers.
//!
//! Queries take `&self` so any number of them can run at once provided each
//! in-flight query against a graph uses a distinct thread index.
//! [Pathfinding::run_tasks] does exactly that, it spreads a batch over
//! [THREADS_COUNT] workers where worker `w` handles every task `i` with
//! `i % THREADS_COUNT == w` using thread index `w`:
//!
//! ```text
//!  tasks    [ 0 | 1 | 2 | .. | 7 | 8 | 9 | .. ]
//!  worker     0   1   2   ..   7   0   1   ..
//! ```
//!

use std::sync::Arc;

use crate::prelude::*;
use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;
use bevy::tasks::{ComputeTaskPool, TaskPool};

/// A path request for [Pathfinding::run_tasks]
#[derive(Clone, Copy, Debug, Default)]
pub struct PathTask {
	/// Where the actor is
	pub from: Vec3,
	/// Where the actor wants to go
	pub to: Vec3,
	/// Node filter
	pub constraint: Constraint,
	/// Reduce node lists to their corners
	pub corners_modifier: Option<PathCornersModifier>,
	/// Invalid tasks are skipped and yield [PathCompleteState::NotCalculated]
	pub is_valid: bool,
}

/// Owns the graphs and answers path queries
#[derive(Resource)]
pub struct Pathfinding {
	/// Graphs, `graphs[i].get_index() == i`
	graphs: Vec<Graph>,
	/// Algorithm selected by the settings
	processor: Arc<dyn PathfindingProcessor>,
	/// Buffers handed to paths
	pools: PathPools,
	/// Configuration
	settings: PathfindingSettings,
	/// Registered modifiers in registration order
	dynamic_modifiers: Vec<Box<dyn GraphDynamicModifier>>,
	/// Whether [Pathfinding::build_all] has run
	is_built: bool,
}

impl Clone for Pathfinding {
	fn clone(&self) -> Self {
		Pathfinding {
			graphs: self.graphs.clone(),
			processor: Arc::clone(&self.processor),
			pools: PathPools::new(),
			settings: self.settings.clone(),
			dynamic_modifiers: Vec::new(),
			is_built: self.is_built,
		}
	}
}

impl Default for Pathfinding {
	fn default() -> Self {
		Pathfinding::new(PathfindingSettings::default())
	}
}

impl Pathfinding {
	/// Create a coordinator without any graphs
	pub fn new(settings: PathfindingSettings) -> Self {
		Pathfinding {
			graphs: Vec::new(),
			processor: processor_from_kind(settings.processor),
			pools: PathPools::new(),
			settings,
			dynamic_modifiers: Vec::new(),
			is_built: false,
		}
	}
	/// Add an unbuilt graph and return its index
	pub fn add_graph(&mut self, layout: GraphLayout) -> usize {
		let index = self.graphs.len();
		let mut graph = Graph::new(index, layout);
		graph.set_log_level(self.settings.log_level);
		self.graphs.push(graph);
		index
	}
	/// Builder form of [Pathfinding::add_graph]
	pub fn with_graph(mut self, layout: GraphLayout) -> Self {
		self.add_graph(layout);
		self
	}
	/// Get the graphs
	pub fn graphs(&self) -> &[Graph] {
		&self.graphs
	}
	/// Get a graph by index
	pub fn graph(&self, index: usize) -> Option<&Graph> {
		self.graphs.get(index)
	}
	/// Get a mutable graph by index
	pub fn graph_mut(&mut self, index: usize) -> Option<&mut Graph> {
		self.graphs.get_mut(index)
	}
	/// Get the settings
	pub fn get_settings(&self) -> &PathfindingSettings {
		&self.settings
	}
	/// Switch the algorithm used by subsequent queries
	pub fn set_processor(&mut self, kind: ProcessorKind) {
		self.settings.processor = kind;
		self.processor = processor_from_kind(kind);
	}
	/// Get the kind of the active processor
	pub fn get_processor_kind(&self) -> ProcessorKind {
		self.processor.get_kind()
	}
	/// Set the log level here and on every graph
	pub fn set_log_level(&mut self, log_level: LogLevel) {
		self.settings.log_level = log_level;
		for graph in self.graphs.iter_mut() {
			graph.set_log_level(log_level);
		}
	}
	/// Whether every bit of `level` is enabled
	pub fn has_log_level(&self, level: LogLevel) -> bool {
		self.settings.log_level.contains(level)
	}
	/// Get the buffer pools
	pub fn get_pools(&self) -> &PathPools {
		&self.pools
	}
	/// Whether [Pathfinding::build_all] has run
	pub fn is_built(&self) -> bool {
		self.is_built
	}
	/// Regenerate every graph. Registered modifiers are lifted beforehand and applied again on the fresh nodes
	pub fn build_all(&mut self) {
		self.lift_dynamic_from(0);
		for graph in self.graphs.iter_mut() {
			graph.do_build();
		}
		if !self.dynamic_modifiers.is_empty() {
			self.reapply_dynamic_from(0);
			self.build_areas();
		}
		self.is_built = true;
		if self.has_log_level(LogLevel::GRAPH_BUILD) {
			info!("Built {} graphs", self.graphs.len());
		}
	}
	/// Relabel the areas of every graph
	pub fn build_areas(&mut self) {
		for graph in self.graphs.iter_mut() {
			graph.build_areas();
		}
	}
	/// Undo the modifiers from `first` onward, newest first
	fn lift_dynamic_from(&mut self, first: usize) {
		for modifier in self.dynamic_modifiers[first..].iter_mut().rev() {
			modifier.force_apply(&mut self.graphs, true);
		}
	}
	/// Apply the modifiers from `first` onward, oldest first
	fn reapply_dynamic_from(&mut self, first: usize) {
		for modifier in self.dynamic_modifiers[first..].iter_mut() {
			modifier.force_apply(&mut self.graphs, false);
		}
	}
	/// Register a modifier, it is applied straight away on top of the existing ones. Returns `false` if a modifier with the same id is already registered
	pub fn register_dynamic(&mut self, mut modifier: Box<dyn GraphDynamicModifier>) -> bool {
		let id = modifier.id();
		if self.dynamic_modifiers.iter().any(|m| m.id() == id) {
			return false;
		}
		modifier.force_apply(&mut self.graphs, false);
		self.dynamic_modifiers.push(modifier);
		self.build_areas();
		debug!("Registered dynamic modifier {:?}", id);
		true
	}
	/// Remove a modifier and undo its effect, modifiers registered after it are applied again. Returns `false` if it was not registered
	pub fn unregister_dynamic(&mut self, id: ModifierId) -> bool {
		let Some(position) = self.dynamic_modifiers.iter().position(|m| m.id() == id) else {
			return false;
		};
		self.lift_dynamic_from(position);
		self.dynamic_modifiers.remove(position);
		self.reapply_dynamic_from(position);
		self.build_areas();
		debug!("Unregistered dynamic modifier {:?}", id);
		true
	}
	/// Number of registered modifiers
	pub fn get_dynamic_count(&self) -> usize {
		self.dynamic_modifiers.len()
	}
	/// Give every modifier the chance to apply pending changes, areas are relabelled once if any did.
	/// Modifiers stacked above the first pending one are lifted and applied again around it
	pub fn advance_tick(&mut self) {
		let Some(first) = self.dynamic_modifiers.iter().position(|m| m.has_pending()) else {
			return;
		};
		self.lift_dynamic_from(first);
		let mut any_updated = false;
		for modifier in self.dynamic_modifiers[first..].iter_mut() {
			if modifier.try_apply(&mut self.graphs) {
				any_updated = true;
			} else {
				modifier.force_apply(&mut self.graphs, false);
			}
		}
		if any_updated {
			self.build_areas();
		}
	}
	/// Find the node nearest to `position` across every graph accepted by the constraint's graph mask. On equal distance the lower graph wins
	pub fn get_nearest(&self, position: Vec3, constraint: &Constraint) -> Option<&Node> {
		let mut nearest: Option<&Node> = None;
		let mut best = f32::MAX;
		for graph in self.graphs.iter() {
			let Some(node) = graph.get_nearest(position, constraint) else {
				continue;
			};
			let distance = node.get_world_position().distance_squared(position);
			if distance < best {
				best = distance;
				nearest = Some(node);
			}
		}
		nearest
	}
	/// Append `(graph index, node index)` of every node within `bounds` on any graph
	pub fn get_nodes_in_bounds(&self, result: &mut Vec<(usize, usize)>, bounds: Aabb3d) {
		let mut indices = Vec::new();
		for graph in self.graphs.iter() {
			indices.clear();
			graph.get_nodes_in_bounds(&mut indices, bounds);
			result.extend(indices.iter().map(|i| (graph.get_index(), *i)));
		}
	}
	/// Calculate a path on the graph holding the node nearest to `from`
	pub fn calculate_path(
		&self,
		from: Vec3,
		to: Vec3,
		constraint: Constraint,
		modifier: &dyn PathModifier,
		thread_index: usize,
	) -> Path {
		let Some(graph_index) = self
			.get_nearest(from, &constraint)
			.map(|n| n.get_graph_index())
		else {
			return Path::not_exist();
		};
		self.calculate_path_on_graph(graph_index, from, to, constraint, modifier, thread_index)
	}
	/// Calculate a path on a specific graph
	pub fn calculate_path_on_graph(
		&self,
		graph_index: usize,
		from: Vec3,
		to: Vec3,
		constraint: Constraint,
		modifier: &dyn PathModifier,
		thread_index: usize,
	) -> Path {
		let Some(graph) = self.graphs.get(graph_index) else {
			panic!(
				"Graph index {} is out of range, there are {} graphs",
				graph_index,
				self.graphs.len()
			);
		};
		let query = PathQuery::new(from, to, constraint);
		self.processor.run(
			self.settings.log_level,
			&query,
			graph,
			&self.pools,
			modifier,
			thread_index,
		)
	}
	/// Create a valid [PathTask]
	pub fn calculate_path_task(
		&self,
		from: Vec3,
		to: Vec3,
		constraint: Constraint,
		corners_modifier: Option<PathCornersModifier>,
	) -> PathTask {
		PathTask {
			from,
			to,
			constraint,
			corners_modifier,
			is_valid: true,
		}
	}
	/// Answer a single task
	fn run_task(&self, task: &PathTask, thread_index: usize) -> Path {
		if !task.is_valid {
			return Path::default();
		}
		match task.corners_modifier {
			Some(modifier) => {
				self.calculate_path(task.from, task.to, task.constraint, &modifier, thread_index)
			}
			None => self.calculate_path(
				task.from,
				task.to,
				task.constraint,
				&PathModifierEmpty,
				thread_index,
			),
		}
	}
	/// Answer a batch of tasks in parallel, `result[i]` belongs to `tasks[i]`. Worker thread indices `0..THREADS_COUNT` are used so no other query may be in flight while this runs
	pub fn run_tasks(&self, tasks: &[PathTask]) -> Vec<Path> {
		let workers = THREADS_COUNT.min(tasks.len());
		let task_pool = ComputeTaskPool::get_or_init(TaskPool::default);
		let per_worker = task_pool.scope(|scope| {
			for worker in 0..workers {
				scope.spawn(async move {
					let mut results = Vec::new();
					for i in (worker..tasks.len()).step_by(THREADS_COUNT) {
						results.push((i, self.run_task(&tasks[i], worker)));
					}
					results
				});
			}
		});
		let mut paths: Vec<Path> = (0..tasks.len()).map(|_| Path::default()).collect();
		for (i, path) in per_worker.into_iter().flatten() {
			paths[i] = path;
		}
		if self.has_log_level(LogLevel::PATH) {
			info!("Ran {} path tasks on {} workers", tasks.len(), workers);
		}
		paths
	}
}
