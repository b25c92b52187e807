//! Building the graphs of the [Pathfinding] resource on request
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Request that every graph of the [Pathfinding] resource is built
#[derive(Event, Debug, Default, Clone, Copy)]
pub struct EventBuildAllGraphs;

/// Written once a build request has been handled
#[derive(Event, Debug, Default, Clone, Copy)]
pub struct EventGraphsBuilt;

/// Tracks whether the graphs have been built in response to [EventBuildAllGraphs]
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct GraphsBuilt {
	/// Set once the first request has been handled
	is_built: bool,
	/// Number of times [Pathfinding::build_all] was called by the plugin
	build_count: u32,
}

impl GraphsBuilt {
	/// Has a build request been handled
	pub fn is_built(&self) -> bool {
		self.is_built
	}
	/// Number of builds performed
	pub fn get_build_count(&self) -> u32 {
		self.build_count
	}
}

/// Handle [EventBuildAllGraphs]. The graphs are built on the first request only, unless the settings ask for a cloned instance which is rebuilt on every request
pub fn build_graphs(
	mut events: EventReader<EventBuildAllGraphs>,
	mut pathfinding: ResMut<Pathfinding>,
	mut built: ResMut<GraphsBuilt>,
	mut writer: EventWriter<EventGraphsBuilt>,
) {
	// several requests in one frame collapse into one build
	if events.read().count() == 0 {
		return;
	}
	if !built.is_built || pathfinding.get_settings().clone_pathfinding {
		pathfinding.build_all();
		built.build_count += 1;
	}
	built.is_built = true;
	debug!("Graphs built, {} builds so far", built.build_count);
	writer.write(EventGraphsBuilt);
}
