//! Defines the Bevy [Plugin] driving a [Pathfinding] resource
//!
//! The plugin does not create the resource, insert a configured [Pathfinding]
//! and send [build_layer::EventBuildAllGraphs] once its graphs are described.
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod build_layer;
pub mod tick_layer;

/// Order of the plugin's systems within `Update`
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum PathfindingSet {
	/// Handle build requests
	Build,
	/// Apply dynamic modifiers
	Tick,
}

/// Builds graphs on request and advances dynamic modifiers every frame
pub struct PathfindingPlugin;

impl Plugin for PathfindingPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<Slot>()
			.register_type::<Constraint>()
			.register_type::<GridSettings>()
			.register_type::<PathCompleteState>()
			.register_type::<LogLevel>()
			.register_type::<ProcessorKind>()
			.register_type::<PathfindingSettings>()
			.register_type::<ModifierId>()
			.register_type::<PathCornersModifier>()
			.init_resource::<build_layer::GraphsBuilt>()
			.add_event::<build_layer::EventBuildAllGraphs>()
			.add_event::<build_layer::EventGraphsBuilt>()
			.configure_sets(
				Update,
				(PathfindingSet::Build, PathfindingSet::Tick)
					.chain()
					.run_if(resource_exists::<Pathfinding>),
			)
			.add_systems(
				Update,
				(
					build_layer::build_graphs.in_set(PathfindingSet::Build),
					tick_layer::advance_dynamic_modifiers.in_set(PathfindingSet::Tick),
				),
			);
	}
}
