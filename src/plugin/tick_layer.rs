//! Per frame upkeep of the [Pathfinding] resource
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Let registered dynamic modifiers apply their pending changes
pub fn advance_dynamic_modifiers(mut pathfinding: ResMut<Pathfinding>) {
	// reading the count does not flag the resource as changed
	if pathfinding.get_dynamic_count() > 0 {
		pathfinding.advance_tick();
	}
}
