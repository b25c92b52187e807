//! `use bevy_graph_pathfinding::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::graphs::{constraint::*, grid::*, node::*, spatial::*, utilities::*, *};

#[doc(hidden)]
pub use crate::modifiers::{dynamic::*, path_modifier::*};

#[doc(hidden)]
pub use crate::processors::{corners::*, flow_field::*, *};

#[doc(hidden)]
pub use crate::{
	coordinator::*,
	path::*,
	plugin::{build_layer::*, tick_layer::*, *},
	pool::*,
	settings::*,
};
