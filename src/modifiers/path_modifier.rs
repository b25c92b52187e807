//! Path modifiers post process the node list of a calculated [Path]. They
//! only run for processors producing a node list, a flow field is left alone.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Post processing applied to a [Path] once it has been calculated
pub trait PathModifier: Send + Sync {
	/// Rewrite the path, results go into [Path::set_nodes_modified]
	fn run(&self, path: &mut Path, graph: &Graph, pools: &PathPools);
}

/// Leaves the path untouched
#[derive(Clone, Copy, Debug, Default)]
pub struct PathModifierEmpty;

impl PathModifier for PathModifierEmpty {
	fn run(&self, _path: &mut Path, _graph: &Graph, _pools: &PathPools) {}
}

/// Reduces a node list to its corners, the start, every node where the
/// direction of travel changes and the end
///
/// ```text
///  S > > C
///        v
///        C > > E
/// ```
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, Reflect)]
pub struct PathCornersModifier;

/// Slot of `from` which connects to `to`
fn slot_between(graph: &Graph, from: usize, to: usize) -> Option<usize> {
	graph
		.get_node(from)?
		.get_connections()
		.iter()
		.position(|c| *c == Some(to))
}

impl PathModifier for PathCornersModifier {
	fn run(&self, path: &mut Path, graph: &Graph, pools: &PathPools) {
		let Some(nodes) = path.get_nodes() else {
			return;
		};
		let mut corners = pools.get_nodes().spawn(nodes.len());
		if let (Some(first), Some(last)) = (nodes.first(), nodes.last()) {
			corners.push(*first);
			for window in nodes.windows(3) {
				let incoming = slot_between(graph, window[0], window[1]);
				let outgoing = slot_between(graph, window[1], window[2]);
				if incoming != outgoing {
					corners.push(window[1]);
				}
			}
			if nodes.len() > 1 {
				corners.push(*last);
			}
		}
		path.set_nodes_modified(corners);
	}
}
