//! Dynamic modifiers change the nodes of already built graphs, they are
//! registered with [crate::prelude::Pathfinding] which polls them once per
//! tick through [GraphDynamicModifier::try_apply] and relabels areas when any
//! of them reports a change.
//!
//! A modifier is identified by its [ModifierId], registering the same id twice
//! is a no-op.
//!
//! Modifiers stack in registration order. Each one records the node values it
//! found before applying, so whenever a modifier changes every modifier
//! registered after it is lifted newest first and applied again oldest first:
//!
//! ```text
//!  lift     [ m0 | m1 | m2 | m3 ]   <- m3, m2, m1   (m1 changed)
//!  apply    [ m0 | m1 | m2 | m3 ]   -> m1, m2, m3
//! ```
//!

use std::sync::atomic::{AtomicU64, Ordering};

use crate::prelude::*;
use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

/// Source of [ModifierId::unique]
static NEXT_MODIFIER_ID: AtomicU64 = AtomicU64::new(1 << 32);

/// Identity of a registered [GraphDynamicModifier]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ModifierId(u64);

impl ModifierId {
	/// Create an id from a caller chosen value
	pub fn new(id: u64) -> Self {
		ModifierId(id)
	}
	/// Create an id which no other call of this method returns
	pub fn unique() -> Self {
		ModifierId(NEXT_MODIFIER_ID.fetch_add(1, Ordering::Relaxed))
	}
	/// Get the raw id
	pub fn get(&self) -> u64 {
		self.0
	}
}

/// Something which changes graph nodes while the world runs
pub trait GraphDynamicModifier: Send + Sync {
	/// Identity used by the coordinator's registry
	fn id(&self) -> ModifierId;
	/// Whether [GraphDynamicModifier::try_apply] would alter nodes
	fn has_pending(&self) -> bool;
	/// Apply pending changes, returns `true` when nodes were altered and areas need rebuilding
	fn try_apply(&mut self, graphs: &mut [Graph]) -> bool;
	/// Apply unconditionally. With `disabled` set any previous effect is undone, nothing new is applied and pending changes stay pending
	fn force_apply(&mut self, graphs: &mut [Graph], disabled: bool);
}

/// Original state of a node touched by a [BoundsModifier]
#[derive(Clone, Copy, Debug)]
struct NodeOriginal {
	/// Node index
	index: usize,
	/// Walkability before the modifier applied
	walkable: bool,
	/// Penalty before the modifier applied
	penalty: u32,
}

/// Overrides walkability and/or adds penalty to every node of one graph inside
/// an axis aligned box
///
/// ```text
///  _______________________
/// |___|___|___|___|___|___|
/// |___|_X_|_X_|_X_|___|___|
/// |___|_X_|_X_|_X_|___|___|
/// |___|___|___|___|___|___|
/// ```
#[derive(Clone, Debug)]
pub struct BoundsModifier {
	/// Identity
	id: ModifierId,
	/// Index of the graph the modifier works on
	graph_index: usize,
	/// Region of effect
	bounds: Aabb3d,
	/// Walkability forced onto nodes in the region, [None] leaves it untouched
	walkable: Option<bool>,
	/// Penalty added to nodes in the region
	added_penalty: u32,
	/// Whether the modifier has an effect
	enabled: bool,
	/// Set when the bounds or enabled state changed since the last application
	changed: bool,
	/// Nodes currently modified with their original values
	originals: Vec<NodeOriginal>,
}

impl BoundsModifier {
	/// Create an enabled modifier with no effect until [BoundsModifier::with_walkable] or [BoundsModifier::with_penalty] is used
	pub fn new(graph_index: usize, bounds: Aabb3d) -> Self {
		BoundsModifier {
			id: ModifierId::unique(),
			graph_index,
			bounds,
			walkable: None,
			added_penalty: 0,
			enabled: true,
			changed: true,
			originals: Vec::new(),
		}
	}
	/// Force walkability of the nodes in the region
	pub fn with_walkable(mut self, walkable: bool) -> Self {
		self.walkable = Some(walkable);
		self
	}
	/// Add a penalty to the nodes in the region
	pub fn with_penalty(mut self, added_penalty: u32) -> Self {
		self.added_penalty = added_penalty;
		self
	}
	/// Replace the generated id
	pub fn with_id(mut self, id: ModifierId) -> Self {
		self.id = id;
		self
	}
	/// Get the region of effect
	pub fn get_bounds(&self) -> Aabb3d {
		self.bounds
	}
	/// Move the region, takes effect on the next tick
	pub fn set_bounds(&mut self, bounds: Aabb3d) {
		if bounds != self.bounds {
			self.bounds = bounds;
			self.changed = true;
		}
	}
	/// Is the modifier enabled
	pub fn is_enabled(&self) -> bool {
		self.enabled
	}
	/// Enable or disable the modifier, takes effect on the next tick
	pub fn set_enabled(&mut self, enabled: bool) {
		if enabled != self.enabled {
			self.enabled = enabled;
			self.changed = true;
		}
	}
	/// Number of nodes currently modified
	pub fn get_affected_count(&self) -> usize {
		self.originals.len()
	}
	/// Write the original values back
	fn restore(&mut self, graph: &mut Graph) {
		for original in self.originals.drain(..) {
			if let Some(node) = graph.get_node_mut(original.index) {
				node.set_walkable(original.walkable);
				node.set_penalty(original.penalty);
			}
		}
	}
	/// Record and override every node inside the bounds
	fn apply(&mut self, graph: &mut Graph) {
		let mut indices = Vec::new();
		graph.get_nodes_in_bounds(&mut indices, self.bounds);
		for index in indices {
			let Some(node) = graph.get_node_mut(index) else {
				continue;
			};
			self.originals.push(NodeOriginal {
				index,
				walkable: node.is_walkable(),
				penalty: node.get_penalty(),
			});
			if let Some(walkable) = self.walkable {
				node.set_walkable(walkable);
			}
			node.set_penalty(node.get_penalty().saturating_add(self.added_penalty));
		}
		trace!(
			"Bounds modifier {:?} affects {} nodes of graph {}",
			self.id,
			self.originals.len(),
			self.graph_index
		);
	}
}

impl GraphDynamicModifier for BoundsModifier {
	fn id(&self) -> ModifierId {
		self.id
	}
	fn has_pending(&self) -> bool {
		self.changed
	}
	fn try_apply(&mut self, graphs: &mut [Graph]) -> bool {
		if !self.changed {
			return false;
		}
		self.force_apply(graphs, false);
		true
	}
	fn force_apply(&mut self, graphs: &mut [Graph], disabled: bool) {
		if !disabled {
			self.changed = false;
		}
		let Some(graph) = graphs.iter_mut().find(|g| g.get_index() == self.graph_index) else {
			warn!(
				"Bounds modifier {:?} targets graph {} which does not exist",
				self.id, self.graph_index
			);
			self.originals.clear();
			return;
		};
		self.restore(graph);
		if !disabled && self.enabled {
			self.apply(graph);
		}
	}
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	fn graphs() -> Vec<Graph> {
		vec![Graph::new_built(0, GraphLayout::Grid(GridSettings::new(4, 4, 1.0)))]
	}
	/// Covers the nodes at columns 1..=2 of rows 1..=2
	fn centre() -> Aabb3d {
		Aabb3d::new(Vec3::new(2.0, 0.0, 2.0), Vec3::new(1.0, 1.0, 1.0))
	}
	#[test]
	fn unique_ids_differ() {
		assert_ne!(ModifierId::unique(), ModifierId::unique());
		assert_eq!(3, ModifierId::new(3).get());
	}
	#[test]
	fn blocks_and_restores() {
		let mut graphs = graphs();
		let mut modifier = BoundsModifier::new(0, centre()).with_walkable(false);
		modifier.force_apply(&mut graphs, false);
		assert_eq!(4, modifier.get_affected_count());
		for i in [5, 6, 9, 10] {
			assert!(!graphs[0].get_node(i).unwrap().is_walkable());
		}
		assert!(graphs[0].get_node(0).unwrap().is_walkable());
		modifier.force_apply(&mut graphs, true);
		assert_eq!(0, modifier.get_affected_count());
		assert!(graphs[0].get_nodes().iter().all(|n| n.is_walkable()));
	}
	#[test]
	fn penalty_is_added_once() {
		let mut graphs = graphs();
		let mut modifier = BoundsModifier::new(0, centre()).with_penalty(4);
		modifier.force_apply(&mut graphs, false);
		modifier.force_apply(&mut graphs, false);
		assert_eq!(5, graphs[0].get_node(5).unwrap().get_penalty());
		assert_eq!(1, graphs[0].get_node(0).unwrap().get_penalty());
	}
	#[test]
	fn try_apply_only_reports_changes() {
		let mut graphs = graphs();
		let mut modifier = BoundsModifier::new(0, centre()).with_walkable(false);
		assert!(modifier.try_apply(&mut graphs));
		assert!(!modifier.try_apply(&mut graphs));
		modifier.set_bounds(centre());
		assert!(!modifier.try_apply(&mut graphs));
		// move one column east
		modifier.set_bounds(Aabb3d::new(Vec3::new(3.0, 0.0, 2.0), Vec3::new(1.0, 1.0, 1.0)));
		assert!(modifier.try_apply(&mut graphs));
		assert!(graphs[0].get_node(5).unwrap().is_walkable());
		assert!(!graphs[0].get_node(7).unwrap().is_walkable());
		modifier.set_enabled(false);
		assert!(modifier.try_apply(&mut graphs));
		assert!(graphs[0].get_nodes().iter().all(|n| n.is_walkable()));
	}
	#[test]
	fn lifting_keeps_changes_pending() {
		let mut graphs = graphs();
		let mut modifier = BoundsModifier::new(0, centre()).with_walkable(false);
		assert!(modifier.has_pending());
		modifier.force_apply(&mut graphs, true);
		assert!(modifier.has_pending());
		assert!(graphs[0].get_nodes().iter().all(|n| n.is_walkable()));
		modifier.force_apply(&mut graphs, false);
		assert!(!modifier.has_pending());
		assert!(!modifier.try_apply(&mut graphs));
	}
	#[test]
	fn missing_graph_is_ignored() {
		let mut graphs = graphs();
		let mut modifier = BoundsModifier::new(7, centre()).with_walkable(false);
		assert!(modifier.try_apply(&mut graphs));
		assert_eq!(0, modifier.get_affected_count());
	}
}
