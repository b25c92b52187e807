//! Acceleration structure for nearest node lookups.
//!
//! Node positions are hashed onto a uniform grid of buckets laid over the
//! `x/z` plane of the graph bounds. A query starts in the bucket containing
//! (or closest to) the query position and walks outwards one square ring at a
//! time:
//!
//! ```text
//!  ___________________
//! |_2_|_2_|_2_|_2_|_2_|
//! |_2_|_1_|_1_|_1_|_2_|
//! |_2_|_1_|_0_|_1_|_2_|
//! |_2_|_1_|_1_|_1_|_2_|
//! |_2_|_2_|_2_|_2_|_2_|
//! ```
//!
//! Any point inside ring `r` is at least `(r - 1) * bucket_size` away from the
//! query position, so once that bound exceeds the best distance found the
//! search stops. Ties in distance resolve to the lowest node index which makes
//! the result identical to a linear scan.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Target average number of nodes per bucket
const NODES_PER_BUCKET: f32 = 4.0;

/// Uniform bucket grid over node positions
#[derive(Clone, Debug, Default)]
pub struct SpatialIndex {
	/// Minimum `x/z` corner of the indexed area
	min: Vec2,
	/// Side length of a bucket
	bucket_size: f32,
	/// Number of bucket columns (`x`)
	columns: usize,
	/// Number of bucket rows (`z`)
	rows: usize,
	/// Node indices per bucket, ascending within each bucket
	buckets: Vec<Vec<usize>>,
}

impl SpatialIndex {
	/// Index the positions of `nodes`
	pub fn new(nodes: &[Node]) -> Self {
		if nodes.is_empty() {
			return SpatialIndex::default();
		}
		let mut min = Vec2::splat(f32::MAX);
		let mut max = Vec2::splat(f32::MIN);
		for node in nodes {
			let p = node.get_world_position().xz();
			min = min.min(p);
			max = max.max(p);
		}
		let extent = (max - min).max(Vec2::splat(f32::EPSILON));
		// aim for a handful of nodes per bucket
		let bucket_count = (nodes.len() as f32 / NODES_PER_BUCKET).max(1.0);
		// thin layouts (a single row of nodes) have almost no area, fall back to the long side
		let bucket_size = (extent.x * extent.y / bucket_count)
			.sqrt()
			.max(extent.max_element() / bucket_count)
			.max(f32::EPSILON);
		let columns = ((extent.x / bucket_size).floor() as usize + 1).max(1);
		let rows = ((extent.y / bucket_size).floor() as usize + 1).max(1);
		let mut index = SpatialIndex {
			min,
			bucket_size,
			columns,
			rows,
			buckets: vec![Vec::new(); columns * rows],
		};
		for node in nodes {
			let (c, r) = index.bucket_of(node.get_world_position());
			index.buckets[r * columns + c].push(node.get_index());
		}
		index
	}
	/// Bucket `(column, row)` containing a position, clamped onto the grid
	fn bucket_of(&self, position: Vec3) -> (usize, usize) {
		let local = (position.xz() - self.min) / self.bucket_size;
		let column = (local.x.max(0.0) as usize).min(self.columns - 1);
		let row = (local.y.max(0.0) as usize).min(self.rows - 1);
		(column, row)
	}
	/// Find the suitable node nearest to `position`. `is_suitable` decides which nodes are eligible
	pub fn nearest<F>(&self, nodes: &[Node], position: Vec3, is_suitable: F) -> Option<usize>
	where
		F: Fn(&Node) -> bool,
	{
		if self.buckets.is_empty() {
			return None;
		}
		let (column, row) = self.bucket_of(position);
		let max_ring = self.columns.max(self.rows);
		let mut best: Option<(f32, usize)> = None;
		for ring in 0..=max_ring {
			if let Some((best_distance, _)) = best {
				let reach = ring.saturating_sub(1) as f32 * self.bucket_size;
				if reach * reach > best_distance {
					break;
				}
			}
			for bucket in self.ring(column, row, ring) {
				for &i in bucket {
					let node = &nodes[i];
					if !is_suitable(node) {
						continue;
					}
					let d = node.get_world_position().distance_squared(position);
					let closer = match best {
						None => true,
						Some((bd, bi)) => d < bd || (d == bd && i < bi),
					};
					if closer {
						best = Some((d, i));
					}
				}
			}
		}
		best.map(|(_, i)| i)
	}
	/// Buckets lying on the square ring `ring` around `(column, row)`
	fn ring(&self, column: usize, row: usize, ring: usize) -> impl Iterator<Item = &Vec<usize>> {
		let c = column as i64;
		let r = row as i64;
		let k = ring as i64;
		let (columns, rows) = (self.columns as i64, self.rows as i64);
		(r - k..=r + k)
			.flat_map(move |z| (c - k..=c + k).map(move |x| (x, z)))
			.filter(move |(x, z)| (x - c).abs() == k || (z - r).abs() == k)
			.filter(move |(x, z)| *x >= 0 && *z >= 0 && *x < columns && *z < rows)
			.map(move |(x, z)| &self.buckets[(z * columns + x) as usize])
	}
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	/// Nodes scattered along a curve with some duplicated positions
	fn scattered(count: usize) -> Vec<Node> {
		(0..count)
			.map(|i| {
				let f = i as f32;
				let p = Vec3::new((f * 1.7).sin() * 20.0 + f * 0.3, 0.0, (f * 0.9).cos() * 15.0);
				Node::new(i, 0, &NodeDescriptor::new(p))
			})
			.collect()
	}
	/// Reference answer, first minimum in index order
	fn linear(nodes: &[Node], position: Vec3, filter: impl Fn(&Node) -> bool) -> Option<usize> {
		let mut best: Option<(f32, usize)> = None;
		for n in nodes.iter().filter(|n| filter(n)) {
			let d = n.get_world_position().distance_squared(position);
			if best.is_none_or(|(bd, _)| d < bd) {
				best = Some((d, n.get_index()));
			}
		}
		best.map(|(_, i)| i)
	}
	#[test]
	fn matches_linear_scan() {
		let nodes = scattered(300);
		let index = SpatialIndex::new(&nodes);
		for q in 0..60 {
			let f = q as f32;
			let p = Vec3::new(f * 1.3 - 30.0, 2.0, (f * 0.37).sin() * 40.0);
			assert_eq!(linear(&nodes, p, |_| true), index.nearest(&nodes, p, |_| true));
			let even = |n: &Node| n.get_index() % 7 == 0;
			assert_eq!(linear(&nodes, p, even), index.nearest(&nodes, p, even));
		}
	}
	#[test]
	fn ties_pick_lowest_index() {
		let nodes = vec![
			Node::new(0, 0, &NodeDescriptor::new(Vec3::new(-1.0, 0.0, 0.0))),
			Node::new(1, 0, &NodeDescriptor::new(Vec3::new(1.0, 0.0, 0.0))),
		];
		let index = SpatialIndex::new(&nodes);
		assert_eq!(Some(0), index.nearest(&nodes, Vec3::ZERO, |_| true));
	}
	#[test]
	fn none_when_nothing_suitable() {
		let nodes = scattered(20);
		let index = SpatialIndex::new(&nodes);
		assert_eq!(None, index.nearest(&nodes, Vec3::ZERO, |_| false));
		assert_eq!(None, SpatialIndex::new(&[]).nearest(&[], Vec3::ZERO, |_| true));
	}
	#[test]
	fn far_outside_bounds() {
		let nodes = scattered(50);
		let index = SpatialIndex::new(&nodes);
		let p = Vec3::new(1000.0, 0.0, -1000.0);
		assert_eq!(linear(&nodes, p, |_| true), index.nearest(&nodes, p, |_| true));
	}
}
