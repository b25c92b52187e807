//! Pools of reusable buffers.
//!
//! Searches need a handful of short lived buffers (visited lists, queues) and
//! hand back long lived ones (flow fields, node lists). Rather than allocate
//! these on every query a [BufferPool] keeps released vectors bucketed by
//! capacity class (the next power of two) and hands them out again.
//!
//! A buffer leaves the pool as a [PooledBuffer] which is the single owner of
//! the backing vector. It can be moved but not cloned and it returns the
//! vector to its pool when dropped, so a buffer cannot be released twice and
//! cannot leak past its owner.
//!

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Upper bound on idle vectors kept per capacity class
const MAX_IDLE_PER_CLASS: usize = 64;

/// Idle vectors and bookkeeping of a [BufferPool]
#[derive(Debug)]
struct PoolState<T> {
	/// Idle vectors keyed by capacity class
	idle: BTreeMap<usize, Vec<Vec<T>>>,
	/// Number of buffers handed out
	spawned: usize,
	/// Number of buffers given back
	recycled: usize,
}

impl<T> Default for PoolState<T> {
	fn default() -> Self {
		PoolState {
			idle: BTreeMap::new(),
			spawned: 0,
			recycled: 0,
		}
	}
}

/// A shareable pool of `Vec<T>`, cloning the pool shares the same storage
#[derive(Debug)]
pub struct BufferPool<T> {
	/// Shared state
	state: Arc<Mutex<PoolState<T>>>,
}

impl<T> Clone for BufferPool<T> {
	fn clone(&self) -> Self {
		BufferPool {
			state: Arc::clone(&self.state),
		}
	}
}

impl<T> Default for BufferPool<T> {
	fn default() -> Self {
		BufferPool {
			state: Arc::new(Mutex::new(PoolState::default())),
		}
	}
}

/// Capacity class of a requested capacity
fn capacity_class(capacity: usize) -> usize {
	capacity.max(1).next_power_of_two()
}

impl<T> BufferPool<T> {
	/// Create an empty pool
	pub fn new() -> Self {
		BufferPool::default()
	}
	/// Lock the state, a panic on another thread never leaves the state inconsistent so poisoning is ignored
	fn lock(&self) -> MutexGuard<'_, PoolState<T>> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}
	/// Take an empty buffer able to hold at least `capacity` items
	pub fn spawn(&self, capacity: usize) -> PooledBuffer<T> {
		let class = capacity_class(capacity);
		let mut state = self.lock();
		state.spawned += 1;
		let reused = state.idle.get_mut(&class).and_then(|v| v.pop());
		drop(state);
		let data = reused.unwrap_or_else(|| Vec::with_capacity(class));
		PooledBuffer {
			data,
			pool: self.clone(),
		}
	}
	/// Take a buffer of exactly `len` copies of `value`
	pub fn spawn_filled(&self, len: usize, value: T) -> PooledBuffer<T>
	where
		T: Clone,
	{
		let mut buffer = self.spawn(len);
		buffer.resize(len, value);
		buffer
	}
	/// Give a vector back to the pool
	fn give_back(&self, mut data: Vec<T>) {
		data.clear();
		let class = capacity_class(data.capacity());
		let mut state = self.lock();
		state.recycled += 1;
		// a vector that grew past its class is filed under the class it can still serve
		let class = if class > data.capacity() { class / 2 } else { class };
		let bucket = state.idle.entry(class).or_default();
		if bucket.len() < MAX_IDLE_PER_CLASS {
			bucket.push(data);
		}
	}
	/// Number of buffers ever handed out
	pub fn get_spawned(&self) -> usize {
		self.lock().spawned
	}
	/// Number of buffers ever given back
	pub fn get_recycled(&self) -> usize {
		self.lock().recycled
	}
	/// Number of buffers currently owned outside the pool
	pub fn get_outstanding(&self) -> usize {
		let state = self.lock();
		state.spawned - state.recycled
	}
	/// Number of idle vectors held
	pub fn get_idle(&self) -> usize {
		self.lock().idle.values().map(|v| v.len()).sum()
	}
}

/// Single owner of a vector borrowed from a [BufferPool]
#[derive(Debug)]
pub struct PooledBuffer<T> {
	/// The borrowed vector
	data: Vec<T>,
	/// Pool the vector goes back to
	pool: BufferPool<T>,
}

impl<T> PooledBuffer<T> {
	/// Hand the buffer back to its pool now rather than at the end of scope
	pub fn recycle(self) {
		drop(self);
	}
	/// Copy the contents into a plain vector
	pub fn to_vec(&self) -> Vec<T>
	where
		T: Clone,
	{
		self.data.clone()
	}
}

impl<T> Deref for PooledBuffer<T> {
	type Target = Vec<T>;
	fn deref(&self) -> &Self::Target {
		&self.data
	}
}

impl<T> DerefMut for PooledBuffer<T> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.data
	}
}

impl<T> Drop for PooledBuffer<T> {
	fn drop(&mut self) {
		let data = std::mem::take(&mut self.data);
		self.pool.give_back(data);
	}
}

/// The pools used by path queries
#[derive(Debug, Clone, Default)]
pub struct PathPools {
	/// Node index lists, visited lists and queues
	nodes: BufferPool<usize>,
	/// Flow field buffers
	flow_fields: BufferPool<u8>,
}

impl PathPools {
	/// Create a fresh set of pools
	pub fn new() -> Self {
		PathPools::default()
	}
	/// Get the node index pool
	pub fn get_nodes(&self) -> &BufferPool<usize> {
		&self.nodes
	}
	/// Get the flow field pool
	pub fn get_flow_fields(&self) -> &BufferPool<u8> {
		&self.flow_fields
	}
	/// Number of buffers of any kind owned outside the pools
	pub fn get_outstanding(&self) -> usize {
		self.nodes.get_outstanding() + self.flow_fields.get_outstanding()
	}
}
