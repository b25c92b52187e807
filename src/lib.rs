//! Multi-graph pathfinding for the Bevy game engine. Graphs of nodes with
//! directional connections answer path queries either as a flow field
//! covering the whole graph or as a list of nodes, and many queries can run
//! against the same graph at once by giving each its own thread index
//!

pub mod coordinator;
pub mod graphs;
pub mod modifiers;
pub mod path;
pub mod plugin;
pub mod pool;
pub mod processors;
pub mod settings;

pub mod prelude;
