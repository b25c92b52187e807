//! Modifiers alter graphs or paths without touching the search algorithms.
//!
//! - [dynamic] - objects registered with the coordinator which change node
//!   walkability or penalties while the world runs, e.g. a door closing
//! - [path_modifier] - post processing of a calculated [crate::prelude::Path]
//!

pub mod dynamic;
pub mod path_modifier;
