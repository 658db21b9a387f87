//! Navigation Support
//!
//! Shortest-path queries over a level grid snapshot.

pub mod dijkstra;

pub use dijkstra::{Pathfinder, DEFAULT_MAX_DISTANCE, DEFAULT_TILE_SIZE};
