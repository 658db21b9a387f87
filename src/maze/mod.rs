//! Procedural Dungeon Layout
//!
//! Grid representation and the maze/dungeon generator. The generator's
//! output contract: a row-major [`Grid`] of [`Tile`] codes with odd
//! dimensions, exactly one entrance and one exit, and a walkable route
//! between them.

pub mod generator;
pub mod grid;

pub use generator::{CarveStrategy, EntrancePolicy, MazeConfig, MazeGenerator};
pub use grid::{Grid, Tile};
