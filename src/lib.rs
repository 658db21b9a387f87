//! MIRECRAWL: a dungeon-crawler simulation core
//!
//! Headless building blocks for grid dungeon games:
//! - A type-erased entity/component world with tuple queries
//! - Randomized-Prim maze generation with guaranteed-solvable layouts
//! - Dijkstra pathfinding over the generated grid
//!
//! The crate has no rendering or input layer; a host embeds the world,
//! schedules systems, and draws the result however it likes. The bundled
//! binary runs the simulation for a fixed number of ticks and logs what
//! happened.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod components;
pub mod config;
pub mod ecs;
pub mod level;
pub mod maze;
pub mod path;
pub mod systems;

pub use components::{Collider, Enemy, Health, MapTile, NavAgent, NavState, Player, Position, Velocity};
pub use config::{ConfigError, GameConfig};
pub use ecs::{Entity, Schedule, System, World};
pub use level::CurrentLevel;
pub use maze::{Grid, MazeConfig, MazeGenerator, Tile};
pub use path::Pathfinder;
