//! Built-in Systems
//!
//! The systems the headless simulation runs each tick. Hosts can add their
//! own by implementing [`crate::ecs::System`].

pub mod health;
pub mod movement;
pub mod nav;
pub mod portal;

pub use health::HealthSystem;
pub use movement::MovementSystem;
pub use nav::{EnemyNavSystem, NavTuning};
pub use portal::PortalSystem;
