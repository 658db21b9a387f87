//! Entity-Component-System Core
//!
//! A lightweight ECS tailored for a dungeon crawler:
//! - Entity: generational index, safe to hold across despawns
//! - Component: any plain `'static` data type, no registration
//! - World: type-erased per-type columns with dynamic multi-type queries
//! - Schedule: fixed-order, single-threaded system execution
//!
//! Design philosophy: simple over flexible. Columns are sparse sets rather
//! than archetypes because a crawler's entity counts are small, and stale
//! handles degrade to no-ops because gameplay code checks then uses.

pub mod entity;
pub mod schedule;
pub mod storage;
pub mod world;

pub use entity::Entity;
pub use schedule::{Schedule, System};
pub use storage::ComponentStorage;
pub use world::{ComponentSet, World};
