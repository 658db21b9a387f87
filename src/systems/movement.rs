//! Movement System
//!
//! Integrates velocity into position for every entity that has both.
//! Collision response is out of scope for the core; a host that wants solid
//! walls resolves them against tile colliders after this runs.

use crate::components::{Position, Velocity};
use crate::ecs::{System, World};

pub struct MovementSystem;

impl System for MovementSystem {
    fn update(&mut self, world: &mut World, dt: f32) {
        for entity in world.query::<(Position, Velocity)>() {
            let Some(velocity) = world.get::<Velocity>(entity).copied() else {
                continue;
            };
            if let Some(position) = world.get_mut::<Position>(entity) {
                position.0 += velocity.0 * dt;
            }
        }
    }
}
