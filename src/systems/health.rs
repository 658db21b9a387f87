//! Health Upkeep
//!
//! Removes non-player entities whose hit points hit zero. The player is
//! exempt: player death is handled at the point the killing blow lands, so
//! a host gets the chance to react (game over screen, respawn) before the
//! entity disappears.

use log::debug;

use crate::components::{Health, Player};
use crate::ecs::{System, World};

pub struct HealthSystem;

impl System for HealthSystem {
    fn update(&mut self, world: &mut World, _dt: f32) {
        for entity in world.query::<(Health,)>() {
            if world.has::<Player>(entity) {
                continue;
            }
            let dead = world.get::<Health>(entity).is_some_and(|h| h.is_dead());
            if dead {
                debug!("{entity:?} died");
                world.despawn(entity);
            }
        }
    }
}
