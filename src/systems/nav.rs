//! Enemy Navigation System
//!
//! Steers enemies toward the player over the level grid. Per enemy, the
//! behavior is a two-state machine:
//!
//! - **Idle**: player outside the detection radius; no path, no movement.
//! - **Seeking**: a path is requested from the pathfinder and followed
//!   waypoint by waypoint (a waypoint is popped once the agent is within
//!   tolerance of it). When the path runs out, or none was found, the
//!   enemy falls back to steering straight at the player.
//!
//! Paths go stale as the player moves, so on a fixed repath interval the
//! whole path is discarded and re-requested; it is never patched in place.
//! That keeps pathfinder calls throttled instead of once per tick per enemy.
//!
//! Combat rides along: inside the attack radius the enemy damages the
//! player on a cooldown, and a kill despawns the player entity.

use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::components::{Enemy, Health, NavAgent, NavState, Player, Position, Velocity};
use crate::ecs::{System, World};
use crate::level::CurrentLevel;
use crate::path::Pathfinder;

/// Steering cadence knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavTuning {
    /// Seconds between full path re-requests while seeking.
    pub repath_interval: f32,
    /// World-space distance at which a waypoint counts as reached.
    pub waypoint_tolerance: f32,
    /// Search bound handed to the pathfinder, in tile steps.
    pub max_search_distance: u32,
}

impl Default for NavTuning {
    fn default() -> Self {
        Self {
            repath_interval: 0.5,
            waypoint_tolerance: 8.0,
            max_search_distance: crate::path::DEFAULT_MAX_DISTANCE,
        }
    }
}

pub struct EnemyNavSystem {
    pathfinder: Pathfinder,
    tuning: NavTuning,
    /// Depth of the level the pathfinder was built from.
    level_depth: Option<u32>,
}

impl EnemyNavSystem {
    pub fn new(pathfinder: Pathfinder, tuning: NavTuning) -> Self {
        Self {
            pathfinder,
            tuning,
            level_depth: None,
        }
    }

    /// A pathfinder holds an immutable grid snapshot, so when the loaded
    /// level changes it is replaced outright, never patched.
    fn sync_pathfinder(&mut self, world: &World) {
        let Some(&level_entity) = world.query::<(CurrentLevel,)>().first() else {
            return;
        };
        let Some(level) = world.get::<CurrentLevel>(level_entity) else {
            return;
        };
        if self.level_depth != Some(level.depth) {
            self.pathfinder = Pathfinder::new(level.grid.clone(), self.pathfinder.tile_size());
            self.level_depth = Some(level.depth);
        }
    }
}

impl System for EnemyNavSystem {
    fn update(&mut self, world: &mut World, dt: f32) {
        self.sync_pathfinder(world);

        let players = world.query::<(Player, Position)>();
        let Some(&player) = players.first() else {
            return;
        };

        for entity in world.query::<(Enemy, Position, Velocity, NavAgent)>() {
            // The player can die mid-loop to an earlier enemy's attack.
            let Some(player_pos) = world.get::<Position>(player).map(|p| p.0) else {
                return;
            };
            let Some(pos) = world.get::<Position>(entity).map(|p| p.0) else {
                continue;
            };
            let Some(enemy) = world.get::<Enemy>(entity).copied() else {
                continue;
            };

            let distance = pos.distance(player_pos);
            if distance > enemy.detection_radius {
                if let Some(agent) = world.get_mut::<NavAgent>(entity) {
                    agent.clear();
                }
                if let Some(velocity) = world.get_mut::<Velocity>(entity) {
                    velocity.0 = Vec2::ZERO;
                }
                continue;
            }

            // Seeking: throttle path requests to the repath interval.
            let needs_repath = match world.get_mut::<NavAgent>(entity) {
                Some(agent) => {
                    agent.state = NavState::Seeking;
                    agent.repath_timer -= dt;
                    agent.repath_timer <= 0.0
                }
                None => false,
            };
            if needs_repath {
                let path =
                    self.pathfinder
                        .find_path(pos, player_pos, self.tuning.max_search_distance);
                debug!("repath: {} waypoints", path.len());
                if let Some(agent) = world.get_mut::<NavAgent>(entity) {
                    agent.set_path(path, self.tuning.repath_interval);
                }
            }

            // Next waypoint, or the player directly once the path is spent.
            let mut target = player_pos;
            if let Some(agent) = world.get_mut::<NavAgent>(entity) {
                while let Some(&waypoint) = agent.path.front() {
                    if pos.distance(waypoint) <= self.tuning.waypoint_tolerance {
                        agent.path.pop_front();
                    } else {
                        break;
                    }
                }
                if let Some(&waypoint) = agent.path.front() {
                    target = waypoint;
                }
            }

            let to_target = target - pos;
            let new_velocity = if to_target.length() > f32::EPSILON {
                to_target.normalize() * enemy.speed
            } else {
                Vec2::ZERO
            };
            if let Some(velocity) = world.get_mut::<Velocity>(entity) {
                velocity.0 = new_velocity;
            }

            self.tick_attack(world, entity, player, enemy, distance, dt);
        }
    }
}

impl EnemyNavSystem {
    /// Attack the player on a cooldown when in range; a kill despawns the
    /// player entity.
    fn tick_attack(
        &self,
        world: &mut World,
        entity: crate::ecs::Entity,
        player: crate::ecs::Entity,
        enemy: Enemy,
        distance: f32,
        dt: f32,
    ) {
        let mut attacked = false;
        if distance <= enemy.attack_radius && enemy.attack_cooldown <= 0.0 {
            if let Some(health) = world.get_mut::<Health>(player) {
                let killed = health.damage(enemy.damage);
                attacked = true;
                if killed {
                    debug!("player killed by enemy attack");
                    world.despawn(player);
                }
            }
        }

        if let Some(state) = world.get_mut::<Enemy>(entity) {
            if attacked {
                state.attack_cooldown = state.attack_rate;
            } else if state.attack_cooldown > 0.0 {
                state.attack_cooldown -= dt;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;
    use crate::maze::{Grid, Tile};
    use crate::path::DEFAULT_TILE_SIZE;

    fn open_grid(size: usize) -> Grid {
        let mut grid = Grid::filled(size, size, Tile::Floor);
        for i in 0..size as i32 {
            grid.set(i, 0, Tile::Wall);
            grid.set(i, size as i32 - 1, Tile::Wall);
            grid.set(0, i, Tile::Wall);
            grid.set(size as i32 - 1, i, Tile::Wall);
        }
        grid
    }

    fn spawn_player(world: &mut World, pos: Vec2) -> Entity {
        let player = world.spawn();
        world.insert(player, Player);
        world.insert(player, Position(pos));
        world.insert(player, Health::new(100));
        player
    }

    fn spawn_enemy(world: &mut World, pos: Vec2, enemy: Enemy) -> Entity {
        let e = world.spawn();
        world.insert(e, enemy);
        world.insert(e, Position(pos));
        world.insert(e, Velocity::default());
        world.insert(e, NavAgent::new());
        e
    }

    fn nav_system(size: usize) -> EnemyNavSystem {
        EnemyNavSystem::new(
            Pathfinder::new(open_grid(size), DEFAULT_TILE_SIZE),
            NavTuning::default(),
        )
    }

    #[test]
    fn enemy_outside_detection_radius_idles() {
        let mut world = World::new();
        spawn_player(&mut world, Vec2::new(48.0, 48.0));
        let enemy = spawn_enemy(
            &mut world,
            Vec2::new(400.0, 400.0),
            Enemy {
                detection_radius: 100.0,
                ..Enemy::default()
            },
        );

        nav_system(15).update(&mut world, 0.1);

        assert_eq!(world.get::<Velocity>(enemy).unwrap().0, Vec2::ZERO);
        assert_eq!(world.get::<NavAgent>(enemy).unwrap().state, NavState::Idle);
    }

    #[test]
    fn enemy_in_range_acquires_path_and_moves() {
        let mut world = World::new();
        spawn_player(&mut world, Vec2::new(48.0, 48.0));
        let enemy = spawn_enemy(&mut world, Vec2::new(240.0, 48.0), Enemy::default());

        nav_system(15).update(&mut world, 0.1);

        let agent = world.get::<NavAgent>(enemy).unwrap();
        assert_eq!(agent.state, NavState::Seeking);
        assert!(!agent.path.is_empty());

        // Moving along the corridor toward the player (negative x).
        let velocity = world.get::<Velocity>(enemy).unwrap().0;
        assert!(velocity.x < 0.0);
    }

    #[test]
    fn repath_waits_for_the_timer() {
        let mut world = World::new();
        spawn_player(&mut world, Vec2::new(48.0, 48.0));
        let enemy = spawn_enemy(&mut world, Vec2::new(240.0, 48.0), Enemy::default());

        let mut system = nav_system(15);
        system.update(&mut world, 0.01);
        let timer_after_first = world.get::<NavAgent>(enemy).unwrap().repath_timer;
        assert!(timer_after_first > 0.0);

        // A short tick later the path is kept, only the timer moves.
        let len_before = world.get::<NavAgent>(enemy).unwrap().path.len();
        system.update(&mut world, 0.01);
        let agent = world.get::<NavAgent>(enemy).unwrap();
        assert!(agent.repath_timer < timer_after_first);
        assert!(agent.path.len() <= len_before);
    }

    #[test]
    fn attack_damages_and_eventually_kills_player() {
        let mut world = World::new();
        let player = spawn_player(&mut world, Vec2::new(48.0, 48.0));
        world.insert(player, Health::new(10));
        spawn_enemy(
            &mut world,
            Vec2::new(60.0, 48.0),
            Enemy {
                damage: 10,
                ..Enemy::default()
            },
        );

        nav_system(15).update(&mut world, 0.1);

        // One attack at 10 damage kills a 10 hp player, who despawns.
        assert!(!world.is_alive(player));
    }

    #[test]
    fn attack_respects_cooldown() {
        let mut world = World::new();
        let player = spawn_player(&mut world, Vec2::new(48.0, 48.0));
        let enemy = spawn_enemy(
            &mut world,
            Vec2::new(60.0, 48.0),
            Enemy {
                damage: 10,
                attack_rate: 1.0,
                ..Enemy::default()
            },
        );

        let mut system = nav_system(15);
        system.update(&mut world, 0.1);
        assert_eq!(world.get::<Health>(player).unwrap().current, 90);
        assert!(world.get::<Enemy>(enemy).unwrap().attack_cooldown > 0.0);

        // Next tick is inside the cooldown window: no extra damage.
        system.update(&mut world, 0.1);
        assert_eq!(world.get::<Health>(player).unwrap().current, 90);
    }

    #[test]
    fn pathfinder_rebuilds_when_the_level_changes() {
        let mut world = World::new();
        spawn_player(&mut world, Vec2::new(48.0, 48.0));
        let enemy = spawn_enemy(&mut world, Vec2::new(240.0, 48.0), Enemy::default());

        // Level 1: a wall column severs the route to the player.
        let mut blocked = open_grid(15);
        for y in 0..15 {
            blocked.set(4, y, Tile::Wall);
        }
        let level_entity = world.spawn();
        world.insert(
            level_entity,
            CurrentLevel {
                grid: blocked,
                depth: 1,
            },
        );

        let mut system = EnemyNavSystem::new(
            Pathfinder::new(open_grid(15), DEFAULT_TILE_SIZE),
            NavTuning::default(),
        );
        system.update(&mut world, 0.01);
        assert!(world.get::<NavAgent>(enemy).unwrap().path.is_empty());

        // Level 2 opens the route; the next repath finds it.
        world.get_mut::<CurrentLevel>(level_entity).unwrap().grid = open_grid(15);
        world.get_mut::<CurrentLevel>(level_entity).unwrap().depth = 2;
        system.update(&mut world, 1.0);
        assert!(!world.get::<NavAgent>(enemy).unwrap().path.is_empty());
    }

    #[test]
    fn no_player_is_a_noop() {
        let mut world = World::new();
        let enemy = spawn_enemy(&mut world, Vec2::new(48.0, 48.0), Enemy::default());
        nav_system(15).update(&mut world, 0.1);
        assert_eq!(world.get::<Velocity>(enemy).unwrap().0, Vec2::ZERO);
    }
}
