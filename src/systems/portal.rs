//! Level Progression
//!
//! Watches the player against the current level's exit tile. When the player
//! steps within the activation radius of the exit's center, the old level is
//! torn down and a fresh one generated: tile and enemy entities despawn, the
//! generator carves the next layout, the player teleports to the new
//! entrance, and [`CurrentLevel`] gets the new grid with a bumped depth.
//!
//! Nothing here touches pathfinders directly; bumping the depth is the
//! signal for grid-derived state to rebuild itself from the new grid.

use glam::Vec2;
use log::info;

use crate::components::{Enemy, MapTile, Player, Position, Velocity};
use crate::config::GameConfig;
use crate::ecs::{System, World};
use crate::level::{build_level, entrance_position, exit_position, spawn_enemies, tile_center, CurrentLevel};
use crate::maze::MazeGenerator;

pub struct PortalSystem {
    generator: MazeGenerator,
    tile_size: f32,
    level_width: usize,
    level_height: usize,
    enemy_count: usize,
    /// Base for deriving per-depth enemy placement seeds.
    seed: u64,
    /// How close to the exit's center the player must be to descend.
    activation_radius: f32,
}

impl PortalSystem {
    /// Takes over the generator that carved the first level, so later levels
    /// continue its rng stream instead of repeating it.
    pub fn new(generator: MazeGenerator, config: &GameConfig, seed: u64) -> Self {
        Self {
            generator,
            tile_size: config.tile_size,
            level_width: config.level_width,
            level_height: config.level_height,
            enemy_count: config.enemy_count,
            seed,
            activation_radius: config.tile_size * 0.75,
        }
    }
}

impl System for PortalSystem {
    fn update(&mut self, world: &mut World, _dt: f32) {
        let players = world.query::<(Player, Position)>();
        let Some(&player) = players.first() else {
            return;
        };
        let Some(player_pos) = world.get::<Position>(player).map(|p| p.0) else {
            return;
        };

        let levels = world.query::<(CurrentLevel,)>();
        let Some(&level_entity) = levels.first() else {
            return;
        };
        let (exit, depth) = {
            let Some(level) = world.get::<CurrentLevel>(level_entity) else {
                return;
            };
            let Some(exit) = exit_position(&level.grid, self.tile_size) else {
                return;
            };
            (exit, level.depth)
        };

        if player_pos.distance(exit) > self.activation_radius {
            return;
        }
        info!("player reached the exit, descending to depth {}", depth + 1);

        // Tear down the old level before anything from the new one exists.
        for entity in world.query::<(MapTile,)>() {
            world.despawn(entity);
        }
        for entity in world.query::<(Enemy,)>() {
            world.despawn(entity);
        }

        let grid = self.generator.generate(self.level_width, self.level_height);
        build_level(world, &grid, self.tile_size);

        let spawn = entrance_position(&grid, self.tile_size)
            .unwrap_or_else(|| tile_center(1, 1, self.tile_size));
        if let Some(position) = world.get_mut::<Position>(player) {
            position.0 = spawn;
        }
        if let Some(velocity) = world.get_mut::<Velocity>(player) {
            velocity.0 = Vec2::ZERO;
        }

        spawn_enemies(
            world,
            &grid,
            self.tile_size,
            self.enemy_count,
            spawn,
            self.seed.wrapping_add(depth as u64 + 1),
        );

        if let Some(level) = world.get_mut::<CurrentLevel>(level_entity) {
            level.grid = grid;
            level.depth = depth + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Health;
    use crate::maze::Tile;

    fn setup(
        config: &GameConfig,
        seed: u64,
    ) -> (World, crate::ecs::Entity, crate::ecs::Entity, MazeGenerator) {
        let mut generator = MazeGenerator::new(config.maze.clone(), seed);
        let grid = generator.generate(config.level_width, config.level_height);

        let mut world = World::new();
        build_level(&mut world, &grid, config.tile_size);
        let spawn = entrance_position(&grid, config.tile_size).unwrap();
        spawn_enemies(&mut world, &grid, config.tile_size, config.enemy_count, spawn, seed);

        let player = world.spawn();
        world.insert(player, Player);
        world.insert(player, Position(spawn));
        world.insert(player, Velocity::default());
        world.insert(player, Health::new(100));

        let level_entity = world.spawn();
        world.insert(level_entity, CurrentLevel { grid, depth: 1 });
        (world, player, level_entity, generator)
    }

    #[test]
    fn reaching_the_exit_advances_the_level() {
        let config = GameConfig::default();
        let seed = 21;
        let (mut world, player, level_entity, generator) = setup(&config, seed);

        let old_grid = world.get::<CurrentLevel>(level_entity).unwrap().grid.clone();
        let exit = exit_position(&old_grid, config.tile_size).unwrap();
        world.get_mut::<Position>(player).unwrap().0 = exit;

        let mut system = PortalSystem::new(generator, &config, seed);
        system.update(&mut world, 1.0 / 60.0);

        let level = world.get::<CurrentLevel>(level_entity).unwrap().clone();
        assert_eq!(level.depth, 2);

        // The player stands at the new level's entrance.
        let spawn = entrance_position(&level.grid, config.tile_size).unwrap();
        assert_eq!(world.get::<Position>(player).unwrap().0, spawn);

        // Old tiles are gone; the world holds exactly the new layout.
        let non_empty = level
            .grid
            .iter()
            .filter(|&(_, _, t)| t != Tile::Empty)
            .count();
        assert_eq!(world.query::<(MapTile,)>().len(), non_empty);
        assert!(!world.query::<(Enemy,)>().is_empty());
    }

    #[test]
    fn far_from_the_exit_nothing_happens() {
        let config = GameConfig::default();
        let (mut world, _, level_entity, generator) = setup(&config, 21);
        let tiles_before = world.query::<(MapTile,)>().len();

        let mut system = PortalSystem::new(generator, &config, 21);
        system.update(&mut world, 1.0 / 60.0);

        assert_eq!(world.get::<CurrentLevel>(level_entity).unwrap().depth, 1);
        assert_eq!(world.query::<(MapTile,)>().len(), tiles_before);
    }
}
