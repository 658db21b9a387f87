//! Level Loading
//!
//! Turns a generated grid into world entities: one tile entity per non-empty
//! cell, positioned at the cell's world-space center. Non-walkable tiles get
//! a collider so the collision layer can block movement through them.

use glam::Vec2;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::components::{Collider, Enemy, Health, MapTile, NavAgent, Position, Velocity};
use crate::ecs::{Entity, World};
use crate::maze::{Grid, Tile};

/// Enemies never spawn closer than this to the player's start, in world units.
const ENEMY_SPAWN_CLEARANCE: f32 = 200.0;

/// Starting hit points for spawned enemies.
const ENEMY_HEALTH: i32 = 50;

/// Singleton component describing the level currently loaded into the world.
///
/// `depth` is bumped on every transition; consumers that derive state from
/// the grid (pathfinders in particular) watch it to know when to rebuild.
#[derive(Debug, Clone)]
pub struct CurrentLevel {
    pub grid: Grid,
    pub depth: u32,
}

/// World-space center of a tile cell.
pub fn tile_center(x: usize, y: usize, tile_size: f32) -> Vec2 {
    Vec2::new(
        x as f32 * tile_size + tile_size * 0.5,
        y as f32 * tile_size + tile_size * 0.5,
    )
}

/// Create one entity per non-empty grid cell. Returns the created entities.
pub fn build_level(world: &mut World, grid: &Grid, tile_size: f32) -> Vec<Entity> {
    let mut tiles = Vec::new();

    for (x, y, tile) in grid.iter() {
        if tile == Tile::Empty {
            continue;
        }

        let entity = world.spawn();
        world.insert(entity, MapTile { tile });
        world.insert(entity, Position(tile_center(x, y, tile_size)));
        if !tile.is_walkable() {
            world.insert(
                entity,
                Collider {
                    width: tile_size,
                    height: tile_size,
                },
            );
        }
        tiles.push(entity);
    }

    info!(
        "loaded level: {} tile entities from {}x{} grid",
        tiles.len(),
        grid.width(),
        grid.height()
    );
    tiles
}

/// World-space center of the level's entrance cell, if present.
pub fn entrance_position(grid: &Grid, tile_size: f32) -> Option<Vec2> {
    grid.find(Tile::Entrance)
        .map(|(x, y)| tile_center(x, y, tile_size))
}

/// World-space center of the level's exit cell, if present.
pub fn exit_position(grid: &Grid, tile_size: f32) -> Option<Vec2> {
    grid.find(Tile::Exit).map(|(x, y)| tile_center(x, y, tile_size))
}

/// Scatter `count` enemies on floor tiles, keeping clear of `avoid` (the
/// player's start). Spawns fewer when the level has too few eligible tiles.
pub fn spawn_enemies(
    world: &mut World,
    grid: &Grid,
    tile_size: f32,
    count: usize,
    avoid: Vec2,
    seed: u64,
) -> Vec<Entity> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut floors: Vec<(usize, usize)> = grid
        .iter()
        .filter(|&(x, y, tile)| {
            tile == Tile::Floor && tile_center(x, y, tile_size).distance(avoid) > ENEMY_SPAWN_CLEARANCE
        })
        .map(|(x, y, _)| (x, y))
        .collect();
    floors.shuffle(&mut rng);

    let mut enemies = Vec::new();
    for &(x, y) in floors.iter().take(count) {
        let enemy = world.spawn();
        world.insert(enemy, Enemy::default());
        world.insert(enemy, Position(tile_center(x, y, tile_size)));
        world.insert(enemy, Velocity::default());
        world.insert(enemy, NavAgent::new());
        world.insert(enemy, Health::new(ENEMY_HEALTH));
        enemies.push(enemy);
    }
    info!("spawned {} enemies", enemies.len());
    enemies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::DEFAULT_TILE_SIZE;

    #[test]
    fn one_entity_per_non_empty_cell() {
        let mut grid = Grid::filled(3, 3, Tile::Wall);
        grid.set(1, 1, Tile::Floor);
        grid.set(2, 2, Tile::Empty);

        let mut world = World::new();
        let tiles = build_level(&mut world, &grid, DEFAULT_TILE_SIZE);

        assert_eq!(tiles.len(), 8); // 9 cells, one empty
        assert_eq!(world.query::<(MapTile,)>().len(), 8);
    }

    #[test]
    fn walls_get_colliders_and_floors_do_not() {
        let mut grid = Grid::filled(2, 1, Tile::Wall);
        grid.set(1, 0, Tile::Floor);

        let mut world = World::new();
        build_level(&mut world, &grid, DEFAULT_TILE_SIZE);

        let blocked = world.query::<(MapTile, Collider)>();
        assert_eq!(blocked.len(), 1);
        let tile = world.get::<MapTile>(blocked[0]).unwrap();
        assert_eq!(tile.tile, Tile::Wall);
    }

    #[test]
    fn tiles_sit_at_cell_centers() {
        let grid = Grid::filled(1, 1, Tile::Floor);
        let mut world = World::new();
        let tiles = build_level(&mut world, &grid, 32.0);
        let pos = world.get::<Position>(tiles[0]).unwrap();
        assert_eq!(pos.0, Vec2::new(16.0, 16.0));
    }

    #[test]
    fn entrance_and_exit_lookups() {
        let mut grid = Grid::filled(3, 3, Tile::Floor);
        grid.set(0, 0, Tile::Entrance);
        grid.set(2, 2, Tile::Exit);

        assert_eq!(entrance_position(&grid, 32.0), Some(Vec2::new(16.0, 16.0)));
        assert_eq!(exit_position(&grid, 32.0), Some(Vec2::new(80.0, 80.0)));

        let bare = Grid::filled(2, 2, Tile::Floor);
        assert_eq!(entrance_position(&bare, 32.0), None);
    }

    #[test]
    fn enemies_spawn_on_floor_away_from_the_player() {
        let grid = Grid::filled(31, 31, Tile::Floor);
        let mut world = World::new();
        let avoid = tile_center(1, 1, 32.0);

        let enemies = spawn_enemies(&mut world, &grid, 32.0, 3, avoid, 7);
        assert_eq!(enemies.len(), 3);
        for &enemy in &enemies {
            let pos = world.get::<Position>(enemy).unwrap().0;
            assert!(pos.distance(avoid) > 200.0);
            assert!(world.has::<Health>(enemy));
            assert!(world.has::<NavAgent>(enemy));
        }
    }

    #[test]
    fn enemy_spawn_count_caps_at_eligible_tiles() {
        // A tiny level where every floor tile is inside the clearance zone.
        let grid = Grid::filled(3, 3, Tile::Floor);
        let mut world = World::new();
        let enemies = spawn_enemies(&mut world, &grid, 32.0, 5, tile_center(1, 1, 32.0), 7);
        assert!(enemies.is_empty());
    }
}
