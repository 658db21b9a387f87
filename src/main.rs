//! Headless simulation runner.
//!
//! Generates a level, drops a player at the entrance and a handful of
//! enemies on random floor tiles, then ticks the schedule at a fixed rate
//! and logs the outcome. Reaching the exit descends to a freshly generated
//! level. Useful for eyeballing generator output and for profiling the
//! simulation without a renderer.
//!
//! Usage: `mirecrawl [config.ron] [seed]`

use std::path::Path;

use glam::Vec2;
use log::{error, info};

use mirecrawl::components::{Health, Player, Position, Velocity};
use mirecrawl::config::GameConfig;
use mirecrawl::ecs::{Schedule, World};
use mirecrawl::level::{build_level, entrance_position, spawn_enemies, tile_center, CurrentLevel};
use mirecrawl::maze::MazeGenerator;
use mirecrawl::path::Pathfinder;
use mirecrawl::systems::{EnemyNavSystem, HealthSystem, MovementSystem, PortalSystem};
use mirecrawl::VERSION;

const TICK_RATE: f32 = 1.0 / 60.0;
const TICKS: usize = 600;
const DEFAULT_SEED: u64 = 42;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "mirecrawl.ron".to_string());
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    let config = match GameConfig::load_or_default(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    info!(
        "mirecrawl v{VERSION}: seed {seed}, {}x{} tiles",
        config.level_width, config.level_height
    );

    let mut generator = MazeGenerator::new(config.maze.clone(), seed);
    let grid = generator.generate(config.level_width, config.level_height);

    let mut world = World::new();
    build_level(&mut world, &grid, config.tile_size);

    let player = world.spawn();
    let spawn = entrance_position(&grid, config.tile_size)
        .unwrap_or_else(|| tile_center(1, 1, config.tile_size));
    world.insert(player, Player);
    world.insert(player, Position(spawn));
    world.insert(player, Velocity::default());
    world.insert(player, Health::new(100));

    spawn_enemies(&mut world, &grid, config.tile_size, config.enemy_count, spawn, seed);

    let level_entity = world.spawn();
    world.insert(
        level_entity,
        CurrentLevel {
            grid: grid.clone(),
            depth: 1,
        },
    );

    let mut schedule = Schedule::new();
    schedule.add_system(PortalSystem::new(generator, &config, seed));
    schedule.add_system(EnemyNavSystem::new(
        Pathfinder::new(grid, config.tile_size),
        config.nav,
    ));
    schedule.add_system(MovementSystem);
    schedule.add_system(HealthSystem);

    for _ in 0..TICKS {
        schedule.run(&mut world, TICK_RATE);
        if !world.is_alive(player) {
            break;
        }
    }

    let depth = world
        .get::<CurrentLevel>(level_entity)
        .map(|l| l.depth)
        .unwrap_or(1);
    match world.get::<Health>(player).map(|h| h.current) {
        Some(hp) => info!(
            "after {TICKS} ticks: depth {depth}, player at {:?} with {hp} hp, {} entities alive",
            world.get::<Position>(player).map(|p| p.0).unwrap_or(Vec2::ZERO),
            world.entity_count()
        ),
        None => info!("player died before tick {TICKS}"),
    }
}
