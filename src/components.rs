//! Gameplay Components
//!
//! Plain data attached to entities; behavior lives in systems. Anything
//! `'static` can be a component, these are just the types the built-in
//! systems and the level loader agree on.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::maze::Tile;

// =============================================================================
// Spatial
// =============================================================================

/// World-space position, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// World-space velocity, in pixels per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity(pub Vec2);

impl Velocity {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Axis-aligned collision box, used by the collision layer to block
/// movement through wall tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collider {
    pub width: f32,
    pub height: f32,
}

// =============================================================================
// Level
// =============================================================================

/// Marks an entity as one cell of the level layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTile {
    pub tile: Tile,
}

impl MapTile {
    pub fn is_walkable(&self) -> bool {
        self.tile.is_walkable()
    }
}

// =============================================================================
// Actors
// =============================================================================

/// Marks the player entity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Player;

/// Enemy behavior parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Enemy {
    /// Movement speed, pixels per second.
    pub speed: f32,
    /// Damage dealt per attack.
    pub damage: i32,
    /// The enemy notices targets inside this radius.
    pub detection_radius: f32,
    /// The enemy can attack targets inside this radius.
    pub attack_radius: f32,
    /// Seconds between attacks.
    pub attack_rate: f32,
    /// Seconds until the next attack is allowed.
    pub attack_cooldown: f32,
}

impl Default for Enemy {
    fn default() -> Self {
        Self {
            speed: 100.0,
            damage: 10,
            detection_radius: 300.0,
            attack_radius: 50.0,
            attack_rate: 1.0,
            attack_cooldown: 0.0,
        }
    }
}

/// Hit points for damageable entities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage; returns true if this killed the entity.
    pub fn damage(&mut self, amount: i32) -> bool {
        self.current = (self.current - amount).max(0);
        self.current == 0
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Steering state for a path-following agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    /// Target out of range; no path requested.
    #[default]
    Idle,
    /// Following a path (or closing in directly once it empties).
    Seeking,
}

/// Path-following state for an agent steered by the navigation system.
///
/// The path is consumed front-to-back: each waypoint is popped once the
/// agent is within tolerance of it. Paths are discarded wholesale and
/// re-requested on a timer, never patched in place.
#[derive(Debug, Clone, Default)]
pub struct NavAgent {
    pub state: NavState,
    /// Remaining waypoints, in order.
    pub path: VecDeque<Vec2>,
    /// Seconds until the current path is discarded and re-requested.
    pub repath_timer: f32,
}

impl NavAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current path outright.
    pub fn set_path(&mut self, waypoints: Vec<Vec2>, repath_interval: f32) {
        self.path = waypoints.into();
        self.repath_timer = repath_interval;
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.state = NavState::Idle;
    }
}
