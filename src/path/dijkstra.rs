//! Grid Pathfinding
//!
//! Shortest walkable routes over a level grid, used by enemy navigation.
//! The walkable surface is a 4-connected graph over tiles where floor,
//! entrance and exit are traversable. Search is Dijkstra with uniform edge
//! weight 1, equivalent to breadth-first here, but the priority queue stays
//! so non-uniform step costs (mud, traps) can slot in later.
//!
//! Everything that can go wrong collapses to an empty path: endpoints off
//! the grid, endpoints on a wall, no route within the distance bound.
//! Callers that care which of those happened must pre-validate themselves.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::Vec2;

use crate::maze::Grid;

/// Default search bound, in tile steps.
pub const DEFAULT_MAX_DISTANCE: u32 = 100;

/// Default edge length of one tile in world units.
pub const DEFAULT_TILE_SIZE: f32 = 32.0;

/// Shortest-path engine over an immutable grid snapshot.
///
/// Holds its own copy of the grid; when the level changes, build a new
/// `Pathfinder` rather than mutating this one. Queries are read-only, so a
/// single instance can serve any number of callers.
pub struct Pathfinder {
    grid: Grid,
    tile_size: f32,
}

impl Pathfinder {
    pub fn new(grid: Grid, tile_size: f32) -> Self {
        Self { grid, tile_size }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// World-space center of a tile.
    pub fn tile_center(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(
            x as f32 * self.tile_size + self.tile_size * 0.5,
            y as f32 * self.tile_size + self.tile_size * 0.5,
        )
    }

    /// Tile indices containing a world-space point.
    pub fn world_to_tile(&self, point: Vec2) -> (i32, i32) {
        (
            (point.x / self.tile_size).floor() as i32,
            (point.y / self.tile_size).floor() as i32,
        )
    }

    /// Shortest walkable path from `start` to `goal`, both in world space.
    ///
    /// Returns waypoints at tile centers in start-to-goal order; the start
    /// tile is excluded, the goal tile included. Returns an empty vec when
    /// either endpoint is off-grid or non-walkable, or no route exists
    /// within `max_distance` steps; never an error.
    pub fn find_path(&self, start: Vec2, goal: Vec2, max_distance: u32) -> Vec<Vec2> {
        let (start_x, start_y) = self.world_to_tile(start);
        let (goal_x, goal_y) = self.world_to_tile(goal);

        if !self.grid.is_walkable(start_x, start_y) || !self.grid.is_walkable(goal_x, goal_y) {
            return Vec::new();
        }

        let width = self.grid.width();
        let start_idx = start_y as usize * width + start_x as usize;
        let goal_idx = goal_y as usize * width + goal_x as usize;

        let mut distance = vec![u32::MAX; width * self.grid.height()];
        let mut previous: Vec<Option<usize>> = vec![None; distance.len()];
        let mut frontier: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();

        distance[start_idx] = 0;
        frontier.push(Reverse((0, start_idx)));

        while let Some(Reverse((dist, idx))) = frontier.pop() {
            // Goal settled, or the whole remaining frontier is out of range.
            if idx == goal_idx || dist > max_distance {
                break;
            }
            if dist > distance[idx] {
                continue; // Stale queue entry.
            }

            let x = (idx % width) as i32;
            let y = (idx / width) as i32;
            for (dx, dy) in [(0, -1), (1, 0), (0, 1), (-1, 0)] {
                let (nx, ny) = (x + dx, y + dy);
                if !self.grid.is_walkable(nx, ny) {
                    continue;
                }
                let next_idx = ny as usize * width + nx as usize;
                let next_dist = dist + 1;
                if next_dist < distance[next_idx] {
                    distance[next_idx] = next_dist;
                    previous[next_idx] = Some(idx);
                    frontier.push(Reverse((next_dist, next_idx)));
                }
            }
        }

        // Covers both no-route (still u32::MAX) and routes past the bound
        // whose predecessor links were already written when the cutoff hit.
        if distance[goal_idx] > max_distance {
            return Vec::new();
        }

        // Walk predecessor links back from the goal, then flip.
        let mut path = Vec::new();
        let mut current = goal_idx;
        while current != start_idx {
            let x = (current % width) as i32;
            let y = (current / width) as i32;
            path.push(self.tile_center(x, y));
            match previous[current] {
                Some(prev) => current = prev,
                None => break,
            }
        }
        path.reverse();
        path
    }
}
