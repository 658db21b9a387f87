//! Maze Generation
//!
//! Produces a solvable dungeon layout from (width, height, seed, tuning).
//! The primary strategy is randomized Prim's growth over the odd-coordinate
//! cell lattice, followed by post-processing that deliberately breaks the
//! perfect-maze property to make the layout playable:
//!
//! 1. frontier-wall carve (iterative, no recursion) -> spanning tree
//! 2. rectangular rooms, spread across a 3x3 sector partition, each joined
//!    to the corridor network by a carved connector
//! 3. optional probabilistic corridor widening (axis-aligned only)
//! 4. entrance/exit placement
//!
//! Every post-processing step only adds passage, so reachability established
//! by the carve is never lost. Degenerate results (too little passage) are
//! retried and finally regenerated with a fallback strategy; generation never
//! fails outward.
//!
//! The generator owns a seeded RNG, making output a pure function of
//! (dimensions, seed, config).

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::grid::{Grid, Tile};

/// How the entrance and exit cells are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntrancePolicy {
    /// Entrance anchored in the top-left quadrant, exit in the bottom-right,
    /// with an explicit corridor carved between them through the grid
    /// midpoint. Solvable regardless of maze topology, and deterministic
    /// for a given grid size.
    FixedQuadrants,
    /// Scan the outer boundary ring for cells adjacent to passage and draw
    /// entrance/exit from opposite spatial halves of the candidates.
    PerimeterScan,
}

/// Tuning parameters for generation. All the knobs the layout algorithms
/// read live here rather than as hard-coded literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Smallest playable dimension; requests below this are padded up.
    pub min_size: usize,
    /// Rooms to carve into the maze.
    pub room_count: usize,
    /// Room edge length range, inclusive.
    pub room_min: usize,
    pub room_max: usize,
    /// Target corridor width in tiles; widths above 1 enable widening.
    pub corridor_width: usize,
    /// Chance that widening converts a given wall next to a passage.
    pub widen_probability: f64,
    /// Passage ratio below which a generated grid counts as degenerate.
    pub sparsity_threshold: f32,
    /// Degenerate results are regenerated at most this many times before
    /// the fallback strategy takes over.
    pub max_attempts: u32,
    pub entrance_policy: EntrancePolicy,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            min_size: 15,
            room_count: 3,
            room_min: 3,
            room_max: 5,
            corridor_width: 1,
            widen_probability: 0.7,
            sparsity_threshold: 0.3,
            max_attempts: 3,
            entrance_policy: EntrancePolicy::FixedQuadrants,
        }
    }
}

/// A layout-carving algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarveStrategy {
    /// Randomized Prim's maze plus rooms and optional widening.
    PrimMaze,
    /// Open floor with scattered wall clusters. Coarse but never sparse;
    /// used as the fallback when maze generation keeps coming out
    /// degenerate.
    OpenArena,
}

/// Wall-cluster density for [`CarveStrategy::OpenArena`] (clusters per cell).
const ARENA_CLUSTER_DENSITY: f64 = 0.1;
/// Chance each cell of an arena cluster actually becomes a wall.
const ARENA_CLUSTER_FILL: f64 = 0.7;

/// Maze/dungeon generator with an explicit, seeded RNG.
pub struct MazeGenerator {
    config: MazeConfig,
    rng: StdRng,
}

impl MazeGenerator {
    pub fn new(config: MazeConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Generate a solvable layout. Requested dimensions are padded up to the
    /// configured minimum and forced odd; the returned grid carries the
    /// actual dimensions.
    pub fn generate(&mut self, width: usize, height: usize) -> Grid {
        self.generate_with_fallback(
            width,
            height,
            CarveStrategy::PrimMaze,
            CarveStrategy::OpenArena,
        )
    }

    /// Generate with an explicit primary/fallback strategy pair.
    ///
    /// The primary strategy runs up to `max_attempts` times; each result
    /// whose passage ratio is below the sparsity threshold is discarded.
    /// If every attempt is degenerate the fallback strategy's result is
    /// returned unconditionally.
    pub fn generate_with_fallback(
        &mut self,
        width: usize,
        height: usize,
        primary: CarveStrategy,
        fallback: CarveStrategy,
    ) -> Grid {
        let (w, h) = normalize_dimensions(width, height, self.config.min_size);
        info!("generating {w}x{h} layout (requested {width}x{height})");

        for attempt in 1..=self.config.max_attempts {
            let grid = self.generate_once(w, h, primary);
            let ratio = grid.passage_ratio();
            if ratio >= self.config.sparsity_threshold {
                debug!("attempt {attempt}: passage ratio {ratio:.2}, accepted");
                return grid;
            }
            warn!(
                "attempt {attempt}: passage ratio {ratio:.2} below threshold {:.2}, regenerating",
                self.config.sparsity_threshold
            );
        }

        warn!("primary strategy exhausted {} attempts, using fallback", self.config.max_attempts);
        self.generate_once(w, h, fallback)
    }

    /// One full carve + entrance/exit pass with the given strategy.
    fn generate_once(&mut self, width: usize, height: usize, strategy: CarveStrategy) -> Grid {
        let mut grid = match strategy {
            CarveStrategy::PrimMaze => {
                let mut grid = Grid::filled(width, height, Tile::Wall);
                self.carve_prim(&mut grid);
                self.carve_rooms(&mut grid);
                if self.config.corridor_width > 1 {
                    self.widen_corridors(&mut grid);
                }
                grid
            }
            CarveStrategy::OpenArena => self.carve_arena(width, height),
        };
        self.place_entrance_exit(&mut grid);
        grid
    }

    // =========================================================================
    // Prim's frontier carve
    // =========================================================================

    /// Carve a spanning tree over the odd-coordinate cell lattice.
    ///
    /// The frontier holds `(cell_x, cell_y, wall_x, wall_y)` entries: the
    /// unvisited cell on the far side of a wall, plus the wall between it
    /// and the maze. Picking uniformly from the frontier and carving only
    /// when the far cell is still a wall yields a perfect maze.
    fn carve_prim(&mut self, grid: &mut Grid) {
        const DIRECTIONS: [(i32, i32); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

        let start_x = self.random_odd(grid.width());
        let start_y = self.random_odd(grid.height());
        grid.set(start_x, start_y, Tile::Floor);
        debug!("prim carve from cell ({start_x}, {start_y})");

        let mut frontier: Vec<(i32, i32, i32, i32)> = Vec::new();
        for (dx, dy) in DIRECTIONS {
            let (nx, ny) = (start_x + dx, start_y + dy);
            if grid.in_bounds(nx, ny) {
                frontier.push((nx, ny, start_x + dx / 2, start_y + dy / 2));
            }
        }

        while !frontier.is_empty() {
            let pick = self.rng.gen_range(0..frontier.len());
            let (cell_x, cell_y, wall_x, wall_y) = frontier.swap_remove(pick);

            // Already part of the maze: discard the wall, no carve.
            if grid.get(cell_x, cell_y) != Tile::Wall {
                continue;
            }

            grid.set(cell_x, cell_y, Tile::Floor);
            grid.set(wall_x, wall_y, Tile::Floor);

            for (dx, dy) in DIRECTIONS {
                let (nx, ny) = (cell_x + dx, cell_y + dy);
                if grid.in_bounds(nx, ny) && grid.get(nx, ny) == Tile::Wall {
                    frontier.push((nx, ny, cell_x + dx / 2, cell_y + dy / 2));
                }
            }
        }
    }

    // =========================================================================
    // Rooms
    // =========================================================================

    /// Carve up to `room_count` rectangular rooms, one per 3x3 sector, each
    /// connected outward to the existing corridor network. Connections only
    /// add passage, so the maze stays connected.
    fn carve_rooms(&mut self, grid: &mut Grid) {
        let width = grid.width() as i32;
        let height = grid.height() as i32;
        let sector_w = width / 3;
        let sector_h = height / 3;
        let room_min = self.config.room_min as i32;
        let room_max = self.config.room_max as i32;

        let mut rooms_added = 0usize;
        'sectors: for sector_y in 0..3i32 {
            for sector_x in 0..3i32 {
                if rooms_added >= self.config.room_count {
                    break 'sectors;
                }

                // Sector interior, keeping clear of the grid border.
                let min_x = sector_x * sector_w + 2;
                let min_y = sector_y * sector_h + 2;
                let max_x = ((sector_x + 1) * sector_w - 2).min(width - 2);
                let max_y = ((sector_y + 1) * sector_h - 2).min(height - 2);
                if max_x - min_x < room_min + 2 || max_y - min_y < room_min + 2 {
                    continue;
                }

                let room_w = self.rng.gen_range(room_min..=room_max).min(max_x - min_x);
                let room_h = self.rng.gen_range(room_min..=room_max).min(max_y - min_y);
                let room_x = self.rng.gen_range(min_x..=max_x - room_w);
                let room_y = self.rng.gen_range(min_y..=max_y - room_h);

                for y in room_y..room_y + room_h {
                    for x in room_x..room_x + room_w {
                        grid.set(x, y, Tile::Floor);
                    }
                }

                self.connect_room(grid, room_x, room_y, room_w, room_h);
                rooms_added += 1;
                debug!("room {rooms_added} at ({room_x}, {room_y}) size {room_w}x{room_h}");
            }
        }
        debug!("added {rooms_added} rooms");
    }

    /// Extend a 1-wide corridor from a random edge of the room until it
    /// meets existing passage or reaches the grid boundary.
    fn connect_room(&mut self, grid: &mut Grid, room_x: i32, room_y: i32, room_w: i32, room_h: i32) {
        let width = grid.width() as i32;
        let height = grid.height() as i32;

        match self.rng.gen_range(0..4u8) {
            0 => {
                // Up
                let x = self.rng.gen_range(room_x..room_x + room_w);
                for y in (1..room_y).rev() {
                    grid.set(x, y, Tile::Floor);
                    if grid.is_walkable(x, y - 1) {
                        break;
                    }
                }
            }
            1 => {
                // Right
                let y = self.rng.gen_range(room_y..room_y + room_h);
                for x in room_x + room_w..width - 1 {
                    grid.set(x, y, Tile::Floor);
                    if grid.is_walkable(x + 1, y) {
                        break;
                    }
                }
            }
            2 => {
                // Down
                let x = self.rng.gen_range(room_x..room_x + room_w);
                for y in room_y + room_h..height - 1 {
                    grid.set(x, y, Tile::Floor);
                    if grid.is_walkable(x, y + 1) {
                        break;
                    }
                }
            }
            _ => {
                // Left
                let y = self.rng.gen_range(room_y..room_y + room_h);
                for x in (1..room_x).rev() {
                    grid.set(x, y, Tile::Floor);
                    if grid.is_walkable(x - 1, y) {
                        break;
                    }
                }
            }
        }
    }

    // =========================================================================
    // Corridor widening
    // =========================================================================

    /// Probabilistically convert walls adjacent to passage into passage,
    /// axis-aligned neighbors only, to keep the layout structured. Widening
    /// never removes passage and the border ring stays walled.
    fn widen_corridors(&mut self, grid: &mut Grid) {
        let width = grid.width() as i32;
        let height = grid.height() as i32;

        // Snapshot the passages first so widening doesn't cascade.
        let passages: Vec<(i32, i32)> = grid
            .iter()
            .filter(|(_, _, t)| t.is_walkable())
            .map(|(x, y, _)| (x as i32, y as i32))
            .collect();

        for (x, y) in passages {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let (nx, ny) = (x + dx, y + dy);
                if nx <= 0 || ny <= 0 || nx >= width - 1 || ny >= height - 1 {
                    continue;
                }
                if grid.get(nx, ny) == Tile::Wall
                    && self.rng.gen_bool(self.config.widen_probability)
                {
                    grid.set(nx, ny, Tile::Floor);
                }
            }
        }
    }

    // =========================================================================
    // Fallback arena
    // =========================================================================

    /// Open floor with a walled border and scattered wall clusters.
    fn carve_arena(&mut self, width: usize, height: usize) -> Grid {
        let mut grid = Grid::filled(width, height, Tile::Floor);
        let w = width as i32;
        let h = height as i32;

        for x in 0..w {
            grid.set(x, 0, Tile::Wall);
            grid.set(x, h - 1, Tile::Wall);
        }
        for y in 0..h {
            grid.set(0, y, Tile::Wall);
            grid.set(w - 1, y, Tile::Wall);
        }

        let clusters = ((width * height) as f64 * ARENA_CLUSTER_DENSITY) as usize;
        for _ in 0..clusters {
            let cx = self.rng.gen_range(2..w - 2);
            let cy = self.rng.gen_range(2..h - 2);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if self.rng.gen_bool(ARENA_CLUSTER_FILL) {
                        let (x, y) = (cx + dx, cy + dy);
                        if x > 0 && y > 0 && x < w - 1 && y < h - 1 {
                            grid.set(x, y, Tile::Wall);
                        }
                    }
                }
            }
        }
        grid
    }

    // =========================================================================
    // Entrance / exit placement
    // =========================================================================

    fn place_entrance_exit(&mut self, grid: &mut Grid) {
        match self.config.entrance_policy {
            EntrancePolicy::FixedQuadrants => place_fixed_quadrants(grid),
            EntrancePolicy::PerimeterScan => self.place_perimeter_scan(grid),
        }
    }

    /// Boundary-ring scan: find border cells adjacent to passage, split the
    /// candidates into two spatial halves to keep entrance and exit apart,
    /// and draw one from each pool.
    fn place_perimeter_scan(&mut self, grid: &mut Grid) {
        let width = grid.width() as i32;
        let height = grid.height() as i32;

        let mut candidates: Vec<(i32, i32)> = Vec::new();
        for x in 1..width - 1 {
            if grid.is_walkable(x, 1) {
                candidates.push((x, 0));
            }
            if grid.is_walkable(x, height - 2) {
                candidates.push((x, height - 1));
            }
        }
        for y in 1..height - 1 {
            if grid.is_walkable(1, y) {
                candidates.push((0, y));
            }
            if grid.is_walkable(width - 2, y) {
                candidates.push((width - 1, y));
            }
        }

        // Top/left half feeds the entrance pool, bottom/right the exit pool.
        let mut entrance_pool: Vec<(i32, i32)> = Vec::new();
        let mut exit_pool: Vec<(i32, i32)> = Vec::new();
        for &(x, y) in &candidates {
            if x < width / 2 || y < height / 2 {
                entrance_pool.push((x, y));
            } else {
                exit_pool.push((x, y));
            }
        }

        // One pool came up empty: split the other between the two. A lone
        // candidate cannot feed both pools, so that case falls through.
        if entrance_pool.is_empty() && exit_pool.len() >= 2 {
            let middle = exit_pool.len() / 2;
            entrance_pool = exit_pool.drain(..middle).collect();
        } else if exit_pool.is_empty() && entrance_pool.len() >= 2 {
            let middle = entrance_pool.len() / 2;
            exit_pool = entrance_pool.drain(middle..).collect();
        }

        // Too few candidates to fill both pools (sealed grid, or a single
        // perimeter opening): force an opening for each empty pool.
        if entrance_pool.is_empty() {
            warn!("no entrance candidates on the perimeter, carving an opening");
            let x = self.random_odd(grid.width());
            grid.set(x, 0, Tile::Floor);
            grid.set(x, 1, Tile::Floor);
            entrance_pool.push((x, 0));
        }
        if exit_pool.is_empty() {
            warn!("no exit candidates on the perimeter, carving an opening");
            let x = self.random_odd(grid.width());
            grid.set(x, height - 1, Tile::Floor);
            grid.set(x, height - 2, Tile::Floor);
            exit_pool.push((x, height - 1));
        }

        let entrance = entrance_pool[self.rng.gen_range(0..entrance_pool.len())];
        let exit = exit_pool[self.rng.gen_range(0..exit_pool.len())];
        grid.set(entrance.0, entrance.1, Tile::Entrance);
        grid.set(exit.0, exit.1, Tile::Exit);
        debug!("entrance at {entrance:?}, exit at {exit:?}");
    }

    /// Uniformly random odd coordinate in `1..=extent-2`.
    fn random_odd(&mut self, extent: usize) -> i32 {
        let cells = (extent as i32 - 1) / 2;
        1 + 2 * self.rng.gen_range(0..cells)
    }
}

/// Fixed-quadrant placement: entrance and exit at opposite quadrant anchors,
/// joined by a corridor carved through the grid's vertical midline. Needs no
/// randomness, so positions are identical for every seed at a given size.
fn place_fixed_quadrants(grid: &mut Grid) {
    let width = grid.width() as i32;
    let height = grid.height() as i32;

    let entrance = (force_odd(width / 4), force_odd(height / 4));
    let exit = (force_odd(3 * width / 4), force_odd(3 * height / 4));
    let mid_x = force_odd(width / 2);

    // L-shaped route through the midpoint: across, down the midline, across.
    for x in entrance.0.min(mid_x)..=entrance.0.max(mid_x) {
        grid.set(x, entrance.1, Tile::Floor);
    }
    for y in entrance.1.min(exit.1)..=entrance.1.max(exit.1) {
        grid.set(mid_x, y, Tile::Floor);
    }
    for x in mid_x.min(exit.0)..=mid_x.max(exit.0) {
        grid.set(x, exit.1, Tile::Floor);
    }

    grid.set(entrance.0, entrance.1, Tile::Entrance);
    grid.set(exit.0, exit.1, Tile::Exit);
    debug!("entrance at {entrance:?}, exit at {exit:?} (fixed quadrants)");
}

/// Pad requested dimensions up to the minimum playable size and force them
/// odd so the cell/wall lattice is well-defined.
fn normalize_dimensions(width: usize, height: usize, min_size: usize) -> (usize, usize) {
    let mut w = width.max(min_size);
    let mut h = height.max(min_size);
    if w % 2 == 0 {
        w += 1;
    }
    if h % 2 == 0 {
        h += 1;
    }
    (w, h)
}

/// Nudge an even coordinate onto the odd lattice, staying off the border.
fn force_odd(v: i32) -> i32 {
    let v = if v % 2 == 0 { v + 1 } else { v };
    v.max(1)
}
