//! Level Grid
//!
//! A level is a row-major 2D array of tile codes. The integer codes are the
//! boundary format shared with the level loader, the renderer and the
//! pathfinder: `0=empty, 1=wall, 2=floor, 3=entrance, 4=exit`.

use serde::{Deserialize, Serialize};

/// One cell of the level grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tile {
    /// Unused cell, outside the playable area.
    Empty = 0,
    /// Blocking cell.
    Wall = 1,
    /// Walkable cell.
    Floor = 2,
    /// Walkable; exactly one per level.
    Entrance = 3,
    /// Walkable; exactly one per level.
    Exit = 4,
}

impl Tile {
    /// Can agents stand on and traverse this tile?
    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Floor | Tile::Entrance | Tile::Exit)
    }

    /// The wire/boundary integer code for this tile.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse a boundary code. Unknown codes are rejected, not mapped.
    pub fn from_code(code: u8) -> Option<Tile> {
        match code {
            0 => Some(Tile::Empty),
            1 => Some(Tile::Wall),
            2 => Some(Tile::Floor),
            3 => Some(Tile::Entrance),
            4 => Some(Tile::Exit),
            _ => None,
        }
    }
}

/// Row-major grid of tiles over a width x height domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// A grid with every cell set to `fill`.
    pub fn filled(width: usize, height: usize, fill: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![fill; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Tile at (x, y). Out-of-bounds reads as `Empty`, which is never
    /// walkable, so callers probing neighbors need no bounds dance.
    pub fn get(&self, x: i32, y: i32) -> Tile {
        if self.in_bounds(x, y) {
            self.tiles[y as usize * self.width + x as usize]
        } else {
            Tile::Empty
        }
    }

    /// Set the tile at (x, y). Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if self.in_bounds(x, y) {
            self.tiles[y as usize * self.width + x as usize] = tile;
        }
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_walkable()
    }

    /// Iterate over all `(x, y, tile)` triples in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &t)| (i % self.width, i / self.width, t))
    }

    /// How many cells hold the given tile?
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// First cell holding the given tile, row-major order.
    pub fn find(&self, tile: Tile) -> Option<(usize, usize)> {
        self.tiles
            .iter()
            .position(|&t| t == tile)
            .map(|i| (i % self.width, i / self.width))
    }

    /// Fraction of cells that are walkable. Used for the degenerate-layout
    /// check after generation.
    pub fn passage_ratio(&self) -> f32 {
        if self.tiles.is_empty() {
            return 0.0;
        }
        let walkable = self.tiles.iter().filter(|t| t.is_walkable()).count();
        walkable as f32 / self.tiles.len() as f32
    }

    /// Export the grid as flat boundary codes, row-major.
    pub fn to_codes(&self) -> Vec<u8> {
        self.tiles.iter().map(|t| t.code()).collect()
    }

    /// Import a grid from flat boundary codes. `None` if the length does not
    /// match the dimensions or any code is unknown.
    pub fn from_codes(codes: &[u8], width: usize, height: usize) -> Option<Self> {
        if codes.len() != width * height {
            return None;
        }
        let tiles = codes
            .iter()
            .map(|&c| Tile::from_code(c))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            width,
            height,
            tiles,
        })
    }
}
