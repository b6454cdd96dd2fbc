//! Tile lattice: wraps horizontally, clamps vertically.

use serde::{Deserialize, Serialize};

use crate::tile::Tile;

/// Row-major index of a tile in its grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    neighbours: Vec<Vec<TileId>>,
}

impl Grid {
    /// Builds a grid with every tile at `elevation`. Both dimensions are raised to at least 1.
    pub fn new(width: u32, height: u32, elevation: f64) -> Self {
        Self::from_fn(width, height, |pos| Tile::new(pos, elevation))
    }

    pub fn from_fn(width: u32, height: u32, mut make: impl FnMut(TilePos) -> Tile) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                tiles.push(make(TilePos { x, y }));
            }
        }
        let neighbours = (0..width * height)
            .map(|raw| adjacency(width, height, raw))
            .collect();
        Self {
            width,
            height,
            tiles,
            neighbours,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn pos_to_id(&self, pos: TilePos) -> Option<TileId> {
        if pos.x < self.width && pos.y < self.height {
            Some(TileId(pos.y * self.width + pos.x))
        } else {
            None
        }
    }

    pub fn id_to_pos(&self, id: TileId) -> Option<TilePos> {
        self.tiles.get(id.index()).map(Tile::pos)
    }

    /// Resolves signed coordinates: x wraps around, y outside the rows yields `None`.
    pub fn wrapped(&self, x: i64, y: i64) -> Option<TileId> {
        if y < 0 || y >= self.height as i64 {
            return None;
        }
        let x = x.rem_euclid(self.width as i64) as u32;
        self.pos_to_id(TilePos { x, y: y as u32 })
    }

    pub fn ids(&self) -> impl Iterator<Item = TileId> + '_ {
        (0..self.tiles.len() as u32).map(TileId)
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.index()]
    }

    pub(crate) fn tile_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id.index()]
    }

    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| (TileId(index as u32), tile))
    }

    /// Top, bottom, left, right. On a one-column grid left and right are the tile itself.
    pub fn neighbours(&self, id: TileId) -> &[TileId] {
        &self.neighbours[id.index()]
    }

    /// The shorter of straight-line and Manhattan distance, both wrap-aware in x.
    pub fn distance(&self, a: TileId, b: TileId) -> f64 {
        let a = self.tile(a).pos();
        let b = self.tile(b).pos();
        let raw_dx = a.x.abs_diff(b.x);
        let dx = raw_dx.min(self.width - raw_dx) as f64;
        let dy = a.y.abs_diff(b.y) as f64;
        let diagonal = (dx * dx + dy * dy).sqrt();
        diagonal.min(dx + dy)
    }
}

fn adjacency(width: u32, height: u32, raw: u32) -> Vec<TileId> {
    let x = raw % width;
    let y = raw / width;
    let at = |x: u32, y: u32| TileId(y * width + x);
    let mut neighbours = Vec::with_capacity(4);
    if y > 0 {
        neighbours.push(at(x, y - 1));
    }
    if y + 1 < height {
        neighbours.push(at(x, y + 1));
    }
    neighbours.push(at((x + width - 1) % width, y));
    neighbours.push(at((x + 1) % width, y));
    neighbours
}
