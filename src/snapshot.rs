//! Write-only JSON observations of the world for external viewers.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    country::CountryId,
    scoreboard::{self, CountryStatus, ScoreEntry},
    terrain::TerrainKind,
    tile::Building,
    world::World,
};

#[derive(Debug, Clone, Serialize)]
pub struct TileSnapshot {
    pub x: u32,
    pub y: u32,
    pub terrain: TerrainKind,
    pub elevation: f64,
    pub owner: Option<CountryId>,
    pub development: f64,
    pub buildings: Vec<Building>,
    pub sprite: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub tick: u64,
    pub date: String,
    pub width: u32,
    pub height: u32,
    pub standings: Vec<ScoreEntry>,
    pub countries: Vec<CountryStatus>,
    pub tiles: Vec<TileSnapshot>,
}

impl WorldSnapshot {
    pub fn capture(world: &World, tick: u64, scenario: &str) -> Self {
        let tiles = world
            .grid()
            .tiles()
            .map(|(id, tile)| {
                let is_capital = tile
                    .owner()
                    .map_or(false, |owner| world.country(owner).capital() == Some(id));
                TileSnapshot {
                    x: tile.pos().x,
                    y: tile.pos().y,
                    terrain: tile.terrain(),
                    elevation: tile.elevation(),
                    owner: tile.owner(),
                    development: tile.development(),
                    buildings: tile.buildings().to_vec(),
                    sprite: tile.sprite(is_capital),
                }
            })
            .collect();

        Self {
            scenario: scenario.to_string(),
            tick,
            date: world.calendar().to_string(),
            width: world.grid().width(),
            height: world.grid().height(),
            standings: scoreboard::standings(world.countries()),
            countries: scoreboard::statuses(world.countries()),
            tiles,
        }
    }
}

pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    /// Writes `<dir>/<scenario>/tick_NNNNNN.json` on every `interval`-th tick. An interval of 0 disables output.
    pub fn maybe_write(&self, world: &World, tick: u64, scenario: &str) -> Result<Option<PathBuf>> {
        if self.interval == 0 || tick % self.interval != 0 {
            return Ok(None);
        }

        let dir = self.dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("tick_{tick:06}.json"));
        let snapshot = WorldSnapshot::capture(world, tick, scenario);
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
