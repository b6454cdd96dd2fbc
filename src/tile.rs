use serde::{Deserialize, Serialize};

use crate::country::CountryId;
use crate::grid::TilePos;
use crate::terrain::{TerrainKind, MAX_ELEVATION};

pub const INITIAL_DEVELOPMENT: f64 = 0.1;
pub const DEVELOPMENT_STEP: f64 = 0.05;
pub const DEVELOPMENT_CAP: f64 = 4.0;
pub const RUIN_MULTIPLIER: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Building {
    Developed0,
    Developed1,
    Developed2,
    Developed3,
    /// Marks a ruin tile; drives the prosperity multiplier.
    Ruins0,
    Ruins1,
    Ruins2,
    Dock,
}

impl Building {
    pub fn sprite_id(self) -> &'static str {
        match self {
            Building::Developed0 => "developed0",
            Building::Developed1 => "developed1",
            Building::Developed2 => "developed2",
            Building::Developed3 => "developed3",
            Building::Ruins0 => "ruins0",
            Building::Ruins1 => "ruins1",
            Building::Ruins2 => "ruins2",
            Building::Dock => "dock",
        }
    }
}

/// Sprite priority for renderers, highest first. A capital outranks all of them.
pub const SPRITE_PRIORITY: [Building; 8] = [
    Building::Ruins2,
    Building::Ruins1,
    Building::Ruins0,
    Building::Developed3,
    Building::Developed2,
    Building::Developed1,
    Building::Developed0,
    Building::Dock,
];

pub const CAPITAL_SPRITE: &str = "capital";

/// Inputs of the owned-tile prosperity formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnedContext {
    pub distance_to_capital: f64,
    pub owned_neighbours: usize,
}

#[derive(Debug, Clone)]
pub struct Tile {
    pos: TilePos,
    elevation: f64,
    terrain: TerrainKind,
    development: f64,
    buildings: Vec<Building>,
    pub(crate) owner: Option<CountryId>,
    pub(crate) prosperity: f64,
}

impl Tile {
    pub fn new(pos: TilePos, elevation: f64) -> Self {
        let elevation = elevation.clamp(0.0, MAX_ELEVATION);
        let terrain = TerrainKind::from_elevation(elevation);
        let mut tile = Self {
            pos,
            elevation,
            terrain,
            development: INITIAL_DEVELOPMENT,
            buildings: Vec::new(),
            owner: None,
            prosperity: 0.0,
        };
        tile.prosperity = tile.prosperity_with(None);
        tile
    }

    pub fn pos(&self) -> TilePos {
        self.pos
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    pub fn development(&self) -> f64 {
        self.development
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn owner(&self) -> Option<CountryId> {
        self.owner
    }

    pub fn prosperity(&self) -> f64 {
        self.prosperity
    }

    pub fn is_traversable(&self) -> bool {
        self.terrain.is_traversable()
    }

    pub fn is_unclaimed(&self) -> bool {
        self.owner.is_none()
    }

    pub fn is_ruin(&self) -> bool {
        self.has_building(Building::Ruins0)
    }

    pub fn has_building(&self, building: Building) -> bool {
        self.buildings.contains(&building)
    }

    /// Appends `building` unless it is already present.
    pub fn add_building(&mut self, building: Building) -> bool {
        if self.has_building(building) {
            return false;
        }
        self.buildings.push(building);
        true
    }

    pub(crate) fn set_development(&mut self, development: f64) {
        self.development = development.max(0.0);
    }

    /// Sets elevation and re-derives terrain, keeping development and buildings.
    pub(crate) fn set_elevation(&mut self, elevation: f64) {
        self.elevation = elevation.clamp(0.0, MAX_ELEVATION);
        self.terrain = TerrainKind::from_elevation(self.elevation);
    }

    /// Overrides terrain and elevation, clearing development and buildings.
    pub(crate) fn paint(&mut self, terrain: TerrainKind, elevation: f64) {
        self.elevation = elevation.clamp(0.0, MAX_ELEVATION);
        self.terrain = terrain;
        self.buildings.clear();
        self.development = INITIAL_DEVELOPMENT;
    }

    /// One development increment plus the tier tags it unlocks.
    pub(crate) fn develop(&mut self) {
        self.development += DEVELOPMENT_STEP;
        let development = self.development;

        if self.is_ruin() {
            if development >= 4.0 {
                self.add_building(Building::Ruins2);
            }
            if development > 3.0 {
                self.add_building(Building::Ruins1);
            }
        } else {
            if development > 4.0 {
                self.add_building(Building::Developed3);
            }
            if development > 3.0 {
                self.add_building(Building::Developed2);
            }
            if development > 2.0 {
                self.add_building(Building::Developed1);
            }
            if development > 1.0 {
                self.add_building(Building::Developed0);
            }
        }
    }

    /// Prosperity under the given ownership, without storing it.
    pub fn prosperity_with(&self, owned: Option<OwnedContext>) -> f64 {
        let factor = self.terrain.prosperity_factor();
        let base = match owned {
            Some(ctx) => {
                (factor * self.development) / 5.0 - ctx.distance_to_capital / 25.0
                    + ctx.owned_neighbours as f64 / 100.0
            }
            None => factor * self.development,
        };
        if self.is_ruin() {
            base * RUIN_MULTIPLIER
        } else {
            base
        }
    }

    /// Highest-priority sprite for this tile, if any.
    pub fn sprite(&self, is_capital: bool) -> Option<&'static str> {
        if is_capital {
            return Some(CAPITAL_SPRITE);
        }
        SPRITE_PRIORITY
            .iter()
            .find(|building| self.has_building(**building))
            .map(|building| building.sprite_id())
    }
}
