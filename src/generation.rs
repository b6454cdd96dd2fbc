//! Staged world generation. Each call to [`Generator::step`] runs one stage so
//! a cooperative host can yield between them.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::country::Country;
use crate::grid::TileId;
use crate::rng::RandomSource;
use crate::tile::Building;
use crate::world::World;

pub const COUNTRY_NAMES: [&str; 14] = [
    "Gloypland",
    "Frapturnia",
    "Colwslia",
    "Volyvia",
    "Acturt",
    "Boystown",
    "Dunemarch",
    "Ardentia",
    "Hillside",
    "Fropland",
    "Charnia",
    "Upswart",
    "Gungellow",
    "StinkySmellow",
];

pub const COUNTRY_COLORS: [&str; 20] = [
    "#000000", "#FFFFFF", "#2D3748", "#63C69C", "#C53030", "#FFA500", "#2F855A", "#B0E57C",
    "#D69E2E", "#F6E05E", "#FF6347", "#FF8C00", "#4FD1C5", "#3182CE", "#FFA500", "#FF69B4",
    "#68D391", "#6B46C1", "#9F7AEA", "#A0522D",
];

const RAISE_JITTER: f64 = 10.0;
const SMOOTH_JITTER: f64 = 0.1;
const RUIN_DEVELOPMENT: f64 = 2.0;

fn default_smoothing_passes() -> u32 {
    5
}

fn default_spacing() -> f64 {
    25.0
}

fn default_elevation_minimum() -> f64 {
    -3.0
}

fn default_elevation_variance() -> f64 {
    5.0
}

fn default_years_per_pass() -> i64 {
    50_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_smoothing_passes")]
    pub smoothing_passes: u32,
    #[serde(default = "default_spacing")]
    pub country_spacing: f64,
    #[serde(default = "default_spacing")]
    pub ruin_spacing: f64,
    #[serde(default = "default_elevation_minimum")]
    pub elevation_minimum: f64,
    #[serde(default = "default_elevation_variance")]
    pub elevation_variance: f64,
    #[serde(default = "default_years_per_pass")]
    pub years_per_pass: i64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            smoothing_passes: default_smoothing_passes(),
            country_spacing: default_spacing(),
            ruin_spacing: default_spacing(),
            elevation_minimum: default_elevation_minimum(),
            elevation_variance: default_elevation_variance(),
            years_per_pass: default_years_per_pass(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Raise,
    Smooth { completed: u32 },
    SeedCountries,
    SeedRuins,
    Done,
}

#[derive(Debug, Clone)]
pub struct Generator {
    config: GenerationConfig,
    stage: Stage,
}

impl Generator {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            stage: Stage::Raise,
        }
    }

    /// The stage the next call to [`Generator::step`] will run.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Runs the pending stage and returns the one after it. A finished generator stays `Done`.
    pub fn step<R: RandomSource + ?Sized>(&mut self, world: &mut World, rng: &mut R) -> Stage {
        self.stage = match self.stage {
            Stage::Raise => {
                raise(world, &self.config, rng);
                info!(
                    width = world.grid().width(),
                    height = world.grid().height(),
                    "raised terrain"
                );
                self.after_smoothing(0)
            }
            Stage::Smooth { completed } => {
                smooth(world, rng);
                world.calendar_mut().advance_years(self.config.years_per_pass);
                info!(pass = completed + 1, date = %world.calendar(), "smoothed terrain");
                self.after_smoothing(completed + 1)
            }
            Stage::SeedCountries => {
                let founded = seed_countries(world, self.config.country_spacing, rng);
                info!(countries = founded, "seeded countries");
                Stage::SeedRuins
            }
            Stage::SeedRuins => {
                let ruins = seed_ruins(world, self.config.ruin_spacing, rng);
                info!(ruins, "seeded ruins");
                Stage::Done
            }
            Stage::Done => Stage::Done,
        };
        self.stage
    }

    pub fn run_to_completion<R: RandomSource + ?Sized>(&mut self, world: &mut World, rng: &mut R) {
        while !self.is_done() {
            self.step(world, rng);
        }
    }

    fn after_smoothing(&self, completed: u32) -> Stage {
        if completed < self.config.smoothing_passes {
            Stage::Smooth { completed }
        } else {
            Stage::SeedCountries
        }
    }
}

/// Parabolic bias across the rows: low at the poles, highest mid-map.
pub fn row_bias(y: u32, height: u32, minimum: f64, variance: f64) -> f64 {
    let r = y as f64 / height as f64;
    -(4.0 * variance) * r * r + (4.0 * variance) * r + minimum
}

pub fn raise<R: RandomSource + ?Sized>(world: &mut World, config: &GenerationConfig, rng: &mut R) {
    let height = world.grid().height();
    let ids: Vec<TileId> = world.grid().ids().collect();
    for id in ids {
        let y = world.tile(id).pos().y;
        let bias = row_bias(y, height, config.elevation_minimum, config.elevation_variance);
        let elevation = bias + rng.range(-RAISE_JITTER, RAISE_JITTER);
        world.set_elevation(id, elevation);
    }
}

/// One in-place averaging pass; later tiles see the already-smoothed values of earlier ones.
pub fn smooth<R: RandomSource + ?Sized>(world: &mut World, rng: &mut R) {
    let ids: Vec<TileId> = world.grid().ids().collect();
    for id in ids {
        let own = world.tile(id).elevation() + rng.range(-SMOOTH_JITTER, SMOOTH_JITTER);
        let neighbours = world.grid().neighbours(id);
        let sum: f64 = neighbours
            .iter()
            .map(|neighbour| world.tile(*neighbour).elevation())
            .sum();
        let mut elevation = (own + sum) / (neighbours.len() as f64 + 1.0);
        if elevation < 2.0 {
            elevation *= 0.95;
        } else if elevation > 2.0 {
            elevation *= 1.05;
        }
        world.set_elevation(id, elevation);
    }
}

/// Fisher-Yates over `items`, one draw per swap.
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

fn free_land(world: &World) -> Vec<TileId> {
    world
        .grid()
        .tiles()
        .filter(|(_, tile)| tile.is_traversable() && tile.is_unclaimed())
        .map(|(id, _)| id)
        .collect()
}

/// Founds countries on free land until no candidate remains. Returns how many were founded.
///
/// Each capital drops itself and every candidate within `spacing` of it.
pub fn seed_countries<R: RandomSource + ?Sized>(
    world: &mut World,
    spacing: f64,
    rng: &mut R,
) -> usize {
    let mut names = COUNTRY_NAMES;
    let mut colors = COUNTRY_COLORS;
    shuffle(&mut names, rng);
    shuffle(&mut colors, rng);

    let mut candidates = free_land(world);
    let mut founded = 0;
    while !candidates.is_empty() {
        let name = names[founded % names.len()];
        let color = colors[founded % colors.len()];
        let country = Country::random(name, color, rng);
        let capital = candidates[rng.index(candidates.len())];
        let id = world.found_country(country, capital);
        candidates.retain(|tile| *tile != capital && world.distance_to_capital(id, *tile) > spacing);
        founded += 1;
    }
    founded
}

/// Places ruins on free land, each more than `spacing` from every earlier ruin.
pub fn seed_ruins<R: RandomSource + ?Sized>(world: &mut World, spacing: f64, rng: &mut R) -> usize {
    let mut candidates = free_land(world);
    let mut placed = 0;
    while !candidates.is_empty() {
        let ruin = candidates[rng.index(candidates.len())];
        world.add_building(ruin, Building::Ruins0);
        world.set_development(ruin, RUIN_DEVELOPMENT);
        candidates.retain(|tile| *tile != ruin && world.grid().distance(ruin, *tile) > spacing);
        placed += 1;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::grid::Grid;
    use crate::rng::ScriptedRandom;
    use crate::terrain::TerrainKind;

    #[test]
    fn row_bias_peaks_mid_map() {
        assert_eq!(row_bias(0, 64, -3.0, 5.0), -3.0);
        assert!((row_bias(32, 64, -3.0, 5.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn stages_advance_in_order() {
        let mut world = World::new(8, 4, Calendar::starting_at(-100));
        let config = GenerationConfig {
            smoothing_passes: 2,
            years_per_pass: 50,
            ..GenerationConfig::default()
        };
        let mut generator = Generator::new(config);
        let mut rng = ScriptedRandom::new(Vec::<f64>::new());

        assert_eq!(generator.step(&mut world, &mut rng), Stage::Smooth { completed: 0 });
        assert_eq!(generator.step(&mut world, &mut rng), Stage::Smooth { completed: 1 });
        assert_eq!(generator.step(&mut world, &mut rng), Stage::SeedCountries);
        assert_eq!(world.calendar().year(), 0);
        assert_eq!(generator.step(&mut world, &mut rng), Stage::SeedRuins);
        assert_eq!(generator.step(&mut world, &mut rng), Stage::Done);
        assert_eq!(generator.step(&mut world, &mut rng), Stage::Done);
    }

    #[test]
    fn zero_passes_skip_smoothing() {
        let config = GenerationConfig {
            smoothing_passes: 0,
            ..GenerationConfig::default()
        };
        let mut world = World::new(4, 4, Calendar::default());
        let mut generator = Generator::new(config);
        let mut rng = ScriptedRandom::new(Vec::<f64>::new());
        assert_eq!(generator.step(&mut world, &mut rng), Stage::SeedCountries);
    }

    #[test]
    fn raise_draws_once_per_tile() {
        let mut world = World::new(3, 2, Calendar::default());
        // 0.65 maps to +3 after the [-10, 10] range; row 0 bias is -3.
        let mut rng = ScriptedRandom::new(Vec::<f64>::new()).with_fallback(0.65);
        raise(&mut world, &GenerationConfig::default(), &mut rng);
        assert_eq!(rng.consumed(), 6);
        let top = world.tile(TileId::from_raw(0));
        assert!(top.elevation().abs() < 1e-9);
        assert_eq!(top.terrain(), TerrainKind::DeepWater);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut items = [1, 2, 3, 4, 5];
        let mut rng = ScriptedRandom::new([0.0, 0.9, 0.1, 0.5]);
        shuffle(&mut items, &mut rng);
        let mut sorted = items;
        sorted.sort();
        assert_eq!(sorted, [1, 2, 3, 4, 5]);
        assert_eq!(rng.consumed(), 4);
    }

    fn grass_strip(width: u32) -> World {
        World::from_grid(Grid::new(width, 1, 3.0), Calendar::default())
    }

    #[test]
    fn zero_country_spacing_still_terminates() {
        let mut world = grass_strip(3);
        let mut rng = ScriptedRandom::new(Vec::<f64>::new()).with_fallback(0.0);

        assert_eq!(seed_countries(&mut world, 0.0, &mut rng), 3);
        let capitals: Vec<_> = world
            .countries()
            .iter()
            .filter_map(|country| country.capital())
            .collect();
        assert_eq!(capitals.len(), 3);
        for (id, _) in world.grid().tiles() {
            assert!(capitals.contains(&id));
        }
    }

    #[test]
    fn zero_ruin_spacing_fills_free_land_once() {
        let mut world = grass_strip(4);
        let mut rng = ScriptedRandom::new(Vec::<f64>::new()).with_fallback(0.0);

        assert_eq!(seed_ruins(&mut world, 0.0, &mut rng), 4);
        assert!(world
            .grid()
            .tiles()
            .all(|(_, tile)| tile.has_building(Building::Ruins0)));
    }

    #[test]
    fn ruins_sit_further_apart_than_spacing() {
        let mut world = grass_strip(30);
        let mut rng = ScriptedRandom::new(Vec::<f64>::new()).with_fallback(0.0);
        let spacing = 2.0;

        let placed = seed_ruins(&mut world, spacing, &mut rng);
        let ruins: Vec<TileId> = world
            .grid()
            .tiles()
            .filter(|(_, tile)| tile.has_building(Building::Ruins0))
            .map(|(id, _)| id)
            .collect();

        // first-candidate picks land on x = 0, 3, 6, ..., 27
        assert_eq!(placed, 10);
        assert_eq!(ruins.len(), placed);
        for (i, a) in ruins.iter().enumerate() {
            for b in &ruins[i + 1..] {
                let distance = world.grid().distance(*a, *b);
                assert!(distance > spacing, "ruins {} and {} only {distance} apart", a.raw(), b.raw());
            }
        }
    }
}
