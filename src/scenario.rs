use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    calendar::Calendar,
    engine::{EngineSettings, Speed},
    generation::{GenerationConfig, Generator},
    world::World,
};

fn default_ticks() -> u64 {
    3650
}

fn default_tick_interval_ms() -> u64 {
    Speed::default().millis()
}

fn default_start_year() -> i64 {
    -250_000
}

fn default_width() -> u32 {
    128
}

fn default_height() -> u32 {
    64
}

/// Distance to a capital counts the capital itself, so spacing under one tile excludes nothing.
const MIN_COUNTRY_SPACING: f64 = 1.0;

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("map must be at least 1x1, got {width}x{height}")]
    EmptyMap { width: u32, height: u32 },
    #[error("{field} must not be negative, got {value}")]
    NegativeSpacing { field: &'static str, value: f64 },
    #[error("{field} must be a finite number of at least {minimum}, got {value}")]
    UnusableSpacing {
        field: &'static str,
        value: f64,
        minimum: f64,
    },
    #[error("tick_interval_ms {0} is not on the speed menu (500, 200, 100, 50, 10)")]
    OffMenuInterval(u64),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub snapshot_interval_ticks: u64,
    #[serde(default = "default_start_year")]
    pub start_year: i64,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Reads, parses and validates a scenario file relative to the base dir.
    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario = Scenario::from_yaml(&data)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn from_yaml(data: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(data).context("Invalid scenario YAML")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.map.width == 0 || self.map.height == 0 {
            return Err(ScenarioError::EmptyMap {
                width: self.map.width,
                height: self.map.height,
            });
        }
        for (field, value, minimum) in [
            (
                "generation.country_spacing",
                self.generation.country_spacing,
                MIN_COUNTRY_SPACING,
            ),
            ("generation.ruin_spacing", self.generation.ruin_spacing, 0.0),
        ] {
            if !value.is_finite() {
                return Err(ScenarioError::UnusableSpacing {
                    field,
                    value,
                    minimum,
                });
            }
            if value < 0.0 {
                return Err(ScenarioError::NegativeSpacing { field, value });
            }
            if value < minimum {
                return Err(ScenarioError::UnusableSpacing {
                    field,
                    value,
                    minimum,
                });
            }
        }
        self.speed()?;
        Ok(())
    }

    pub fn speed(&self) -> Result<Speed, ScenarioError> {
        Speed::try_from(self.tick_interval_ms)
            .map_err(|_| ScenarioError::OffMenuInterval(self.tick_interval_ms))
    }

    /// An ungenerated world: flat deep water, calendar at `start_year`.
    pub fn build_world(&self) -> World {
        World::new(
            self.map.width,
            self.map.height,
            Calendar::starting_at(self.start_year),
        )
    }

    pub fn generator(&self) -> Generator {
        Generator::new(self.generation.clone())
    }

    pub fn engine_settings(&self, snapshot_dir: impl Into<PathBuf>) -> EngineSettings {
        EngineSettings {
            scenario_name: self.name.clone(),
            seed: self.seed,
            snapshot_interval_ticks: self.snapshot_interval_ticks,
            snapshot_dir: snapshot_dir.into(),
            speed: self.speed().unwrap_or_default(),
        }
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or_else(default_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_scenario_takes_defaults() {
        let scenario = Scenario::from_yaml("name: mini\nseed: 7\n").expect("parses");
        assert_eq!(scenario.ticks(None), 3650);
        assert_eq!(scenario.ticks(Some(5)), 5);
        assert_eq!(scenario.tick_interval_ms, 200);
        assert_eq!(scenario.snapshot_interval_ticks, 0);
        assert_eq!((scenario.map.width, scenario.map.height), (128, 64));
        assert_eq!(scenario.generation, GenerationConfig::default());
        assert_eq!(scenario.logging.level, "info");
        assert_eq!(scenario.build_world().calendar().year(), -250_000);
    }

    #[test]
    fn rejects_empty_map() {
        let err = Scenario::from_yaml("name: x\nseed: 1\nmap:\n  width: 0\n").unwrap_err();
        let validation = err.downcast_ref::<ScenarioError>().expect("typed error");
        assert_eq!(
            validation,
            &ScenarioError::EmptyMap {
                width: 0,
                height: 64
            }
        );
    }

    #[test]
    fn rejects_negative_spacing_and_off_menu_interval() {
        let negative = Scenario::from_yaml(
            "name: x\nseed: 1\ngeneration:\n  ruin_spacing: -1\n",
        )
        .unwrap_err();
        assert!(matches!(
            negative.downcast_ref::<ScenarioError>(),
            Some(ScenarioError::NegativeSpacing { field: "generation.ruin_spacing", .. })
        ));

        let interval = Scenario::from_yaml("name: x\nseed: 1\ntick_interval_ms: 30\n").unwrap_err();
        assert_eq!(
            interval.downcast_ref::<ScenarioError>(),
            Some(&ScenarioError::OffMenuInterval(30))
        );
    }

    #[test]
    fn rejects_country_spacing_below_one_tile() {
        let err = Scenario::from_yaml("name: x\nseed: 1\ngeneration:\n  country_spacing: 0\n")
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ScenarioError>(),
            Some(&ScenarioError::UnusableSpacing {
                field: "generation.country_spacing",
                value: 0.0,
                minimum: 1.0,
            })
        );

        let zero_ruins = Scenario::from_yaml("name: x\nseed: 1\ngeneration:\n  ruin_spacing: 0\n");
        assert!(zero_ruins.is_ok());
    }

    #[test]
    fn rejects_non_finite_spacing() {
        let err = Scenario::from_yaml("name: x\nseed: 1\ngeneration:\n  ruin_spacing: .inf\n")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScenarioError>(),
            Some(ScenarioError::UnusableSpacing { field: "generation.ruin_spacing", .. })
        ));

        let err = Scenario::from_yaml("name: x\nseed: 1\ngeneration:\n  country_spacing: .nan\n")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScenarioError>(),
            Some(ScenarioError::UnusableSpacing { field: "generation.country_spacing", .. })
        ));
    }
}
