pub mod calendar;
pub mod country;
pub mod decision;
pub mod engine;
pub mod generation;
pub mod grid;
pub mod host;
pub mod rng;
pub mod scenario;
pub mod scoreboard;
pub mod snapshot;
pub mod systems;
pub mod terrain;
pub mod tile;
pub mod world;

pub use engine::{Engine, EngineBuilder, EngineSettings, Speed, TickSummary};
pub use scenario::{Scenario, ScenarioLoader};
pub use world::World;
