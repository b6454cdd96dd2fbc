mod performance;
mod speed;

use std::{path::PathBuf, time::Duration, time::Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    generation::{Generator, Stage},
    rng::{RngManager, SystemRng},
    snapshot::SnapshotWriter,
    world::World,
};

pub use performance::{LoadLevel, PerformanceStats, CRITICAL_TICK_MS, ELEVATED_TICK_MS, SAMPLE_WINDOW};
pub use speed::{Speed, SpeedError};

pub const GENERATION_STREAM: &str = "generation";

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
    pub speed: Speed,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ticks,
            ),
            speed: self.settings.speed,
            settings: self.settings,
            tick: 0,
            paused: false,
            performance: PerformanceStats::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SystemRunReport {
    pub name: String,
    pub duration_ms: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub date: String,
    pub system_reports: Vec<SystemRunReport>,
    pub snapshot_path: Option<PathBuf>,
    pub load: LoadLevel,
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
    speed: Speed,
    tick: u64,
    paused: bool,
    performance: PerformanceStats,
}

impl Engine {
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn performance(&self) -> &PerformanceStats {
        &self.performance
    }

    /// Runs one generation stage on the `generation` stream.
    pub fn generate_step(&mut self, world: &mut World, generator: &mut Generator) -> Stage {
        let mut rng = self.rng.stream(GENERATION_STREAM);
        generator.step(world, &mut rng)
    }

    pub fn generate(&mut self, world: &mut World, generator: &mut Generator) {
        while !generator.is_done() {
            self.generate_step(world, generator);
        }
    }

    /// One simulation tick. Returns `None` without touching the world while the roster is empty.
    pub fn tick(&mut self, world: &mut World) -> Result<Option<TickSummary>> {
        if world.countries().is_empty() {
            return Ok(None);
        }

        self.tick += 1;
        let started = Instant::now();
        let mut system_reports = Vec::with_capacity(self.systems.len());
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            let ctx = SystemContext {
                tick: self.tick,
                scenario_name: &self.settings.scenario_name,
            };
            let system_started = Instant::now();
            system
                .run(&ctx, world, &mut rng_stream)
                .with_context(|| format!("System {} failed on tick {}", system.name(), self.tick))?;
            system_reports.push(SystemRunReport {
                name: system.name().to_string(),
                duration_ms: system_started.elapsed().as_secs_f64() * 1_000.0,
            });
        }

        let snapshot_path =
            self.snapshot_writer
                .maybe_write(world, self.tick, &self.settings.scenario_name)?;

        let previous_load = self.performance.load_level();
        self.performance
            .record(started.elapsed().as_secs_f64() * 1_000.0, &system_reports);
        let load = self.performance.load_level();
        if load != LoadLevel::Normal && load != previous_load {
            warn!(
                tick = self.tick,
                average_ms = self.performance.average_tick_ms(),
                max_ms = self.performance.max_tick_ms(),
                ?load,
                "tick load increased"
            );
        }

        let summary = TickSummary {
            tick: self.tick,
            date: world.calendar().to_string(),
            system_reports,
            snapshot_path,
            load,
        };
        debug!(tick = summary.tick, date = %summary.date, "tick complete");
        Ok(Some(summary))
    }

    pub fn run(&mut self, world: &mut World, ticks: u64) -> Result<()> {
        self.run_with_hook(world, ticks, |_| {})
    }

    pub fn run_with_hook<F>(&mut self, world: &mut World, ticks: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(&TickSummary),
    {
        for _ in 0..ticks {
            if let Some(summary) = self.tick(world)? {
                hook(&summary);
            }
        }
        Ok(())
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    pub fn tick_interval(&self) -> Duration {
        self.speed.interval()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flips the pause flag and returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub scenario_name: &'a str,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
