use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use hegemony::{
    engine::{EngineBuilder, Speed},
    host,
    scenario::ScenarioLoader,
    scoreboard,
    systems::{CalendarSystem, CountrySystem},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Hegemony territorial simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/pangaea.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Tick interval in ms: 500, 200, 100, 50 or 10
    #[arg(long)]
    speed: Option<u64>,

    /// Pace ticks in real time and read controls from stdin
    #[arg(long)]
    realtime: bool,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&scenario.logging.level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(interval) = cli.snapshot_interval {
        scenario.snapshot_interval_ticks = interval;
    }
    let ticks = scenario.ticks(cli.ticks);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from("snapshots"));

    let mut settings = scenario.engine_settings(snapshot_dir);
    if let Some(millis) = cli.speed {
        settings.speed = Speed::try_from(millis)?;
    }

    let mut world = scenario.build_world();
    let mut generator = scenario.generator();
    let mut engine = EngineBuilder::new(settings)
        .with_system(CountrySystem::new())
        .with_system(CalendarSystem::new())
        .build();

    if cli.realtime {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start runtime")?;
        let report = runtime.block_on(async {
            let (tx, rx) = mpsc::channel(16);
            tokio::spawn(async move {
                if let Err(err) = host::forward_stdin(tx).await {
                    tracing::warn!(error = %err, "stdin controls stopped");
                }
            });
            let shutdown = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            host::run_host(
                &mut engine,
                &mut world,
                &mut generator,
                ticks,
                rx,
                shutdown,
                |_| {},
            )
            .await
        });
        // stdin reads block a worker; don't wait for them
        runtime.shutdown_background();
        let report = report?;
        tracing::info!(ticks = report.ticks_run, "host finished");
    } else {
        engine.generate(&mut world, &mut generator);
        engine.run(&mut world, ticks)?;
    }

    println!(
        "Scenario '{}' completed after {} ticks on the {}.",
        scenario.name,
        engine.current_tick(),
        world.calendar()
    );
    for entry in scoreboard::standings(world.countries()) {
        println!(
            "{:>2}. {:<14} score {:>10.2}  tiles {:>5}{}",
            entry.rank,
            entry.name,
            entry.score,
            entry.size,
            if entry.defeated { "  (defeated)" } else { "" }
        );
    }
    Ok(())
}
