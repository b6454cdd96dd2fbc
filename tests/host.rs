use std::{future, path::PathBuf};

use hegemony::{
    engine::{Engine, EngineBuilder, Speed},
    generation::Generator,
    host::{self, Control},
    scenario::ScenarioLoader,
    systems::{CalendarSystem, CountrySystem},
    world::World,
};
use tokio::sync::mpsc;

fn setup() -> (Engine, World, Generator) {
    let scenario = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
        .load("scenarios/islet.yaml")
        .expect("scenario parses");
    let engine = EngineBuilder::new(scenario.engine_settings(PathBuf::from("unused")))
        .with_system(CountrySystem::new())
        .with_system(CalendarSystem::new())
        .build();
    (engine, scenario.build_world(), scenario.generator())
}

#[tokio::test(start_paused = true)]
async fn host_generates_then_runs_requested_ticks() {
    let (mut engine, mut world, mut generator) = setup();
    let (_tx, rx) = mpsc::channel(4);

    let mut seen = Vec::new();
    let report = host::run_host(
        &mut engine,
        &mut world,
        &mut generator,
        5,
        rx,
        future::pending::<()>(),
        |summary| seen.push(summary.tick),
    )
    .await
    .expect("host runs");

    // raise, five smoothing passes, countries, ruins
    assert_eq!(report.generation_stages, 8);
    assert_eq!(report.ticks_run, 5);
    assert!(!report.stopped_early);
    assert!(generator.is_done());
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn paused_host_only_advances_on_step() {
    let (mut engine, mut world, mut generator) = setup();
    let (tx, rx) = mpsc::channel(8);
    for control in [Control::Pause, Control::Step, Control::Step, Control::Stop] {
        tx.send(control).await.unwrap();
    }

    let report = host::run_host(
        &mut engine,
        &mut world,
        &mut generator,
        100,
        rx,
        future::pending::<()>(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.ticks_run, 2);
    assert!(report.stopped_early);
    assert!(engine.is_paused());
    assert_eq!(engine.current_tick(), 2);
}

#[tokio::test(start_paused = true)]
async fn paused_host_stops_when_controls_close() {
    let (mut engine, mut world, mut generator) = setup();
    let (tx, rx) = mpsc::channel(1);
    tx.send(Control::Pause).await.unwrap();
    drop(tx);

    let report = host::run_host(
        &mut engine,
        &mut world,
        &mut generator,
        100,
        rx,
        future::pending::<()>(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.ticks_run, 0);
    assert!(report.stopped_early);
}

#[tokio::test(start_paused = true)]
async fn speed_controls_update_the_engine() {
    let (mut engine, mut world, mut generator) = setup();
    let (tx, rx) = mpsc::channel(4);
    tx.send(Control::SetSpeed(Speed::Fastest)).await.unwrap();
    tx.send(Control::Slower).await.unwrap();

    let report = host::run_host(
        &mut engine,
        &mut world,
        &mut generator,
        3,
        rx,
        future::pending::<()>(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.ticks_run, 3);
    assert_eq!(engine.speed(), Speed::Fast);
    assert_eq!(engine.tick_interval().as_millis(), 50);
}

#[tokio::test(start_paused = true)]
async fn shutdown_future_stops_the_host() {
    let (mut engine, mut world, mut generator) = setup();
    let (_tx, rx) = mpsc::channel(1);

    let report = host::run_host(
        &mut engine,
        &mut world,
        &mut generator,
        100,
        rx,
        future::ready(()),
        |_| {},
    )
    .await
    .unwrap();

    assert!(report.stopped_early);
    assert!(report.ticks_run < 100);
}
