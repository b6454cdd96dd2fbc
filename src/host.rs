//! Cooperative real-time host: generation stages separated by yields, then
//! ticks on an interval that follows the selected speed.

use std::future::Future;

use anyhow::Result;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::{
    engine::{Engine, Speed, TickSummary},
    generation::Generator,
    world::World,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Step,
    Pause,
    Resume,
    TogglePause,
    SetSpeed(Speed),
    Faster,
    Slower,
    Stop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostReport {
    pub generation_stages: usize,
    pub ticks_run: u64,
    pub stopped_early: bool,
}

/// Parses one line of stdin input into a control message.
pub fn parse_control(line: &str) -> Option<Control> {
    let mut words = line.split_whitespace();
    let command = words.next()?.to_ascii_lowercase();
    let control = match command.as_str() {
        "s" | "step" => Control::Step,
        "p" | "pause" => Control::Pause,
        "r" | "resume" => Control::Resume,
        "t" | "toggle" => Control::TogglePause,
        "+" | "faster" => Control::Faster,
        "-" | "slower" => Control::Slower,
        "q" | "quit" | "stop" => Control::Stop,
        "speed" => {
            let millis: u64 = words.next()?.parse().ok()?;
            Control::SetSpeed(Speed::try_from(millis).ok()?)
        }
        _ => return None,
    };
    Some(control)
}

/// Forwards parsed stdin lines until stdin closes or the host hangs up.
pub async fn forward_stdin(controls: mpsc::Sender<Control>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_control(&line) {
            Some(control) => {
                if controls.send(control).await.is_err() {
                    break;
                }
            }
            None => warn!(input = %line, "unrecognized control"),
        }
    }
    Ok(())
}

fn ticker(period: std::time::Duration) -> time::Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Generates the world, then runs up to `ticks` ticks paced by the engine speed.
///
/// Returns early on [`Control::Stop`], when `shutdown` resolves, or when the
/// engine is paused and the control channel has closed.
pub async fn run_host<F, S>(
    engine: &mut Engine,
    world: &mut World,
    generator: &mut Generator,
    ticks: u64,
    mut controls: mpsc::Receiver<Control>,
    shutdown: S,
    mut hook: F,
) -> Result<HostReport>
where
    F: FnMut(&TickSummary),
    S: Future<Output = ()>,
{
    let mut report = HostReport::default();
    while !generator.is_done() {
        engine.generate_step(world, generator);
        report.generation_stages += 1;
        tokio::task::yield_now().await;
    }
    info!(countries = world.countries().len(), date = %world.calendar(), "generation complete");

    tokio::pin!(shutdown);
    let mut interval = ticker(engine.tick_interval());
    let mut controls_open = true;

    while report.ticks_run < ticks {
        if engine.is_paused() && !controls_open {
            report.stopped_early = true;
            break;
        }

        let mut step = false;
        tokio::select! {
            _ = interval.tick(), if !engine.is_paused() => step = true,
            control = controls.recv(), if controls_open => match control {
                Some(Control::Step) => step = true,
                Some(Control::Pause) => engine.pause(),
                Some(Control::Resume) => engine.resume(),
                Some(Control::TogglePause) => {
                    engine.toggle_pause();
                }
                Some(Control::SetSpeed(speed)) => {
                    engine.set_speed(speed);
                    interval = ticker(engine.tick_interval());
                }
                Some(Control::Faster) => {
                    engine.set_speed(engine.speed().faster());
                    interval = ticker(engine.tick_interval());
                }
                Some(Control::Slower) => {
                    engine.set_speed(engine.speed().slower());
                    interval = ticker(engine.tick_interval());
                }
                Some(Control::Stop) => {
                    report.stopped_early = true;
                    break;
                }
                None => controls_open = false,
            },
            _ = &mut shutdown => {
                info!("shutdown requested");
                report.stopped_early = true;
                break;
            }
        }

        if step {
            if let Some(summary) = engine.tick(world)? {
                hook(&summary);
            }
            report.ticks_run += 1;
        }
    }

    Ok(report)
}
