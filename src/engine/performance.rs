use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use super::SystemRunReport;

pub const SAMPLE_WINDOW: usize = 60;
pub const ELEVATED_TICK_MS: f64 = 50.0;
pub const CRITICAL_TICK_MS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadLevel {
    Normal,
    Elevated,
    Critical,
}

impl LoadLevel {
    pub fn from_average_ms(average_ms: f64) -> Self {
        if average_ms > CRITICAL_TICK_MS {
            LoadLevel::Critical
        } else if average_ms > ELEVATED_TICK_MS {
            LoadLevel::Elevated
        } else {
            LoadLevel::Normal
        }
    }
}

/// Rolling tick and per-system timings over the last [`SAMPLE_WINDOW`] ticks.
#[derive(Debug, Clone, Default)]
pub struct PerformanceStats {
    ticks: VecDeque<f64>,
    systems: HashMap<String, VecDeque<f64>>,
}

impl PerformanceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tick_ms: f64, reports: &[SystemRunReport]) {
        push_sample(&mut self.ticks, tick_ms);
        for report in reports {
            let samples = self.systems.entry(report.name.clone()).or_default();
            push_sample(samples, report.duration_ms);
        }
    }

    pub fn samples(&self) -> usize {
        self.ticks.len()
    }

    pub fn average_tick_ms(&self) -> f64 {
        average(&self.ticks)
    }

    pub fn max_tick_ms(&self) -> f64 {
        self.ticks.iter().copied().fold(0.0, f64::max)
    }

    pub fn average_system_ms(&self, name: &str) -> Option<f64> {
        self.systems.get(name).map(average)
    }

    pub fn load_level(&self) -> LoadLevel {
        LoadLevel::from_average_ms(self.average_tick_ms())
    }
}

fn push_sample(samples: &mut VecDeque<f64>, value: f64) {
    if samples.len() == SAMPLE_WINDOW {
        samples.pop_front();
    }
    samples.push_back(value);
}

fn average(samples: &VecDeque<f64>) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}
