use std::{fmt, time::Duration};

use thiserror::Error;

/// Tick interval menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Speed {
    Slowest,
    #[default]
    Slow,
    Normal,
    Fast,
    Fastest,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpeedError {
    #[error("tick interval {0} ms is not on the speed menu (500, 200, 100, 50, 10)")]
    OffMenu(u64),
}

impl Speed {
    pub const MENU: [Speed; 5] = [
        Speed::Slowest,
        Speed::Slow,
        Speed::Normal,
        Speed::Fast,
        Speed::Fastest,
    ];

    pub fn millis(self) -> u64 {
        match self {
            Speed::Slowest => 500,
            Speed::Slow => 200,
            Speed::Normal => 100,
            Speed::Fast => 50,
            Speed::Fastest => 10,
        }
    }

    pub fn interval(self) -> Duration {
        Duration::from_millis(self.millis())
    }

    /// Next entry with a shorter interval, saturating at the fastest.
    pub fn faster(self) -> Self {
        let index = Self::MENU.iter().position(|speed| *speed == self).unwrap_or(0);
        Self::MENU[(index + 1).min(Self::MENU.len() - 1)]
    }

    pub fn slower(self) -> Self {
        let index = Self::MENU.iter().position(|speed| *speed == self).unwrap_or(0);
        Self::MENU[index.saturating_sub(1)]
    }
}

impl TryFrom<u64> for Speed {
    type Error = SpeedError;

    fn try_from(millis: u64) -> Result<Self, Self::Error> {
        Self::MENU
            .into_iter()
            .find(|speed| speed.millis() == millis)
            .ok_or(SpeedError::OffMenu(millis))
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ms", self.millis())
    }
}
