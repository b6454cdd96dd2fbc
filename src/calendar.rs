use std::fmt;

use serde::{Deserialize, Serialize};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const DAYS_PER_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
pub const DAYS_PER_MONTH_LEAP_YEAR: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// In-game date. `month` is zero-based; `year` may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    day: u32,
    month: usize,
    year: i64,
}

impl Calendar {
    /// Out-of-range days and months clamp into the valid range.
    pub fn new(day: u32, month: usize, year: i64) -> Self {
        let month = month.min(11);
        let mut calendar = Self { day: 1, month, year };
        calendar.day = day.clamp(1, calendar.days_in_month());
        calendar
    }

    pub fn starting_at(year: i64) -> Self {
        Self::new(1, 0, year)
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> usize {
        self.month
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.month]
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn is_leap_year(&self) -> bool {
        self.year % 4 == 0
    }

    pub fn days_in_month(&self) -> u32 {
        if self.is_leap_year() {
            DAYS_PER_MONTH_LEAP_YEAR[self.month]
        } else {
            DAYS_PER_MONTH[self.month]
        }
    }

    pub fn advance_day(&mut self) {
        self.day += 1;
        if self.day > self.days_in_month() {
            self.day = 1;
            self.month += 1;
            if self.month > 11 {
                self.month = 0;
                self.year += 1;
            }
        }
    }

    /// Geological time skip; day and month are left alone.
    pub fn advance_years(&mut self, years: i64) {
        self.year += years;
        self.day = self.day.min(self.days_in_month());
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::starting_at(-250_000)
    }
}

fn day_suffix(day: u32) -> &'static str {
    match day {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} of {} ",
            self.day,
            day_suffix(self.day),
            self.month_name()
        )?;
        if self.year >= 0 {
            write!(f, "{:04}", self.year)
        } else {
            write!(f, "{}", self.year)
        }
    }
}
