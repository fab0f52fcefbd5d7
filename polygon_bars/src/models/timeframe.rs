//! Nominal bar size: a multiplier applied to a timespan unit.
//!
//! The unit names map one-to-one onto the path segment the aggregates
//! endpoint expects. Calendar units get approximate fixed durations, which
//! is what bucket containment math needs; exact calendar arithmetic is the
//! upstream aggregator's concern.

use std::fmt;

use chrono::TimeDelta;

/// Timespan unit accepted by the aggregates endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimespanUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
}

impl TimespanUnit {
    /// Path-segment spelling of the unit.
    pub fn as_str(self) -> &'static str {
        match self {
            TimespanUnit::Minute => "minute",
            TimespanUnit::Hour => "hour",
            TimespanUnit::Day => "day",
            TimespanUnit::Week => "week",
            TimespanUnit::Month => "month",
            TimespanUnit::Quarter => "quarter",
        }
    }

    /// Nominal length of one unit. Day and larger are approximations.
    fn duration(self) -> TimeDelta {
        match self {
            TimespanUnit::Minute => TimeDelta::minutes(1),
            TimespanUnit::Hour => TimeDelta::hours(1),
            TimespanUnit::Day => TimeDelta::hours(24),
            TimespanUnit::Week => TimeDelta::hours(24 * 7),
            TimespanUnit::Month => TimeDelta::hours(730),
            TimespanUnit::Quarter => TimeDelta::hours(2190),
        }
    }
}

impl fmt::Display for TimespanUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bar size: `multiplier` × `unit` (e.g. 1 × hour).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFrame {
    pub multiplier: i64,
    pub unit: TimespanUnit,
}

impl TimeFrame {
    pub fn new(multiplier: i64, unit: TimespanUnit) -> Self {
        Self { multiplier, unit }
    }

    /// Nominal length of one bar of this size.
    pub fn duration(&self) -> TimeDelta {
        self.unit.duration() * self.multiplier as i32
    }
}
