//! Parameters for an aggregates request, including the calendar window.
//!
//! The window is expressed as trading-session-aware dates: the aggregates
//! endpoint takes an inclusive start date and an exclusive end date. Window
//! math is timezone-explicit so tests can pick an arbitrary reference zone;
//! there is no ambient process-wide location.

use chrono::{DateTime, Days, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

use crate::models::timeframe::TimeFrame;

/// One aggregates request: ticker, bar size, calendar window `[from, to)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggsRequest {
    /// Ticker symbol, e.g. `AAPL`.
    pub ticker: String,

    /// Nominal bar size (multiplier × timespan unit).
    pub timeframe: TimeFrame,

    /// Inclusive window start.
    pub from: NaiveDate,

    /// Exclusive window end.
    pub to: NaiveDate,

    /// Whether to request split-unadjusted prices.
    pub unadjusted: bool,
}

impl AggsRequest {
    pub fn new(
        ticker: impl Into<String>,
        timeframe: TimeFrame,
        from: NaiveDate,
        to: NaiveDate,
        unadjusted: bool,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            timeframe,
            from,
            to,
            unadjusted,
        }
    }

    /// Builds the initial window around `at` for a bucket search.
    ///
    /// The window start is `at`'s date in the session timezone, pushed back
    /// one extra day when the local hour is before 1am: early pre-market
    /// bars belong to the previous trading session and would otherwise fall
    /// outside the window. The end is always the next calendar day, keeping
    /// the window exclusive of nothing on the near side.
    pub fn window_around(at: DateTime<Utc>, session_tz: Tz) -> (NaiveDate, NaiveDate) {
        let local = at.with_timezone(&session_tz);
        let date = local.date_naive();
        let from = if local.hour() < 1 {
            date - Days::new(1)
        } else {
            date
        };
        (from, date + Days::new(1))
    }

    /// Extends the window one day into the past.
    pub fn widen_back(&mut self) {
        self.from = self.from - Days::new(1);
    }

    /// Extends the window one day into the future.
    pub fn widen_forward(&mut self) {
        self.to = self.to + Days::new(1);
    }
}
