//! Canonical in-memory representation of one aggregate bar (OHLCV).
//!
//! A [`Bar`] is the payload of a single element of an aggregates page,
//! combined with the nominal bar duration from the request that produced it.
//! The wire payload does not carry the duration; construction is the single
//! point where payload and request context meet, and the value is immutable
//! afterwards.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;

/// A single aggregate bar covering the half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Bucket start (UTC, millisecond resolution upstream).
    pub start: DateTime<Utc>,

    /// Nominal bucket length. Always strictly positive.
    pub duration: TimeDelta,

    /// Opening price.
    pub open: Decimal,

    /// Highest price during the interval.
    pub high: Decimal,

    /// Lowest price during the interval.
    pub low: Decimal,

    /// Closing price.
    pub close: Decimal,

    /// Volume traded during the interval.
    pub volume: Decimal,

    /// Number of trades during the interval.
    pub trade_count: i64,
}

impl Bar {
    /// Builds a bar from payload fields plus the request's nominal duration.
    ///
    /// # Panics
    /// Panics if `duration` is zero or negative; a bucket interval must
    /// never be empty.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start: DateTime<Utc>,
        duration: TimeDelta,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        trade_count: i64,
    ) -> Self {
        assert!(
            duration > TimeDelta::zero(),
            "bar duration must be positive, got {duration}"
        );
        Self {
            start,
            duration,
            open,
            high,
            low,
            close,
            volume,
            trade_count,
        }
    }

    /// Exclusive upper bound of the bucket interval.
    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.duration
    }

    /// Whether `at` falls within `[start, end)`.
    ///
    /// Half-open: the instant exactly at `start` belongs to this bar, the
    /// instant exactly at `end` belongs to the next one.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end()
    }

    /// Midpoint of open and close, in exact decimal arithmetic.
    pub fn average(&self) -> Decimal {
        (self.open + self.close) / Decimal::TWO
    }

    /// Reduces the bars returned by a locate step to one representative bar.
    ///
    /// A single bar is returned unchanged. A chronological pair `(a, b)`
    /// produces a synthetic bar spanning both inputs and the gap between
    /// them: open from `a`, close from `b`, extreme of the highs and lows,
    /// summed volume and trade count, duration `b.end() - a.start`.
    ///
    /// # Panics
    /// Panics on zero or three-plus inputs. Those lengths cannot come out of
    /// a locate step; producing a bar for them would silently misrepresent
    /// the interval.
    pub fn merge(bars: &[Bar]) -> Bar {
        match bars {
            [single] => *single,
            [a, b] => Bar {
                start: a.start,
                duration: b.end() - a.start,
                open: a.open,
                high: a.high.max(b.high),
                low: a.low.min(b.low),
                close: b.close,
                volume: a.volume + b.volume,
                trade_count: a.trade_count + b.trade_count,
            },
            _ => panic!("merge expects one or two bars, got {}", bars.len()),
        }
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} ({}) o:{} c:{} h:{} l:{} v:{}",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end().format("%Y-%m-%d %H:%M:%S"),
            self.duration,
            self.open,
            self.close,
            self.high,
            self.low,
            self.volume,
        )
    }
}
