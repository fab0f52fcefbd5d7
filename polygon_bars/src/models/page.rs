//! One page of aggregate bars as delivered by a single fetch.
//!
//! Pages arrive sorted ascending by bucket start with no overlaps; gaps are
//! normal (nights, weekends, holidays). The ordering is an upstream
//! guarantee and is never re-established here, only relied upon.

use chrono::{DateTime, Utc};

use crate::models::bar::Bar;

/// An ordered sequence of [`Bar`]s from one aggregates fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarPage {
    bars: Vec<Bar>,
}

/// Outcome of locating an instant within a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    /// One bar when the instant lands on or just outside a single bar, two
    /// bars (in chronological order) when it falls in the gap between
    /// adjacent bars. Empty for an empty page.
    pub bars: Vec<Bar>,
    /// Whether the instant is actually covered, either directly by one bar
    /// or bracketed by a pair.
    pub found: bool,
}

impl BarPage {
    /// Wraps an already-sorted sequence of bars.
    pub fn new(bars: Vec<Bar>) -> Self {
        debug_assert!(
            bars.windows(2).all(|w| w[0].start <= w[1].start),
            "aggregate pages must be sorted ascending by start"
        );
        Self { bars }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Finds the bar(s) closest to `at`.
    ///
    /// Ordered search for the first bar that contains `at` or starts at or
    /// after it, then:
    ///
    /// - past the end: the last bar alone, found only if it contains `at`;
    /// - at the front: the first bar alone, found only if it contains `at`;
    /// - interior hit: that bar alone, found;
    /// - interior miss: `at` sits in the gap between the candidate and its
    ///   predecessor, so both are returned in order with `found = true`.
    ///   Picking a side is the caller's decision, via [`Bar::merge`].
    pub fn locate(&self, at: DateTime<Utc>) -> Located {
        if self.bars.is_empty() {
            return Located {
                bars: Vec::new(),
                found: false,
            };
        }

        let i = self
            .bars
            .partition_point(|bar| !(bar.contains(at) || bar.start >= at));

        if i == self.bars.len() {
            let last = self.bars[self.bars.len() - 1];
            Located {
                found: last.contains(at),
                bars: vec![last],
            }
        } else if i == 0 {
            let first = self.bars[0];
            Located {
                found: first.contains(at),
                bars: vec![first],
            }
        } else {
            let candidate = self.bars[i];
            if candidate.contains(at) {
                Located {
                    bars: vec![candidate],
                    found: true,
                }
            } else {
                Located {
                    bars: vec![self.bars[i - 1], candidate],
                    found: true,
                }
            }
        }
    }
}
