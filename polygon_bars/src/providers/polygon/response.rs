//! Wire-level payload structs for the polygon endpoints.
//!
//! Prices and volumes arrive as JSON numbers that are occasionally
//! scientific-notation encoded; they are decoded through serde_json's
//! arbitrary-precision path into [`Decimal`] so no value ever takes a
//! detour through binary floating point.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// One element of an aggregates `results` sequence. Payload only: the
/// bucket duration is request context and is attached in a separate
/// construction step.
#[derive(Debug, Clone, Deserialize)]
pub struct WireBar {
    #[serde(rename = "v", with = "rust_decimal::serde::arbitrary_precision")]
    pub volume: Decimal,
    #[serde(rename = "o", with = "rust_decimal::serde::arbitrary_precision")]
    pub open: Decimal,
    #[serde(rename = "c", with = "rust_decimal::serde::arbitrary_precision")]
    pub close: Decimal,
    #[serde(rename = "h", with = "rust_decimal::serde::arbitrary_precision")]
    pub high: Decimal,
    #[serde(rename = "l", with = "rust_decimal::serde::arbitrary_precision")]
    pub low: Decimal,
    /// Bucket start, milliseconds since the Unix epoch.
    #[serde(rename = "t")]
    pub start_ms: i64,
    /// Trade count; omitted by the upstream for some buckets.
    #[serde(rename = "n", default)]
    pub trade_count: i64,
}

/// Aggregates response envelope. The upstream omits `results` entirely when
/// the window holds no data, hence the default.
#[derive(Debug, Clone, Deserialize)]
pub struct AggsResponse {
    #[serde(default)]
    pub results: Vec<WireBar>,
}

/// The quote object inside a last-quote response.
#[derive(Debug, Clone, Deserialize)]
pub struct LastQuote {
    #[serde(rename = "askprice", with = "rust_decimal::serde::arbitrary_precision")]
    pub ask_price: Decimal,
    #[serde(rename = "asksize", default)]
    pub ask_size: i64,
    #[serde(rename = "bidprice", with = "rust_decimal::serde::arbitrary_precision")]
    pub bid_price: Decimal,
    #[serde(rename = "bidsize", default)]
    pub bid_size: i64,
    /// Quote time, milliseconds since the Unix epoch.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
}

impl LastQuote {
    /// Bid/ask midpoint, in exact decimal arithmetic.
    pub fn market(&self) -> Decimal {
        (self.bid_price + self.ask_price) / Decimal::TWO
    }

    pub fn at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

/// Last-quote response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct LastQuoteResponse {
    pub last: LastQuote,
}

/// One NBBO tick from the historic-quotes endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricQuote {
    #[serde(rename = "p", default, with = "rust_decimal::serde::arbitrary_precision")]
    pub bid_price: Decimal,
    #[serde(rename = "P", default, with = "rust_decimal::serde::arbitrary_precision")]
    pub ask_price: Decimal,
    /// SIP timestamp, nanoseconds since the Unix epoch.
    #[serde(rename = "t", default)]
    pub sip_unix_nanos: i64,
    /// Participant timestamp, nanoseconds since the Unix epoch.
    #[serde(rename = "y", default)]
    pub participant_unix_nanos: i64,
    /// TRF timestamp, nanoseconds since the Unix epoch.
    #[serde(rename = "f", default)]
    pub trf_unix_nanos: i64,
    #[serde(rename = "S", default)]
    pub ask_size: i64,
    /// Tape identifier.
    #[serde(rename = "z", default)]
    pub tape: i64,
}

/// Historic-quotes response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricQuotesResponse {
    #[serde(default)]
    pub results: Vec<HistoricQuote>,
}
