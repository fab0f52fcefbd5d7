//! Tagged endpoint descriptors consumed by the client's generic
//! build → fetch-through-cache → parse pipeline.
//!
//! Each endpoint family contributes its path template, query parameters,
//! cache eligibility and typed response shape; the client owns everything
//! else (base URL, credential, transport, caching).

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::models::request_params::AggsRequest;
use crate::providers::polygon::response::{AggsResponse, HistoricQuotesResponse, LastQuoteResponse};

/// A request to one polygon REST endpoint.
pub trait Endpoint {
    /// Parsed response shape.
    type Response: DeserializeOwned;

    /// Whether a successful response may be served from and written to the
    /// response cache. Time-sensitive endpoints opt out.
    const CACHEABLE: bool;

    /// URL path for this request.
    fn path(&self) -> String;

    /// Query parameters, excluding the credential (the client appends it).
    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

impl Endpoint for AggsRequest {
    type Response = AggsResponse;

    // Closed historical windows never change; replays are free.
    const CACHEABLE: bool = true;

    fn path(&self) -> String {
        format!(
            "/v2/aggs/ticker/{}/range/{}/{}/{}/{}",
            self.ticker,
            self.timeframe.multiplier,
            self.timeframe.unit,
            self.from.format("%Y-%m-%d"),
            self.to.format("%Y-%m-%d"),
        )
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("unadjusted".to_string(), self.unadjusted.to_string())]
    }
}

/// Request for the latest NBBO quote of a ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastQuoteRequest {
    pub ticker: String,
}

impl Endpoint for LastQuoteRequest {
    type Response = LastQuoteResponse;

    // The latest quote goes stale the moment it is stored.
    const CACHEABLE: bool = false;

    fn path(&self) -> String {
        format!("/v1/last_quote/stocks/{}", self.ticker)
    }
}

/// Request for a page of historic NBBO ticks on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricQuotesRequest {
    pub ticker: String,
    pub date: NaiveDate,
    /// Offset timestamp (nanoseconds) to resume paging from.
    pub timestamp: i64,
    /// Upper timestamp bound (nanoseconds).
    pub timestamp_limit: i64,
    pub reverse: bool,
    pub limit: u32,
}

impl Endpoint for HistoricQuotesRequest {
    type Response = HistoricQuotesResponse;

    const CACHEABLE: bool = true;

    fn path(&self) -> String {
        format!(
            "/v2/ticks/stocks/nbbo/{}/{}",
            self.ticker,
            self.date.format("%Y-%m-%d")
        )
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![
            ("timestamp".to_string(), self.timestamp.to_string()),
            ("timestampLimit".to_string(), self.timestamp_limit.to_string()),
            ("reverse".to_string(), self.reverse.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ]
    }
}
