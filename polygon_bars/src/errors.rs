use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;

/// The unified error type for the `polygon_bars` crate.
///
/// Transport, upstream and payload errors propagate unchanged to the
/// caller; nothing is retried inside the crate except the explicit,
/// bounded window widenings of the bucket search.
#[derive(Debug, Error)]
pub enum Error {
    /// Network or I/O failure reaching the endpoint.
    #[error("request failed")]
    Transport(#[from] reqwest::Error),

    /// The upstream rejected the request with a non-200 status.
    #[error("upstream returned HTTP status {0}")]
    Status(u16),

    /// The response body does not parse into the expected shape.
    #[error("malformed response payload")]
    Malformed(#[from] serde_json::Error),

    /// The response body parsed, but a bar start timestamp is outside the
    /// representable millisecond range.
    #[error("bar start timestamp {0} is out of range")]
    TimestampOutOfRange(i64),

    /// The response cache failed in a way that is not a simple miss.
    #[error("cache error")]
    Cache(#[from] CacheError),

    /// The bucket search widened its window the maximum number of times
    /// without bracketing the target instant.
    #[error("search limit exceeded after {widenings} window widenings")]
    SearchLimitExceeded { widenings: u32 },

    /// Every window up to the widening budget came back empty; no bars
    /// exist for the ticker anywhere near the target instant.
    #[error("search returned no results")]
    NoResults,

    /// Client configuration is missing or invalid.
    #[error("configuration error")]
    Config(#[from] ConfigError),
}
