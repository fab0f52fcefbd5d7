//! The polygon REST client: cache-aware fetch pipeline, aggregates, the
//! bucket search loop, and the quote endpoints.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::Rng;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use tracing::debug;
use url::Url;

use crate::cache::FileCache;
use crate::cache::response::RawResponse;
use crate::config::ClientConfig;
use crate::errors::Error;
use crate::models::bar::Bar;
use crate::models::page::BarPage;
use crate::models::request_params::AggsRequest;
use crate::providers::polygon::endpoint::{Endpoint, HistoricQuotesRequest, LastQuoteRequest};
use crate::providers::polygon::response::{HistoricQuote, LastQuote};

/// Maximum number of window widenings a bucket search may perform.
const MAX_WIDENINGS: u32 = 5;

/// Client for the polygon REST API.
///
/// All network access is sequential; one request is in flight at a time.
/// Dropping a returned future cancels the cache lookup and the network call
/// together.
pub struct PolygonClient {
    http: Client,
    config: ClientConfig,
    cache: Option<FileCache>,
}

impl PolygonClient {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = Client::builder().build()?;
        let cache = config.cache_dir.as_ref().map(FileCache::new);
        Ok(Self {
            http,
            config,
            cache,
        })
    }

    /// The session timezone this client windows searches in.
    pub fn session_tz(&self) -> Tz {
        self.config.session_tz
    }

    fn endpoint_url<E: Endpoint>(&self, endpoint: &E) -> Url {
        let mut url = self.config.base_url.clone();
        url.set_path(&endpoint.path());
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in endpoint.query() {
                pairs.append_pair(&key, &value);
            }
            pairs.append_pair("apiKey", self.config.api_key.expose_secret());
        }
        url
    }

    /// Fetches `url`, consulting the response cache first when the request
    /// is cache-eligible and persisting successful responses afterwards.
    ///
    /// Cache hits and live responses come back in the same representation;
    /// callers cannot tell them apart. Persisting buffers the body, so the
    /// returned response is always fully readable.
    async fn execute_cached(&self, url: Url, cacheable: bool) -> Result<RawResponse, Error> {
        if cacheable {
            if let Some(cache) = &self.cache {
                if let Some(hit) = cache.get_or_miss(&url) {
                    debug!(%url, "cache hit");
                    return Ok(hit);
                }
                debug!(%url, "cache miss");
            }
        }

        let response = self.http.get(url.clone()).send().await?;
        let raw = RawResponse::from_reqwest(response).await?;

        if cacheable && raw.status == StatusCode::OK {
            if let Some(cache) = &self.cache {
                cache.save(&url, &raw)?;
            }
        }
        Ok(raw)
    }

    /// Generic pipeline: build the URL, fetch through the cache, check the
    /// status, parse the typed response.
    async fn fetch<E: Endpoint>(&self, endpoint: &E) -> Result<E::Response, Error> {
        let url = self.endpoint_url(endpoint);
        let raw = self.execute_cached(url, E::CACHEABLE).await?;
        if raw.status != StatusCode::OK {
            return Err(Error::Status(raw.status.as_u16()));
        }
        Ok(serde_json::from_slice(&raw.body)?)
    }

    /// Fetches one page of aggregate bars for the request's window.
    ///
    /// Wire payloads carry no bucket duration; each bar is constructed here
    /// from its payload plus the request's nominal timespan.
    pub async fn aggregates(&self, request: &AggsRequest) -> Result<BarPage, Error> {
        let response = self.fetch(request).await?;
        let duration = request.timeframe.duration();
        let mut bars = Vec::with_capacity(response.results.len());
        for wire in response.results {
            let start = DateTime::from_timestamp_millis(wire.start_ms)
                .ok_or(Error::TimestampOutOfRange(wire.start_ms))?;
            bars.push(Bar::new(
                start,
                duration,
                wire.open,
                wire.high,
                wire.low,
                wire.close,
                wire.volume,
                wire.trade_count,
            ));
        }
        Ok(BarPage::new(bars))
    }

    /// Searches for the bar(s) covering `at`, widening the fetch window
    /// until the instant is bracketed or the widening budget runs out.
    ///
    /// The request's `from`/`to` are replaced by a window derived from `at`
    /// in the client's session timezone. An empty page gives no signal for
    /// which direction holds data, so the widening direction is a random
    /// draw; a single returned bar widens toward the instant. Returns one
    /// bar when `at` is covered directly, two (in order) when it falls in a
    /// gap; reduce a pair with [`Bar::merge`].
    pub async fn search_bars(
        &self,
        request: &AggsRequest,
        at: DateTime<Utc>,
    ) -> Result<Vec<Bar>, Error> {
        let (from, to) = AggsRequest::window_around(at, self.config.session_tz);
        let mut window = AggsRequest {
            from,
            to,
            ..request.clone()
        };

        let mut widenings = 0;
        let mut saw_bars = false;

        loop {
            let page = self.aggregates(&window).await?;
            saw_bars |= !page.is_empty();

            let located = page.locate(at);
            if located.found {
                return Ok(located.bars);
            }

            if widenings == MAX_WIDENINGS {
                return Err(if saw_bars {
                    Error::SearchLimitExceeded { widenings }
                } else {
                    Error::NoResults
                });
            }

            match located.bars.first() {
                None => {
                    if rand::rng().random_bool(0.5) {
                        window.widen_back();
                    } else {
                        window.widen_forward();
                    }
                }
                Some(bar) if at < bar.start => window.widen_back(),
                Some(_) => window.widen_forward(),
            }
            widenings += 1;
            debug!(from = %window.from, to = %window.to, widenings, "widening search window");
        }
    }

    /// Fetches the latest quote for a ticker. Never served from cache.
    pub async fn last_quote(&self, request: &LastQuoteRequest) -> Result<LastQuote, Error> {
        let response = self.fetch(request).await?;
        Ok(response.last)
    }

    /// Fetches one page of historic NBBO ticks.
    pub async fn historic_quotes(
        &self,
        request: &HistoricQuotesRequest,
    ) -> Result<Vec<HistoricQuote>, Error> {
        let response = self.fetch(request).await?;
        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::models::timeframe::{TimeFrame, TimespanUnit};

    use super::*;

    fn client(base: &str) -> PolygonClient {
        let config = ClientConfig::new("test-key")
            .with_base_url(Url::parse(base).unwrap());
        PolygonClient::new(config).unwrap()
    }

    #[test]
    fn endpoint_url_appends_query_and_credential() {
        let client = client("http://127.0.0.1:1");
        let request = AggsRequest::new(
            "AAPL",
            TimeFrame::new(1, TimespanUnit::Hour),
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2019, 1, 2).unwrap(),
            false,
        );
        let url = client.endpoint_url(&request);
        assert_eq!(
            url.path(),
            "/v2/aggs/ticker/AAPL/range/1/hour/2019-01-01/2019-01-02"
        );
        assert_eq!(
            url.query(),
            Some("unadjusted=false&apiKey=test-key")
        );
    }

    #[test]
    fn credential_is_not_leaked_by_debug_config() {
        let config = ClientConfig::new("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
