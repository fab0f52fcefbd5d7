//! Time-bucketed OHLCV retrieval with an adaptive bucket search and a
//! request-keyed response cache.
//!
//! The crate answers "which bar(s) cover instant T?" for an arbitrary
//! timestamp: [`PolygonClient::search_bars`](providers::polygon::PolygonClient::search_bars)
//! fetches aggregate pages over an expanding calendar window until the
//! instant is covered or bracketed, and
//! [`Bar::merge`](models::bar::Bar::merge) reduces a bracketing pair to one
//! representative bar. Every cache-eligible fetch goes through an atomic,
//! file-backed response cache keyed by the credential-normalized request
//! URL, so repeated queries for closed historical windows never touch the
//! network twice.

pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
