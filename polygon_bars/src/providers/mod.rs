//! Market data providers.
//!
//! One provider per upstream API. Each provider owns its endpoint
//! descriptors and wire shapes and shares the crate-wide models and the
//! response cache.

pub mod polygon;
