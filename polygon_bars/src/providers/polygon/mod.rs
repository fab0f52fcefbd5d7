//! Polygon REST endpoint family.

pub mod endpoint;
pub mod provider;
pub mod response;

pub use provider::PolygonClient;
