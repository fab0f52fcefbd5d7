//! Domain models shared across the crate.

pub mod bar;
pub mod page;
pub mod request_params;
pub mod timeframe;
