pub mod api;
pub mod attributes;
pub mod cli;
pub mod error;
pub mod geometry;
pub mod normalization;
pub mod types;

pub use api::{NormalizedSeries, SeriesNormalizer};
pub use cli::report::TextReport;
pub use error::{MfnormError, Result};
pub use types::*;
