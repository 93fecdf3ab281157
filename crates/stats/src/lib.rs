//! # Incident Stats
//!
//! Count-weighted aggregation of incident rows and the duration → severity
//! color scale shared by both visualizations.

mod aggregator;
mod color;
mod error;

pub use aggregator::{StatsAggregator, WeightedTotals};
pub use color::{ColorScale, Rgb, DEFAULT_THRESHOLD, MAX_DURATION, MIN_DURATION};
pub use error::{Result, StatsError};
