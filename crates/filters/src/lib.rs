//! # Incident Filters
//!
//! Cascading categorical filters over the incident table.
//!
//! ```text
//! toggle / select all / allow-list
//!     │
//!     ├──> FilterState (per-key {value, selected})
//!     │
//!     └──> RecomputeGraph (driver → dependent, acyclic)
//!            └─ TopNSelector re-derives each downstream key
//! ```

mod cascade;
mod config;
mod dependency;
mod error;
mod state;
mod topn;

pub use cascade::CascadingFilters;
pub use config::{FilterConfig, FilterDependency};
pub use dependency::RecomputeGraph;
pub use error::{FilterError, Result};
pub use state::{FilterOption, FilterState};
pub use topn::{DriverMode, TopNSelector};
