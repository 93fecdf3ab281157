//! # Incident Dashboard
//!
//! Session layer: owns the uploaded tables, the cascading filter state and
//! the color threshold, and turns every mutation into a fresh view-model.
//!
//! ```text
//! mutation (upload / toggle / select all / allow-list / threshold / reset)
//!     │
//!     └──> recompute
//!            ├─ CascadingFilters ──> filtered subset
//!            ├─ FlowProjector    ──> Panel<FlowDiagram>
//!            └─ BipartiteProjector ──> Panel<NetworkGraph>
//!
//! summarize / ask ──> SummaryPayloadBuilder ──> PromptComposer ──> ChatPrompt
//! ```

mod config;
mod error;
mod session;
mod view;

pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
pub use session::{Dashboard, TableKind};
pub use view::{DashboardView, FilterPanel, Panel};
