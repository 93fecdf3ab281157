//! # Incident Graph
//!
//! Visualization-ready projections of the filtered incident subset.
//!
//! ## Architecture
//!
//! ```text
//! RelationRecord[] ──> RelationGraph (petgraph, undirected)
//!                          │
//! IncidentRecord[] ──> BipartiteProjector
//!                          ├─ Category stats first, then Sub Cat stats
//!                          ├─ RadiusScale (sqrt of count)
//!                          └─ ColorScale (avg hours)
//!                                 │
//!                                 └──> NetworkGraph
//!
//! IncidentRecord[] ──> FlowProjector ──> FlowDiagram (nodes + links per
//!                                        adjacent dimension pair)
//! ```

mod error;
mod flow;
mod projector;
mod scale;
mod types;

pub use error::{GraphError, Result};
pub use flow::{FlowDiagram, FlowLink, FlowNode, FlowProjector, DEFAULT_FLOW_DIMENSIONS};
pub use projector::{BipartiteProjector, NetworkGraph, NetworkLink, NetworkNode};
pub use scale::{RadiusScale, MAX_RADIUS, MIN_RADIUS};
pub use types::{RelationGraph, RelationLink};
