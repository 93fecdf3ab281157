use incident_filters::FilterOption;
use incident_graph::{FlowDiagram, NetworkGraph};
use incident_protocol::{Dimension, NO_DATA_MESSAGE};
use serde::Serialize;

/// One visualization: either renderable data or a message to show instead
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Panel<T> {
    Empty { message: String },
    Ready(T),
}

impl<T> Panel<T> {
    pub fn no_data() -> Self {
        Self::Empty {
            message: NO_DATA_MESSAGE.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Empty { .. } => None,
        }
    }
}

/// Dropdown of one filter key, options selected-first then alphabetical
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterPanel {
    pub key: Dimension,
    pub select_all: bool,
    pub options: Vec<FilterOption>,
}

/// Everything the renderer needs after one recompute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub schema_version: u32,
    pub threshold: f64,
    pub filters: Vec<FilterPanel>,

    /// Rows of the filtered subset
    pub matched_rows: usize,

    /// Σcount over the filtered subset
    pub matched_incidents: u64,

    pub flow: Panel<FlowDiagram>,
    pub network: Panel<NetworkGraph>,
}
