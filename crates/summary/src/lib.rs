//! # Incident Summary
//!
//! Structured summary payload for the selected categories and its rendering
//! into a text-generation prompt.
//!
//! ```text
//! filtered incidents + RelationGraph + selected categories
//!     │
//!     └──> SummaryPayloadBuilder ──> SummaryOutcome
//!                                      ├─ NoCategoriesSelected
//!                                      ├─ NoData
//!                                      └─ Ready(SummaryPayload)
//!                                             │
//!                                             └──> PromptComposer
//!                                                    ├─ summarize
//!                                                    └─ ask(question)
//! ```

mod error;
pub mod format;
mod payload;
mod prompt;

pub use error::{Result, SummaryError};
pub use payload::{
    CategoryBreakdown, CategoryConnections, NetworkSummary, SummaryOutcome, SummaryPayload,
    SummaryPayloadBuilder, DEFAULT_TOP_OVERALL, DEFAULT_TOP_PER_CATEGORY,
};
pub use prompt::{PromptComposer, ASK_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT};
