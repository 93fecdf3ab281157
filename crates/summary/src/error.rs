use incident_protocol::NO_DATA_MESSAGE;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SummaryError>;

/// User-facing reasons a summary or answer request is not sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("No categories selected for summarization.")]
    NoCategoriesSelected,

    #[error("{}", NO_DATA_MESSAGE)]
    NoData,

    #[error("Please enter a question to ask.")]
    EmptyQuestion,
}
