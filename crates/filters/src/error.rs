use incident_protocol::Dimension;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Unknown filter key: {0}")]
    UnknownKey(Dimension),

    #[error("Unknown value '{value}' for filter key {key}")]
    UnknownValue { key: Dimension, value: String },

    #[error("Invalid filter configuration: {0}")]
    InvalidConfig(String),

    #[error("Filter dependencies form a cycle through {0}")]
    CyclicDependency(Dimension),
}
