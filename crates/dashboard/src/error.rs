use incident_filters::FilterError;
use incident_stats::StatsError;
use incident_store::StoreError;
use incident_summary::SummaryError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    ParseConfig { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Both the incident and relation tables must be loaded first")]
    AwaitingData,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Summary(#[from] SummaryError),
}
