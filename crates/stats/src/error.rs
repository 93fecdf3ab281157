use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatsError>;

#[derive(Error, Debug, PartialEq)]
pub enum StatsError {
    #[error("Threshold {value} is outside [{min}, {max}]")]
    ThresholdOutOfRange { value: f64, min: f64, max: f64 },
}
