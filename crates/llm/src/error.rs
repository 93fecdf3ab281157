use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("empty config value: {key}")]
    EmptyValue { key: &'static str },

    #[error("invalid timeout value: {value}")]
    InvalidTimeout { value: String },

    #[error("failed to read config file {path}: {message}")]
    ReadConfigFile { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    ParseConfigFile { path: String, message: String },

    #[error("client build failed: {message}")]
    BuildClient { message: String },

    #[error("http request failed: {message}")]
    Http { message: String },

    #[error("http status {code}: {message}")]
    HttpStatus { code: u16, message: String },

    #[error("malformed response stream: {message}")]
    MalformedStream { message: String },

    #[error("request superseded by a newer one")]
    Cancelled,
}
