/// Domain-specific error types for the hedging engine.
/// Parameter errors abort a run before any output exists. Numeric
/// degeneracy aborts mid-run and discards the partial series.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("numeric degeneracy at step {step}: {detail}")]
    NumericDegeneracy { step: usize, detail: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("worker failed: {0}")]
    Worker(String),
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(e: tokio::task::JoinError) -> Self {
        EngineError::Worker(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
