use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnalysisError {
    pub fn config(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
