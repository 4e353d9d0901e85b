use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Visualization failure: {0}")]
    VisualizationFailure(String),

    #[error("Degenerate population: {0}")]
    Degenerate(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Serde error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;

pub(crate) fn invalid(msg: impl Into<String>) -> PlanError {
    PlanError::InvalidArgument(msg.into())
}
