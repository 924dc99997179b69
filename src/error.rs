use crate::activity_validation::ValidationError;
use thiserror::Error;

/// Fatal failures of an analysis run. No partial result accompanies any of them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("dependency cycle detected at activity '{activity}'")]
    Cycle { activity: String },
    #[error("queue is unstable: utilization {utilization:.4} must be below 1")]
    Instability { utilization: f64 },
}

impl AnalysisError {
    /// Activity id the error points at, for user-facing messages.
    pub fn activity(&self) -> Option<&str> {
        match self {
            AnalysisError::Validation(err) => err.activity(),
            AnalysisError::Cycle { activity } => Some(activity.as_str()),
            AnalysisError::Instability { .. } => None,
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
