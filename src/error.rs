use std::path::PathBuf;

use thiserror::Error;

use crate::domain::HousingCategory;

/// Process-level error: a user-facing message plus the exit code for `hf`.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the forecast lookup pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The postal code has no known geolocation. Nothing was looked up.
    #[error("No geolocation for postal code '{postal_code}'")]
    InvalidPostalCode { postal_code: String },

    /// The caller passed a category label outside the supported set.
    #[error("Unknown housing category '{label}'")]
    UnknownCategory { label: String },

    /// Backing data for a category is missing or malformed.
    #[error("Forecast artifact '{}' unavailable: {reason}", .path.display())]
    ArtifactNotFound { path: PathBuf, reason: String },

    /// The nearest-code fallback had nothing to compare against.
    #[error("No nearest-code candidates available for {category}")]
    NoCandidatesAvailable { category: HousingCategory },
}

impl ResolveError {
    pub(crate) fn artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ResolveError::ArtifactNotFound {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidPostalCode { .. } => {
                AppError::new(2, "Please input a valid Finnish postal code.")
            }
            ResolveError::UnknownCategory { label } => {
                AppError::new(2, format!("Unsupported housing type '{label}'."))
            }
            ResolveError::ArtifactNotFound { .. } => {
                AppError::new(3, "Forecast service is unavailable for this housing type.")
            }
            ResolveError::NoCandidatesAvailable { category } => AppError::new(
                4,
                format!("No forecast models are available to substitute for {category}."),
            ),
        }
    }
}
