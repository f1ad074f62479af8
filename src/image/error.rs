use crate::process::ProcessError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while describing or building an image
#[derive(Debug, Error)]
pub enum ImageError {
    /// An image name or platform tag was empty or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A builder method was called out of order
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The external build tool failed to start or exited unsuccessfully
    #[error("External build tool failed: {0}")]
    ExternalProcessFailure(#[from] ProcessError),

    /// The manifest or a staged file could not be written to the staging directory
    #[error("Failed to write {path:?} into the staging directory: {source:#}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl ImageError {
    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        ImageError::InvalidState(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ImageError::InvalidArgument("image name must not be empty".to_string()).to_string(),
            "Invalid argument: image name must not be empty"
        );
        assert_eq!(
            ImageError::invalid_state("no source image").to_string(),
            "Invalid state: no source image"
        );
    }

    #[test]
    fn test_process_error_conversion() {
        let error: ImageError = ProcessError::Failed {
            command: "docker build".to_string(),
            status: Some(1),
            stderr: String::new(),
        }
        .into();

        assert!(matches!(error, ImageError::ExternalProcessFailure(_)));
        assert!(error.to_string().contains("Command 'docker build' has failed"));
    }
}
