//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image encoding error: {0}")]
    Encoding(String),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("No image was provided")]
    MissingImage,

    #[error("No API key was provided")]
    MissingCredential,

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse failure categories shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingInput,
    MissingCredential,
    EncodingFailure,
    RequestFailure,
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::MissingImage => FailureKind::MissingInput,
            Error::MissingCredential => FailureKind::MissingCredential,
            Error::Image(_) | Error::Encoding(_) | Error::Io(_) => FailureKind::EncodingFailure,
            Error::Serialization(_)
            | Error::Http(_)
            | Error::AiProvider(_)
            | Error::EnvVar(_)
            | Error::Config(_) => FailureKind::RequestFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::MissingImage.kind(), FailureKind::MissingInput);
        assert_eq!(
            Error::MissingCredential.kind(),
            FailureKind::MissingCredential
        );
        assert_eq!(
            Error::Encoding("bad".to_string()).kind(),
            FailureKind::EncodingFailure
        );
        assert_eq!(
            Error::Io(std::io::Error::other("denied")).kind(),
            FailureKind::EncodingFailure
        );
        assert_eq!(
            Error::AiProvider("401".to_string()).kind(),
            FailureKind::RequestFailure
        );
    }
}
