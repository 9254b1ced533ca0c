//! Provider abstraction trait
//!
//! This module defines the ImageProvider trait that all generative backends
//! must implement, and the error taxonomy shared by the adapters.

use async_trait::async_trait;
use outfit_core::{GeneratedImage, GenerationRequest};
use thiserror::Error;

/// Provider operation errors
///
/// The variants separate the failure classes that matter operationally:
/// missing credentials (misconfiguration, detected at construction),
/// transport failures (network or provider-side, with the provider's message
/// attached), semantically-empty responses (the call succeeded but returned
/// no image), and unparseable responses.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider credentials not configured: {0}")]
    MissingCredentials(String),

    #[error("Provider request failed: {0}")]
    Transport(String),

    #[error("Provider returned no image: {0}")]
    NoImage(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request input: {0}")]
    InvalidInput(String),

    #[error("Artifact staging failed: {0}")]
    Staging(String),
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

impl From<ProviderError> for outfit_core::AppError {
    fn from(err: ProviderError) -> Self {
        use outfit_core::AppError;
        match err {
            ProviderError::MissingCredentials(msg) => AppError::Configuration(msg),
            ProviderError::Transport(msg) => AppError::Provider(msg),
            ProviderError::NoImage(msg) => AppError::GenerationFailed(msg),
            ProviderError::InvalidResponse(msg) => AppError::Provider(msg),
            ProviderError::InvalidInput(msg) => AppError::InvalidInput(msg),
            ProviderError::Staging(msg) => AppError::Storage(msg),
        }
    }
}

/// Generative image provider abstraction
///
/// One call to `generate` performs exactly one outbound generation request.
/// Adapters must tolerate partially-empty asset sets (missing selfie or
/// destination, zero clothing items) and must never return an empty image:
/// a response without an image part is a `NoImage` error.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short provider name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Run one generation request to completion
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<GeneratedImage>;
}
