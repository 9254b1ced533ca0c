//! Outfit Providers Library
//!
//! Generative-image provider adapters behind the `ImageProvider` trait.
//! Each adapter turns a classified asset set plus a style directive into
//! exactly one outbound API call and one base64-encoded result image.
//!
//! The Gemini adapter optionally stages assets in object storage first
//! (`staging` module); staged artifacts are deleted on every exit path.

pub mod gemini;
pub mod openai;
pub mod provider;
pub mod staging;

#[cfg(test)]
pub mod test_helpers;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use provider::{ImageProvider, ProviderError, ProviderResult};
pub use staging::{release_artifacts, stage_assets, StagedArtifact};
