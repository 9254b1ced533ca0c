//! Domain models for the outfit generation pipeline.
//!
//! All values here are request-scoped: they are built while handling one
//! HTTP request and dropped when the response is written. Nothing in this
//! module is persisted.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One uploaded file, parsed from a multipart part. Bytes are held in memory
/// for the lifetime of the request only.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedAsset {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }
}

/// Role an uploaded asset plays in the outfit composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    Selfie,
    Clothing,
    Destination,
}

impl AssetRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetRole::Selfie => "selfie",
            AssetRole::Clothing => "clothing",
            AssetRole::Destination => "destination",
        }
    }
}

impl std::fmt::Display for AssetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uploaded assets grouped by role. At most one selfie and one destination;
/// zero or more clothing items in upload order. Empty slots are permitted
/// and flow through to the provider adapters unchanged.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedAssetSet {
    pub selfie: Option<UploadedAsset>,
    pub clothing: Vec<UploadedAsset>,
    pub destination: Option<UploadedAsset>,
}

impl ClassifiedAssetSet {
    /// Total number of images across all slots.
    pub fn image_count(&self) -> usize {
        self.selfie.is_some() as usize
            + self.clothing.len()
            + self.destination.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.image_count() == 0
    }

    /// All assets with their roles, in prompt-presentation order:
    /// selfie first (identity anchor), clothing in upload order, destination last.
    pub fn iter_in_prompt_order(&self) -> impl Iterator<Item = (AssetRole, &UploadedAsset)> {
        self.selfie
            .iter()
            .map(|a| (AssetRole::Selfie, a))
            .chain(self.clothing.iter().map(|a| (AssetRole::Clothing, a)))
            .chain(self.destination.iter().map(|a| (AssetRole::Destination, a)))
    }
}

/// Which generative backend handles the request. Selected by the caller via
/// the endpoint path; exactly one backend is invoked per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Gemini => write!(f, "gemini"),
        }
    }
}

/// One outfit generation request. Immutable once built; not persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub style_directive: String,
    pub assets: ClassifiedAssetSet,
}

impl GenerationRequest {
    pub fn new(style_directive: impl Into<String>, assets: ClassifiedAssetSet) -> Self {
        Self {
            style_directive: style_directive.into(),
            assets,
        }
    }
}

/// Terminal success value of the pipeline: one base64-encoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub base64: String,
}
