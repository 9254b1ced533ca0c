//! Gemini multimodal generation adapter
//!
//! One `generateContent` call per generation request. The user content is
//! assembled as alternating text/image parts: an intro sentence per role
//! group, the image parts in prompt order, then a fixed closing composition
//! instruction that anchors the subject's identity to the selfie.
//!
//! Images travel either as inline base64 parts (default) or as durable
//! storage URIs staged in object storage and deleted after the call
//! completes, whichever the configuration selects.

use crate::provider::{ImageProvider, ProviderError, ProviderResult};
use crate::staging::{release_artifacts, stage_assets, StagedArtifact};
use async_trait::async_trait;
use base64::Engine;
use outfit_core::config::GeminiImageTransport;
use outfit_core::{AssetRole, Config, GeneratedImage, GenerationRequest};
use outfit_storage::Storage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const SELFIE_INTRO: &str =
    "This is the user's selfie. The generated face must stay fully consistent with it:";
const CLOTHING_INTRO: &str = "These are the clothing items and accessories the user wants to \
     wear. Dress the subject in them naturally:";
const DESTINATION_INTRO: &str = "This is a representative photo of the travel destination. \
     Compose the subject naturally into this scene:";

const CLOSING_INSTRUCTION: &str = "\n
      CRITICAL PRIORITY - FACIAL SIMILARITY:
      The generated face MUST be an EXACT REPLICA of the provided selfie photo.
      - Maintain precise facial features, proportions, and unique characteristics
      - Copy exact eye shape, size, and position
      - Match nose structure and mouth details perfectly
      - Preserve skin tone and complexion exactly
      - Keep identical facial expression
      - Ensure same head tilt and angle

      Secondary Priorities:
      1. Combine the provided outfit onto the figure naturally
      2. Place the person in the given location with appropriate lighting and perspective
      3. Ensure the composition shows the full body clearly and centered

      The final result should look like the exact same person from the selfie, just in a \
      different outfit and location.
      This is ABSOLUTELY CRITICAL - the face must be indistinguishable from the original selfie.";

const SAFETY_CATEGORIES: [&str; 8] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_IMAGE_HATE",
    "HARM_CATEGORY_IMAGE_DANGEROUS_CONTENT",
    "HARM_CATEGORY_IMAGE_HARASSMENT",
    "HARM_CATEGORY_IMAGE_SEXUALLY_EXPLICIT",
];

/// Gemini image generation provider
pub struct GeminiProvider {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    transport: GeminiImageTransport,
    storage: Option<Arc<dyn Storage>>,
    api_base: String,
}

// generateContent request/response structures

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

/// One content part. A part carries exactly one of these fields; the shared
/// struct covers both the request and response sides of the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<BlobData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(value: impl Into<String>) -> Self {
        Part {
            text: Some(value.into()),
            inline_data: None,
            file_data: None,
        }
    }

    fn inline(mime_type: impl Into<String>, base64_data: impl Into<String>) -> Self {
        Part {
            text: None,
            inline_data: Some(BlobData {
                mime_type: mime_type.into(),
                data: base64_data.into(),
            }),
            file_data: None,
        }
    }

    fn file(mime_type: impl Into<String>, file_uri: impl Into<String>) -> Self {
        Part {
            text: None,
            inline_data: None,
            file_data: Some(FileData {
                mime_type: mime_type.into(),
                file_uri: file_uri.into(),
            }),
        }
    }

    fn is_image(&self) -> bool {
        self.inline_data.is_some() || self.file_data.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
    response_modalities: Vec<&'static str>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            temperature: 1.0,
            top_p: 0.95,
            max_output_tokens: 8192,
            response_modalities: vec!["TEXT", "IMAGE"],
        }
    }
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

fn safety_settings_off() -> Vec<SafetySetting> {
    SAFETY_CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category,
            threshold: "OFF",
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

impl GeminiProvider {
    pub fn new(config: &Config, storage: Option<Arc<dyn Storage>>) -> ProviderResult<Self> {
        let api_key = config.gemini_api_key.clone().ok_or_else(|| {
            ProviderError::MissingCredentials("GEMINI_API_KEY is not set".to_string())
        })?;

        if config.gemini_image_transport == GeminiImageTransport::Staged && storage.is_none() {
            return Err(ProviderError::MissingCredentials(
                "Staged image transport requires a configured storage backend".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()
            .map_err(|e| {
                ProviderError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            api_key,
            model: config.gemini_image_model.clone(),
            transport: config.gemini_image_transport,
            storage,
            api_base: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Image parts built from in-memory bytes, in prompt order.
    fn inline_image_parts(request: &GenerationRequest) -> Vec<(AssetRole, Part)> {
        request
            .assets
            .iter_in_prompt_order()
            .map(|(role, asset)| {
                let data = base64::engine::general_purpose::STANDARD.encode(&asset.data);
                (role, Part::inline(asset.content_type.clone(), data))
            })
            .collect()
    }

    /// Image parts referencing staged storage URIs, in prompt order.
    fn staged_image_parts(artifacts: &[StagedArtifact]) -> Vec<(AssetRole, Part)> {
        artifacts
            .iter()
            .map(|artifact| {
                (
                    artifact.role,
                    Part::file(artifact.content_type.clone(), artifact.uri.clone()),
                )
            })
            .collect()
    }

    async fn call(&self, parts: Vec<Part>) -> ProviderResult<GeneratedImage> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig::default(),
            safety_settings: safety_settings_off(),
        };

        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(ProviderError::Transport(format!("{}: {}", status, message)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse body: {}", e)))?;

        let base64 = extract_image_base64(&parsed).ok_or_else(|| {
            ProviderError::NoImage("response contained no image part".to_string())
        })?;

        Ok(GeneratedImage { base64 })
    }
}

/// Interleave intro texts with image parts and append the closing instruction.
///
/// Each role group gets one intro sentence before its first image; groups
/// with no images contribute nothing. A non-empty style directive is added
/// as its own text part before the fixed closing instruction.
fn assemble_user_parts(style_directive: &str, images: Vec<(AssetRole, Part)>) -> Vec<Part> {
    let mut parts = Vec::with_capacity(images.len() + 5);
    let mut last_role: Option<AssetRole> = None;

    for (role, image) in images {
        if last_role != Some(role) {
            let intro = match role {
                AssetRole::Selfie => SELFIE_INTRO,
                AssetRole::Clothing => CLOTHING_INTRO,
                AssetRole::Destination => DESTINATION_INTRO,
            };
            parts.push(Part::text(intro));
            last_role = Some(role);
        }
        parts.push(image);
    }

    if !style_directive.trim().is_empty() {
        parts.push(Part::text(style_directive));
    }
    parts.push(Part::text(CLOSING_INSTRUCTION));

    parts
}

/// Scan all parts of the first candidate for the first inline image.
///
/// The model interleaves text and image parts freely, so the scan must not
/// stop at non-image parts.
fn extract_image_base64(response: &GenerateContentResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    content
        .parts
        .iter()
        .find_map(|part| {
            let inline = part.inline_data.as_ref()?;
            if inline.mime_type.starts_with("image/") {
                Some(inline.data.clone())
            } else {
                None
            }
        })
        .filter(|data| !data.is_empty())
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<GeneratedImage> {
        let image_count = request.assets.image_count();
        tracing::info!(
            provider = self.name(),
            model = %self.model,
            transport = ?self.transport,
            image_count,
            "Sending generation request"
        );

        let result = match self.transport {
            GeminiImageTransport::Inline => {
                let images = Self::inline_image_parts(request);
                let parts = assemble_user_parts(&request.style_directive, images);
                self.call(parts).await
            }
            GeminiImageTransport::Staged => {
                let storage = self.storage.as_ref().ok_or_else(|| {
                    ProviderError::MissingCredentials(
                        "Staged image transport requires a configured storage backend".to_string(),
                    )
                })?;

                let artifacts = stage_assets(storage.as_ref(), &request.assets)
                    .await
                    .map_err(|e| ProviderError::Staging(e.to_string()))?;

                let images = Self::staged_image_parts(&artifacts);
                let parts = assemble_user_parts(&request.style_directive, images);
                let result = self.call(parts).await;

                // Staged artifacts are deleted whether or not the call succeeded
                release_artifacts(storage.as_ref(), &artifacts).await;

                result
            }
        };

        match &result {
            Ok(image) => {
                tracing::info!(
                    provider = self.name(),
                    model = %self.model,
                    result_bytes = image.base64.len(),
                    "Generation request completed"
                );
            }
            Err(error) => {
                tracing::warn!(
                    provider = self.name(),
                    model = %self.model,
                    %error,
                    "Generation request failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockStorage;
    use outfit_core::config::{BaseConfig, GeminiImageTransport};
    use outfit_core::{classify_assets, UploadedAsset};

    fn request_with(files: &[&str]) -> GenerationRequest {
        let assets = files
            .iter()
            .map(|name| UploadedAsset::new(*name, "image/jpeg", vec![1u8, 2, 3]))
            .collect();
        GenerationRequest::new("", classify_assets(assets))
    }

    fn test_config(transport: GeminiImageTransport) -> Config {
        Config {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
            },
            openai_api_key: None,
            openai_image_model: "gpt-image-1".to_string(),
            openai_image_size: "1024x1024".to_string(),
            openai_output_format: "png".to_string(),
            gemini_api_key: Some("test-key".to_string()),
            gemini_image_model: "gemini-2.0-flash-preview-image-generation".to_string(),
            gemini_image_transport: transport,
            provider_timeout_secs: 5,
            storage_backend: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
            max_file_size_bytes: 10 * 1024 * 1024,
            allowed_content_types: vec!["image/jpeg".to_string()],
        }
    }

    #[test]
    fn test_assemble_preserves_image_count() {
        let request = request_with(&["selfie.jpg", "a.jpg", "b.jpg", "location.jpg"]);
        let images = GeminiProvider::inline_image_parts(&request);
        let parts = assemble_user_parts(&request.style_directive, images);

        let image_parts = parts.iter().filter(|p| p.is_image()).count();
        assert_eq!(image_parts, 4);
    }

    #[test]
    fn test_assemble_intro_per_role_group() {
        let request = request_with(&["selfie.jpg", "a.jpg", "b.jpg", "location.jpg"]);
        let images = GeminiProvider::inline_image_parts(&request);
        let parts = assemble_user_parts(&request.style_directive, images);

        let texts: Vec<&str> = parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        // Three role intros plus the closing instruction
        assert_eq!(texts.len(), 4);
        assert_eq!(texts[0], SELFIE_INTRO);
        assert_eq!(texts[1], CLOTHING_INTRO);
        assert_eq!(texts[2], DESTINATION_INTRO);
        assert!(texts[3].contains("FACIAL SIMILARITY"));
    }

    #[test]
    fn test_assemble_empty_set_still_has_closing_instruction() {
        let parts = assemble_user_parts("", vec![]);
        assert_eq!(parts.len(), 1);
        assert!(parts[0].text.as_deref().unwrap().contains("FACIAL SIMILARITY"));
    }

    #[test]
    fn test_assemble_includes_style_directive_when_present() {
        let request = request_with(&["selfie.jpg"]);
        let images = GeminiProvider::inline_image_parts(&request);
        let parts = assemble_user_parts("casual summer outfit", images);

        let texts: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        assert!(texts.contains(&"casual summer outfit"));
    }

    #[test]
    fn test_extract_image_at_non_first_index() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your image:"},
                        {"inlineData": {"mimeType": "text/plain", "data": "bm90LWltYWdl"}},
                        {"inlineData": {"mimeType": "image/png", "data": "aW1hZ2U="}}
                    ]
                }
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(extract_image_base64(&response).unwrap(), "aW1hZ2U=");
    }

    #[test]
    fn test_extract_image_text_only_response() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "I cannot generate that image."}]
                }
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert!(extract_image_base64(&response).is_none());
    }

    #[test]
    fn test_extract_image_no_candidates() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(extract_image_base64(&response).is_none());
    }

    #[tokio::test]
    async fn test_staged_artifacts_released_when_call_fails() {
        let storage = Arc::new(MockStorage::new());
        let provider = GeminiProvider::new(
            &test_config(GeminiImageTransport::Staged),
            Some(storage.clone() as Arc<dyn Storage>),
        )
        .unwrap()
        // Nothing listens here, so the provider call fails with a transport error
        .with_api_base("http://127.0.0.1:1");

        let request = request_with(&["selfie.jpg", "shirt.jpg", "location.jpg"]);
        let result = provider.generate(&request).await;

        assert!(matches!(result, Err(ProviderError::Transport(_))));
        assert_eq!(storage.upload_count(), 3);
        assert_eq!(storage.delete_count(), 3);
        assert!(storage.stored_keys().is_empty());
    }

    #[tokio::test]
    async fn test_location_artifact_deleted_after_provider_failure() {
        let storage = Arc::new(MockStorage::new());
        let provider = GeminiProvider::new(
            &test_config(GeminiImageTransport::Staged),
            Some(storage.clone() as Arc<dyn Storage>),
        )
        .unwrap()
        .with_api_base("http://127.0.0.1:1");

        let request = request_with(&["location.jpg"]);
        let result = provider.generate(&request).await;

        assert!(result.is_err());
        let deleted = storage.deleted_keys();
        assert_eq!(deleted.len(), 1);
        assert!(deleted[0].contains("location.jpg"));
        assert!(storage.stored_keys().is_empty());
    }

    #[test]
    fn test_new_requires_storage_for_staged_transport() {
        let result = GeminiProvider::new(&test_config(GeminiImageTransport::Staged), None);
        assert!(matches!(
            result,
            Err(ProviderError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_new_requires_api_key() {
        let mut config = test_config(GeminiImageTransport::Inline);
        config.gemini_api_key = None;
        let result = GeminiProvider::new(&config, None);
        assert!(matches!(
            result,
            Err(ProviderError::MissingCredentials(_))
        ));
    }
}
