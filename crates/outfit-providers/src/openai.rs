//! OpenAI image-edit adapter
//!
//! One `images/edits` multipart call per generation request. Every uploaded
//! asset is forwarded as a typed file part in prompt order (selfie first,
//! clothing in upload order, destination last); the style directive becomes
//! the prompt.

use crate::provider::{ImageProvider, ProviderError, ProviderResult};
use async_trait::async_trait;
use base64::Engine;
use outfit_core::{Config, GeneratedImage, GenerationRequest, UploadedAsset};
use serde::Deserialize;
use std::time::Duration;

const API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI image generation provider
pub struct OpenAiProvider {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    size: String,
    output_format: String,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

impl OpenAiProvider {
    pub fn new(config: &Config) -> ProviderResult<Self> {
        let api_key = config.openai_api_key.clone().ok_or_else(|| {
            ProviderError::MissingCredentials("OPENAI_API_KEY is not set".to_string())
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()
            .map_err(|e| {
                ProviderError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            api_key,
            model: config.openai_image_model.clone(),
            size: config.openai_image_size.clone(),
            output_format: config.openai_output_format.clone(),
        })
    }

    /// Assets in the order they are sent to the API.
    fn ordered_assets(request: &GenerationRequest) -> Vec<&UploadedAsset> {
        request
            .assets
            .iter_in_prompt_order()
            .map(|(_, asset)| asset)
            .collect()
    }

    fn build_form(&self, request: &GenerationRequest) -> ProviderResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .text("prompt", request.style_directive.clone())
            .text("size", self.size.clone())
            .text("output_format", self.output_format.clone());

        for asset in Self::ordered_assets(request) {
            let part = reqwest::multipart::Part::bytes(asset.data.to_vec())
                .file_name(asset.file_name.clone())
                .mime_str(&asset.content_type)
                .map_err(|e| {
                    ProviderError::InvalidInput(format!(
                        "Invalid content type '{}' for {}: {}",
                        asset.content_type, asset.file_name, e
                    ))
                })?;
            // The edits endpoint accepts multiple source images as image[]
            form = form.part("image[]", part);
        }

        Ok(form)
    }

    /// Fetch an image URL returned instead of inline base64 and re-encode it.
    async fn fetch_and_encode(&self, url: &str) -> ProviderResult<String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to fetch result URL: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::Transport(format!(
                "Result URL fetch returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to read result body: {}", e)))?;

        Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
    }
}

/// Extract the result image from a parsed response body.
///
/// Prefers inline base64; falls back to the URL which the caller must fetch.
fn extract_result(response: ImagesResponse) -> ProviderResult<ResultImage> {
    let first = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::NoImage("response data array is empty".to_string()))?;

    if let Some(b64) = first.b64_json {
        if !b64.is_empty() {
            return Ok(ResultImage::Base64(b64));
        }
    }
    if let Some(url) = first.url {
        if !url.is_empty() {
            return Ok(ResultImage::Url(url));
        }
    }

    Err(ProviderError::NoImage(
        "response contained neither b64_json nor url".to_string(),
    ))
}

enum ResultImage {
    Base64(String),
    Url(String),
}

#[async_trait]
impl ImageProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<GeneratedImage> {
        let image_count = request.assets.image_count();
        tracing::info!(
            provider = self.name(),
            model = %self.model,
            image_count,
            "Sending image edit request"
        );

        let form = self.build_form(request)?;

        let response = self
            .http_client
            .post(format!("{}/images/edits", API_BASE))
            .bearer_auth(&self.api_key)
            .multipart(form)
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

        let parsed: ImagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse body: {}", e)))?;

        let base64 = match extract_result(parsed)? {
            ResultImage::Base64(b64) => b64,
            ResultImage::Url(url) => {
                tracing::debug!(provider = self.name(), "Result returned as URL, refetching");
                self.fetch_and_encode(&url).await?
            }
        };

        tracing::info!(
            provider = self.name(),
            model = %self.model,
            result_bytes = base64.len(),
            "Image edit request completed"
        );

        Ok(GeneratedImage { base64 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outfit_core::{classify_assets, UploadedAsset};

    fn request_with(files: &[&str]) -> GenerationRequest {
        let assets = files
            .iter()
            .map(|name| UploadedAsset::new(*name, "image/jpeg", vec![0u8; 8]))
            .collect();
        GenerationRequest::new("beach sunset look", classify_assets(assets))
    }

    #[test]
    fn test_ordered_assets_preserves_count_and_order() {
        let request = request_with(&["shirt.jpg", "selfie.jpg", "pants.jpg", "location.jpg"]);
        let ordered = OpenAiProvider::ordered_assets(&request);

        assert_eq!(ordered.len(), 4);
        assert_eq!(ordered[0].file_name, "selfie.jpg");
        assert_eq!(ordered[1].file_name, "shirt.jpg");
        assert_eq!(ordered[2].file_name, "pants.jpg");
        assert_eq!(ordered[3].file_name, "location.jpg");
    }

    #[test]
    fn test_ordered_assets_empty_set() {
        let request = request_with(&[]);
        assert!(OpenAiProvider::ordered_assets(&request).is_empty());
    }

    #[test]
    fn test_extract_result_prefers_b64() {
        let response: ImagesResponse =
            serde_json::from_str(r#"{"data":[{"b64_json":"Zm9v","url":"https://x/y.png"}]}"#)
                .unwrap();
        match extract_result(response).unwrap() {
            ResultImage::Base64(b64) => assert_eq!(b64, "Zm9v"),
            ResultImage::Url(_) => panic!("expected inline base64"),
        }
    }

    #[test]
    fn test_extract_result_falls_back_to_url() {
        let response: ImagesResponse =
            serde_json::from_str(r#"{"data":[{"url":"https://x/y.png"}]}"#).unwrap();
        match extract_result(response).unwrap() {
            ResultImage::Url(url) => assert_eq!(url, "https://x/y.png"),
            ResultImage::Base64(_) => panic!("expected url"),
        }
    }

    #[test]
    fn test_extract_result_empty_data_is_no_image() {
        let response: ImagesResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(matches!(
            extract_result(response),
            Err(ProviderError::NoImage(_))
        ));
    }

    #[test]
    fn test_extract_result_empty_b64_is_no_image() {
        let response: ImagesResponse =
            serde_json::from_str(r#"{"data":[{"b64_json":""}]}"#).unwrap();
        assert!(matches!(
            extract_result(response),
            Err(ProviderError::NoImage(_))
        ));
    }
}
