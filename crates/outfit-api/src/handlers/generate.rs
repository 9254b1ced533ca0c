//! Outfit generation handlers
//!
//! Both endpoints accept the same `multipart/form-data` shape: a `prompt`
//! text field, repeated `images` file parts whose roles are inferred from
//! filenames, and optional explicit `selfie` / `clothing` / `destination`
//! file parts that bypass inference. The endpoint path selects the provider.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::generation;
use crate::state::AppState;
use outfit_core::{
    apply_explicit_role, classify_assets, AppError, AssetRole, ClassifiedAssetSet, Config,
    GenerationRequest, UploadedAsset,
};
use outfit_providers::ImageProvider;

/// Successful generation response
#[derive(Debug, Serialize, ToSchema)]
pub struct OutfitResponse {
    /// Base64-encoded result image
    #[serde(rename = "imageBase64")]
    pub image_base64: String,
}

/// Generate an outfit image via OpenAI
///
/// # Errors
/// - `AppError::Configuration` - OpenAI credentials not configured
/// - `AppError::InvalidInput` - Missing prompt or unsupported file
/// - `AppError::Provider` - Upstream request failure
/// - `AppError::GenerationFailed` - Provider returned no image
#[utoipa::path(
    post,
    path = "/api/v0/outfits/openai",
    tag = "outfits",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image generated successfully", body = OutfitResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse),
        (status = 502, description = "Provider error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "generate_outfit_openai"))]
pub async fn generate_openai(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<OutfitResponse>, HttpAppError> {
    let provider = state.openai.clone().ok_or_else(|| {
        HttpAppError(AppError::Configuration(
            "OpenAI provider is not configured".to_string(),
        ))
    })?;

    let (prompt, assets) = parse_generation_form(multipart, &state.config).await?;

    // The OpenAI edits endpoint requires a prompt
    if prompt.trim().is_empty() {
        return Err(HttpAppError(AppError::InvalidInput(
            "prompt field is required".to_string(),
        )));
    }

    run(provider, prompt, assets).await
}

/// Generate an outfit image via Gemini
///
/// The closing composition instruction is fixed server-side, so the prompt
/// field is optional here.
#[utoipa::path(
    post,
    path = "/api/v0/outfits/gemini",
    tag = "outfits",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image generated successfully", body = OutfitResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse),
        (status = 502, description = "Provider error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "generate_outfit_gemini"))]
pub async fn generate_gemini(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<OutfitResponse>, HttpAppError> {
    let provider = state.gemini.clone().ok_or_else(|| {
        HttpAppError(AppError::Configuration(
            "Gemini provider is not configured".to_string(),
        ))
    })?;

    let (prompt, assets) = parse_generation_form(multipart, &state.config).await?;

    run(provider, prompt, assets).await
}

async fn run(
    provider: Arc<dyn ImageProvider>,
    prompt: String,
    assets: ClassifiedAssetSet,
) -> Result<Json<OutfitResponse>, HttpAppError> {
    let request = GenerationRequest::new(prompt, assets);
    let image = generation::run_generation(provider.as_ref(), request).await?;
    Ok(Json(OutfitResponse {
        image_base64: image.base64,
    }))
}

/// Parse the multipart form into a prompt and a classified asset set.
///
/// Unknown fields are ignored. Explicit role fields are applied after the
/// filename heuristics and therefore win for the single-slot roles.
async fn parse_generation_form(
    mut multipart: Multipart,
    config: &Config,
) -> Result<(String, ClassifiedAssetSet), HttpAppError> {
    let mut prompt = String::new();
    let mut images: Vec<UploadedAsset> = Vec::new();
    let mut explicit: Vec<(AssetRole, UploadedAsset)> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        HttpAppError(AppError::BadRequest(format!(
            "Invalid multipart payload: {}",
            e
        )))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "prompt" => {
                prompt = field.text().await.map_err(|e| {
                    HttpAppError(AppError::BadRequest(format!(
                        "Failed to read prompt field: {}",
                        e
                    )))
                })?;
            }
            "images" | "selfie" | "clothing" | "destination" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    HttpAppError(AppError::BadRequest(format!(
                        "Failed to read file part '{}': {}",
                        file_name, e
                    )))
                })?;

                validate_file(&file_name, &content_type, data.len(), config)?;

                let asset = UploadedAsset::new(file_name, content_type, data);
                match name.as_str() {
                    "selfie" => explicit.push((AssetRole::Selfie, asset)),
                    "clothing" => explicit.push((AssetRole::Clothing, asset)),
                    "destination" => explicit.push((AssetRole::Destination, asset)),
                    _ => images.push(asset),
                }
            }
            _ => {}
        }
    }

    let mut assets = classify_assets(images);
    for (role, asset) in explicit {
        apply_explicit_role(&mut assets, role, asset);
    }

    tracing::debug!(
        image_count = assets.image_count(),
        has_selfie = assets.selfie.is_some(),
        clothing_count = assets.clothing.len(),
        has_destination = assets.destination.is_some(),
        "Parsed generation form"
    );

    Ok((prompt, assets))
}

fn validate_file(
    file_name: &str,
    content_type: &str,
    size: usize,
    config: &Config,
) -> Result<(), HttpAppError> {
    if size == 0 {
        return Err(HttpAppError(AppError::InvalidInput(format!(
            "File '{}' is empty",
            file_name
        ))));
    }

    if size > config.max_file_size_bytes {
        return Err(HttpAppError(AppError::PayloadTooLarge(format!(
            "File '{}' is {} bytes, exceeds max {} bytes",
            file_name, size, config.max_file_size_bytes
        ))));
    }

    let normalized = content_type.to_lowercase();
    if !config.allowed_content_types.contains(&normalized) {
        return Err(HttpAppError(AppError::InvalidInput(format!(
            "Invalid content type '{}' for '{}', allowed: {:?}",
            content_type, file_name, config.allowed_content_types
        ))));
    }

    Ok(())
}
