//! Generation pipeline
//!
//! One provider call per request: classify (done by the handler), generate,
//! respond. No retries, no partial results; staged artifact cleanup is owned
//! by the provider adapter itself.

use outfit_core::{AppError, GeneratedImage, GenerationRequest};
use outfit_providers::ImageProvider;

/// Run one generation request against the selected provider.
pub async fn run_generation(
    provider: &dyn ImageProvider,
    request: GenerationRequest,
) -> Result<GeneratedImage, AppError> {
    let start = std::time::Instant::now();

    tracing::info!(
        provider = provider.name(),
        image_count = request.assets.image_count(),
        has_selfie = request.assets.selfie.is_some(),
        clothing_count = request.assets.clothing.len(),
        has_destination = request.assets.destination.is_some(),
        "Starting outfit generation"
    );

    let image = provider.generate(&request).await?;

    if image.base64.is_empty() {
        // A provider must never report success with an empty image
        return Err(AppError::GenerationFailed(
            "provider returned an empty image".to_string(),
        ));
    }

    tracing::info!(
        provider = provider.name(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Outfit generation completed"
    );

    Ok(image)
}
