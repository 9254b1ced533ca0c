//! Provider and storage wiring.

use crate::state::AppState;
use anyhow::{Context, Result};
use outfit_core::config::GeminiImageTransport;
use outfit_core::Config;
use outfit_providers::{GeminiProvider, ImageProvider, OpenAiProvider};
use outfit_storage::Storage;
use std::sync::Arc;

/// Build the provider adapters declared by the configuration.
///
/// Storage is only created when the Gemini staged transport needs it; the
/// inline transport and the OpenAI adapter never touch object storage.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let storage: Option<Arc<dyn Storage>> = if config.gemini_api_key.is_some()
        && config.gemini_image_transport == GeminiImageTransport::Staged
    {
        let storage = outfit_storage::create_storage(config)
            .await
            .context("Failed to initialize staging storage")?;
        tracing::info!(backend = %storage.backend_type(), "Staging storage initialized");
        Some(storage)
    } else {
        None
    };

    let openai: Option<Arc<dyn ImageProvider>> = if config.openai_api_key.is_some() {
        let provider = OpenAiProvider::new(config).context("Failed to initialize OpenAI provider")?;
        tracing::info!(model = %config.openai_image_model, "OpenAI provider initialized");
        Some(Arc::new(provider))
    } else {
        None
    };

    let gemini: Option<Arc<dyn ImageProvider>> = if config.gemini_api_key.is_some() {
        let provider = GeminiProvider::new(config, storage)
            .context("Failed to initialize Gemini provider")?;
        tracing::info!(
            model = %config.gemini_image_model,
            transport = ?config.gemini_image_transport,
            "Gemini provider initialized"
        );
        Some(Arc::new(provider))
    } else {
        None
    };

    Ok(Arc::new(AppState::new(config.clone(), openai, gemini)))
}
