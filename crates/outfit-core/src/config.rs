//! Configuration module
//!
//! This module provides environment-driven configuration for the API and
//! providers, including server, provider-credential, and storage settings.

use std::env;

use crate::storage_types::StorageBackend;

// Common constants
const DEFAULT_PORT: u16 = 4000;
const MAX_FILE_SIZE_MB: usize = 10;
const PROVIDER_TIMEOUT_SECS: u64 = 120;
const OPENAI_IMAGE_MODEL: &str = "gpt-image-1";
const OPENAI_IMAGE_SIZE: &str = "1024x1024";
const OPENAI_OUTPUT_FORMAT: &str = "png";
const GEMINI_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

/// How the Gemini strategy transports images to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiImageTransport {
    /// Images are embedded as inline base64 parts. No storage involved.
    Inline,
    /// Images are uploaded to object storage first and referenced by URI,
    /// then deleted after the generation call completes.
    Staged,
}

/// Base configuration shared by the server
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    // Provider credentials and models
    pub openai_api_key: Option<String>,
    pub openai_image_model: String,
    pub openai_image_size: String,
    pub openai_output_format: String,
    pub gemini_api_key: Option<String>,
    pub gemini_image_model: String,
    pub gemini_image_transport: GeminiImageTransport,
    pub provider_timeout_secs: u64,
    // Storage configuration (staged Gemini transport only)
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload limits
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
        };

        let gemini_image_transport = match env::var("GEMINI_IMAGE_TRANSPORT")
            .unwrap_or_else(|_| "inline".to_string())
            .to_lowercase()
            .as_str()
        {
            "staged" => GeminiImageTransport::Staged,
            _ => GeminiImageTransport::Inline,
        };

        let storage_backend =
            env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|s| match s.to_lowercase().as_str() {
                    "s3" => Some(StorageBackend::S3),
                    "local" => Some(StorageBackend::Local),
                    _ => None,
                });

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| "image/jpeg,image/png,image/gif,image/webp".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let config = Config {
            base,
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty()),
            openai_image_model: env::var("OPENAI_IMAGE_MODEL")
                .unwrap_or_else(|_| OPENAI_IMAGE_MODEL.to_string()),
            openai_image_size: env::var("OPENAI_IMAGE_SIZE")
                .unwrap_or_else(|_| OPENAI_IMAGE_SIZE.to_string()),
            openai_output_format: env::var("OPENAI_OUTPUT_FORMAT")
                .unwrap_or_else(|_| OPENAI_OUTPUT_FORMAT.to_string()),
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|s| !s.is_empty()),
            gemini_image_model: env::var("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|_| GEMINI_IMAGE_MODEL.to_string()),
            gemini_image_transport,
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| PROVIDER_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(PROVIDER_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_content_types,
        };

        config.validate()?;
        Ok(config)
    }

    /// Fail fast on misconfiguration, before the server accepts any request.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.openai_api_key.is_none() && self.gemini_api_key.is_none() {
            return Err(anyhow::anyhow!(
                "At least one of OPENAI_API_KEY or GEMINI_API_KEY must be set"
            ));
        }

        if self.gemini_image_transport == GeminiImageTransport::Staged {
            let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
            match backend {
                StorageBackend::S3 => {
                    if self.s3_bucket.is_none() {
                        return Err(anyhow::anyhow!(
                            "S3_BUCKET must be set when GEMINI_IMAGE_TRANSPORT=staged with S3 storage"
                        ));
                    }
                    if self.s3_region.is_none() && self.aws_region.is_none() {
                        return Err(anyhow::anyhow!(
                            "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                        ));
                    }
                }
                StorageBackend::Local => {
                    if self.local_storage_path.is_none() {
                        return Err(anyhow::anyhow!(
                            "LOCAL_STORAGE_PATH must be set when using local storage backend"
                        ));
                    }
                    if self.local_storage_base_url.is_none() {
                        return Err(anyhow::anyhow!(
                            "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> Config {
        Config {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
            },
            openai_api_key: Some("sk-test".to_string()),
            openai_image_model: OPENAI_IMAGE_MODEL.to_string(),
            openai_image_size: OPENAI_IMAGE_SIZE.to_string(),
            openai_output_format: OPENAI_OUTPUT_FORMAT.to_string(),
            gemini_api_key: None,
            gemini_image_model: GEMINI_IMAGE_MODEL.to_string(),
            gemini_image_transport: GeminiImageTransport::Inline,
            provider_timeout_secs: PROVIDER_TIMEOUT_SECS,
            storage_backend: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        }
    }

    #[test]
    fn test_validate_requires_some_provider_key() {
        let mut config = minimal_config();
        config.openai_api_key = None;
        config.gemini_api_key = None;
        assert!(config.validate().is_err());

        config.gemini_api_key = Some("key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_staged_transport_requires_storage() {
        let mut config = minimal_config();
        config.gemini_api_key = Some("key".to_string());
        config.gemini_image_transport = GeminiImageTransport::Staged;
        // Default backend is S3 and no bucket is configured
        assert!(config.validate().is_err());

        config.s3_bucket = Some("outfit-staging".to_string());
        config.s3_region = Some("us-east-1".to_string());
        assert!(config.validate().is_ok());

        config.storage_backend = Some(StorageBackend::Local);
        assert!(config.validate().is_err());
        config.local_storage_path = Some("/tmp/outfit".to_string());
        config.local_storage_base_url = Some("http://localhost:4000/media".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inline_transport_needs_no_storage() {
        let config = minimal_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_production() {
        let mut config = minimal_config();
        assert!(!config.is_production());
        config.base.environment = "Production".to_string();
        assert!(config.is_production());
    }
}
