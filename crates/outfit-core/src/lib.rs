//! Outfit Core Library
//!
//! This crate provides the core domain models, asset classification, error
//! types, and configuration shared across all outfit components.

pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use classifier::{apply_explicit_role, classify_assets};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AssetRole, ClassifiedAssetSet, GeneratedImage, GenerationRequest, Provider, UploadedAsset,
};
pub use storage_types::StorageBackend;
