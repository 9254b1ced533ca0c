//! Outfit Storage Library
//!
//! Storage abstraction and implementations for staged provider artifacts.
//! Providers that cannot accept images inline upload them here first and
//! delete them once the generation call completes, so every object written
//! through this crate is short-lived by design of the callers.
//!
//! # Storage key format
//!
//! Staged artifacts live under a single `staging/` prefix:
//!
//! - `staging/{timestamp_millis}_{role}_{index}_{filename}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized
//! in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::staging_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use outfit_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
