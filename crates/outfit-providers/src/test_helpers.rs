//! Test helpers for provider unit tests
//!
//! In-memory mock Storage with spy counters and failure injection for
//! exercising the staging lifecycle without a real backend.

use async_trait::async_trait;
use outfit_storage::{Storage, StorageBackend, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock storage implementation that stores files in memory
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    uploads: Arc<Mutex<Vec<String>>>,
    deletes: Arc<Mutex<Vec<String>>>,
    fail_upload_substring: Mutex<Option<String>>,
    fail_delete_substring: Mutex<Option<String>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            uploads: Arc::new(Mutex::new(Vec::new())),
            deletes: Arc::new(Mutex::new(Vec::new())),
            fail_upload_substring: Mutex::new(None),
            fail_delete_substring: Mutex::new(None),
        }
    }

    /// Make uploads whose key contains `substring` fail
    pub fn fail_uploads_containing(&self, substring: &str) {
        *self.fail_upload_substring.lock().unwrap() = Some(substring.to_string());
    }

    /// Make deletes whose key contains `substring` fail
    pub fn fail_deletes_containing(&self, substring: &str) {
        *self.fail_delete_substring.lock().unwrap() = Some(substring.to_string());
    }

    /// Keys currently held in storage
    pub fn stored_keys(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    /// Keys passed to delete, in call order (including failed attempts)
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.lock().unwrap().len()
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        if let Some(ref substring) = *self.fail_upload_substring.lock().unwrap() {
            if storage_key.contains(substring.as_str()) {
                return Err(StorageError::UploadFailed(format!(
                    "injected failure for {}",
                    storage_key
                )));
            }
        }

        self.uploads.lock().unwrap().push(storage_key.to_string());
        self.files
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data);
        Ok(format!("https://example.com/{}", storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.deletes.lock().unwrap().push(storage_key.to_string());

        if let Some(ref substring) = *self.fail_delete_substring.lock().unwrap() {
            if storage_key.contains(substring.as_str()) {
                return Err(StorageError::DeleteFailed(format!(
                    "injected failure for {}",
                    storage_key
                )));
            }
        }

        self.files.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
