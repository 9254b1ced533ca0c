//! Artifact staging for providers that need durable image URIs.
//!
//! `stage_assets` uploads every asset of a request under a timestamped
//! `staging/` key; `release_artifacts` deletes them again. Callers pair the
//! two around the provider call so that acquire count always equals release
//! count, whatever the call's outcome. Individual delete failures are logged
//! and swallowed; a cleanup problem must never mask the real result.

use outfit_core::{AssetRole, ClassifiedAssetSet};
use outfit_storage::{staging_key, Storage, StorageError, StorageResult};

/// One asset uploaded to temporary storage for the duration of a request.
#[derive(Debug, Clone)]
pub struct StagedArtifact {
    pub role: AssetRole,
    pub content_type: String,
    /// Public or backend-native URI the provider dereferences
    pub uri: String,
    /// Key used to delete the object afterwards
    pub storage_key: String,
}

/// Upload all assets of a request to staging keys, concurrently.
///
/// Returns artifacts in prompt order (selfie, clothing, destination). If any
/// upload fails, the ones that already succeeded are released before the
/// error is returned, so a failed staging pass leaves nothing behind.
pub async fn stage_assets(
    storage: &dyn Storage,
    assets: &ClassifiedAssetSet,
) -> StorageResult<Vec<StagedArtifact>> {
    let uploads = assets
        .iter_in_prompt_order()
        .enumerate()
        .map(|(index, (role, asset))| async move {
            let key = staging_key(role, index, &asset.file_name);
            let uri = storage
                .upload_with_key(&key, asset.data.to_vec(), &asset.content_type)
                .await?;
            tracing::debug!(key = %key, role = %role, "Staged artifact uploaded");
            Ok::<_, StorageError>(StagedArtifact {
                role,
                content_type: asset.content_type.clone(),
                uri,
                storage_key: key,
            })
        });

    let results = futures::future::join_all(uploads).await;

    let mut staged = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(artifact) => staged.push(artifact),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(_) => {}
        }
    }

    if let Some(error) = first_error {
        release_artifacts(storage, &staged).await;
        return Err(error);
    }

    Ok(staged)
}

/// Delete every staged artifact, concurrently.
///
/// Failures are logged per artifact and never propagated. Safe to call with
/// an empty slice and safe to call twice for the same artifacts.
pub async fn release_artifacts(storage: &dyn Storage, artifacts: &[StagedArtifact]) {
    let deletions = artifacts.iter().map(|artifact| async move {
        if let Err(error) = storage.delete(&artifact.storage_key).await {
            tracing::warn!(
                key = %artifact.storage_key,
                %error,
                "Failed to delete staged artifact"
            );
        }
    });

    futures::future::join_all(deletions).await;
}
