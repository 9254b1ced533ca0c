//! Shared key generation for storage backends.
//!
//! Key format: `staging/{timestamp_millis}_{role}_{index}_{filename}`. The timestamp
//! prefix keeps concurrent requests from colliding on identically-named
//! uploads and makes orphaned artifacts easy to spot by age.

use outfit_core::AssetRole;

/// Generate a staging key for one asset of a generation request.
///
/// `index` disambiguates multiple assets with the same role (clothing items)
/// uploaded in the same millisecond.
pub fn staging_key(role: AssetRole, index: usize, filename: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let basename = sanitize_filename(filename);
    format!("staging/{}_{}_{}_{}", millis, role, index, basename)
}

/// Strip any path components and characters that are unsafe in a storage key.
fn sanitize_filename(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
