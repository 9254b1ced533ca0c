//! Asset classification.
//!
//! Assigns each uploaded file to a role. Two mechanisms exist:
//!
//! 1. Filename heuristics over the generic `images` multipart field: a
//!    lower-cased filename containing `"selfie"` goes to the selfie slot and
//!    one containing `"location"` to the destination slot (last match wins in
//!    both cases, no error on duplicates); everything else is a clothing
//!    item, in upload order. This is a de facto wire convention clients rely
//!    on, so it is kept as-is.
//! 2. Explicitly-named multipart fields (`selfie`, `clothing`,
//!    `destination`), which bypass filename inference. Explicit single-slot
//!    roles are applied after classification and therefore win over
//!    heuristic matches.
//!
//! Classification is a pure function over filenames; it performs no
//! validation. A missing selfie, destination, or even an entirely empty
//! asset list is permitted and propagated downstream as empty slots.

use crate::models::{AssetRole, ClassifiedAssetSet, UploadedAsset};

const SELFIE_KEYWORD: &str = "selfie";
const DESTINATION_KEYWORD: &str = "location";

/// Classify assets by filename heuristics, preserving clothing upload order.
pub fn classify_assets(assets: Vec<UploadedAsset>) -> ClassifiedAssetSet {
    let mut set = ClassifiedAssetSet::default();

    for asset in assets {
        let name = asset.file_name.to_lowercase();
        if name.contains(SELFIE_KEYWORD) {
            set.selfie = Some(asset);
        } else if name.contains(DESTINATION_KEYWORD) {
            set.destination = Some(asset);
        } else {
            set.clothing.push(asset);
        }
    }

    set
}

/// Place an explicitly-declared asset into its slot. Single-slot roles
/// overwrite whatever the heuristics put there; clothing appends.
pub fn apply_explicit_role(set: &mut ClassifiedAssetSet, role: AssetRole, asset: UploadedAsset) {
    match role {
        AssetRole::Selfie => set.selfie = Some(asset),
        AssetRole::Clothing => set.clothing.push(asset),
        AssetRole::Destination => set.destination = Some(asset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> UploadedAsset {
        UploadedAsset::new(name, "image/jpeg", vec![1u8, 2, 3])
    }

    #[test]
    fn test_classify_selfie_location_and_clothing() {
        let set = classify_assets(vec![
            asset("shirt.jpg"),
            asset("my_selfie.png"),
            asset("pants.jpg"),
            asset("location_paris.jpg"),
        ]);

        assert_eq!(set.selfie.as_ref().unwrap().file_name, "my_selfie.png");
        assert_eq!(
            set.destination.as_ref().unwrap().file_name,
            "location_paris.jpg"
        );
        let clothing: Vec<_> = set.clothing.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(clothing, vec!["shirt.jpg", "pants.jpg"]);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let set = classify_assets(vec![asset("SELFIE.JPG"), asset("Location.PNG")]);
        assert!(set.selfie.is_some());
        assert!(set.destination.is_some());
        assert!(set.clothing.is_empty());
    }

    #[test]
    fn test_classify_no_matches_all_clothing() {
        let set = classify_assets(vec![asset("a.jpg"), asset("b.jpg"), asset("c.jpg")]);
        assert!(set.selfie.is_none());
        assert!(set.destination.is_none());
        assert_eq!(set.clothing.len(), 3);
        // Original upload order preserved
        assert_eq!(set.clothing[0].file_name, "a.jpg");
        assert_eq!(set.clothing[2].file_name, "c.jpg");
    }

    #[test]
    fn test_classify_empty_input() {
        let set = classify_assets(vec![]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_duplicate_selfie_last_match_wins() {
        let set = classify_assets(vec![asset("selfie_1.jpg"), asset("selfie_2.jpg")]);
        assert_eq!(set.selfie.as_ref().unwrap().file_name, "selfie_2.jpg");
        assert!(set.clothing.is_empty());
    }

    #[test]
    fn test_explicit_role_wins_over_heuristic() {
        let mut set = classify_assets(vec![asset("selfie_old.jpg")]);
        apply_explicit_role(&mut set, AssetRole::Selfie, asset("me.jpg"));
        assert_eq!(set.selfie.as_ref().unwrap().file_name, "me.jpg");

        apply_explicit_role(&mut set, AssetRole::Clothing, asset("jacket.jpg"));
        apply_explicit_role(&mut set, AssetRole::Destination, asset("beach.jpg"));
        assert_eq!(set.clothing.len(), 1);
        assert_eq!(set.destination.as_ref().unwrap().file_name, "beach.jpg");
    }

    #[test]
    fn test_clothing_named_selfie_is_misclassified_by_heuristic() {
        // Documented hazard of the filename convention: a clothing photo
        // whose name contains "selfie" lands in the selfie slot. Callers can
        // avoid this with the explicit role fields.
        let set = classify_assets(vec![asset("selfie_stick_case.jpg")]);
        assert!(set.selfie.is_some());
        assert!(set.clothing.is_empty());
    }
}
