//! Profile-photo rules.
//!
//! A product has at most one profile photo. After any change to its photo
//! set the number of profile photos is exactly `min(1, photo_count)`:
//!
//! - within one upload batch the first photo asking to be the profile wins;
//! - an upload never displaces a profile photo that already exists;
//! - when nothing is marked, the earliest photo (lowest id) is promoted.
//!
//! Everything here works on plain photo slices so the rules can be checked
//! without a store.

use catalog_core::{DomainError, DomainResult, Entity, PhotoId};

use crate::photo::Photo;

pub fn profile_count(photos: &[Photo]) -> usize {
    photos.iter().filter(|p| p.is_profile()).count()
}

/// The profile photo, if any (lowest id if the set is inconsistent).
pub fn current_profile(photos: &[Photo]) -> Option<PhotoId> {
    photos
        .iter()
        .filter(|p| p.is_profile())
        .map(Photo::id_typed)
        .min()
}

/// Final profile flags for an upload batch, in input order.
///
/// `has_profile` tells whether the product already has a profile photo; if
/// so every request is downgraded.
pub fn resolve_profile_flags(has_profile: bool, requested: &[bool]) -> Vec<bool> {
    let mut taken = has_profile;
    requested
        .iter()
        .map(|&wants| {
            let granted = wants && !taken;
            taken |= granted;
            granted
        })
        .collect()
}

/// Photo to promote when the set has photos but no profile.
pub fn fallback_candidate(photos: &[Photo]) -> Option<PhotoId> {
    if photos.iter().any(Photo::is_profile) {
        return None;
    }
    photos
        .iter()
        .reduce(|earliest, p| if p.created_before(earliest) { p } else { earliest })
        .map(Photo::id_typed)
}

/// Verify the steady-state rule: exactly `min(1, photos.len())` profiles.
pub fn check_invariant(photos: &[Photo]) -> DomainResult<()> {
    let expected = photos.len().min(1);
    let actual = profile_count(photos);
    if actual == expected {
        Ok(())
    } else {
        Err(DomainError::invariant(format!(
            "expected {expected} profile photo(s) among {} photo(s), found {actual}",
            photos.len()
        )))
    }
}
