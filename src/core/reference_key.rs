use crate::domain::model::DomainObject;
use crate::utils::error::{CacheError, Result};
use regex::Regex;
use std::sync::LazyLock;

pub const CACHE_REFERENCE_KEY_PREFIX: &str = ".cache.ref.";

/// Every reference key written by the normalizer matches this pattern, and
/// every string matching it is dereferenced on read.
pub static CACHE_NORMALIZATION_FOREIGN_KEY_REGEXP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.cache\.ref\..+$").expect("reference key pattern is a valid regex")
});

pub fn is_reference_key(candidate: &str) -> bool {
    CACHE_NORMALIZATION_FOREIGN_KEY_REGEXP.is_match(candidate)
}

pub fn validate_reference_key(key: &str) -> Result<()> {
    if is_reference_key(key) {
        return Ok(());
    }
    tracing::error!("❌ Detected an invalid reference key: {:?}", key);
    Err(CacheError::InvalidReferenceKeyFormat {
        key: key.to_string(),
    })
}

/// Derives `.cache.ref.<identity slug>` for a domain object.
///
/// A key failing the canonical pattern means the identity slug is broken;
/// the caller must abort instead of storing it.
pub fn get_cache_reference_key_for_domain_object<D: DomainObject + ?Sized>(
    object: &D,
) -> Result<String> {
    let key = format!("{}{}", CACHE_REFERENCE_KEY_PREFIX, object.identity_slug());
    validate_reference_key(&key)?;
    Ok(key)
}
