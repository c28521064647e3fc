use crate::core::reference_key::get_cache_reference_key_for_domain_object;
use crate::domain::model::{CacheValue, Normalized, ReferenceMap};
use crate::utils::error::Result;

/// Replaces every domain object in `value` with its reference key and
/// collects the objects by key.
///
/// For example
/// ```text
/// { ships: [Ship(1), Ship(2), Ship(1)] }
/// ```
/// normalizes to
/// ```text
/// value:      { ships: [".cache.ref.Ship.1.<hash>", ".cache.ref.Ship.2.<hash>", ".cache.ref.Ship.1.<hash>"] }
/// references: { ".cache.ref.Ship.1.<hash>": Ship(1), ".cache.ref.Ship.2.<hash>": Ship(2) }
/// ```
///
/// Strings are never reinterpreted, even when they look like reference keys.
pub fn normalize_domain_object_references(value: &CacheValue) -> Result<Normalized> {
    let mut references = ReferenceMap::new();
    let value = normalize_recursively(value, &mut references)?;
    tracing::debug!("Normalized value with {} references", references.len());
    Ok(Normalized { value, references })
}

fn normalize_recursively(value: &CacheValue, references: &mut ReferenceMap) -> Result<CacheValue> {
    match value {
        CacheValue::Domain(object) => {
            let key = get_cache_reference_key_for_domain_object(object.as_ref())?;
            references.insert(key.clone(), object.clone());
            Ok(CacheValue::String(key))
        }
        CacheValue::Sequence(items) => {
            let normalized = items
                .iter()
                .map(|item| normalize_recursively(item, references))
                .collect::<Result<Vec<_>>>()?;
            Ok(CacheValue::Sequence(normalized))
        }
        CacheValue::Mapping(entries) => {
            let normalized = entries
                .iter()
                .map(|(key, item)| -> Result<(String, CacheValue)> {
                    Ok((key.clone(), normalize_recursively(item, references)?))
                })
                .collect::<Result<_>>()?;
            Ok(CacheValue::Mapping(normalized))
        }
        CacheValue::Null | CacheValue::Bool(_) | CacheValue::Number(_) | CacheValue::String(_) => {
            Ok(value.clone())
        }
    }
}
