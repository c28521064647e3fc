//! Default identity derivation for domain objects.

use crate::domain::model::DomainObject;
use sha2::{Digest, Sha256};

/// Builds `<domain name>.<identity values>.<sha256 of identity fields>`.
///
/// Identity fields are the object's unique keys, or all of its fields when it
/// declares none. String values are embedded raw, other scalars by their JSON
/// text. The hash covers the key-sorted JSON of the identity fields so two
/// objects with equal identities always share a slug.
pub fn unique_identifier_slug<D: DomainObject + ?Sized>(object: &D) -> String {
    let identity = identity_fields(object);

    let readable: Vec<String> = identity
        .values()
        .filter_map(|value| match value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect();

    // serde_json::Map keeps keys sorted, so this text is canonical
    let canonical = serde_json::Value::Object(identity).to_string();
    let digest = hex::encode(Sha256::digest(canonical.as_bytes()));

    if readable.is_empty() {
        format!("{}.{}", object.domain_name(), digest)
    } else {
        format!("{}.{}.{}", object.domain_name(), readable.join("."), digest)
    }
}

fn identity_fields<D: DomainObject + ?Sized>(
    object: &D,
) -> serde_json::Map<String, serde_json::Value> {
    let fields = match object.to_json() {
        serde_json::Value::Object(fields) => fields,
        other => {
            let mut fields = serde_json::Map::new();
            fields.insert("value".to_string(), other);
            return fields;
        }
    };

    let unique = object.unique_keys();
    if unique.is_empty() {
        return fields;
    }
    unique
        .iter()
        .map(|key| {
            let value = fields.get(*key).cloned().unwrap_or(serde_json::Value::Null);
            (key.to_string(), value)
        })
        .collect()
}
