use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Field carrying the domain name when a domain object is rendered as JSON.
pub const DOMAIN_OBJECT_TAG: &str = "_dobj";

/// Field carrying the JSON of a domain object whose fields are not an object.
pub const DOMAIN_OBJECT_VALUE: &str = "_dobj_value";

// `_dobj`, `__dobj`, `___dobj_value`, ...
fn is_reserved_like(key: &str) -> bool {
    let bare = key.trim_start_matches('_');
    bare.len() < key.len() && (bare == "dobj" || bare == "dobj_value")
}

/// Prefixes one `_` to mapping keys that look like the reserved domain object
/// fields, so a rendered mapping never carries a bare tag of its own.
pub fn escape_mapping_key(key: &str) -> Cow<'_, str> {
    if is_reserved_like(key) {
        Cow::Owned(format!("_{}", key))
    } else {
        Cow::Borrowed(key)
    }
}

/// Inverse of [`escape_mapping_key`]. Bare reserved keys are left alone.
pub fn unescape_mapping_key(key: String) -> String {
    if is_reserved_like(&key) && key.starts_with("__") {
        key[1..].to_string()
    } else {
        key
    }
}

/// An identity-bearing value type, e.g. an entity with a unique id or a
/// literal identified by all of its fields.
pub trait DomainObject: fmt::Debug + Send + Sync {
    /// Type discriminator, e.g. `"Ship"`.
    fn domain_name(&self) -> &str;

    /// The object's fields as a JSON object.
    fn to_json(&self) -> serde_json::Value;

    /// Fields that uniquely identify an entity. Empty means every field does.
    fn unique_keys(&self) -> &[&str] {
        &[]
    }

    /// Slug embedding the type discriminator and identity, e.g. `Ship.S1.<hash>`.
    fn identity_slug(&self) -> String {
        crate::domain::identity::unique_identifier_slug(self)
    }
}

impl PartialEq for dyn DomainObject {
    fn eq(&self, other: &Self) -> bool {
        self.domain_name() == other.domain_name() && self.to_json() == other.to_json()
    }
}

/// A value which may be stored in a normalizing cache.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Sequence(Vec<CacheValue>),
    Mapping(BTreeMap<String, CacheValue>),
    Domain(Arc<dyn DomainObject>),
}

impl CacheValue {
    pub fn domain<D: DomainObject + 'static>(object: D) -> Self {
        CacheValue::Domain(Arc::new(object))
    }

    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, CacheValue)>,
    {
        CacheValue::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CacheValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&CacheValue> {
        match self {
            CacheValue::Mapping(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Renders the value as plain JSON. Domain objects become their fields
    /// tagged with [`DOMAIN_OBJECT_TAG`]; a domain object whose JSON is not an
    /// object is carried under [`DOMAIN_OBJECT_VALUE`]. Mapping keys that look
    /// like either field are escaped with [`escape_mapping_key`].
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CacheValue::Null => serde_json::Value::Null,
            CacheValue::Bool(b) => serde_json::Value::Bool(*b),
            CacheValue::Number(n) => serde_json::Value::Number(n.clone()),
            CacheValue::String(s) => serde_json::Value::String(s.clone()),
            CacheValue::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(CacheValue::to_json).collect())
            }
            CacheValue::Mapping(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (escape_mapping_key(k).into_owned(), v.to_json()))
                    .collect(),
            ),
            CacheValue::Domain(object) => {
                let mut fields = match object.to_json() {
                    serde_json::Value::Object(fields) => fields
                        .into_iter()
                        .map(|(k, v)| (escape_mapping_key(&k).into_owned(), v))
                        .collect(),
                    other => {
                        let mut fields = serde_json::Map::new();
                        fields.insert(DOMAIN_OBJECT_VALUE.to_string(), other);
                        fields
                    }
                };
                fields.insert(
                    DOMAIN_OBJECT_TAG.to_string(),
                    serde_json::Value::String(object.domain_name().to_string()),
                );
                serde_json::Value::Object(fields)
            }
        }
    }
}

impl PartialEq for CacheValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CacheValue::Null, CacheValue::Null) => true,
            (CacheValue::Bool(a), CacheValue::Bool(b)) => a == b,
            (CacheValue::Number(a), CacheValue::Number(b)) => a == b,
            (CacheValue::String(a), CacheValue::String(b)) => a == b,
            (CacheValue::Sequence(a), CacheValue::Sequence(b)) => a == b,
            (CacheValue::Mapping(a), CacheValue::Mapping(b)) => a == b,
            (CacheValue::Domain(a), CacheValue::Domain(b)) => **a == **b,
            _ => false,
        }
    }
}

impl From<serde_json::Value> for CacheValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CacheValue::Null,
            serde_json::Value::Bool(b) => CacheValue::Bool(b),
            serde_json::Value::Number(n) => CacheValue::Number(n),
            serde_json::Value::String(s) => CacheValue::String(s),
            serde_json::Value::Array(items) => {
                CacheValue::Sequence(items.into_iter().map(CacheValue::from).collect())
            }
            serde_json::Value::Object(entries) => CacheValue::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, CacheValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::String(value.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::String(value)
    }
}

impl From<bool> for CacheValue {
    fn from(value: bool) -> Self {
        CacheValue::Bool(value)
    }
}

impl From<i64> for CacheValue {
    fn from(value: i64) -> Self {
        CacheValue::Number(value.into())
    }
}

impl<T: Into<CacheValue>> From<Vec<T>> for CacheValue {
    fn from(items: Vec<T>) -> Self {
        CacheValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Reference key → the domain object it was extracted from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceMap(BTreeMap<String, Arc<dyn DomainObject>>);

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins; entries under one key are identity-equal anyway.
    pub fn insert(&mut self, key: String, object: Arc<dyn DomainObject>) {
        self.0.insert(key, object);
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn DomainObject>> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Arc<dyn DomainObject>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for ReferenceMap {
    type Item = (String, Arc<dyn DomainObject>);
    type IntoIter = btree_map::IntoIter<String, Arc<dyn DomainObject>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Output of a normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The value with every domain object replaced by its reference key.
    pub value: CacheValue,
    /// The extracted domain objects, by reference key.
    pub references: ReferenceMap,
}

/// Write options forwarded to the backing cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOptions {
    pub seconds_until_expiration: Option<u64>,
}

impl SetOptions {
    pub fn expiring_in(seconds: u64) -> Self {
        Self {
            seconds_until_expiration: Some(seconds),
        }
    }
}
