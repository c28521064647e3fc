use crate::domain::model::{
    unescape_mapping_key, CacheValue, DomainObject, SetOptions, DOMAIN_OBJECT_TAG,
    DOMAIN_OBJECT_VALUE,
};
use crate::domain::ports::{Cache, ValueCodec};
use crate::utils::error::{CacheError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type DomainConstructor =
    Arc<dyn Fn(serde_json::Value) -> Result<Arc<dyn DomainObject>> + Send + Sync>;

/// Domain types a codec may revive from their tagged JSON form.
#[derive(Clone, Default)]
pub struct DomainRegistry {
    constructors: HashMap<String, DomainConstructor>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under `name`, which must match what its `domain_name()` returns.
    pub fn with<T>(mut self, name: &str) -> Self
    where
        T: DomainObject + DeserializeOwned + 'static,
    {
        let owned = name.to_string();
        let constructor: DomainConstructor = Arc::new(move |fields| {
            let object: T = serde_json::from_value(fields).map_err(|e| {
                CacheError::MalformedDomainObject {
                    name: owned.clone(),
                    message: e.to_string(),
                }
            })?;
            Ok(Arc::new(object) as Arc<dyn DomainObject>)
        });
        self.constructors.insert(name.to_string(), constructor);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    fn revive(&self, name: &str, fields: serde_json::Value) -> Result<Arc<dyn DomainObject>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| CacheError::UnknownDomainObject {
                name: name.to_string(),
            })?;
        constructor(fields)
    }
}

impl fmt::Debug for DomainRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("DomainRegistry").field("types", &names).finish()
    }
}

/// The default codec: JSON text.
///
/// Domain objects are written as their fields tagged with `_dobj`, and plain
/// mapping keys shaped like that tag are escaped, so any value reads back as
/// it was written. Without a registry, tagged objects read back as plain
/// mappings; with one, registered names are revived as domain objects and
/// unknown names are an error.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    registry: Option<DomainRegistry>,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: DomainRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    fn revive(&self, value: serde_json::Value) -> Result<CacheValue> {
        match value {
            serde_json::Value::Object(mut fields) => {
                let tag = match fields.get(DOMAIN_OBJECT_TAG) {
                    Some(serde_json::Value::String(name)) => Some(name.clone()),
                    _ => None,
                };
                match (tag, &self.registry) {
                    (Some(name), Some(registry)) => {
                        fields.remove(DOMAIN_OBJECT_TAG);
                        let payload = match fields.remove(DOMAIN_OBJECT_VALUE) {
                            Some(inner) => inner,
                            None => serde_json::Value::Object(unescape_fields(fields)),
                        };
                        Ok(CacheValue::Domain(registry.revive(&name, payload)?))
                    }
                    // domain fields were written verbatim below the top level
                    (Some(_), None) => Ok(CacheValue::from(serde_json::Value::Object(
                        unescape_fields(fields),
                    ))),
                    (None, _) => {
                        let entries = fields
                            .into_iter()
                            .map(|(key, item)| -> Result<(String, CacheValue)> {
                                Ok((unescape_mapping_key(key), self.revive(item)?))
                            })
                            .collect::<Result<_>>()?;
                        Ok(CacheValue::Mapping(entries))
                    }
                }
            }
            serde_json::Value::Array(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.revive(item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(CacheValue::Sequence(items))
            }
            other => Ok(CacheValue::from(other)),
        }
    }
}

fn unescape_fields(
    fields: serde_json::Map<String, serde_json::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    fields
        .into_iter()
        .map(|(key, value)| (unescape_mapping_key(key), value))
        .collect()
}

impl ValueCodec for JsonCodec {
    fn serialize(&self, value: &CacheValue) -> Result<String> {
        Ok(serde_json::to_string(&value.to_json())?)
    }

    fn deserialize(&self, raw: &str) -> Result<CacheValue> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        self.revive(value)
    }
}

/// A codec built from a pair of functions.
pub struct FnCodec<S, D> {
    serialize: S,
    deserialize: D,
}

impl<S, D> FnCodec<S, D>
where
    S: Fn(&CacheValue) -> Result<String> + Send + Sync,
    D: Fn(&str) -> Result<CacheValue> + Send + Sync,
{
    pub fn new(serialize: S, deserialize: D) -> Self {
        Self {
            serialize,
            deserialize,
        }
    }
}

impl<S, D> ValueCodec for FnCodec<S, D>
where
    S: Fn(&CacheValue) -> Result<String> + Send + Sync,
    D: Fn(&str) -> Result<CacheValue> + Send + Sync,
{
    fn serialize(&self, value: &CacheValue) -> Result<String> {
        (self.serialize)(value)
    }

    fn deserialize(&self, raw: &str) -> Result<CacheValue> {
        (self.deserialize)(raw)
    }
}

/// Lets a cache which only persists strings hold [`CacheValue`]s.
#[derive(Debug, Clone)]
pub struct WithSerialization<C, K = JsonCodec> {
    cache: C,
    codec: K,
}

impl<C: Cache<String>> WithSerialization<C, JsonCodec> {
    pub fn new(cache: C) -> Self {
        Self::with_codec(cache, JsonCodec::new())
    }
}

impl<C: Cache<String>, K: ValueCodec> WithSerialization<C, K> {
    pub fn with_codec(cache: C, codec: K) -> Self {
        Self { cache, codec }
    }

    pub fn inner(&self) -> &C {
        &self.cache
    }
}

pub fn with_serialization<C: Cache<String>>(cache: C) -> WithSerialization<C> {
    WithSerialization::new(cache)
}

#[async_trait]
impl<C: Cache<String>, K: ValueCodec> Cache<CacheValue> for WithSerialization<C, K> {
    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        match self.cache.get(key).await? {
            Some(raw) => Ok(Some(self.codec.deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: CacheValue, options: Option<SetOptions>) -> Result<()> {
        let serialized = self.codec.serialize(&value)?;
        self.cache.set(key, serialized, options).await
    }
}
