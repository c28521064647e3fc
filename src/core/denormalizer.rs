use crate::core::reference_key::is_reference_key;
use crate::domain::model::{CacheValue, ReferenceMap, SetOptions};
use crate::domain::ports::Cache;
use crate::utils::error::{CacheError, Result};
use async_trait::async_trait;
use futures::future::{try_join_all, BoxFuture};

/// Looks up the value a reference key points at.
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    async fn resolve(&self, key: &str) -> Result<Option<CacheValue>>;
}

#[async_trait]
impl<C> ReferenceResolver for C
where
    C: Cache<CacheValue> + ?Sized,
{
    async fn resolve(&self, key: &str) -> Result<Option<CacheValue>> {
        self.get(key).await
    }
}

#[async_trait]
impl ReferenceResolver for ReferenceMap {
    async fn resolve(&self, key: &str) -> Result<Option<CacheValue>> {
        Ok(self.get(key).cloned().map(CacheValue::Domain))
    }
}

/// Replaces every reference key string in `value` with the value it points at.
///
/// Resolution is one hop: a resolved value is substituted as-is, even if it
/// contains reference keys itself. A reference that cannot be resolved fails
/// the whole value with [`CacheError::UnresolvedReference`].
pub async fn hydrate_cached_value_references<R>(value: CacheValue, resolver: &R) -> Result<CacheValue>
where
    R: ReferenceResolver + ?Sized,
{
    hydrate_recursively(value, resolver).await
}

fn hydrate_recursively<'a, R>(value: CacheValue, resolver: &'a R) -> BoxFuture<'a, Result<CacheValue>>
where
    R: ReferenceResolver + ?Sized,
{
    Box::pin(async move {
        match value {
            CacheValue::String(candidate) if is_reference_key(&candidate) => {
                match resolver.resolve(&candidate).await? {
                    Some(referenced) => Ok(referenced),
                    None => {
                        let err = CacheError::UnresolvedReference { key: candidate };
                        tracing::warn!("⚠️ {} (Severity: {:?})", err, err.severity());
                        Err(err)
                    }
                }
            }
            CacheValue::Sequence(items) => {
                let hydrated =
                    try_join_all(items.into_iter().map(|item| hydrate_recursively(item, resolver)))
                        .await?;
                Ok(CacheValue::Sequence(hydrated))
            }
            CacheValue::Mapping(entries) => {
                let (keys, items): (Vec<String>, Vec<CacheValue>) = entries.into_iter().unzip();
                let hydrated =
                    try_join_all(items.into_iter().map(|item| hydrate_recursively(item, resolver)))
                        .await?;
                Ok(CacheValue::Mapping(keys.into_iter().zip(hydrated).collect()))
            }
            other @ (CacheValue::Null
            | CacheValue::Bool(_)
            | CacheValue::Number(_)
            | CacheValue::String(_)
            | CacheValue::Domain(_)) => Ok(other),
        }
    })
}

/// A cache which dereferences values on `get`, using the same cache to
/// resolve references. Writes pass through untouched.
///
/// Typically used to read values written by
/// [`WithNormalization`](crate::core::normalization::WithNormalization).
#[derive(Debug, Clone)]
pub struct WithDenormalization<C> {
    cache: C,
}

impl<C: Cache<CacheValue>> WithDenormalization<C> {
    pub fn new(cache: C) -> Self {
        Self { cache }
    }

    pub fn inner(&self) -> &C {
        &self.cache
    }

    pub fn into_inner(self) -> C {
        self.cache
    }
}

pub fn with_denormalization<C: Cache<CacheValue>>(cache: C) -> WithDenormalization<C> {
    WithDenormalization::new(cache)
}

#[async_trait]
impl<C: Cache<CacheValue>> Cache<CacheValue> for WithDenormalization<C> {
    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let Some(found) = self.cache.get(key).await? else {
            return Ok(None);
        };
        let hydrated = hydrate_cached_value_references(found, &self.cache).await?;
        Ok(Some(hydrated))
    }

    async fn set(&self, key: &str, value: CacheValue, options: Option<SetOptions>) -> Result<()> {
        self.cache.set(key, value, options).await
    }
}
