use crate::domain::model::{CacheValue, SetOptions};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A backing key-value cache. Storage, expiration and eviction are its own
/// business; values handed to `set` are stored as given.
#[async_trait]
pub trait Cache<V: Send + 'static>: Send + Sync {
    /// Returns `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<V>>;
    async fn set(&self, key: &str, value: V, options: Option<SetOptions>) -> Result<()>;
}

#[async_trait]
impl<V, C> Cache<V> for Arc<C>
where
    V: Send + 'static,
    C: Cache<V> + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<V>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: V, options: Option<SetOptions>) -> Result<()> {
        (**self).set(key, value, options).await
    }
}

/// Converts cache values to and from the text a string-only store persists.
pub trait ValueCodec: Send + Sync {
    fn serialize(&self, value: &CacheValue) -> Result<String>;
    fn deserialize(&self, raw: &str) -> Result<CacheValue>;
}
