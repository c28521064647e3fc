#![allow(dead_code)]

use async_trait::async_trait;
use cache_normalization::{Cache, CacheError, CacheValue, DomainObject, Result, SetOptions};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub isid: String,
    pub name: String,
}

impl Ship {
    pub fn new(isid: &str, name: &str) -> Self {
        Self {
            isid: isid.to_string(),
            name: name.to_string(),
        }
    }
}

impl DomainObject for Ship {
    fn domain_name(&self) -> &str {
        "Ship"
    }

    fn to_json(&self) -> serde_json::Value {
        json!({"isid": self.isid, "name": self.name})
    }

    fn unique_keys(&self) -> &[&str] {
        &["isid"]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub code: String,
    pub country: String,
}

impl DomainObject for Port {
    fn domain_name(&self) -> &str {
        "Port"
    }

    fn to_json(&self) -> serde_json::Value {
        json!({"code": self.code, "country": self.country})
    }
}

/// A literal whose JSON form is a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Count(pub i64);

impl DomainObject for Count {
    fn domain_name(&self) -> &str {
        "Count"
    }

    fn to_json(&self) -> serde_json::Value {
        json!(self.0)
    }
}

/// Shared in-memory store which records each write.
#[derive(Clone)]
pub struct MockCache<V> {
    entries: Arc<Mutex<HashMap<String, V>>>,
    writes: Arc<Mutex<Vec<(String, Option<SetOptions>)>>>,
    unavailable: bool,
}

impl<V: Clone> MockCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            writes: Arc::new(Mutex::new(Vec::new())),
            unavailable: false,
        }
    }

    /// A cache whose every operation fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new()
        }
    }

    pub async fn written_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.writes.lock().await.iter().map(|(k, _)| k.clone()).collect();
        keys.sort();
        keys
    }

    pub async fn options_for(&self, key: &str) -> Option<Option<SetOptions>> {
        self.writes
            .lock()
            .await
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, options)| *options)
    }

    pub async fn raw(&self, key: &str) -> Option<V> {
        self.entries.lock().await.get(key).cloned()
    }

    pub async fn evict(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> Cache<V> for MockCache<V> {
    async fn get(&self, key: &str) -> Result<Option<V>> {
        if self.unavailable {
            return Err(CacheError::Backend(anyhow::anyhow!("cache unavailable")));
        }
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: V, options: Option<SetOptions>) -> Result<()> {
        if self.unavailable {
            return Err(CacheError::Backend(anyhow::anyhow!("cache unavailable")));
        }
        self.writes.lock().await.push((key.to_string(), options));
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

pub fn ship(isid: &str, name: &str) -> CacheValue {
    CacheValue::domain(Ship::new(isid, name))
}

pub fn port(code: &str, country: &str) -> CacheValue {
    CacheValue::domain(Port {
        code: code.to_string(),
        country: country.to_string(),
    })
}
