//! Fixtures shared by the unit tests.

use crate::domain::model::{CacheValue, DomainObject, SetOptions};
use crate::domain::ports::Cache;
use crate::utils::error::{CacheError, Result};
use async_trait::async_trait;
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
pub struct Geocode {
    pub latitude: i64,
    pub longitude: i64,
}

impl Geocode {
    pub fn new(latitude: i64, longitude: i64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl DomainObject for Geocode {
    fn domain_name(&self) -> &str {
        "Geocode"
    }

    fn to_json(&self) -> serde_json::Value {
        json!({"latitude": self.latitude, "longitude": self.longitude})
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

/// A domain object whose identity slug is whatever the test says it is.
#[derive(Debug)]
pub struct BrokenSlug(pub &'static str);

impl DomainObject for BrokenSlug {
    fn domain_name(&self) -> &str {
        "BrokenSlug"
    }

    fn to_json(&self) -> serde_json::Value {
        json!({})
    }

    fn identity_slug(&self) -> String {
        self.0.to_string()
    }
}

pub type RecordedWrite<V> = (String, V, Option<SetOptions>);

/// In-memory cache recording every write, in the order it was issued.
#[derive(Clone)]
pub struct MockCache<V> {
    entries: Arc<Mutex<HashMap<String, V>>>,
    writes: Arc<Mutex<Vec<RecordedWrite<V>>>>,
    failing_key: Option<String>,
}

impl<V: Clone> MockCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            writes: Arc::new(Mutex::new(Vec::new())),
            failing_key: None,
        }
    }

    /// Writes to `key` fail with a backend error.
    pub fn failing_on(key: &str) -> Self {
        Self {
            failing_key: Some(key.to_string()),
            ..Self::new()
        }
    }

    pub async fn writes(&self) -> Vec<RecordedWrite<V>> {
        self.writes.lock().await.clone()
    }

    pub async fn write_to(&self, key: &str) -> Option<RecordedWrite<V>> {
        self.writes
            .lock()
            .await
            .iter()
            .find(|(k, _, _)| k == key)
            .cloned()
    }

    pub async fn remove(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> Cache<V> for MockCache<V> {
    async fn get(&self, key: &str) -> Result<Option<V>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: V, options: Option<SetOptions>) -> Result<()> {
        self.writes
            .lock()
            .await
            .push((key.to_string(), value.clone(), options));
        if self.failing_key.as_deref() == Some(key) {
            return Err(CacheError::Backend(anyhow::anyhow!("write to {} rejected", key)));
        }
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

pub fn ship_value(isid: &str, name: &str) -> CacheValue {
    CacheValue::domain(Ship::new(isid, name))
}
