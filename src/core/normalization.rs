use crate::config::NormalizationConfig;
use crate::core::denormalizer::WithDenormalization;
use crate::core::normalizer::normalize_domain_object_references;
use crate::core::reference_key::validate_reference_key;
use crate::domain::model::{CacheValue, Normalized, SetOptions};
use crate::domain::ports::Cache;
use crate::utils::error::{ErrorSeverity, Result};
use async_trait::async_trait;
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;

/// 30 days.
pub const DEFAULT_REFERENCE_SECONDS_UNTIL_EXPIRATION: u64 = 30 * 24 * 60 * 60;

pub type NormalizeFn = Arc<dyn Fn(&CacheValue) -> Result<Normalized> + Send + Sync>;

#[derive(Clone)]
pub struct NormalizationOptions {
    pub normalize: NormalizeFn,

    /// Lifetime of every reference entry, independent of the primary entry's.
    ///
    /// References are shared between many cached values, so this should be
    /// long: it only garbage collects references some time after the last
    /// write that touched them. Expiring a reference early invalidates the
    /// values pointing at it, it never makes them return stale data.
    pub reference_seconds_until_expiration: u64,
}

impl NormalizationOptions {
    pub fn new(normalize: NormalizeFn) -> Self {
        Self {
            normalize,
            reference_seconds_until_expiration: DEFAULT_REFERENCE_SECONDS_UNTIL_EXPIRATION,
        }
    }

    pub fn from_config(config: &NormalizationConfig) -> Self {
        Self::default()
            .with_reference_seconds_until_expiration(config.normalization.reference_seconds_until_expiration)
    }

    pub fn with_reference_seconds_until_expiration(mut self, seconds: u64) -> Self {
        self.reference_seconds_until_expiration = seconds;
        self
    }
}

impl Default for NormalizationOptions {
    fn default() -> Self {
        Self::new(Arc::new(normalize_domain_object_references))
    }
}

impl fmt::Debug for NormalizationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizationOptions")
            .field(
                "reference_seconds_until_expiration",
                &self.reference_seconds_until_expiration,
            )
            .finish_non_exhaustive()
    }
}

/// A cache which normalizes domain objects out of values on `set` and
/// hydrates them back on `get`.
#[derive(Debug, Clone)]
pub struct WithNormalization<C> {
    cache: WithDenormalization<C>,
    options: NormalizationOptions,
}

impl<C: Cache<CacheValue>> WithNormalization<C> {
    pub fn new(cache: C, options: NormalizationOptions) -> Self {
        Self {
            cache: WithDenormalization::new(cache),
            options,
        }
    }

    pub fn options(&self) -> &NormalizationOptions {
        &self.options
    }

    pub fn inner(&self) -> &C {
        self.cache.inner()
    }
}

pub fn with_normalization<C: Cache<CacheValue>>(
    cache: C,
    options: NormalizationOptions,
) -> WithNormalization<C> {
    WithNormalization::new(cache, options)
}

#[async_trait]
impl<C: Cache<CacheValue>> Cache<CacheValue> for WithNormalization<C> {
    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        self.cache.get(key).await
    }

    /// Writes the normalized value and every reference concurrently.
    ///
    /// Reference keys are all validated before anything is written. Once the
    /// writes start, every one of them settles before the first failure is
    /// returned; writes that succeeded are not rolled back.
    async fn set(&self, key: &str, value: CacheValue, options: Option<SetOptions>) -> Result<()> {
        let Normalized {
            value: normalized,
            references,
        } = (self.options.normalize)(&value)?;

        for reference_key in references.keys() {
            validate_reference_key(reference_key)?;
        }

        tracing::debug!(
            "Setting {} with {} normalized references",
            key,
            references.len()
        );

        let cache = self.cache.inner();
        let reference_options = Some(SetOptions::expiring_in(
            self.options.reference_seconds_until_expiration,
        ));

        let mut writes = Vec::with_capacity(references.len() + 1);
        writes.push(cache.set(key, normalized, options));
        for (reference_key, object) in references.iter() {
            writes.push(cache.set(
                reference_key,
                CacheValue::Domain(object.clone()),
                reference_options,
            ));
        }

        let results = join_all(writes).await;
        for err in results.iter().filter_map(|result| result.as_ref().err()) {
            match err.severity() {
                ErrorSeverity::High | ErrorSeverity::Critical => tracing::error!(
                    "❌ Write for {} failed: {} (Severity: {:?})",
                    key,
                    err,
                    err.severity()
                ),
                ErrorSeverity::Low | ErrorSeverity::Medium => tracing::warn!(
                    "⚠️ Write for {} failed: {} (Severity: {:?})",
                    key,
                    err,
                    err.severity()
                ),
            }
        }
        results.into_iter().collect::<Result<Vec<()>>>()?;
        Ok(())
    }
}
