//! Stores values containing domain objects in a plain key-value cache without
//! duplicating them.
//!
//! On write, [`WithNormalization`] swaps every domain object for a reference
//! key (`.cache.ref.<identity slug>`) and writes the object under that key
//! with a long, independent lifetime. On read, reference keys are hydrated
//! back into the objects they point at. [`WithSerialization`] adapts caches
//! which only store strings.
//!
//! [`NormalizationConfig`] loads the reference lifetime and logging settings
//! from TOML; [`NormalizationConfig::init_logging`] installs the configured
//! `tracing` subscriber for applications that do not install their own.

pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(test)]
mod testing;

pub use config::NormalizationConfig;
pub use crate::core::denormalizer::{
    hydrate_cached_value_references, with_denormalization, ReferenceResolver, WithDenormalization,
};
pub use crate::core::normalization::{
    with_normalization, NormalizationOptions, NormalizeFn, WithNormalization,
    DEFAULT_REFERENCE_SECONDS_UNTIL_EXPIRATION,
};
pub use crate::core::normalizer::normalize_domain_object_references;
pub use crate::core::reference_key::{
    get_cache_reference_key_for_domain_object, is_reference_key, validate_reference_key,
    CACHE_NORMALIZATION_FOREIGN_KEY_REGEXP,
};
pub use crate::core::serialization::{
    with_serialization, DomainRegistry, FnCodec, JsonCodec, WithSerialization,
};
pub use domain::identity::unique_identifier_slug;
pub use domain::model::{CacheValue, DomainObject, Normalized, ReferenceMap, SetOptions};
pub use domain::ports::{Cache, ValueCodec};
pub use utils::error::{CacheError, ErrorSeverity, Result};
