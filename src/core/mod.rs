pub mod denormalizer;
pub mod normalization;
pub mod normalizer;
pub mod reference_key;
pub mod serialization;

pub use crate::domain::model::{CacheValue, DomainObject, Normalized, ReferenceMap, SetOptions};
pub use crate::domain::ports::{Cache, ValueCodec};
pub use crate::utils::error::Result;
