use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Invalid reference key format: {key:?} does not match the cache reference pattern")]
    InvalidReferenceKeyFormat { key: String },

    #[error(
        "Could not find the normalized value referenced by key {key} in the cache during denormalization. Has it expired?"
    )]
    UnresolvedReference { key: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unknown domain object type: {name}")]
    UnknownDomainObject { name: String },

    #[error("Malformed domain object {name}: {message}")]
    MalformedDomainObject { name: String, message: String },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CacheError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // a broken reference only means the cached entry is unusable
            CacheError::UnresolvedReference { .. } => ErrorSeverity::Low,
            CacheError::Backend(_) | CacheError::IoError(_) => ErrorSeverity::Medium,
            CacheError::SerializationError(_)
            | CacheError::UnknownDomainObject { .. }
            | CacheError::MalformedDomainObject { .. }
            | CacheError::ConfigError { .. }
            | CacheError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            CacheError::InvalidReferenceKeyFormat { .. } => ErrorSeverity::Critical,
        }
    }

    /// True when the error means "treat the requested entry as a cache miss".
    pub fn is_unresolved_reference(&self) -> bool {
        matches!(self, CacheError::UnresolvedReference { .. })
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
