//! Error handling for the memcab library
//!
//! Map operations report "not found" and "already exists" through their
//! boolean and `Option` results. This error type covers everything else:
//! malformed serialized input, invalid configuration, and optional
//! compression backends that were not compiled in. Allocation failure is
//! not reported here; it ends the process through
//! [`Context::fatal`](crate::system::Context::fatal).

use thiserror::Error;

/// Main error type for the memcab library
#[derive(Error, Debug)]
pub enum MemcabError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format or corruption
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Error message describing the issue
        message: String,
    },

    /// Compression/decompression errors
    #[error("Compression error: {message}")]
    Compression {
        /// Error message from the compression backend
        message: String,
    },

    /// Feature not supported or not compiled in
    #[error("Not supported: {feature}")]
    NotSupported {
        /// Description of the unsupported feature
        feature: String,
    },

    /// Configuration errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// Invalid argument passed by the caller
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the rejected parameter
        message: String,
    },

    /// Resource already in use or locked
    #[error("Resource busy: {resource}")]
    ResourceBusy {
        /// Description of the busy resource
        resource: String,
    },
}

impl MemcabError {
    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a compression error
    pub fn compression<S: Into<String>>(message: S) -> Self {
        Self::Compression {
            message: message.into(),
        }
    }

    /// Create a not supported error
    pub fn not_supported<S: Into<String>>(feature: S) -> Self {
        Self::NotSupported {
            feature: feature.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a resource busy error
    pub fn resource_busy<S: Into<String>>(resource: S) -> Self {
        Self::ResourceBusy {
            resource: resource.into(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::ResourceBusy { .. } => true,
            Self::InvalidData { .. } => false,
            Self::Compression { .. } => false,
            Self::NotSupported { .. } => false,
            Self::Configuration { .. } => false,
            Self::InvalidParameter { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidData { .. } => "data",
            Self::Compression { .. } => "compression",
            Self::NotSupported { .. } => "unsupported",
            Self::Configuration { .. } => "config",
            Self::InvalidParameter { .. } => "parameter",
            Self::ResourceBusy { .. } => "resource",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MemcabError>;
