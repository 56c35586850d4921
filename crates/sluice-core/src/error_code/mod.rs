//! # Sluice Core Error Codes
//!
//! Symbolic error codes and the machinery that turns a code plus its
//! parameters into human-readable text.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`message`]**: [`ErrorMessage`], the lazily rendered, cached message for a
//!   `(code, params)` pair, and the `{}` template formatter behind it.
//! - **[`catalog`]**: [`MessageCatalog`], per-locale template overrides used for
//!   localized rendering, and the process-wide installation point.
//!
//! Codes themselves are defined by whoever raises them. The framework ships two
//! enumerations of its own: [`InterceptorErrors`] and [`BlobStoreErrors`].
pub mod catalog;
pub mod message;

use std::fmt;

pub use catalog::{install_catalog, installed_catalog, MessageCatalog};
pub use message::{format_template, ErrorMessage, TemplateError};

/// A symbolic identifier naming a message template.
pub trait ErrorCode: Send + Sync + fmt::Debug {
    /// The stable code, e.g. `INTERCEPTOR_0001`.
    fn code(&self) -> &str;

    /// The default (non-localized) message template.
    fn message(&self) -> &str;
}

/// An error code defined at runtime rather than as an enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCodeDef {
    code: String,
    message: String,
}

impl ErrorCodeDef {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl ErrorCode for ErrorCodeDef {
    fn code(&self) -> &str {
        &self.code
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Error codes raised by the interceptor host and the built-in interceptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterceptorErrors {
    /// Unknown interceptor name
    Interceptor0001,
    /// Registered version does not satisfy the requested requirement
    Interceptor0002,
    /// Missing required parameter
    Interceptor0003,
    /// Invalid parameter value
    Interceptor0004,
    /// Host configuration key is not defined
    Interceptor0005,
    /// Record is missing a required field
    Interceptor0006,
    /// Blob referenced by an interceptor cannot be loaded
    Interceptor0007,
    /// Parameters that exclude each other were both given
    Interceptor0008,
}

impl ErrorCode for InterceptorErrors {
    fn code(&self) -> &str {
        match self {
            InterceptorErrors::Interceptor0001 => "INTERCEPTOR_0001",
            InterceptorErrors::Interceptor0002 => "INTERCEPTOR_0002",
            InterceptorErrors::Interceptor0003 => "INTERCEPTOR_0003",
            InterceptorErrors::Interceptor0004 => "INTERCEPTOR_0004",
            InterceptorErrors::Interceptor0005 => "INTERCEPTOR_0005",
            InterceptorErrors::Interceptor0006 => "INTERCEPTOR_0006",
            InterceptorErrors::Interceptor0007 => "INTERCEPTOR_0007",
            InterceptorErrors::Interceptor0008 => "INTERCEPTOR_0008",
        }
    }

    fn message(&self) -> &str {
        match self {
            InterceptorErrors::Interceptor0001 => "Interceptor '{}' is not registered",
            InterceptorErrors::Interceptor0002 => "Interceptor '{}' version {} does not satisfy '{}'",
            InterceptorErrors::Interceptor0003 => "Required parameter '{}' is missing",
            InterceptorErrors::Interceptor0004 => "Parameter '{}' has invalid value '{}': {}",
            InterceptorErrors::Interceptor0005 => "Configuration '{}' is not defined",
            InterceptorErrors::Interceptor0006 => "Record '{}' is missing field '{}'",
            InterceptorErrors::Interceptor0007 => "Cannot load blob '{}' from namespace '{}': {}",
            InterceptorErrors::Interceptor0008 => "Parameters '{}' and '{}' cannot be used together",
        }
    }
}

/// Error codes raised by [`BlobStore`](crate::storage::BlobStore) implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobStoreErrors {
    /// Object does not exist
    BlobStore0001,
    /// Version already exists
    BlobStore0002,
    /// Version does not exist
    BlobStore0003,
    /// Underlying storage failure
    BlobStore0004,
    /// Invalid namespace or id
    BlobStore0005,
}

impl ErrorCode for BlobStoreErrors {
    fn code(&self) -> &str {
        match self {
            BlobStoreErrors::BlobStore0001 => "BLOB_STORE_0001",
            BlobStoreErrors::BlobStore0002 => "BLOB_STORE_0002",
            BlobStoreErrors::BlobStore0003 => "BLOB_STORE_0003",
            BlobStoreErrors::BlobStore0004 => "BLOB_STORE_0004",
            BlobStoreErrors::BlobStore0005 => "BLOB_STORE_0005",
        }
    }

    fn message(&self) -> &str {
        match self {
            BlobStoreErrors::BlobStore0001 => "Object '{}' does not exist in namespace '{}'",
            BlobStoreErrors::BlobStore0002 => "Version {} of object '{}' already exists in namespace '{}'",
            BlobStoreErrors::BlobStore0003 => "Version {} of object '{}' does not exist in namespace '{}'",
            BlobStoreErrors::BlobStore0004 => "Blob store operation '{}' failed: {}",
            BlobStoreErrors::BlobStore0005 => "Invalid blob name '{}': {}",
        }
    }
}
