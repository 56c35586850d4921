//! # Sluice Core Stage Error
//!
//! [`StageError`] is the failure value raised by any processing step that
//! cannot continue with the current unit of work. It carries a symbolic
//! [`ErrorCode`], the positional [`Param`]s for that code's template and,
//! optionally, the underlying failure.
//!
//! The cause travels positionally: when the last parameter is a
//! [`Param::Cause`] it is recognized as the error's `source()`, but it stays in
//! [`StageError::params`] so templates that print it keep working.
pub mod param;

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::error_code::{ErrorCode, ErrorMessage};

pub use param::{Cause, Param};

/// Error raised by stages and interceptors while processing records.
#[derive(Clone)]
pub struct StageError {
    message: ErrorMessage,
    cause: Option<Cause>,
}

impl StageError {
    /// Create an error; a trailing [`Param::Cause`] becomes the cause.
    pub fn new<C, I>(code: C, params: I) -> Self
    where
        C: ErrorCode + 'static,
        I: IntoIterator<Item = Param>,
    {
        Self::from_shared_code(Arc::new(code), params)
    }

    /// Create an error with an explicit cause, appended as the last param.
    pub fn with_cause<C, I, E>(code: C, params: I, cause: E) -> Self
    where
        C: ErrorCode + 'static,
        I: IntoIterator<Item = Param>,
        E: StdError + Send + Sync + 'static,
    {
        let params = params.into_iter().chain(std::iter::once(Param::cause(cause)));
        Self::new(code, params)
    }

    /// Create an error from a code that is already shared.
    pub fn from_shared_code<I>(code: Arc<dyn ErrorCode>, params: I) -> Self
    where
        I: IntoIterator<Item = Param>,
    {
        let params: Vec<Param> = params.into_iter().collect();
        let cause = params.last().and_then(Param::as_cause).cloned();
        Self {
            message: ErrorMessage::new(code, params),
            cause,
        }
    }

    pub fn error_code(&self) -> &dyn ErrorCode {
        self.message.error_code()
    }

    /// All parameters in construction order, including a trailing cause.
    pub fn params(&self) -> &[Param] {
        self.message.params()
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Message rendered with the code's default template.
    pub fn message(&self) -> &str {
        self.message.non_localized()
    }

    /// Message rendered with the installed message catalog.
    pub fn localized_message(&self) -> &str {
        self.message.localized()
    }

    pub fn error_message(&self) -> &ErrorMessage {
        &self.message
    }
}

impl fmt::Debug for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageError")
            .field("code", &self.error_code().code())
            .field("params", &self.params())
            .field("has_cause", &self.cause.is_some())
            .finish()
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl StdError for StageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}
