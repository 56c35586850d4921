use std::fmt;
use std::sync::Arc;

use crate::error_code::{ErrorCode, ErrorMessage};
use crate::stage_error::Param;

/// A configuration problem reported by an interceptor at initialization.
///
/// Interceptors obtain issues through
/// [`InterceptorContext::create_config_issue`](crate::interceptor::InterceptorContext::create_config_issue),
/// which stamps the reporting interceptor as the issue's source.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    source: String,
    message: ErrorMessage,
}

impl ConfigIssue {
    /// Constructor for context implementations
    pub fn new(source: impl Into<String>, code: Arc<dyn ErrorCode>, args: Vec<Param>) -> Self {
        Self {
            source: source.into(),
            message: ErrorMessage::new(code, args),
        }
    }

    /// Name of the interceptor that reported the issue
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn error_code(&self) -> &dyn ErrorCode {
        self.message.error_code()
    }

    pub fn args(&self) -> &[Param] {
        self.message.params()
    }

    pub fn message(&self) -> &str {
        self.message.non_localized()
    }

    pub fn localized_message(&self) -> &str {
        self.message.localized()
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message())
    }
}
