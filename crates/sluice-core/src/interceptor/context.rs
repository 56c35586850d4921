use std::fmt;
use std::sync::Arc;

use crate::error_code::ErrorCode;
use crate::interceptor::issue::ConfigIssue;
use crate::interceptor::InterceptorContext;
use crate::stage_error::Param;
use crate::storage::{BlobStore, HostConfig};

/// Context handed by the host to one interceptor instance
#[derive(Clone)]
pub struct HostContext {
    interceptor: String,
    config: Arc<HostConfig>,
    blob_store: Arc<dyn BlobStore>,
}

impl HostContext {
    pub fn new(interceptor: impl Into<String>, config: Arc<HostConfig>, blob_store: Arc<dyn BlobStore>) -> Self {
        Self {
            interceptor: interceptor.into(),
            config,
            blob_store,
        }
    }

    /// Same host services, attributed to another interceptor
    pub fn for_interceptor(&self, interceptor: impl Into<String>) -> Self {
        Self {
            interceptor: interceptor.into(),
            config: Arc::clone(&self.config),
            blob_store: Arc::clone(&self.blob_store),
        }
    }

    pub fn interceptor(&self) -> &str {
        &self.interceptor
    }

    pub fn host_config(&self) -> &HostConfig {
        &self.config
    }
}

impl InterceptorContext for HostContext {
    fn create_config_issue(&self, code: Arc<dyn ErrorCode>, args: Vec<Param>) -> ConfigIssue {
        ConfigIssue::new(self.interceptor.clone(), code, args)
    }

    fn get_config(&self, name: &str) -> Option<String> {
        self.config.get(name)
    }

    fn blob_store(&self) -> Arc<dyn BlobStore> {
        Arc::clone(&self.blob_store)
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("interceptor", &self.interceptor)
            .field("blob_store", &self.blob_store)
            .finish()
    }
}
