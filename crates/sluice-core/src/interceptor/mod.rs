//! # Sluice Core Interceptors
//!
//! An interceptor is a pluggable record-processing step that, unlike a
//! user-visible stage, runs hidden inside the execution framework. It is
//! configured only through host configuration, so pipeline users cannot
//! disable it.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`issue`]**: [`ConfigIssue`], the structured problems reported by `init`.
//! - **[`context`]**: [`HostContext`], the host's implementation of
//!   [`InterceptorContext`].
//! - **[`lifecycle`]**: [`ManagedInterceptor`], which enforces the
//!   `Uninitialized -> Ready -> Processing -> Destroyed` state machine.
//! - **[`chain`]**: [`InterceptorChain`], the ordered set of hidden
//!   interceptors a host runs every batch through.
//! - **[`registry`]**: [`InterceptorRegistry`], the name-keyed table of
//!   interceptor factories, and [`InterceptorDefinition`].
//! - **[`builtin`]**: interceptors shipped with the framework.
pub mod builtin;
pub mod chain;
pub mod context;
pub mod issue;
pub mod lifecycle;
pub mod registry;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error_code::ErrorCode;
use crate::record::Record;
use crate::stage_error::{Param, StageError};
use crate::storage::BlobStore;

pub use chain::InterceptorChain;
pub use context::HostContext;
pub use issue::ConfigIssue;
pub use lifecycle::{InterceptorStats, LifecycleState, ManagedInterceptor};
pub use registry::{InterceptorDefinition, InterceptorDescriptor, InterceptorRegistry};

/// Runtime information and services the host offers an interceptor.
///
/// A context is valid for the whole life of the interceptor it was handed
/// to, so implementations may keep the `Arc` they receive in `init`.
pub trait InterceptorContext: Send + Sync {
    /// Build a configuration issue to return from `init`.
    fn create_config_issue(&self, code: Arc<dyn ErrorCode>, args: Vec<Param>) -> ConfigIssue;

    /// Host configuration value, `None` if it is not defined.
    fn get_config(&self, name: &str) -> Option<String>;

    /// The host's shared blob store.
    fn blob_store(&self) -> Arc<dyn BlobStore>;
}

impl<'a> dyn InterceptorContext + 'a {
    /// Convenience wrapper around [`InterceptorContext::create_config_issue`].
    pub fn issue<C, I>(&self, code: C, args: I) -> ConfigIssue
    where
        C: ErrorCode + 'static,
        I: IntoIterator<Item = Param>,
    {
        self.create_config_issue(Arc::new(code), args.into_iter().collect())
    }
}

/// Core trait that all interceptors must implement
pub trait Interceptor: Send {
    /// Initialize the interceptor.
    ///
    /// Called once, before any data is processed. An empty result means the
    /// interceptor is ready. Any issue aborts pipeline initialization; the
    /// host then calls [`destroy`](Interceptor::destroy) without ever calling
    /// [`intercept`](Interceptor::intercept).
    fn init(
        &mut self,
        parameters: &HashMap<String, String>,
        context: Arc<dyn InterceptorContext>,
    ) -> Vec<ConfigIssue>;

    /// Process a batch and return the records that continue downstream.
    ///
    /// Records may be dropped, changed, reordered or synthesized. An error is
    /// fatal for the batch.
    fn intercept(&mut self, records: Vec<Record>) -> Result<Vec<Record>, StageError>;

    /// Release resources acquired in `init` or while processing.
    ///
    /// Called once at shutdown, and also after a failed initialization.
    fn destroy(&mut self);
}

// Test module declaration
#[cfg(test)]
mod tests;
