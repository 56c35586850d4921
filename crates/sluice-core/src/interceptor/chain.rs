use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::interceptor::context::HostContext;
use crate::interceptor::issue::ConfigIssue;
use crate::interceptor::lifecycle::ManagedInterceptor;
use crate::interceptor::{Interceptor, InterceptorContext};
use crate::record::Record;

/// Ordered hidden interceptors that every batch passes through
#[derive(Debug, Default)]
pub struct InterceptorChain {
    interceptors: Vec<ManagedInterceptor>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interceptor: ManagedInterceptor) {
        self.interceptors.push(interceptor);
    }

    /// Append an interceptor to the end of the chain
    pub fn add(&mut self, name: impl Into<String>, interceptor: Box<dyn Interceptor>, parameters: HashMap<String, String>) {
        self.push(ManagedInterceptor::new(name, interceptor, parameters));
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|m| m.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ManagedInterceptor> {
        self.interceptors.iter().find(|m| m.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManagedInterceptor> {
        self.interceptors.iter()
    }

    /// Initialize every interceptor with its own view of `context`
    pub fn init(&mut self, context: &HostContext) -> Result<Vec<ConfigIssue>> {
        self.init_with(|name| Arc::new(context.for_interceptor(name)) as Arc<dyn InterceptorContext>)
    }

    /// Initialize every interceptor, collecting all issues.
    ///
    /// Initialization does not stop at the first interceptor that reports a
    /// problem, so operators see every issue at once. A non-empty result
    /// means the chain is not ready and must be destroyed.
    pub fn init_with<F>(&mut self, mut context_for: F) -> Result<Vec<ConfigIssue>>
    where
        F: FnMut(&str) -> Arc<dyn InterceptorContext>,
    {
        let mut issues = Vec::new();
        for managed in &mut self.interceptors {
            let context = context_for(managed.name());
            issues.extend(managed.init(context)?);
        }

        if issues.is_empty() {
            log::info!("Initialized {} interceptor(s)", self.interceptors.len());
        } else {
            log::warn!(
                "Interceptor initialization reported {} issue(s); chain is not ready",
                issues.len()
            );
        }
        Ok(issues)
    }

    /// Whether every interceptor initialized cleanly and none was destroyed
    pub fn is_ready(&self) -> bool {
        self.interceptors.iter().all(|m| m.is_ready())
    }

    /// Feed `records` through each interceptor in order.
    ///
    /// Nothing runs unless the whole chain is ready. A failure from any
    /// interceptor is fatal: the failing instance stops accepting records, so
    /// the chain refuses every later batch until it is destroyed.
    pub fn intercept(&mut self, records: Vec<Record>) -> Result<Vec<Record>> {
        if let Some(blocked) = self.interceptors.iter().find(|m| !m.is_ready()) {
            return Err(blocked.refuse("intercept"));
        }

        let mut batch = records;
        for managed in &mut self.interceptors {
            batch = managed.intercept(batch).inspect_err(|e| {
                log::error!("Interceptor '{}' failed: {}", managed.name(), e);
            })?;
        }
        Ok(batch)
    }

    /// Destroy all interceptors in reverse order; returns how many ran `destroy`
    pub fn destroy(&mut self) -> usize {
        let mut destroyed = 0;
        for managed in self.interceptors.iter_mut().rev() {
            if managed.destroy() {
                destroyed += 1;
            }
        }
        if destroyed > 0 {
            log::info!("Destroyed {} interceptor(s)", destroyed);
        }
        destroyed
    }
}

impl Drop for InterceptorChain {
    fn drop(&mut self) {
        self.destroy();
    }
}
