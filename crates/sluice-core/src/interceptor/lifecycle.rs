use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::interceptor::issue::ConfigIssue;
use crate::interceptor::{Interceptor, InterceptorContext};
use crate::record::Record;

/// Lifecycle states of a hosted interceptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Created, `init` not called yet
    Uninitialized,
    /// `init` reported no issues
    Ready,
    /// At least one batch went through `intercept`
    Processing,
    /// `init` reported issues or a batch failed; only `destroy` is allowed
    DestroyPending,
    /// Terminal
    Destroyed,
}

impl LifecycleState {
    /// Whether `intercept` may be called
    pub fn accepts_records(&self) -> bool {
        matches!(self, LifecycleState::Ready | LifecycleState::Processing)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Uninitialized => write!(f, "uninitialized"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::Processing => write!(f, "processing"),
            LifecycleState::DestroyPending => write!(f, "destroy-pending"),
            LifecycleState::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Batch counters for one interceptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterceptorStats {
    pub batches: u64,
    pub records_in: u64,
    pub records_out: u64,
}

/// An interceptor owned by the host, together with its lifecycle state.
///
/// The wrapper is what makes the host conforming: `intercept` is refused
/// unless `init` succeeded and no earlier batch failed, and the inner
/// `destroy` runs exactly once, on drop at the latest.
pub struct ManagedInterceptor {
    name: String,
    parameters: HashMap<String, String>,
    interceptor: Box<dyn Interceptor>,
    state: LifecycleState,
    stats: InterceptorStats,
}

impl ManagedInterceptor {
    pub fn new(name: impl Into<String>, interceptor: Box<dyn Interceptor>, parameters: HashMap<String, String>) -> Self {
        Self {
            name: name.into(),
            parameters,
            interceptor,
            state: LifecycleState::Uninitialized,
            stats: InterceptorStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn stats(&self) -> InterceptorStats {
        self.stats
    }

    pub fn is_ready(&self) -> bool {
        self.state.accepts_records()
    }

    pub(crate) fn refuse(&self, operation: &'static str) -> Error {
        Error::Lifecycle {
            interceptor: self.name.clone(),
            state: self.state,
            operation,
        }
    }

    /// Initialize the interceptor and return the issues it reported
    pub fn init(&mut self, context: Arc<dyn InterceptorContext>) -> Result<Vec<ConfigIssue>> {
        if self.state != LifecycleState::Uninitialized {
            return Err(self.refuse("initialize"));
        }

        let issues = self.interceptor.init(&self.parameters, context);
        if issues.is_empty() {
            self.state = LifecycleState::Ready;
            log::debug!("Interceptor '{}' is ready", self.name);
        } else {
            self.state = LifecycleState::DestroyPending;
            for issue in &issues {
                log::warn!("Interceptor '{}' configuration issue: {}", self.name, issue.message());
            }
        }
        Ok(issues)
    }

    /// Run one batch through the interceptor
    pub fn intercept(&mut self, records: Vec<Record>) -> Result<Vec<Record>> {
        if !self.state.accepts_records() {
            return Err(self.refuse("intercept"));
        }

        self.state = LifecycleState::Processing;
        self.stats.batches += 1;
        self.stats.records_in += records.len() as u64;
        let output = match self.interceptor.intercept(records) {
            Ok(output) => output,
            Err(e) => {
                // A failed batch is fatal: no further records reach this instance
                self.state = LifecycleState::DestroyPending;
                log::warn!("Interceptor '{}' failed and awaits destroy: {}", self.name, e);
                return Err(e.into());
            }
        };
        self.stats.records_out += output.len() as u64;
        Ok(output)
    }

    /// Destroy the interceptor; returns `false` if it was already destroyed
    pub fn destroy(&mut self) -> bool {
        if self.state == LifecycleState::Destroyed {
            log::debug!("Interceptor '{}' already destroyed", self.name);
            return false;
        }
        log::debug!("Destroying interceptor '{}' ({})", self.name, self.state);
        self.interceptor.destroy();
        self.state = LifecycleState::Destroyed;
        true
    }
}

impl Drop for ManagedInterceptor {
    fn drop(&mut self) {
        if self.state != LifecycleState::Destroyed {
            log::warn!("Interceptor '{}' dropped without destroy; destroying now", self.name);
            self.destroy();
        }
    }
}

impl fmt::Debug for ManagedInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedInterceptor")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish()
    }
}
