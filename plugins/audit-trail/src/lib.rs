//! Audit trail interceptor.
//!
//! Counts what flows through the hidden chain and, when the host shuts the
//! chain down, leaves a JSON summary in the blob store under the `audit`
//! namespace. Each run stores a new version so earlier summaries are kept.
use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use semver::Version;
use serde::Serialize;
use sluice_core::error_code::InterceptorErrors;
use sluice_core::interceptor::InterceptorDescriptor;
use sluice_core::storage::blob::validate_name;
use sluice_core::{ConfigIssue, Interceptor, InterceptorContext, Param, Record, StageError};

pub const NAME: &str = "audit-trail";
pub const AUDIT_NAMESPACE: &str = "audit";
pub const DEFAULT_ID: &str = "audit-trail";

/// Registration entry for hosts that want the audit trail
pub fn descriptor() -> InterceptorDescriptor {
    InterceptorDescriptor::new(
        NAME,
        Version::new(0, 1, 0),
        "Counts batches and stores a summary blob on shutdown",
        || Box::new(AuditTrailInterceptor::default()),
    )
}

/// Summary written on destroy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub batches: u64,
    pub records_in: u64,
    pub records_out: u64,
}

#[derive(Default)]
pub struct AuditTrailInterceptor {
    id: String,
    summary: AuditSummary,
    context: Option<Arc<dyn InterceptorContext>>,
}

impl AuditTrailInterceptor {
    pub fn summary(&self) -> &AuditSummary {
        &self.summary
    }

    fn write_summary(&self, context: &dyn InterceptorContext) {
        let content = match serde_json::to_string(&self.summary) {
            Ok(content) => content,
            Err(e) => {
                warn!("Cannot serialize audit summary: {}", e);
                return;
            }
        };

        let store = context.blob_store();
        let version = store
            .latest_version(AUDIT_NAMESPACE, &self.id)
            .map(|v| v + 1)
            .unwrap_or(1);
        match store.store(AUDIT_NAMESPACE, &self.id, version, &content) {
            Ok(()) => info!("Stored audit summary {}/{} version {}", AUDIT_NAMESPACE, self.id, version),
            Err(e) => warn!("Cannot store audit summary: {}", e),
        }
    }
}

impl Interceptor for AuditTrailInterceptor {
    fn init(&mut self, parameters: &HashMap<String, String>, context: Arc<dyn InterceptorContext>) -> Vec<ConfigIssue> {
        self.id = parameters
            .get("id")
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_ID.to_string());

        // The id names a blob, so reject it now rather than losing the summary at destroy
        if let Err(e) = validate_name(&self.id) {
            return vec![context.issue(
                InterceptorErrors::Interceptor0004,
                [Param::from("id"), Param::from(&self.id), Param::cause(e)],
            )];
        }
        self.context = Some(context);
        debug!("Audit trail writing to {}/{}", AUDIT_NAMESPACE, self.id);
        Vec::new()
    }

    fn intercept(&mut self, records: Vec<Record>) -> Result<Vec<Record>, StageError> {
        self.summary.batches += 1;
        self.summary.records_in += records.len() as u64;
        self.summary.records_out += records.len() as u64;
        info!("Audit: batch {} with {} record(s)", self.summary.batches, records.len());
        Ok(records)
    }

    fn destroy(&mut self) {
        // Nothing to report when init never ran
        if let Some(context) = self.context.take() {
            self.write_summary(context.as_ref());
        }
    }
}
