//! Interceptors shipped with the framework.
use std::collections::HashMap;
use std::sync::Arc;

use semver::Version;

use crate::error_code::InterceptorErrors;
use crate::interceptor::issue::ConfigIssue;
use crate::interceptor::registry::InterceptorDescriptor;
use crate::interceptor::{Interceptor, InterceptorContext};
use crate::record::Record;
use crate::stage_error::{Param, StageError};

/// Version reported by every built-in interceptor
pub const BUILTIN_VERSION: Version = Version::new(0, 1, 0);

pub const PASS_THROUGH: &str = "pass-through";
pub const ATTRIBUTE_STAMP: &str = "attribute-stamp";
pub const FIELD_FILTER: &str = "field-filter";
pub const BLOB_ATTACH: &str = "blob-attach";

/// Descriptors for all built-in interceptors
pub fn descriptors() -> Vec<InterceptorDescriptor> {
    vec![
        InterceptorDescriptor::new(
            PASS_THROUGH,
            BUILTIN_VERSION,
            "Forwards every record unchanged",
            || Box::new(PassThroughInterceptor),
        ),
        InterceptorDescriptor::new(
            ATTRIBUTE_STAMP,
            BUILTIN_VERSION,
            "Stamps a header attribute on every record",
            || Box::new(AttributeStampInterceptor::default()),
        ),
        InterceptorDescriptor::new(
            FIELD_FILTER,
            BUILTIN_VERSION,
            "Drops or rejects records missing a field",
            || Box::new(FieldFilterInterceptor::default()),
        ),
        InterceptorDescriptor::new(
            BLOB_ATTACH,
            BUILTIN_VERSION,
            "Attaches the latest version of a blob to every record",
            || Box::new(BlobAttachInterceptor::default()),
        ),
    ]
}

/// A parameter's trimmed value; blank counts as absent
fn optional<'a>(parameters: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    parameters.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Look up a required parameter, recording an issue when it is absent
fn required<'a>(
    parameters: &'a HashMap<String, String>,
    key: &str,
    context: &dyn InterceptorContext,
    issues: &mut Vec<ConfigIssue>,
) -> Option<&'a str> {
    match optional(parameters, key) {
        Some(value) => Some(value),
        None => {
            issues.push(context.issue(InterceptorErrors::Interceptor0003, [Param::from(key)]));
            None
        }
    }
}

/// Identity interceptor
#[derive(Debug, Default)]
pub struct PassThroughInterceptor;

impl Interceptor for PassThroughInterceptor {
    fn init(&mut self, _parameters: &HashMap<String, String>, _context: Arc<dyn InterceptorContext>) -> Vec<ConfigIssue> {
        Vec::new()
    }

    fn intercept(&mut self, records: Vec<Record>) -> Result<Vec<Record>, StageError> {
        Ok(records)
    }

    fn destroy(&mut self) {}
}

/// Stamps `attribute` with a fixed `value` or the host value of `config_key`
#[derive(Debug, Default)]
pub struct AttributeStampInterceptor {
    attribute: String,
    value: String,
}

impl Interceptor for AttributeStampInterceptor {
    fn init(&mut self, parameters: &HashMap<String, String>, context: Arc<dyn InterceptorContext>) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let attribute = required(parameters, "attribute", context.as_ref(), &mut issues);

        let value = match (optional(parameters, "value"), optional(parameters, "config_key")) {
            (Some(_), Some(_)) => {
                issues.push(context.issue(
                    InterceptorErrors::Interceptor0008,
                    [Param::from("value"), Param::from("config_key")],
                ));
                None
            }
            (Some(value), None) => Some(value.to_string()),
            (None, Some(key)) => {
                let resolved = context.get_config(key);
                if resolved.is_none() {
                    issues.push(context.issue(InterceptorErrors::Interceptor0005, [Param::from(key)]));
                }
                resolved
            }
            (None, None) => {
                issues.push(context.issue(InterceptorErrors::Interceptor0003, [Param::from("value")]));
                None
            }
        };

        if let (Some(attribute), Some(value)) = (attribute, value) {
            self.attribute = attribute.to_string();
            self.value = value;
        }
        issues
    }

    fn intercept(&mut self, mut records: Vec<Record>) -> Result<Vec<Record>, StageError> {
        for record in &mut records {
            record.set_attribute(self.attribute.clone(), self.value.clone());
        }
        Ok(records)
    }

    fn destroy(&mut self) {
        self.attribute.clear();
        self.value.clear();
    }
}

/// What [`FieldFilterInterceptor`] does with a record missing its field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    Drop,
    Fail,
}

impl FilterMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "drop" => Some(FilterMode::Drop),
            "fail" => Some(FilterMode::Fail),
            _ => None,
        }
    }
}

/// Keeps only records whose `field` (a JSON pointer) is present and non-null
#[derive(Debug, Default)]
pub struct FieldFilterInterceptor {
    field: String,
    mode: FilterMode,
}

impl FieldFilterInterceptor {
    fn has_field(&self, record: &Record) -> bool {
        record.field(&self.field).is_some_and(|v| !v.is_null())
    }
}

impl Interceptor for FieldFilterInterceptor {
    fn init(&mut self, parameters: &HashMap<String, String>, context: Arc<dyn InterceptorContext>) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if let Some(field) = required(parameters, "field", context.as_ref(), &mut issues) {
            if field.starts_with('/') {
                self.field = field.to_string();
            } else {
                issues.push(context.issue(
                    InterceptorErrors::Interceptor0004,
                    [
                        Param::from("field"),
                        Param::from(field),
                        Param::from("a JSON pointer must start with '/'"),
                    ],
                ));
            }
        }

        if let Some(mode) = parameters.get("mode") {
            match FilterMode::parse(mode) {
                Some(mode) => self.mode = mode,
                None => issues.push(context.issue(
                    InterceptorErrors::Interceptor0004,
                    [
                        Param::from("mode"),
                        Param::from(mode),
                        Param::from("expected 'drop' or 'fail'"),
                    ],
                )),
            }
        }
        issues
    }

    fn intercept(&mut self, records: Vec<Record>) -> Result<Vec<Record>, StageError> {
        match self.mode {
            FilterMode::Drop => {
                let before = records.len();
                let kept: Vec<Record> = records.into_iter().filter(|r| self.has_field(r)).collect();
                if kept.len() < before {
                    log::debug!("Dropped {} record(s) missing '{}'", before - kept.len(), self.field);
                }
                Ok(kept)
            }
            FilterMode::Fail => {
                if let Some(missing) = records.iter().find(|r| !self.has_field(r)) {
                    return Err(StageError::new(
                        InterceptorErrors::Interceptor0006,
                        [Param::from(missing.source_id()), Param::from(&self.field)],
                    ));
                }
                Ok(records)
            }
        }
    }

    fn destroy(&mut self) {}
}

/// Stamps the latest content of a blob on every record.
///
/// The blob is resolved once, at `init`; a missing blob is a configuration
/// issue rather than a processing failure.
#[derive(Debug, Default)]
pub struct BlobAttachInterceptor {
    attribute: String,
    content: Option<String>,
}

impl Interceptor for BlobAttachInterceptor {
    fn init(&mut self, parameters: &HashMap<String, String>, context: Arc<dyn InterceptorContext>) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let namespace = required(parameters, "namespace", context.as_ref(), &mut issues);
        let id = required(parameters, "id", context.as_ref(), &mut issues);
        let attribute = required(parameters, "attribute", context.as_ref(), &mut issues);

        let (Some(namespace), Some(id), Some(attribute)) = (namespace, id, attribute) else {
            return issues;
        };

        match context.blob_store().retrieve_latest(namespace, id) {
            Ok(content) => {
                self.attribute = attribute.to_string();
                self.content = Some(content);
            }
            Err(e) => issues.push(context.issue(
                InterceptorErrors::Interceptor0007,
                [Param::from(id), Param::from(namespace), Param::cause(e)],
            )),
        }
        issues
    }

    fn intercept(&mut self, mut records: Vec<Record>) -> Result<Vec<Record>, StageError> {
        if let Some(content) = &self.content {
            for record in &mut records {
                record.set_attribute(self.attribute.clone(), content.clone());
            }
        }
        Ok(records)
    }

    fn destroy(&mut self) {
        self.content = None;
    }
}
