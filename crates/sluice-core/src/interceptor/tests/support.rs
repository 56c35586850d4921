#![cfg(test)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::error_code::InterceptorErrors;
use crate::interceptor::{ConfigIssue, HostContext, Interceptor, InterceptorContext};
use crate::record::Record;
use crate::stage_error::{Param, StageError};
use crate::storage::{HostConfig, InMemoryBlobStore};

/// Shared log of lifecycle calls, in the order they happened
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Records every lifecycle call and optionally misbehaves on demand
pub struct RecordingInterceptor {
    name: String,
    log: CallLog,
    report_issue: bool,
    fail_intercept: bool,
}

impl RecordingInterceptor {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            report_issue: false,
            fail_intercept: false,
        }
    }

    pub fn with_issue(mut self) -> Self {
        self.report_issue = true;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_intercept = true;
        self
    }

    fn note(&self, call: &str) {
        self.log.lock().unwrap().push(format!("{}:{}", self.name, call));
    }
}

impl Interceptor for RecordingInterceptor {
    fn init(&mut self, _parameters: &HashMap<String, String>, context: Arc<dyn InterceptorContext>) -> Vec<ConfigIssue> {
        self.note("init");
        if self.report_issue {
            vec![context.issue(InterceptorErrors::Interceptor0003, [Param::from("threshold")])]
        } else {
            Vec::new()
        }
    }

    fn intercept(&mut self, records: Vec<Record>) -> Result<Vec<Record>, StageError> {
        self.note("intercept");
        if self.fail_intercept {
            return Err(StageError::new(
                InterceptorErrors::Interceptor0006,
                [Param::from("r1"), Param::from("/id")],
            ));
        }
        Ok(records)
    }

    fn destroy(&mut self) {
        self.note("destroy");
    }
}

pub fn context() -> HostContext {
    HostContext::new("test", Arc::new(HostConfig::default()), InMemoryBlobStore::shared())
}

pub fn records() -> Vec<Record> {
    vec![
        Record::new("r1", json!({"id": 1, "name": "first"})),
        Record::new("r2", json!({"id": 2, "name": "second"})),
    ]
}

pub fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
