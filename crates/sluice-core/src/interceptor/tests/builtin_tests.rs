#![cfg(test)]

use std::sync::Arc;

use serde_json::json;

use super::support::{context, params, records};
use crate::interceptor::builtin::{
    AttributeStampInterceptor, BlobAttachInterceptor, FieldFilterInterceptor, FilterMode, PassThroughInterceptor,
};
use crate::interceptor::{HostContext, Interceptor, InterceptorContext};
use crate::record::Record;
use crate::storage::config::ConfigData;
use crate::storage::{HostConfig, InMemoryBlobStore};

fn ctx() -> Arc<dyn InterceptorContext> {
    Arc::new(context())
}

fn codes(issues: &[crate::interceptor::ConfigIssue]) -> Vec<String> {
    issues.iter().map(|i| i.error_code().code().to_string()).collect()
}

#[test]
fn test_pass_through_keeps_batch() {
    let mut interceptor = PassThroughInterceptor;
    assert!(interceptor.init(&params(&[]), ctx()).is_empty());
    assert_eq!(interceptor.intercept(records()).unwrap(), records());
    assert!(interceptor.intercept(Vec::new()).unwrap().is_empty());
    interceptor.destroy();
}

#[test]
fn test_attribute_stamp_with_value() {
    let mut interceptor = AttributeStampInterceptor::default();
    let issues = interceptor.init(&params(&[("attribute", "env"), ("value", "prod")]), ctx());
    assert!(issues.is_empty());

    let output = interceptor.intercept(records()).unwrap();
    assert_eq!(output.len(), 2);
    assert!(output.iter().all(|r| r.attribute("env") == Some("prod")));
    assert_eq!(output[0].value, records()[0].value);
}

#[test]
fn test_attribute_stamp_from_host_config() {
    let mut data = ConfigData::new();
    data.set("region", "eu-west").unwrap();
    let context: Arc<dyn InterceptorContext> = Arc::new(HostContext::new(
        "stamp",
        Arc::new(HostConfig::from_data(data)),
        InMemoryBlobStore::shared(),
    ));

    let mut interceptor = AttributeStampInterceptor::default();
    let issues = interceptor.init(&params(&[("attribute", "region"), ("config_key", "region")]), context);
    assert!(issues.is_empty());
    let output = interceptor.intercept(records()).unwrap();
    assert_eq!(output[1].attribute("region"), Some("eu-west"));
}

#[test]
fn test_attribute_stamp_issues() {
    let mut interceptor = AttributeStampInterceptor::default();
    let issues = interceptor.init(&params(&[]), ctx());
    assert_eq!(codes(&issues), vec!["INTERCEPTOR_0003", "INTERCEPTOR_0003"]);
    assert_eq!(issues[0].args()[0].to_string(), "attribute");
    assert_eq!(issues[1].args()[0].to_string(), "value");

    let mut interceptor = AttributeStampInterceptor::default();
    let issues = interceptor.init(
        &params(&[("attribute", "env"), ("value", "prod"), ("config_key", "env")]),
        ctx(),
    );
    assert_eq!(codes(&issues), vec!["INTERCEPTOR_0008"]);

    let mut interceptor = AttributeStampInterceptor::default();
    let issues = interceptor.init(&params(&[("attribute", "env"), ("config_key", "undefined.key")]), ctx());
    assert_eq!(codes(&issues), vec!["INTERCEPTOR_0005"]);
    assert_eq!(issues[0].message(), "INTERCEPTOR_0005 - Configuration 'undefined.key' is not defined");
}

#[test]
fn test_blank_parameter_counts_as_missing() {
    let mut interceptor = AttributeStampInterceptor::default();
    let issues = interceptor.init(&params(&[("attribute", "   "), ("value", "x")]), ctx());
    assert_eq!(codes(&issues), vec!["INTERCEPTOR_0003"]);
}

#[test]
fn test_attribute_stamp_blank_value_or_key() {
    let mut interceptor = AttributeStampInterceptor::default();
    let issues = interceptor.init(&params(&[("attribute", "env"), ("value", "")]), ctx());
    assert_eq!(codes(&issues), vec!["INTERCEPTOR_0003"]);
    assert_eq!(issues[0].args()[0].to_string(), "value");

    // A blank companion does not count as a conflicting second source
    let mut interceptor = AttributeStampInterceptor::default();
    let issues = interceptor.init(
        &params(&[("attribute", "env"), ("value", "prod"), ("config_key", "  ")]),
        ctx(),
    );
    assert!(issues.is_empty());
    let output = interceptor.intercept(records()).unwrap();
    assert_eq!(output[0].attribute("env"), Some("prod"));
}

#[test]
fn test_field_filter_drops_missing_and_null() {
    let mut interceptor = FieldFilterInterceptor::default();
    assert!(interceptor.init(&params(&[("field", "/customer/id")]), ctx()).is_empty());

    let batch = vec![
        Record::new("keep", json!({"customer": {"id": 7}})),
        Record::new("null", json!({"customer": {"id": null}})),
        Record::new("absent", json!({"customer": {}})),
        Record::new("scalar", json!(42)),
    ];
    let output = interceptor.intercept(batch).unwrap();
    let ids: Vec<&str> = output.iter().map(|r| r.source_id()).collect();
    assert_eq!(ids, vec!["keep"]);
}

#[test]
fn test_field_filter_fail_mode() {
    let mut interceptor = FieldFilterInterceptor::default();
    assert!(interceptor.init(&params(&[("field", "/name"), ("mode", "FAIL")]), ctx()).is_empty());
    assert_eq!(interceptor.intercept(records()).unwrap().len(), 2);

    let batch = vec![
        Record::new("ok", json!({"name": "a"})),
        Record::new("bad", json!({"other": 1})),
    ];
    let err = interceptor.intercept(batch).unwrap_err();
    assert_eq!(err.message(), "INTERCEPTOR_0006 - Record 'bad' is missing field '/name'");
}

#[test]
fn test_field_filter_issues() {
    let mut interceptor = FieldFilterInterceptor::default();
    let issues = interceptor.init(&params(&[("field", "name"), ("mode", "explode")]), ctx());
    assert_eq!(codes(&issues), vec!["INTERCEPTOR_0004", "INTERCEPTOR_0004"]);
    assert_eq!(
        issues[1].message(),
        "INTERCEPTOR_0004 - Parameter 'mode' has invalid value 'explode': expected 'drop' or 'fail'"
    );

    let issues = FieldFilterInterceptor::default().init(&params(&[]), ctx());
    assert_eq!(codes(&issues), vec!["INTERCEPTOR_0003"]);
}

#[test]
fn test_filter_mode_parse() {
    assert_eq!(FilterMode::parse("drop"), Some(FilterMode::Drop));
    assert_eq!(FilterMode::parse("Fail"), Some(FilterMode::Fail));
    assert_eq!(FilterMode::parse("skip"), None);
    assert_eq!(FilterMode::default(), FilterMode::Drop);
}

#[test]
fn test_blob_attach_uses_latest_version() {
    let blob_store = InMemoryBlobStore::shared();
    blob_store.store("lookup", "countries", 1, "old").unwrap();
    blob_store.store("lookup", "countries", 2, "new").unwrap();
    let context: Arc<dyn InterceptorContext> =
        Arc::new(HostContext::new("attach", Arc::new(HostConfig::default()), blob_store));

    let mut interceptor = BlobAttachInterceptor::default();
    let issues = interceptor.init(
        &params(&[("namespace", "lookup"), ("id", "countries"), ("attribute", "countries")]),
        context,
    );
    assert!(issues.is_empty());
    let output = interceptor.intercept(records()).unwrap();
    assert!(output.iter().all(|r| r.attribute("countries") == Some("new")));
}

#[test]
fn test_blob_attach_missing_blob_is_an_issue() {
    let mut interceptor = BlobAttachInterceptor::default();
    let issues = interceptor.init(
        &params(&[("namespace", "lookup"), ("id", "countries"), ("attribute", "countries")]),
        ctx(),
    );

    assert_eq!(codes(&issues), vec!["INTERCEPTOR_0007"]);
    let args = issues[0].args();
    assert_eq!(args.len(), 3);
    assert!(args[2].is_cause());
    assert_eq!(
        issues[0].message(),
        "INTERCEPTOR_0007 - Cannot load blob 'countries' from namespace 'lookup': \
         BLOB_STORE_0001 - Object 'countries' does not exist in namespace 'lookup'"
    );
}
