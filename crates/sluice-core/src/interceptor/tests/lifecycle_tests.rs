#![cfg(test)]

use std::collections::HashMap;
use std::sync::Arc;

use super::support::{call_log, calls, context, records, RecordingInterceptor};
use crate::error::Error;
use crate::interceptor::builtin::PassThroughInterceptor;
use crate::interceptor::lifecycle::{InterceptorStats, LifecycleState, ManagedInterceptor};

fn managed(interceptor: RecordingInterceptor) -> ManagedInterceptor {
    ManagedInterceptor::new("recording", Box::new(interceptor), HashMap::new())
}

#[test]
fn test_pass_through_after_clean_init() {
    let mut managed = ManagedInterceptor::new("pass-through", Box::new(PassThroughInterceptor), HashMap::new());
    let issues = managed.init(Arc::new(context())).unwrap();
    assert!(issues.is_empty());
    assert_eq!(managed.state(), LifecycleState::Ready);

    let output = managed.intercept(records()).unwrap();
    assert_eq!(output, records());
    assert_eq!(managed.state(), LifecycleState::Processing);

    assert!(managed.destroy());
    assert_eq!(managed.state(), LifecycleState::Destroyed);
}

#[test]
fn test_intercept_before_init_is_refused() {
    let log = call_log();
    let mut managed = managed(RecordingInterceptor::new("a", &log));

    match managed.intercept(records()) {
        Err(Error::Lifecycle { state, operation, .. }) => {
            assert_eq!(state, LifecycleState::Uninitialized);
            assert_eq!(operation, "intercept");
        }
        other => panic!("Expected lifecycle error, got {:?}", other),
    }
    assert!(calls(&log).is_empty());
}

#[test]
fn test_issues_block_intercept_but_allow_destroy() {
    let log = call_log();
    let mut managed = managed(RecordingInterceptor::new("a", &log).with_issue());

    let issues = managed.init(Arc::new(context())).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].error_code().code(), "INTERCEPTOR_0003");
    assert_eq!(managed.state(), LifecycleState::DestroyPending);
    assert!(!managed.is_ready());

    assert!(managed.intercept(records()).is_err());
    assert!(managed.destroy());
    assert_eq!(calls(&log), vec!["a:init", "a:destroy"]);
}

#[test]
fn test_init_only_once() {
    let log = call_log();
    let mut managed = managed(RecordingInterceptor::new("a", &log));
    managed.init(Arc::new(context())).unwrap();

    let err = managed.init(Arc::new(context())).unwrap_err();
    assert_eq!(err.to_string(), "Interceptor 'recording' cannot initialize while ready");
    assert_eq!(calls(&log), vec!["a:init"]);
}

#[test]
fn test_destroy_runs_exactly_once() {
    let log = call_log();
    {
        let mut managed = managed(RecordingInterceptor::new("a", &log));
        managed.init(Arc::new(context())).unwrap();
        assert!(managed.destroy());
        assert!(!managed.destroy());
        assert!(managed.intercept(records()).is_err());
    }
    assert_eq!(calls(&log), vec!["a:init", "a:destroy"]);
}

#[test]
fn test_drop_destroys_forgotten_interceptor() {
    let log = call_log();
    {
        let mut managed = managed(RecordingInterceptor::new("a", &log));
        managed.init(Arc::new(context())).unwrap();
    }
    assert_eq!(calls(&log), vec!["a:init", "a:destroy"]);
}

#[test]
fn test_failed_batch_stops_interceptor() {
    let log = call_log();
    let mut managed = managed(RecordingInterceptor::new("a", &log).failing());
    managed.init(Arc::new(context())).unwrap();

    match managed.intercept(records()) {
        Err(Error::Stage(e)) => assert_eq!(e.error_code().code(), "INTERCEPTOR_0006"),
        other => panic!("Expected stage error, got {:?}", other),
    }
    assert_eq!(managed.state(), LifecycleState::DestroyPending);
    assert!(!managed.is_ready());
    assert_eq!(
        managed.stats(),
        InterceptorStats {
            batches: 1,
            records_in: 2,
            records_out: 0
        }
    );

    match managed.intercept(records()) {
        Err(Error::Lifecycle { state, operation, .. }) => {
            assert_eq!(state, LifecycleState::DestroyPending);
            assert_eq!(operation, "intercept");
        }
        other => panic!("Expected lifecycle error, got {:?}", other),
    }
    assert!(managed.destroy());
    assert_eq!(calls(&log), vec!["a:init", "a:intercept", "a:destroy"]);
}

#[test]
fn test_state_display() {
    assert_eq!(LifecycleState::DestroyPending.to_string(), "destroy-pending");
    assert!(LifecycleState::Processing.accepts_records());
    assert!(!LifecycleState::Destroyed.accepts_records());
}
