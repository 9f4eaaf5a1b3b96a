//! Tests for the procedure caller

use super::*;
use crate::{
    CallerConfig, ConfigError, DispatchError, MethodSignature, ParameterShape, ProcedureInterface,
    ReturnType, args,
};
use pretty_assertions::assert_eq;
use sprocket_core::{Error, ScalarKind, Value};
use sprocket_driver_mock::{CallScript, MockConnection};
use std::collections::HashSet;
use std::sync::Arc;

fn interface() -> ProcedureInterface {
    ProcedureInterface::new("accounts")
        .schema("app")
        .method(
            MethodSignature::new("balance")
                .param(ParameterShape::scalar("id", ScalarKind::Int64))
                .returns(ReturnType::Scalar(ScalarKind::Int64))
                .out_parameter_default(),
        )
        .method(MethodSignature::new("touch").param(ParameterShape::scalar("id", ScalarKind::Int64)))
        .method(MethodSignature::new("broken").returns(ReturnType::List(None)))
}

fn caller(conn: &MockConnection) -> ProcedureCaller {
    ProcedureCaller::new(Arc::new(conn.clone()), interface(), CallerConfig::default())
}

// ============================================================================
// Descriptor cache
// ============================================================================

#[test]
fn test_descriptor_is_built_once() {
    let caller = caller(&MockConnection::new());
    assert_eq!(caller.cached_descriptors(), 0);

    let first = caller.descriptor("balance").unwrap();
    let second = caller.descriptor("balance").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(caller.cached_descriptors(), 1);
    assert_eq!(first.call_string(), "{call app.balance(?,?)}");
}

#[test]
fn test_clones_share_the_cache() {
    let caller = caller(&MockConnection::new());
    let clone = caller.clone();

    let built = clone.descriptor("touch").unwrap();
    assert_eq!(caller.cached_descriptors(), 1);
    assert!(Arc::ptr_eq(&built, &caller.descriptor("touch").unwrap()));
}

#[test]
fn test_failed_build_is_not_cached() {
    let caller = caller(&MockConnection::new());

    for _ in 0..2 {
        assert!(matches!(
            caller.descriptor("broken"),
            Err(ConfigError::UnresolvedElementType { .. })
        ));
    }
    assert_eq!(caller.cached_descriptors(), 0);
}

#[test]
fn test_unknown_method() {
    let caller = caller(&MockConnection::new());
    assert_eq!(
        caller.descriptor("missing").unwrap_err(),
        ConfigError::UnknownMethod("missing".to_string())
    );
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn test_identity_equality_and_hash() {
    let conn = MockConnection::new();
    let a = caller(&conn);
    let b = caller(&conn);
    let a2 = a.clone();

    assert_eq!(a, a2);
    assert_ne!(a, b);

    let set: HashSet<ProcedureCaller> = [a.clone(), a2, b.clone()].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_display_and_debug() {
    let caller = caller(&MockConnection::new());
    assert_eq!(caller.to_string(), "ProcedureCaller(accounts via mock)");
    assert!(format!("{:?}", caller).contains("cached_descriptors: 0"));
}

// ============================================================================
// Invocation
// ============================================================================

#[tokio::test]
async fn test_invoke_reads_out_parameter() {
    let conn = MockConnection::new().with_script(
        "{call app.balance(?,?)}",
        CallScript::new().with_out_value(2, Value::Int64(1200)),
    );
    let caller = caller(&conn);

    let balance: i64 = caller.invoke_as("balance", &args![7_i64]).await.unwrap();

    assert_eq!(balance, 1200);
    let record = conn.last_call().unwrap();
    assert!(record.executed);
    assert!(record.closed);
}

#[tokio::test]
async fn test_argument_count_is_checked_before_preparing() {
    let conn = MockConnection::new();
    let caller = caller(&conn);

    let err = caller.invoke("touch", &[]).await.unwrap_err();

    assert!(matches!(
        err,
        DispatchError::ArgumentCount {
            expected: 1,
            actual: 0,
            ..
        }
    ));
    assert!(conn.calls().is_empty());
}

#[tokio::test]
async fn test_backend_error_is_translated() {
    let conn = MockConnection::new().with_script(
        "{call app.touch(?)}",
        CallScript::new().with_error(Error::Query("locked".to_string())),
    );
    let caller = caller(&conn);

    let err = caller.invoke("touch", &args![1_i64]).await.unwrap_err();

    match &err {
        DispatchError::CallFailed {
            procedure,
            call,
            source,
        } => {
            assert_eq!(procedure, "touch");
            assert_eq!(call, "{call app.touch(?)}");
            assert_eq!(source, &Error::Query("locked".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(conn.last_call().unwrap().closed);
}

#[tokio::test]
async fn test_close_failure_after_success_is_returned() {
    let conn = MockConnection::new().with_script(
        "{call app.touch(?)}",
        CallScript::new().with_close_error(Error::Driver("close".to_string())),
    );
    let caller = caller(&conn);

    let err = caller.invoke("touch", &args![1_i64]).await.unwrap_err();
    assert_eq!(err.backend_error(), Some(&Error::Driver("close".to_string())));
}

#[tokio::test]
async fn test_close_failure_after_error_is_suppressed() {
    let conn = MockConnection::new().with_script(
        "{call app.touch(?)}",
        CallScript::new()
            .with_error(Error::Query("exec".to_string()))
            .with_close_error(Error::Driver("close".to_string())),
    );
    let caller = caller(&conn);

    let err = caller.invoke("touch", &args![1_i64]).await.unwrap_err();

    assert!(matches!(err.primary(), DispatchError::CallFailed { .. }));
    assert_eq!(err.suppressed().len(), 1);
    assert_eq!(err.suppressed()[0].to_string(), "Driver error: close");
}

#[tokio::test]
async fn test_prepare_failure() {
    let conn = MockConnection::new().with_script(
        "{call app.touch(?)}",
        CallScript::new().with_prepare_error(Error::Connection("gone".to_string())),
    );
    let caller = caller(&conn);

    let err = caller.invoke("touch", &args![1_i64]).await.unwrap_err();
    assert_eq!(err.backend_error(), Some(&Error::Connection("gone".to_string())));
    assert!(conn.calls().is_empty());
}
