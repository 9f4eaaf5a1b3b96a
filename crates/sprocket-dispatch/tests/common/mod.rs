//! Common test utilities

#![allow(dead_code)]

use sprocket_core::{Row, Value};
use sprocket_dispatch::{
    ArrayElement, CallerConfig, MethodSignature, ParamType, ParameterShape, ProcedureCaller,
    ProcedureInterface, ReturnType, ScalarKind,
};
use sprocket_driver_mock::MockConnection;
use std::sync::Arc;

/// Initialize logging for tests if not already initialized
pub fn initialize_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("sprocket_dispatch=debug".parse().unwrap()),
            )
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// An inventory interface exercising every result shape
pub fn inventory() -> ProcedureInterface {
    ProcedureInterface::new("inventory")
        .schema("shop")
        .method(
            MethodSignature::new("restock")
                .param(ParameterShape::scalar("sku", ScalarKind::Text))
                .param(ParameterShape::scalar("quantity", ScalarKind::Int32)),
        )
        .method(
            MethodSignature::new("stockLevel")
                .param(ParameterShape::scalar("sku", ScalarKind::Text))
                .returns(ReturnType::Scalar(ScalarKind::Int32))
                .function(),
        )
        .method(
            MethodSignature::new("skusBelow")
                .param(ParameterShape::scalar("threshold", ScalarKind::Int32))
                .returns(ReturnType::List(Some(ScalarKind::Text))),
        )
        .method(
            MethodSignature::new("items")
                .param(ParameterShape::scalar("warehouse", ScalarKind::Int16))
                .param(ParameterShape::row_mapper())
                .returns(ReturnType::List(None)),
        )
        .method(
            MethodSignature::new("bulkPrice")
                .param(
                    ParameterShape::new(
                        "skus",
                        ParamType::Array(ArrayElement::nullable(ScalarKind::Text)),
                    )
                    .with_type_name("SKU_LIST"),
                )
                .param(ParameterShape::new(
                    "quantities",
                    ParamType::Array(ArrayElement::primitive(ScalarKind::Int32)),
                ))
                .returns(ReturnType::Array(ArrayElement::primitive(ScalarKind::Int64)))
                .out_parameter_default(),
        )
}

pub fn caller(conn: &MockConnection, config: CallerConfig) -> ProcedureCaller {
    initialize_logging();
    ProcedureCaller::new(Arc::new(conn.clone()), inventory(), config)
}

pub fn item_row(sku: &str, quantity: i32) -> Row {
    Row::new(
        vec!["sku".to_string(), "quantity".to_string()],
        vec![Value::from(sku), Value::Int32(quantity)],
    )
}
