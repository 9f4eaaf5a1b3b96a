//! Tests for descriptor construction

use super::*;
use crate::binding::{InParameterBinder, NOT_BOUND, OutParameterRegistrar};
use crate::extract::ResultExtractor;
use crate::resource::{ArraySlot, CallResourceFactory};
use crate::{
    CallerConfig, ConfigError, DispatchError, InterfaceMetadata, MethodSignature, NameCase,
    NamingStrategy, OracleTypeMapper, OutParameterSpec, ParamType, ParameterBinding,
    ParameterShape, ReturnType, ReturnValueSpec, VoidResultPolicy,
};
use pretty_assertions::assert_eq;
use sprocket_core::{ArrayElement, Error, ScalarKind, SqlType};

fn build(method: &MethodSignature) -> Result<CallDescriptor, ConfigError> {
    build_with(&CallerConfig::default(), method)
}

fn build_with(config: &CallerConfig, method: &MethodSignature) -> Result<CallDescriptor, ConfigError> {
    let interface = InterfaceMetadata {
        schema: Some("app".to_string()),
        ..Default::default()
    };
    DescriptorBuilder::new(&interface, config).build(method)
}

fn three_ints(name: &str) -> MethodSignature {
    MethodSignature::new(name)
        .param(ParameterShape::scalar("a", ScalarKind::Int32))
        .param(ParameterShape::scalar("b", ScalarKind::Int32))
        .param(ParameterShape::scalar("c", ScalarKind::Int32))
}

// ============================================================================
// Positions and call strings
// ============================================================================

#[test]
fn test_input_positions() {
    assert_eq!(input_positions(3, Some(2)), vec![1, 3, 4]);
    assert_eq!(input_positions(3, Some(3)), vec![1, 2, 4]);
    assert_eq!(input_positions(3, Some(4)), vec![1, 2, 3]);
    assert_eq!(input_positions(3, Some(1)), vec![2, 3, 4]);
    assert_eq!(input_positions(0, None), Vec::<usize>::new());
}

#[test]
fn test_plain_procedure() {
    let descriptor = build(&three_ints("plus")).unwrap();

    assert_eq!(descriptor.call_string(), "{call app.plus(?,?,?)}");
    assert_eq!(descriptor.procedure_name(), "plus");
    assert_eq!(descriptor.parameter_count(), 3);
    assert_eq!(
        descriptor.in_parameters(),
        &InParameterBinder::ByIndex {
            positions: vec![1, 2, 3]
        }
    );
    assert_eq!(descriptor.out_parameter(), &OutParameterRegistrar::None);
    assert_eq!(
        descriptor.extractor(),
        &ResultExtractor::Void {
            policy: VoidResultPolicy::AcceptAndIgnore
        }
    );
    assert!(descriptor.translates_errors());
}

#[test]
fn test_out_parameter_defaults_to_last_slot() {
    let method = three_ints("plus")
        .returns(ReturnType::Scalar(ScalarKind::Int32))
        .out_parameter_default();
    let descriptor = build(&method).unwrap();

    assert_eq!(descriptor.call_string(), "{call app.plus(?,?,?,?)}");
    assert_eq!(
        descriptor.in_parameters(),
        &InParameterBinder::ByIndex {
            positions: vec![1, 2, 3]
        }
    );
    assert_eq!(
        descriptor.out_parameter(),
        &OutParameterRegistrar::ByIndexAndType {
            index: 4,
            sql_type: SqlType::Integer
        }
    );
}

#[test]
fn test_out_parameter_in_the_middle() {
    let method = three_ints("split")
        .returns(ReturnType::Scalar(ScalarKind::Text))
        .out_parameter(OutParameterSpec {
            index: Some(2),
            ..Default::default()
        });
    let descriptor = build(&method).unwrap();

    assert_eq!(
        descriptor.in_parameters(),
        &InParameterBinder::ByIndex {
            positions: vec![1, 3, 4]
        }
    );
    assert_eq!(descriptor.out_parameter().slot(), Some(sprocket_core::ParameterSlot::Index(2)));
}

#[test]
fn test_rebuilding_yields_identical_descriptor() {
    let method = three_ints("plus")
        .returns(ReturnType::Scalar(ScalarKind::Int32))
        .out_parameter(OutParameterSpec {
            index: Some(2),
            ..Default::default()
        });

    let first = build(&method).unwrap();
    let second = build(&method).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.call_string(), "{call app.plus(?,?,?,?)}");
    assert_eq!(first.extractor(), second.extractor());
}

#[test]
fn test_function_shifts_inputs_past_return_slot() {
    let method = MethodSignature::new("next_id")
        .param(ParameterShape::scalar("seq", ScalarKind::Text))
        .returns(ReturnType::Scalar(ScalarKind::Int64))
        .namespace("pkg")
        .function();
    let descriptor = build(&method).unwrap();

    assert_eq!(descriptor.call_string(), "{ ? = call pkg.app.next_id(?)}");
    assert_eq!(
        descriptor.in_parameters(),
        &InParameterBinder::ByIndex { positions: vec![2] }
    );
    assert_eq!(
        descriptor.out_parameter(),
        &OutParameterRegistrar::ByIndexAndType {
            index: 1,
            sql_type: SqlType::BigInt
        }
    );
}

#[test]
fn test_qualifier_precedence() {
    let config = CallerConfig::new().with_namespace("cfg_ns").with_schema("cfg_schema");
    let interface = InterfaceMetadata {
        schema: Some("iface_schema".to_string()),
        ..Default::default()
    };
    let builder = DescriptorBuilder::new(&interface, &config);

    let plain = builder.build(&MethodSignature::new("ping")).unwrap();
    assert_eq!(plain.call_string(), "{call cfg_ns.iface_schema.ping()}");

    let overridden = builder
        .build(&MethodSignature::new("ping").schema("own").namespace("mine"))
        .unwrap();
    assert_eq!(overridden.call_string(), "{call mine.own.ping()}");
}

#[test]
fn test_procedure_naming() {
    let config = CallerConfig::new()
        .with_procedure_naming(NamingStrategy::new(NameCase::UpperSnake).with_prefix("SP_"));

    let derived = build_with(&config, &MethodSignature::new("findUser")).unwrap();
    assert_eq!(derived.procedure_name(), "SP_FIND_USER");

    let explicit = build_with(
        &config,
        &MethodSignature::new("findUser").procedure_name("lookup"),
    )
    .unwrap();
    assert_eq!(explicit.call_string(), "{call app.lookup()}");
}

// ============================================================================
// Binding styles
// ============================================================================

#[test]
fn test_typed_binding_uses_mapper_and_overrides() {
    let config = CallerConfig::new()
        .with_binding(ParameterBinding::IndexAndType)
        .with_type_mapper(OracleTypeMapper);
    let method = MethodSignature::new("flag")
        .param(ParameterShape::scalar("active", ScalarKind::Bool))
        .param(ParameterShape::scalar("note", ScalarKind::Text).with_sql_type(SqlType::Clob));

    let descriptor = build_with(&config, &method).unwrap();
    assert_eq!(
        descriptor.in_parameters(),
        &InParameterBinder::ByIndexAndType {
            positions: vec![1, 2],
            types: vec![SqlType::Vendor(crate::ORACLE_PLSQL_BOOLEAN), SqlType::Clob],
        }
    );
}

#[test]
fn test_name_binding() {
    let config = CallerConfig::new()
        .with_binding(ParameterBinding::NameOnly)
        .with_parameter_naming(NamingStrategy::new(NameCase::Snake).with_prefix("p_"));
    let method = MethodSignature::new("rename")
        .param(ParameterShape::scalar("userId", ScalarKind::Int64))
        .param(ParameterShape::scalar("newName", ScalarKind::Text).with_backend_name("NAME"));

    let descriptor = build_with(&config, &method).unwrap();
    assert_eq!(
        descriptor.in_parameters(),
        &InParameterBinder::ByName {
            names: vec![Some("p_user_id".to_string()), Some("NAME".to_string())]
        }
    );
}

#[test]
fn test_name_binding_requires_names() {
    let config = CallerConfig::new().with_binding(ParameterBinding::NameAndType);
    let method = MethodSignature::new("anon")
        .param(ParameterShape::scalar("a", ScalarKind::Int32))
        .param(ParameterShape::unnamed(ParamType::Scalar(ScalarKind::Int32)));

    assert_eq!(
        build_with(&config, &method),
        Err(ConfigError::UnresolvedParameterName {
            method: "anon".to_string(),
            index: 1
        })
    );
}

#[test]
fn test_named_out_parameter() {
    let config = CallerConfig::new().with_binding(ParameterBinding::NameAndType);
    let method = MethodSignature::new("total")
        .param(ParameterShape::scalar("id", ScalarKind::Int64))
        .returns(ReturnType::Scalar(ScalarKind::Decimal))
        .out_parameter(OutParameterSpec {
            name: Some("p_total".to_string()),
            ..Default::default()
        });

    let descriptor = build_with(&config, &method).unwrap();
    assert_eq!(
        descriptor.out_parameter(),
        &OutParameterRegistrar::ByNameAndType {
            name: "p_total".to_string(),
            sql_type: SqlType::Numeric
        }
    );

    let unnamed = method.clone().out_parameter_default();
    assert!(matches!(
        build_with(&config, &unnamed),
        Err(ConfigError::UnresolvedOutParameterName { .. })
    ));
}

#[test]
fn test_row_mapper_is_not_bound() {
    let method = MethodSignature::new("users")
        .param(ParameterShape::scalar("min_age", ScalarKind::Int32))
        .param(ParameterShape::row_mapper())
        .param(ParameterShape::scalar("city", ScalarKind::Text))
        .returns(ReturnType::List(None));

    let descriptor = build(&method).unwrap();
    assert_eq!(descriptor.call_string(), "{call app.users(?,?)}");
    assert_eq!(descriptor.parameter_count(), 3);
    assert_eq!(
        descriptor.in_parameters(),
        &InParameterBinder::ByIndex {
            positions: vec![1, NOT_BOUND, 2]
        }
    );
    assert_eq!(
        descriptor.extractor(),
        &ResultExtractor::MappedList {
            mapper: 1,
            fetch_size: None
        }
    );
}

// ============================================================================
// Results
// ============================================================================

#[test]
fn test_list_fetch_size_precedence() {
    let config = CallerConfig::new().with_fetch_size(10);
    let interface = InterfaceMetadata {
        fetch_size: Some(20),
        ..Default::default()
    };
    let builder = DescriptorBuilder::new(&interface, &config);
    let method = MethodSignature::new("names").returns(ReturnType::List(Some(ScalarKind::Text)));

    assert_eq!(
        builder.build(&method).unwrap().extractor(),
        &ResultExtractor::ScalarList {
            kind: ScalarKind::Text,
            fetch_size: Some(20)
        }
    );
    assert_eq!(
        builder.build(&method.clone().fetch_size(5)).unwrap().extractor(),
        &ResultExtractor::ScalarList {
            kind: ScalarKind::Text,
            fetch_size: Some(5)
        }
    );
}

#[test]
fn test_list_without_element_type_or_mapper() {
    let method = MethodSignature::new("things").returns(ReturnType::List(None));
    assert_eq!(
        build(&method),
        Err(ConfigError::UnresolvedElementType {
            method: "things".to_string(),
            index: None
        })
    );
}

#[test]
fn test_list_out_parameter_is_cursor() {
    let method = MethodSignature::new("names")
        .returns(ReturnType::List(Some(ScalarKind::Text)))
        .out_parameter_default();
    assert_eq!(
        build(&method).unwrap().out_parameter(),
        &OutParameterRegistrar::ByIndexAndType {
            index: 1,
            sql_type: SqlType::RefCursor
        }
    );
}

#[test]
fn test_reject_policy_flows_into_void_extractor() {
    let config = CallerConfig::new().with_void_results(VoidResultPolicy::Reject);
    assert_eq!(
        build_with(&config, &MethodSignature::new("touch")).unwrap().extractor(),
        &ResultExtractor::Void {
            policy: VoidResultPolicy::Reject
        }
    );
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn test_array_parameter_type_name_sources() {
    let config = CallerConfig::new().with_array_type_names(
        |method: &str, index: usize, _: &ParameterShape| Some(format!("{}_{}", method, index)),
    );
    let method = MethodSignature::new("tag")
        .param(
            ParameterShape::new("ids", ParamType::Array(ArrayElement::primitive(ScalarKind::Int64)))
                .with_type_name("ID_TABLE"),
        )
        .param(ParameterShape::new("names", ParamType::List(Some(ScalarKind::Text))))
        .param(ParameterShape::new("extra", ParamType::List(None)));

    let descriptor = build_with(&config, &method).unwrap();
    assert_eq!(
        descriptor.resources(),
        &CallResourceFactory::Arrays(vec![
            ArraySlot {
                argument: 0,
                type_name: "ID_TABLE".to_string()
            },
            ArraySlot {
                argument: 1,
                type_name: "VARCHAR".to_string()
            },
            ArraySlot {
                argument: 2,
                type_name: "tag_2".to_string()
            },
        ])
    );
    assert!(matches!(
        descriptor.in_parameters(),
        InParameterBinder::ResourceBacked(_)
    ));
}

#[test]
fn test_unresolvable_array_element_type() {
    let method =
        MethodSignature::new("tag").param(ParameterShape::new("extra", ParamType::List(None)));
    assert_eq!(
        build(&method),
        Err(ConfigError::UnresolvedElementType {
            method: "tag".to_string(),
            index: Some(0)
        })
    );
}

// ============================================================================
// Configuration errors
// ============================================================================

#[test]
fn test_ambiguous_output() {
    let method = MethodSignature::new("both")
        .returns(ReturnType::Scalar(ScalarKind::Int32))
        .out_parameter_default()
        .return_value(ReturnValueSpec::default());
    assert!(matches!(build(&method), Err(ConfigError::AmbiguousOutput { .. })));
}

#[test]
fn test_output_slot_without_return_type() {
    let method = MethodSignature::new("nothing").function();
    assert!(matches!(build(&method), Err(ConfigError::MissingReturnType { .. })));
}

#[test]
fn test_out_index_range() {
    let method = three_ints("plus")
        .returns(ReturnType::Scalar(ScalarKind::Int32))
        .out_parameter(OutParameterSpec {
            index: Some(5),
            ..Default::default()
        });
    assert_eq!(
        build(&method),
        Err(ConfigError::InvalidOutIndex {
            method: "plus".to_string(),
            index: 5,
            max: 4
        })
    );
}

#[test]
fn test_unsupported_scalar_type() {
    let method = MethodSignature::new("id").returns(ReturnType::Scalar(ScalarKind::Uuid)).function();
    assert_eq!(
        build(&method),
        Err(ConfigError::UnsupportedType("uuid".to_string()))
    );
}

#[test]
fn test_parameter_limit() {
    let mut method = MethodSignature::new("wide");
    for i in 0..254 {
        method = method.param(ParameterShape::scalar(format!("p{}", i), ScalarKind::Int32));
    }
    assert!(build(&method).is_ok());

    let widest = method.clone().param(ParameterShape::scalar("p254", ScalarKind::Int32));
    assert!(matches!(
        build(&widest),
        Err(ConfigError::TooManyParameters { count: 255, .. })
    ));
}

#[test]
fn test_parameter_limit_counts_output_slots() {
    let mut inputs = MethodSignature::new("wide");
    for i in 0..253 {
        inputs = inputs.param(ParameterShape::scalar(format!("p{}", i), ScalarKind::Int32));
    }
    let out_parameter = inputs
        .clone()
        .returns(ReturnType::Scalar(ScalarKind::Int32))
        .out_parameter_default();
    assert_eq!(
        build(&out_parameter).unwrap().out_parameter(),
        &OutParameterRegistrar::ByIndexAndType {
            index: 254,
            sql_type: SqlType::Integer
        }
    );

    let inputs = inputs.param(ParameterShape::scalar("p253", ScalarKind::Int32));
    let out_parameter = inputs
        .clone()
        .returns(ReturnType::Scalar(ScalarKind::Int32))
        .out_parameter_default();
    assert!(matches!(
        build(&out_parameter),
        Err(ConfigError::TooManyParameters { count: 255, .. })
    ));

    let leading_out = inputs
        .clone()
        .returns(ReturnType::Scalar(ScalarKind::Int32))
        .out_parameter(OutParameterSpec {
            index: Some(1),
            ..Default::default()
        });
    assert!(matches!(
        build(&leading_out),
        Err(ConfigError::TooManyParameters { count: 255, .. })
    ));

    let function = inputs
        .returns(ReturnType::Scalar(ScalarKind::Int32))
        .function();
    assert!(matches!(
        build(&function),
        Err(ConfigError::TooManyParameters { count: 255, .. })
    ));
}

// ============================================================================
// Error translation
// ============================================================================

#[test]
fn test_translate_wraps_backend_errors() {
    let descriptor = build(&MethodSignature::new("ping")).unwrap();
    let translated = descriptor.translate(DispatchError::Backend(Error::Query("boom".to_string())));

    assert_eq!(
        translated.to_string(),
        "call to ping using \"{call app.ping()}\" failed: Query error: boom"
    );
    assert!(matches!(
        descriptor.translate(DispatchError::NoOutParameter),
        DispatchError::NoOutParameter
    ));
}

#[test]
fn test_translate_keeps_suppressed() {
    let descriptor = build(&MethodSignature::new("ping")).unwrap();
    let error = DispatchError::Backend(Error::other("primary"))
        .with_suppressed(vec![DispatchError::Backend(Error::other("later"))]);

    let translated = descriptor.translate(error);
    assert!(matches!(translated.primary(), DispatchError::CallFailed { .. }));
    assert_eq!(translated.suppressed()[0].to_string(), "later");
}

#[test]
fn test_raw_backend_errors_pass_through() {
    let descriptor = build(&MethodSignature::new("ping").raw_backend_errors()).unwrap();
    assert!(!descriptor.translates_errors());
    assert!(matches!(
        descriptor.translate(DispatchError::Backend(Error::other("raw"))),
        DispatchError::Backend(_)
    ));
}
