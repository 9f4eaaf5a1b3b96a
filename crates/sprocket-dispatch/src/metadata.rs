//! Declared shape of a procedure interface
//!
//! A [`ProcedureInterface`] lists the methods a caller can invoke. Each
//! [`MethodSignature`] carries the parameter and return shapes plus the
//! per-method overrides that drive descriptor construction. Everything here
//! is plain data and deserializes with serde, so interfaces can be loaded from
//! TOML or JSON as well as built in code.

use serde::{Deserialize, Serialize};
use sprocket_core::{ArrayElement, ScalarKind, SqlType};

/// Declared type of one method parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Scalar(ScalarKind),
    /// Fixed element array, bound through a backend array handle
    Array(ArrayElement),
    /// Growable collection, bound through a backend array handle. The element
    /// kind may be unknown until a type name resolver supplies one.
    List(Option<ScalarKind>),
    /// Maps each result row to a value; not bound as a parameter
    RowMapper,
    /// Maps each result row and its 0-based index; not bound as a parameter
    IndexedRowMapper,
}

impl ParamType {
    pub fn is_row_mapper(&self) -> bool {
        matches!(self, ParamType::RowMapper | ParamType::IndexedRowMapper)
    }

    /// Parameters bound through a backend array handle
    pub fn is_array(&self) -> bool {
        matches!(self, ParamType::Array(_) | ParamType::List(_))
    }

    /// The element kind of an array-like parameter, when known
    pub fn element_kind(&self) -> Option<ScalarKind> {
        match self {
            ParamType::Array(element) => Some(element.kind),
            ParamType::List(kind) => *kind,
            _ => None,
        }
    }
}

/// Declared return type of a method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    #[default]
    Unit,
    Scalar(ScalarKind),
    /// Rows collected into a list; the element kind is needed unless a row
    /// mapper argument shapes the rows
    List(Option<ScalarKind>),
    Array(ArrayElement),
}

/// Per-parameter overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterMetadata {
    /// Backend parameter name, used verbatim
    pub name: Option<String>,
    /// Type code used instead of the type mapper's
    pub sql_type: Option<SqlType>,
    /// Element type name for array parameters
    pub type_name: Option<String>,
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterShape {
    /// Source-level name, passed through the parameter naming strategy
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: ParamType,
    #[serde(default)]
    pub metadata: ParameterMetadata,
}

impl ParameterShape {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            metadata: ParameterMetadata::default(),
        }
    }

    /// A parameter whose name was not retained
    pub fn unnamed(ty: ParamType) -> Self {
        Self {
            name: None,
            ty,
            metadata: ParameterMetadata::default(),
        }
    }

    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, ParamType::Scalar(kind))
    }

    pub fn row_mapper() -> Self {
        Self::unnamed(ParamType::RowMapper)
    }

    pub fn indexed_row_mapper() -> Self {
        Self::unnamed(ParamType::IndexedRowMapper)
    }

    pub fn with_backend_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = Some(name.into());
        self
    }

    pub fn with_sql_type(mut self, sql_type: SqlType) -> Self {
        self.metadata.sql_type = Some(sql_type);
        self
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.metadata.type_name = Some(type_name.into());
        self
    }
}

/// The result is read from an output parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutParameterSpec {
    /// 1-based placeholder position; defaults to the last placeholder
    pub index: Option<usize>,
    /// Backend name for name-based registration
    pub name: Option<String>,
    pub sql_type: Option<SqlType>,
}

/// The result is the function return value, the first placeholder of
/// `{ ? = call ...}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnValueSpec {
    pub name: Option<String>,
    pub sql_type: Option<SqlType>,
}

/// Per-method overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcedureMetadata {
    /// Backend procedure name, used verbatim
    pub procedure_name: Option<String>,
    pub namespace: Option<String>,
    pub schema: Option<String>,
    pub fetch_size: Option<u32>,
    pub out_parameter: Option<OutParameterSpec>,
    pub return_value: Option<ReturnValueSpec>,
}

/// A method that can be invoked through a [`crate::ProcedureCaller`]
///
/// # Examples
///
/// ```
/// use sprocket_dispatch::{MethodSignature, ParameterShape, ReturnType, ScalarKind};
///
/// let plus = MethodSignature::new("plus")
///     .param(ParameterShape::scalar("a", ScalarKind::Int32))
///     .param(ParameterShape::scalar("b", ScalarKind::Int32))
///     .returns(ReturnType::Scalar(ScalarKind::Int32))
///     .out_parameter_default();
///
/// assert_eq!(plus.parameters.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterShape>,
    #[serde(default)]
    pub returns: ReturnType,
    #[serde(default)]
    pub metadata: ProcedureMetadata,
    /// Surface backend errors as-is instead of wrapping them with the call
    #[serde(default)]
    pub raw_backend_errors: bool,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            returns: ReturnType::Unit,
            metadata: ProcedureMetadata::default(),
            raw_backend_errors: false,
        }
    }

    pub fn param(mut self, parameter: ParameterShape) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, returns: ReturnType) -> Self {
        self.returns = returns;
        self
    }

    pub fn procedure_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.procedure_name = Some(name.into());
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metadata.namespace = Some(namespace.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.metadata.schema = Some(schema.into());
        self
    }

    pub fn fetch_size(mut self, rows: u32) -> Self {
        self.metadata.fetch_size = Some(rows);
        self
    }

    pub fn out_parameter(mut self, spec: OutParameterSpec) -> Self {
        self.metadata.out_parameter = Some(spec);
        self
    }

    /// Read the result from an output parameter after the last input
    pub fn out_parameter_default(self) -> Self {
        self.out_parameter(OutParameterSpec::default())
    }

    pub fn return_value(mut self, spec: ReturnValueSpec) -> Self {
        self.metadata.return_value = Some(spec);
        self
    }

    /// Call as a function, `{ ? = call ...}`
    pub fn function(self) -> Self {
        self.return_value(ReturnValueSpec::default())
    }

    pub fn raw_backend_errors(mut self) -> Self {
        self.raw_backend_errors = true;
        self
    }

    /// Parameters that are bound, i.e. everything except row mappers
    pub fn value_parameters(&self) -> impl Iterator<Item = (usize, &ParameterShape)> {
        self.parameters
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.ty.is_row_mapper())
    }
}

/// Interface-wide defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceMetadata {
    pub namespace: Option<String>,
    pub schema: Option<String>,
    pub fetch_size: Option<u32>,
}

/// A named set of invocable methods
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureInterface {
    pub name: String,
    #[serde(default)]
    pub metadata: InterfaceMetadata,
    #[serde(default)]
    pub methods: Vec<MethodSignature>,
}

impl ProcedureInterface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metadata.namespace = Some(namespace.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.metadata.schema = Some(schema.into());
        self
    }

    pub fn fetch_size(mut self, rows: u32) -> Self {
        self.metadata.fetch_size = Some(rows);
        self
    }

    pub fn method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    pub fn find(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Parse an interface definition from TOML
    pub fn from_toml_str(source: &str) -> Result<Self, crate::ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_parameters_skip_row_mappers() {
        let method = MethodSignature::new("users")
            .param(ParameterShape::scalar("min_age", ScalarKind::Int32))
            .param(ParameterShape::row_mapper())
            .param(ParameterShape::scalar("city", ScalarKind::Text));

        let indexes: Vec<usize> = method.value_parameters().map(|(i, _)| i).collect();
        assert_eq!(indexes, vec![0, 2]);
    }

    #[test]
    fn test_interface_from_toml() {
        let interface = ProcedureInterface::from_toml_str(
            r#"
            name = "accounts"

            [metadata]
            schema = "billing"
            fetch_size = 50

            [[methods]]
            name = "balance"
            returns = { scalar = "decimal" }

            [[methods.parameters]]
            name = "account_id"
            type = { scalar = "int64" }

            [methods.metadata]
            procedure_name = "GET_BALANCE"
            out_parameter = { sql_type = "numeric" }
            "#,
        )
        .unwrap();

        assert_eq!(interface.metadata.schema.as_deref(), Some("billing"));
        let balance = interface.find("balance").unwrap();
        assert_eq!(balance.returns, ReturnType::Scalar(ScalarKind::Decimal));
        assert_eq!(balance.parameters[0].ty, ParamType::Scalar(ScalarKind::Int64));
        assert_eq!(
            balance.metadata.out_parameter,
            Some(OutParameterSpec {
                index: None,
                name: None,
                sql_type: Some(SqlType::Numeric),
            })
        );
        assert!(interface.find("missing").is_none());
    }

    #[test]
    fn test_element_kind() {
        assert_eq!(
            ParamType::Array(ArrayElement::primitive(ScalarKind::Int32)).element_kind(),
            Some(ScalarKind::Int32)
        );
        assert_eq!(ParamType::List(None).element_kind(), None);
        assert!(ParamType::List(None).is_array());
        assert!(!ParamType::Scalar(ScalarKind::Text).is_array());
    }
}
