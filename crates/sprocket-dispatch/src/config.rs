//! Caller configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::{ArrayTypeNameResolver, ConfigError, DefaultTypeMapper, NamingStrategy, TypeMapper};

/// How input parameters are addressed when binding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterBinding {
    /// By position, letting the driver infer types
    #[default]
    IndexOnly,
    /// By position with explicit type codes
    IndexAndType,
    /// By parameter name, letting the driver infer types
    NameOnly,
    /// By parameter name with explicit type codes
    NameAndType,
}

impl ParameterBinding {
    pub fn by_name(&self) -> bool {
        matches!(self, ParameterBinding::NameOnly | ParameterBinding::NameAndType)
    }

    pub fn typed(&self) -> bool {
        matches!(
            self,
            ParameterBinding::IndexAndType | ParameterBinding::NameAndType
        )
    }
}

/// What a void method does with rows the call produced anyway
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoidResultPolicy {
    /// Drain and discard them
    #[default]
    AcceptAndIgnore,
    /// Fail with an incorrect result size
    Reject,
}

/// Configuration shared by every method of a [`crate::ProcedureCaller`]
///
/// The plain settings deserialize from TOML; the type mapper and array type
/// name resolver are attached in code.
///
/// # Examples
///
/// ```
/// use sprocket_dispatch::{CallerConfig, NameCase, ParameterBinding};
///
/// let config = CallerConfig::from_toml_str(
///     r#"
///     binding = "name_and_type"
///     schema = "app"
///
///     [parameter_naming]
///     case = "snake"
///     prefix = "p_"
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(config.binding, ParameterBinding::NameAndType);
/// assert_eq!(config.parameter_naming.case, NameCase::Snake);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallerConfig {
    pub binding: ParameterBinding,
    /// Derives procedure names from method names
    pub procedure_naming: NamingStrategy,
    /// Derives backend parameter names from source parameter names
    pub parameter_naming: NamingStrategy,
    pub namespace: Option<String>,
    pub schema: Option<String>,
    pub fetch_size: Option<u32>,
    pub void_results: VoidResultPolicy,
    #[serde(skip, default = "default_type_mapper")]
    type_mapper: Arc<dyn TypeMapper>,
    #[serde(skip)]
    array_type_names: Option<Arc<dyn ArrayTypeNameResolver>>,
}

fn default_type_mapper() -> Arc<dyn TypeMapper> {
    Arc::new(DefaultTypeMapper)
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            binding: ParameterBinding::default(),
            procedure_naming: NamingStrategy::default(),
            parameter_naming: NamingStrategy::default(),
            namespace: None,
            schema: None,
            fetch_size: None,
            void_results: VoidResultPolicy::default(),
            type_mapper: default_type_mapper(),
            array_type_names: None,
        }
    }
}

impl CallerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the serializable settings from TOML
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_binding(mut self, binding: ParameterBinding) -> Self {
        self.binding = binding;
        self
    }

    pub fn with_procedure_naming(mut self, naming: NamingStrategy) -> Self {
        self.procedure_naming = naming;
        self
    }

    pub fn with_parameter_naming(mut self, naming: NamingStrategy) -> Self {
        self.parameter_naming = naming;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_fetch_size(mut self, rows: u32) -> Self {
        self.fetch_size = Some(rows);
        self
    }

    pub fn with_void_results(mut self, policy: VoidResultPolicy) -> Self {
        self.void_results = policy;
        self
    }

    pub fn with_type_mapper(mut self, mapper: impl TypeMapper + 'static) -> Self {
        self.type_mapper = Arc::new(mapper);
        self
    }

    pub fn with_array_type_names(mut self, resolver: impl ArrayTypeNameResolver + 'static) -> Self {
        self.array_type_names = Some(Arc::new(resolver));
        self
    }

    pub fn type_mapper(&self) -> &dyn TypeMapper {
        self.type_mapper.as_ref()
    }

    pub fn array_type_names(&self) -> Option<&dyn ArrayTypeNameResolver> {
        self.array_type_names.as_deref()
    }
}

impl fmt::Debug for CallerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallerConfig")
            .field("binding", &self.binding)
            .field("procedure_naming", &self.procedure_naming)
            .field("parameter_naming", &self.parameter_naming)
            .field("namespace", &self.namespace)
            .field("schema", &self.schema)
            .field("fetch_size", &self.fetch_size)
            .field("void_results", &self.void_results)
            .field("type_mapper", &self.type_mapper)
            .field("array_type_names", &self.array_type_names.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NameCase, OracleTypeMapper};
    use pretty_assertions::assert_eq;
    use sprocket_core::{ScalarKind, SqlType};

    #[test]
    fn test_defaults() {
        let config = CallerConfig::default();
        assert_eq!(config.binding, ParameterBinding::IndexOnly);
        assert_eq!(config.void_results, VoidResultPolicy::AcceptAndIgnore);
        assert_eq!(config.fetch_size, None);
        assert_eq!(
            config.type_mapper().map_scalar(ScalarKind::Bool),
            Some(SqlType::Boolean)
        );
        assert!(config.array_type_names().is_none());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = CallerConfig::from_toml_str("").unwrap();
        assert_eq!(config.binding, ParameterBinding::IndexOnly);
        assert_eq!(config.procedure_naming, NamingStrategy::identity());
    }

    #[test]
    fn test_toml_settings() {
        let config = CallerConfig::from_toml_str(
            r#"
            binding = "index_and_type"
            namespace = "pkg"
            fetch_size = 500
            void_results = "reject"

            [procedure_naming]
            case = "upper_snake"
            "#,
        )
        .unwrap();

        assert!(config.binding.typed());
        assert!(!config.binding.by_name());
        assert_eq!(config.namespace.as_deref(), Some("pkg"));
        assert_eq!(config.fetch_size, Some(500));
        assert_eq!(config.void_results, VoidResultPolicy::Reject);
        assert_eq!(config.procedure_naming.apply("getUser"), "GET_USER");
        assert_eq!(config.procedure_naming.case, NameCase::UpperSnake);
    }

    #[test]
    fn test_invalid_toml() {
        let err = CallerConfig::from_toml_str("binding = \"sideways\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_builders_attach_hooks() {
        let config = CallerConfig::new()
            .with_type_mapper(OracleTypeMapper)
            .with_array_type_names(|_: &str, _: usize, _: &crate::ParameterShape| {
                Some("NUM_LIST".to_string())
            });

        assert_eq!(
            config.type_mapper().map_scalar(ScalarKind::Bool),
            Some(SqlType::Vendor(crate::ORACLE_PLSQL_BOOLEAN))
        );
        assert!(config.array_type_names().is_some());
        assert!(format!("{:?}", config).contains("OracleTypeMapper"));
    }
}
