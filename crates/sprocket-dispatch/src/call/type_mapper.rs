//! Declared kind to backend type code mapping

use sprocket_core::{ScalarKind, SqlType};
use std::fmt;

use crate::{ConfigError, ParamType, ParameterShape};

/// Oracle's `PLSQL_BOOLEAN` type code
pub const ORACLE_PLSQL_BOOLEAN: i32 = 252;

/// Maps declared kinds to backend type codes
pub trait TypeMapper: Send + Sync + fmt::Debug {
    /// Type code for a scalar kind, `None` when the backend has no mapping
    fn map_scalar(&self, kind: ScalarKind) -> Option<SqlType>;

    /// Like [`TypeMapper::map_scalar`] but failing on unsupported kinds
    fn map_kind(&self, kind: ScalarKind) -> Result<SqlType, ConfigError> {
        self.map_scalar(kind)
            .ok_or_else(|| ConfigError::UnsupportedType(kind.to_string()))
    }

    /// Type code for a declared parameter type
    fn map_type(&self, ty: &ParamType) -> Result<SqlType, ConfigError> {
        match ty {
            ParamType::Scalar(kind) => self.map_kind(*kind),
            ParamType::Array(_) | ParamType::List(_) => Ok(SqlType::Array),
            ParamType::RowMapper | ParamType::IndexedRowMapper => {
                Err(ConfigError::UnsupportedType("row mapper".to_string()))
            }
        }
    }
}

/// Portable mapping shared by most backends
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypeMapper;

impl TypeMapper for DefaultTypeMapper {
    fn map_scalar(&self, kind: ScalarKind) -> Option<SqlType> {
        let sql_type = match kind {
            ScalarKind::Text => SqlType::Varchar,
            ScalarKind::Int8 => SqlType::TinyInt,
            ScalarKind::Int16 => SqlType::SmallInt,
            ScalarKind::Int32 => SqlType::Integer,
            ScalarKind::Int64 => SqlType::BigInt,
            ScalarKind::Decimal => SqlType::Numeric,
            ScalarKind::Float32 => SqlType::Real,
            ScalarKind::Float64 => SqlType::Double,
            ScalarKind::Date => SqlType::Date,
            ScalarKind::Time => SqlType::Time,
            ScalarKind::DateTime => SqlType::Timestamp,
            ScalarKind::DateTimeUtc => SqlType::TimestampWithTimezone,
            ScalarKind::Blob => SqlType::Blob,
            ScalarKind::Clob => SqlType::Clob,
            ScalarKind::Bool => SqlType::Boolean,
            ScalarKind::Bytes | ScalarKind::Uuid | ScalarKind::Json => return None,
        };
        Some(sql_type)
    }
}

/// Oracle mapping: booleans travel as `PLSQL_BOOLEAN`
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleTypeMapper;

impl TypeMapper for OracleTypeMapper {
    fn map_scalar(&self, kind: ScalarKind) -> Option<SqlType> {
        match kind {
            ScalarKind::Bool => Some(SqlType::Vendor(ORACLE_PLSQL_BOOLEAN)),
            other => DefaultTypeMapper.map_scalar(other),
        }
    }
}

/// Supplies the element type name of an array parameter when neither the
/// parameter metadata nor its declared element kind does
pub trait ArrayTypeNameResolver: Send + Sync {
    fn resolve(&self, method: &str, index: usize, parameter: &ParameterShape) -> Option<String>;
}

impl<F> ArrayTypeNameResolver for F
where
    F: Fn(&str, usize, &ParameterShape) -> Option<String> + Send + Sync,
{
    fn resolve(&self, method: &str, index: usize, parameter: &ParameterShape) -> Option<String> {
        self(method, index, parameter)
    }
}
