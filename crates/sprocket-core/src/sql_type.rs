//! Backend parameter type codes
//!
//! The numeric codes follow the widely used SQL type code table so that
//! drivers bridging to an existing client library can pass them straight
//! through. Dialects with proprietary codes use [`SqlType::Vendor`].

use serde::{Deserialize, Serialize};

/// A backend parameter type code
///
/// # Examples
///
/// ```
/// use sprocket_core::SqlType;
///
/// assert_eq!(SqlType::Integer.code(), 4);
/// assert_eq!(SqlType::Varchar.name(), "VARCHAR");
/// assert_eq!(SqlType::from_code(2003), SqlType::Array);
/// assert_eq!(SqlType::from_code(252), SqlType::Vendor(252));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Null,
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Decimal,
    Varchar,
    VarBinary,
    Date,
    Time,
    Timestamp,
    TimestampWithTimezone,
    Blob,
    Clob,
    Boolean,
    Array,
    RefCursor,
    Other,
    /// Dialect-specific code with no portable equivalent
    Vendor(i32),
}

impl SqlType {
    /// The numeric type code
    pub fn code(&self) -> i32 {
        match self {
            SqlType::Null => 0,
            SqlType::Bit => -7,
            SqlType::TinyInt => -6,
            SqlType::SmallInt => 5,
            SqlType::Integer => 4,
            SqlType::BigInt => -5,
            SqlType::Real => 7,
            SqlType::Double => 8,
            SqlType::Numeric => 2,
            SqlType::Decimal => 3,
            SqlType::Varchar => 12,
            SqlType::VarBinary => -3,
            SqlType::Date => 91,
            SqlType::Time => 92,
            SqlType::Timestamp => 93,
            SqlType::TimestampWithTimezone => 2014,
            SqlType::Blob => 2004,
            SqlType::Clob => 2005,
            SqlType::Boolean => 16,
            SqlType::Array => 2003,
            SqlType::RefCursor => 2012,
            SqlType::Other => 1111,
            SqlType::Vendor(code) => *code,
        }
    }

    /// Look up the type for a numeric code, falling back to [`SqlType::Vendor`]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => SqlType::Null,
            -7 => SqlType::Bit,
            -6 => SqlType::TinyInt,
            5 => SqlType::SmallInt,
            4 => SqlType::Integer,
            -5 => SqlType::BigInt,
            7 => SqlType::Real,
            8 => SqlType::Double,
            2 => SqlType::Numeric,
            3 => SqlType::Decimal,
            12 => SqlType::Varchar,
            -3 => SqlType::VarBinary,
            91 => SqlType::Date,
            92 => SqlType::Time,
            93 => SqlType::Timestamp,
            2014 => SqlType::TimestampWithTimezone,
            2004 => SqlType::Blob,
            2005 => SqlType::Clob,
            16 => SqlType::Boolean,
            2003 => SqlType::Array,
            2012 => SqlType::RefCursor,
            1111 => SqlType::Other,
            other => SqlType::Vendor(other),
        }
    }

    /// SQL name of the type, used as the element type name of backend arrays
    pub fn name(&self) -> &'static str {
        match self {
            SqlType::Null => "NULL",
            SqlType::Bit => "BIT",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::Double => "DOUBLE",
            SqlType::Numeric => "NUMERIC",
            SqlType::Decimal => "DECIMAL",
            SqlType::Varchar => "VARCHAR",
            SqlType::VarBinary => "VARBINARY",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::TimestampWithTimezone => "TIMESTAMP WITH TIME ZONE",
            SqlType::Blob => "BLOB",
            SqlType::Clob => "CLOB",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Array => "ARRAY",
            SqlType::RefCursor => "REF CURSOR",
            SqlType::Other => "OTHER",
            SqlType::Vendor(_) => "OTHER",
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlType::Vendor(code) => write!(f, "VENDOR({})", code),
            other => write!(f, "{}", other.name()),
        }
    }
}
