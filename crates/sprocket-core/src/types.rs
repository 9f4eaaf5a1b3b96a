//! Core types for sprocket

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A database value that can represent any SQL type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// 8-bit signed integer
    Int8(i8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit floating point
    Float32(f32),
    /// 64-bit floating point
    Float64(f64),
    /// Decimal/Numeric (stored as string for precision)
    Decimal(String),
    /// UTF-8 string
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// UUID
    Uuid(Uuid),
    /// Date (year, month, day)
    Date(NaiveDate),
    /// Time (hour, minute, second, nanosecond)
    Time(NaiveTime),
    /// DateTime without timezone
    DateTime(NaiveDateTime),
    /// DateTime with timezone (UTC)
    DateTimeUtc(DateTime<Utc>),
    /// JSON value
    Json(serde_json::Value),
    /// Array of values
    Array(Vec<Value>),
}

impl Value {
    /// Check if the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Build an array value from anything convertible into values
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Try to get as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::String(s) | Value::Decimal(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_) => {
                self.as_i64().map(|v| v as f64)
            }
            Value::String(s) | Value::Decimal(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The scalar kind this value carries, `None` for NULL and arrays
    pub fn kind(&self) -> Option<ScalarKind> {
        let kind = match self {
            Value::Null | Value::Array(_) => return None,
            Value::Bool(_) => ScalarKind::Bool,
            Value::Int8(_) => ScalarKind::Int8,
            Value::Int16(_) => ScalarKind::Int16,
            Value::Int32(_) => ScalarKind::Int32,
            Value::Int64(_) => ScalarKind::Int64,
            Value::Float32(_) => ScalarKind::Float32,
            Value::Float64(_) => ScalarKind::Float64,
            Value::Decimal(_) => ScalarKind::Decimal,
            Value::String(_) => ScalarKind::Text,
            Value::Bytes(_) => ScalarKind::Bytes,
            Value::Uuid(_) => ScalarKind::Uuid,
            Value::Date(_) => ScalarKind::Date,
            Value::Time(_) => ScalarKind::Time,
            Value::DateTime(_) => ScalarKind::DateTime,
            Value::DateTimeUtc(_) => ScalarKind::DateTimeUtc,
            Value::Json(_) => ScalarKind::Json,
        };
        Some(kind)
    }

    /// Short name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Array(_) => "array",
            other => other.kind().map(|k| k.name()).unwrap_or("unknown"),
        }
    }

    /// Convert this value into the representation of `kind`.
    ///
    /// NULL converts to NULL for every kind. Integer narrowing is range
    /// checked. Returns `None` when no lossless (or conventional) conversion
    /// exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use sprocket_core::{ScalarKind, Value};
    ///
    /// assert_eq!(Value::Int64(7).coerce_to(ScalarKind::Int32), Some(Value::Int32(7)));
    /// assert_eq!(Value::Int64(i64::MAX).coerce_to(ScalarKind::Int32), None);
    /// assert_eq!(Value::Null.coerce_to(ScalarKind::Text), Some(Value::Null));
    /// assert_eq!(Value::Bool(true).coerce_to(ScalarKind::Date), None);
    /// ```
    pub fn coerce_to(&self, kind: ScalarKind) -> Option<Value> {
        if self.is_null() {
            return Some(Value::Null);
        }
        if self.kind() == Some(kind) {
            return Some(self.clone());
        }

        match (self, kind) {
            (Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_), _)
                if kind.is_integer() =>
            {
                let v = self.as_i64()?;
                match kind {
                    ScalarKind::Int8 => i8::try_from(v).ok().map(Value::Int8),
                    ScalarKind::Int16 => i16::try_from(v).ok().map(Value::Int16),
                    ScalarKind::Int32 => i32::try_from(v).ok().map(Value::Int32),
                    _ => Some(Value::Int64(v)),
                }
            }
            (Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_), ScalarKind::Decimal) => {
                self.as_i64().map(|v| Value::Decimal(v.to_string()))
            }
            (Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_), ScalarKind::Float64) => {
                self.as_f64().map(Value::Float64)
            }
            (Value::Float32(v), ScalarKind::Float64) => Some(Value::Float64(*v as f64)),
            (Value::Float32(v), ScalarKind::Decimal) => Some(Value::Decimal(v.to_string())),
            (Value::Float64(v), ScalarKind::Decimal) => Some(Value::Decimal(v.to_string())),
            (Value::Decimal(s), ScalarKind::Float64) => s.parse().ok().map(Value::Float64),
            (Value::Decimal(s), _) if kind.is_integer() => {
                let v: i64 = s.parse().ok()?;
                Value::Int64(v).coerce_to(kind)
            }
            (Value::String(s), ScalarKind::Clob) => Some(Value::String(s.clone())),
            (Value::Bytes(b), ScalarKind::Blob) => Some(Value::Bytes(b.clone())),
            (Value::DateTime(v), ScalarKind::Date) => Some(Value::Date(v.date())),
            (Value::DateTime(v), ScalarKind::DateTimeUtc) => Some(Value::DateTimeUtc(v.and_utc())),
            (Value::DateTimeUtc(v), ScalarKind::DateTime) => Some(Value::DateTime(v.naive_utc())),
            (Value::Date(v), ScalarKind::DateTime) => {
                v.and_hms_opt(0, 0, 0).map(Value::DateTime)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::DateTimeUtc(v) => write!(f, "{}", v),
            Value::Json(v) => write!(f, "{}", v),
            Value::Array(v) => write!(f, "[{} items]", v.len()),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => String,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<Utc> => DateTimeUtc,
    serde_json::Value => Json,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// The declared kind of a scalar value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    Text,
    Bytes,
    Uuid,
    Date,
    Time,
    DateTime,
    DateTimeUtc,
    Json,
    /// Binary large object, carried as `Value::Bytes`
    Blob,
    /// Character large object, carried as `Value::String`
    Clob,
}

impl ScalarKind {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32 | ScalarKind::Int64
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int8 => "i8",
            ScalarKind::Int16 => "i16",
            ScalarKind::Int32 => "i32",
            ScalarKind::Int64 => "i64",
            ScalarKind::Float32 => "f32",
            ScalarKind::Float64 => "f64",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Text => "text",
            ScalarKind::Bytes => "bytes",
            ScalarKind::Uuid => "uuid",
            ScalarKind::Date => "date",
            ScalarKind::Time => "time",
            ScalarKind::DateTime => "datetime",
            ScalarKind::DateTimeUtc => "datetime_utc",
            ScalarKind::Json => "json",
            ScalarKind::Blob => "blob",
            ScalarKind::Clob => "clob",
        }
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Element type of an array
///
/// `nullable: false` is the "primitive" flavour: elements can never be NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayElement {
    pub kind: ScalarKind,
    #[serde(default)]
    pub nullable: bool,
}

impl ArrayElement {
    /// Elements that may be NULL
    pub const fn nullable(kind: ScalarKind) -> Self {
        Self { kind, nullable: true }
    }

    /// Elements that are never NULL
    pub const fn primitive(kind: ScalarKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }
}

impl std::fmt::Display for ArrayElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.nullable {
            write!(f, "Option<{}>", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// A row from a query result
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Column values
    pub values: Vec<Value>,
    /// Column names
    columns: Vec<String>,
}

impl Row {
    /// Create a new row
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    /// Create a row with generated column names (`col0`, `col1`, ...)
    pub fn from_values(values: Vec<Value>) -> Self {
        let columns = (0..values.len()).map(|i| format!("col{}", i)).collect();
        Self { values, columns }
    }

    /// Get a value by column index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}
