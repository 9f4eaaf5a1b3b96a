//! Invocation arguments and row mappers

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sprocket_core::{Row, Value};
use std::fmt;
use std::sync::Arc;

/// Maps one result row to a value
pub trait RowMapper: Send + Sync {
    fn map_row(&self, row: &Row) -> sprocket_core::Result<Value>;
}

impl<F> RowMapper for F
where
    F: Fn(&Row) -> sprocket_core::Result<Value> + Send + Sync,
{
    fn map_row(&self, row: &Row) -> sprocket_core::Result<Value> {
        self(row)
    }
}

/// Maps one result row and its 0-based position to a value
pub trait IndexedRowMapper: Send + Sync {
    fn map_row(&self, row: &Row, row_index: usize) -> sprocket_core::Result<Value>;
}

impl<F> IndexedRowMapper for F
where
    F: Fn(&Row, usize) -> sprocket_core::Result<Value> + Send + Sync,
{
    fn map_row(&self, row: &Row, row_index: usize) -> sprocket_core::Result<Value> {
        self(row, row_index)
    }
}

/// A row mapper passed as an argument
#[derive(Clone)]
pub enum RowMapperArg {
    Plain(Arc<dyn RowMapper>),
    Indexed(Arc<dyn IndexedRowMapper>),
}

impl RowMapperArg {
    pub fn map(&self, row: &Row, row_index: usize) -> sprocket_core::Result<Value> {
        match self {
            RowMapperArg::Plain(mapper) => mapper.map_row(row),
            RowMapperArg::Indexed(mapper) => mapper.map_row(row, row_index),
        }
    }
}

impl fmt::Debug for RowMapperArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowMapperArg::Plain(_) => f.write_str("RowMapper"),
            RowMapperArg::Indexed(_) => f.write_str("IndexedRowMapper"),
        }
    }
}

/// One argument of an invocation, positionally matching the method's
/// declared parameters
#[derive(Debug, Clone)]
pub enum Argument {
    Value(Value),
    Mapper(RowMapperArg),
}

impl Argument {
    pub fn null() -> Self {
        Argument::Value(Value::Null)
    }

    pub fn mapper(mapper: impl RowMapper + 'static) -> Self {
        Argument::Mapper(RowMapperArg::Plain(Arc::new(mapper)))
    }

    pub fn indexed_mapper(mapper: impl IndexedRowMapper + 'static) -> Self {
        Argument::Mapper(RowMapperArg::Indexed(Arc::new(mapper)))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Argument::Value(value) => Some(value),
            Argument::Mapper(_) => None,
        }
    }

    pub fn as_mapper(&self) -> Option<&RowMapperArg> {
        match self {
            Argument::Mapper(mapper) => Some(mapper),
            Argument::Value(_) => None,
        }
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Value(value)
    }
}

impl From<RowMapperArg> for Argument {
    fn from(mapper: RowMapperArg) -> Self {
        Argument::Mapper(mapper)
    }
}

macro_rules! impl_from_for_argument {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Argument {
                fn from(v: $ty) -> Self {
                    Argument::Value(Value::from(v))
                }
            }

            impl From<Option<$ty>> for Argument {
                fn from(v: Option<$ty>) -> Self {
                    Argument::Value(Value::from(v))
                }
            }

            impl From<Vec<$ty>> for Argument {
                fn from(v: Vec<$ty>) -> Self {
                    Argument::Value(Value::Array(v.into_iter().map(Value::from).collect()))
                }
            }
        )*
    };
}

impl_from_for_argument! {
    bool,
    i8,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    &str,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<Utc>,
}

/// Build an argument list from values and mappers
///
/// ```
/// use sprocket_dispatch::{Argument, args};
///
/// let list: Vec<Argument> = args![1_i32, "two", Option::<i64>::None];
/// assert_eq!(list.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::Argument::from($arg)),*]
    };
}
