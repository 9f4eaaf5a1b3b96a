//! Conversion from call results to Rust types

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sprocket_core::{ScalarKind, Value};
use uuid::Uuid;

use crate::DispatchError;

/// A type a call result can be converted into
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, DispatchError>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, DispatchError> {
        Ok(value)
    }
}

impl FromValue for () {
    fn from_value(_: Value) -> Result<Self, DispatchError> {
        Ok(())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, DispatchError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, DispatchError> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(DispatchError::type_mismatch("array", other.type_name())),
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $kind:ident, $variant:ident);* $(;)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, DispatchError> {
                    match value.coerce_to(ScalarKind::$kind) {
                        Some(Value::$variant(v)) => Ok(v),
                        _ => Err(DispatchError::type_mismatch(
                            stringify!($ty),
                            value.type_name(),
                        )),
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool, Bool;
    i8 => Int8, Int8;
    i16 => Int16, Int16;
    i32 => Int32, Int32;
    i64 => Int64, Int64;
    f32 => Float32, Float32;
    f64 => Float64, Float64;
    String => Text, String;
    Uuid => Uuid, Uuid;
    NaiveDate => Date, Date;
    NaiveTime => Time, Time;
    NaiveDateTime => DateTime, DateTime;
    DateTime<Utc> => DateTimeUtc, DateTimeUtc;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalars() {
        assert_eq!(i32::from_value(Value::Int32(7)).unwrap(), 7);
        assert_eq!(i64::from_value(Value::Int32(7)).unwrap(), 7);
        assert_eq!(String::from_value(Value::from("x")).unwrap(), "x");
        assert!(bool::from_value(Value::Bool(true)).unwrap());
    }

    #[test]
    fn test_null_needs_option() {
        assert!(matches!(
            i32::from_value(Value::Null),
            Err(DispatchError::TypeMismatch { .. })
        ));
        assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::Int32(3)).unwrap(), Some(3));
    }

    #[test]
    fn test_narrowing_out_of_range() {
        let err = i8::from_value(Value::Int64(1_000)).unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: expected i8, got i64");
    }

    #[test]
    fn test_lists() {
        let value = Value::Array(vec![Value::Int32(1), Value::Null, Value::Int32(3)]);
        assert_eq!(
            Vec::<Option<i32>>::from_value(value.clone()).unwrap(),
            vec![Some(1), None, Some(3)]
        );
        assert!(Vec::<i32>::from_value(value).is_err());
        assert!(Vec::<i32>::from_value(Value::Int32(1)).is_err());
    }

    #[test]
    fn test_unit_ignores_value() {
        assert!(<()>::from_value(Value::Null).is_ok());
    }
}
