//! Field-level value access and native ↔ database value conversion.
//!
//! # Invariants
//! - `to_value` never fails; every supported native value has a database form.
//! - `from_value` rejects mismatched storage classes instead of coercing
//!   text to numbers.

use super::metadata::FieldDescriptor;
use crate::error::{AccessError, ConversionError};
use crate::model::schema::Entity;
use rusqlite::types::Value;
use uuid::Uuid;

/// Reads `field` from `instance` as a database value.
pub fn get<E: Entity>(field: &FieldDescriptor, instance: &E) -> Result<Value, AccessError> {
    instance.read_field(field.name)
}

/// Writes `value` into `field` of `instance`, converting to the native type.
pub fn set<E: Entity>(
    field: &FieldDescriptor,
    instance: &mut E,
    value: Value,
) -> Result<(), AccessError> {
    instance.write_field(field.name, value)
}

/// Native field type that can travel as a SQLite value.
pub trait FieldValue: Sized {
    fn to_value(&self) -> Value;
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

impl FieldValue for i64 {
    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Integer(number) => Ok(number),
            other => Err(unexpected("integer", &other)),
        }
    }
}

macro_rules! narrow_integer_field {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Integer(i64::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    let number = i64::from_value(value)?;
                    <$ty>::try_from(number).map_err(|_| ConversionError::OutOfRange {
                        target: stringify!($ty),
                        value: number,
                    })
                }
            }
        )*
    };
}

narrow_integer_field!(i32, i16, u32, u8);

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Integer(number) => Ok(number != 0),
            other => Err(unexpected("boolean", &other)),
        }
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Real(number) => Ok(number),
            // SQLite may hand back integral REAL column values as integers.
            Value::Integer(number) => Ok(number as f64),
            other => Err(unexpected("real", &other)),
        }
    }
}

impl FieldValue for f32 {
    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        f64::from_value(value).map(|number| number as f32)
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(text) => Ok(text),
            other => Err(unexpected("text", &other)),
        }
    }
}

impl FieldValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Blob(bytes) => Ok(bytes),
            other => Err(unexpected("blob", &other)),
        }
    }
}

impl FieldValue for Uuid {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        let text = String::from_value(value)?;
        Uuid::parse_str(&text).map_err(|err| ConversionError::Invalid {
            target: "uuid",
            message: err.to_string(),
        })
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn unexpected(expected: &'static str, found: &Value) -> ConversionError {
    ConversionError::UnexpectedType {
        expected,
        found: found.data_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::FieldValue;
    use crate::error::ConversionError;
    use rusqlite::types::{Type, Value};
    use uuid::Uuid;

    #[test]
    fn narrow_integers_reject_out_of_range_values() {
        assert_eq!(i32::from_value(Value::Integer(42)).unwrap(), 42);
        let err = u8::from_value(Value::Integer(300)).unwrap_err();
        assert_eq!(
            err,
            ConversionError::OutOfRange {
                target: "u8",
                value: 300
            }
        );
    }

    #[test]
    fn option_maps_null_to_none() {
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(Value::Integer(3)).unwrap(), Some(3));
        assert_eq!(None::<String>.to_value(), Value::Null);
    }

    #[test]
    fn text_is_not_coerced_into_numbers() {
        let err = i64::from_value(Value::Text("12".to_string())).unwrap_err();
        assert_eq!(
            err,
            ConversionError::UnexpectedType {
                expected: "integer",
                found: Type::Text
            }
        );
    }

    #[test]
    fn reals_accept_integral_storage() {
        assert_eq!(f64::from_value(Value::Integer(5)).unwrap(), 5.0);
        assert!(bool::from_value(Value::Integer(1)).unwrap());
        assert_eq!(true.to_value(), Value::Integer(1));
    }

    #[test]
    fn uuid_travels_as_text() {
        let id = Uuid::new_v4();
        let stored = id.to_value();
        assert_eq!(stored, Value::Text(id.to_string()));
        assert_eq!(Uuid::from_value(stored).unwrap(), id);
        assert!(matches!(
            Uuid::from_value(Value::Text("not-a-uuid".to_string())),
            Err(ConversionError::Invalid { target: "uuid", .. })
        ));
    }
}
