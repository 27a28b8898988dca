use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Number, Value};

/// Field value → document value.
///
/// Types derived with `Mapped` implement this by serializing themselves, so a
/// governed instance nested in a field turns into its own document.
pub trait IntoValue {
    fn into_value(&self) -> Value;
}

/// Document value → field value.
///
/// Returns `None` when the value has a different native type than the field;
/// nothing is coerced (a string never becomes a number and so on).
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl IntoValue for Value {
    fn into_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl IntoValue for bool {
    fn into_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl IntoValue for String {
    fn into_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl IntoValue for str {
    fn into_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! signed {
    ($($ty:ty),*) => {$(
        impl IntoValue for $ty {
            fn into_value(&self) -> Value {
                Value::from(i64::from(*self))
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Option<Self> {
                value.as_i64().and_then(|v| <$ty>::try_from(v).ok())
            }
        }
    )*};
}

macro_rules! unsigned {
    ($($ty:ty),*) => {$(
        impl IntoValue for $ty {
            fn into_value(&self) -> Value {
                Value::from(u64::from(*self))
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Option<Self> {
                value.as_u64().and_then(|v| <$ty>::try_from(v).ok())
            }
        }
    )*};
}

signed!(i8, i16, i32, i64);
unsigned!(u8, u16, u32, u64);

impl IntoValue for usize {
    fn into_value(&self) -> Value {
        Value::from(*self as u64)
    }
}

impl FromValue for usize {
    fn from_value(value: Value) -> Option<Self> {
        value.as_u64().and_then(|v| usize::try_from(v).ok())
    }
}

impl IntoValue for isize {
    fn into_value(&self) -> Value {
        Value::from(*self as i64)
    }
}

impl FromValue for isize {
    fn from_value(value: Value) -> Option<Self> {
        value.as_i64().and_then(|v| isize::try_from(v).ok())
    }
}

impl IntoValue for f64 {
    // NaN and infinities have no JSON form and become null.
    fn into_value(&self) -> Value {
        Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Option<Self> {
        value.as_f64()
    }
}

impl IntoValue for f32 {
    fn into_value(&self) -> Value {
        f64::from(*self).into_value()
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Option<Self> {
        // Doubles past f32's range would become infinite.
        value
            .as_f64()
            .filter(|v| v.abs() <= f64::from(f32::MAX))
            .map(|v| v as f32)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(&self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Box<T> {
    fn into_value(&self) -> Value {
        (**self).into_value()
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: Value) -> Option<Self> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(&self) -> Value {
        Value::Array(self.iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    /// All-or-nothing: one foreign element rejects the whole list.
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl IntoValue for Map<String, Value> {
    fn into_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl FromValue for Map<String, Value> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl<T: IntoValue> IntoValue for BTreeMap<String, T> {
    fn into_value(&self) -> Value {
        Value::Object(self.iter().map(|(k, v)| (k.clone(), v.into_value())).collect())
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            _ => None,
        }
    }
}

impl<T: IntoValue> IntoValue for HashMap<String, T> {
    fn into_value(&self) -> Value {
        Value::Object(self.iter().map(|(k, v)| (k.clone(), v.into_value())).collect())
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            _ => None,
        }
    }
}
