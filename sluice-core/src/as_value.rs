use crate::Value;
use rust_decimal::Decimal;
use std::borrow::Cow;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion of native Rust types into the dynamically typed [`Value`] used for
/// parameter binding.
///
/// # Examples
/// ```rust
/// use sluice_core::{AsValue, Value};
/// assert_eq!(42i32.as_value(), Value::Int64(42));
/// assert_eq!(None::<String>.as_value(), Value::Null);
/// ```
pub trait AsValue {
    fn as_value(self) -> Value;
}

macro_rules! impl_as_value {
    ($source:ty, $into:path $(,)?) => {
        impl AsValue for $source {
            fn as_value(self) -> Value {
                $into(self)
            }
        }
    };
    ($source:ty, $into:path, $conversion:expr $(,)?) => {
        impl AsValue for $source {
            fn as_value(self) -> Value {
                $into($conversion(self))
            }
        }
    };
}

impl_as_value!(bool, Value::Boolean);
impl_as_value!(i8, Value::Int64, i64::from);
impl_as_value!(i16, Value::Int64, i64::from);
impl_as_value!(i32, Value::Int64, i64::from);
impl_as_value!(i64, Value::Int64);
impl_as_value!(u8, Value::Int64, i64::from);
impl_as_value!(u16, Value::Int64, i64::from);
impl_as_value!(u32, Value::Int64, i64::from);
impl_as_value!(u64, Value::UInt64);
impl_as_value!(f32, Value::Float64, f64::from);
impl_as_value!(f64, Value::Float64);
impl_as_value!(Decimal, Value::Decimal);
impl_as_value!(String, Value::Varchar);
impl_as_value!(&str, Value::Varchar, str::to_owned);
impl_as_value!(Cow<'_, str>, Value::Varchar, Cow::into_owned);
impl_as_value!(Vec<u8>, Value::Blob, Vec::into_boxed_slice);
impl_as_value!(Box<[u8]>, Value::Blob);
impl_as_value!(&[u8], Value::Blob, Box::from);
impl_as_value!(Date, Value::Date);
impl_as_value!(Time, Value::Time);
impl_as_value!(PrimitiveDateTime, Value::Timestamp);
impl_as_value!(OffsetDateTime, Value::TimestampWithTimezone);
impl_as_value!(Uuid, Value::Uuid);

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => Value::Null,
        }
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}
