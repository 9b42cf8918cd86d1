use crate::Value;
use std::fmt::{self, Display};

/// Column type tag for engines that demand explicitly typed parameters.
///
/// Only the first five variants are ever produced by [`infer_type`], the others are
/// available to explicitly typed [`Parameter`](crate::Parameter)s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    DateTime,
    Text,
    Int,
    Decimal,
    Boolean,
    Float,
    Binary,
    Uuid,
}

impl Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SqlType::DateTime => "datetime",
            SqlType::Text => "text",
            SqlType::Int => "int",
            SqlType::Decimal => "decimal",
            SqlType::Boolean => "boolean",
            SqlType::Float => "float",
            SqlType::Binary => "binary",
            SqlType::Uuid => "uuid",
        })
    }
}

/// Best effort type tag for a raw value, first match wins:
/// 1. date and time values are `DateTime`
/// 2. strings are `Text`
/// 3. numbers are `Int` without a fractional component, `Decimal` otherwise
/// 4. booleans are `Boolean`
/// 5. anything else falls back to `Text`
pub fn infer_type(value: &Value) -> SqlType {
    match value {
        Value::Date(..)
        | Value::Time(..)
        | Value::Timestamp(..)
        | Value::TimestampWithTimezone(..) => SqlType::DateTime,
        Value::Varchar(..) => SqlType::Text,
        Value::Int64(..) | Value::UInt64(..) => SqlType::Int,
        Value::Float64(v) if v.fract() == 0.0 => SqlType::Int,
        Value::Float64(..) => SqlType::Decimal,
        Value::Decimal(v) if v.fract().is_zero() => SqlType::Int,
        Value::Decimal(..) => SqlType::Decimal,
        Value::Boolean(..) => SqlType::Boolean,
        Value::Null | Value::Blob(..) | Value::Uuid(..) => SqlType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use time::macros::{date, datetime, time};

    #[test]
    fn date_like_values() {
        assert_eq!(infer_type(&Value::Date(date!(2024 - 02 - 29))), SqlType::DateTime);
        assert_eq!(infer_type(&Value::Time(time!(12:30))), SqlType::DateTime);
        assert_eq!(
            infer_type(&Value::Timestamp(datetime!(2024-02-29 12:30))),
            SqlType::DateTime
        );
        assert_eq!(
            infer_type(&Value::TimestampWithTimezone(datetime!(2024-02-29 12:30 +2))),
            SqlType::DateTime
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(infer_type(&3.into()), SqlType::Int);
        assert_eq!(infer_type(&3u64.into()), SqlType::Int);
        assert_eq!(infer_type(&3.0.into()), SqlType::Int);
        assert_eq!(infer_type(&3.5.into()), SqlType::Decimal);
        assert_eq!(infer_type(&(-0.25).into()), SqlType::Decimal);
        assert_eq!(infer_type(&Decimal::new(35, 1).into()), SqlType::Decimal);
        assert_eq!(infer_type(&Decimal::new(300, 2).into()), SqlType::Int);
        assert_eq!(infer_type(&f64::NAN.into()), SqlType::Decimal);
    }

    #[test]
    fn fallback() {
        assert_eq!(infer_type(&"hello".into()), SqlType::Text);
        assert_eq!(infer_type(&true.into()), SqlType::Boolean);
        assert_eq!(infer_type(&Value::Null), SqlType::Text);
        assert_eq!(infer_type(&vec![1u8, 2].into()), SqlType::Text);
        assert_eq!(infer_type(&uuid::Uuid::nil().into()), SqlType::Text);
    }
}
