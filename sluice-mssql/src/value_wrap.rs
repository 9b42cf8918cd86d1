use rust_decimal::Decimal;
use sluice_core::{Error, Result, SqlType, Value};
use std::borrow::Cow;
use tiberius::{ColumnData, FromSql, ToSql, numeric::Numeric};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Outgoing value, nulls carry the declared type so that the server can convert them.
#[derive(Debug)]
pub(crate) struct ValueWrap {
    pub(crate) value: Value,
    pub(crate) sql_type: SqlType,
}

impl ToSql for ValueWrap {
    fn to_sql(&self) -> ColumnData<'_> {
        match &self.value {
            Value::Null => match self.sql_type {
                SqlType::Int => ColumnData::I64(None),
                SqlType::Text => ColumnData::String(None),
                SqlType::DateTime => ColumnData::DateTime2(None),
                SqlType::Decimal => ColumnData::Numeric(None),
                SqlType::Boolean => ColumnData::Bit(None),
                SqlType::Float => ColumnData::F64(None),
                SqlType::Binary => ColumnData::Binary(None),
                SqlType::Uuid => ColumnData::Guid(None),
            },
            Value::Boolean(v) => ColumnData::Bit(Some(*v)),
            Value::Int64(v) => ColumnData::I64(Some(*v)),
            Value::UInt64(v) => match i64::try_from(*v) {
                Ok(v) => ColumnData::I64(Some(v)),
                Err(..) => ColumnData::Numeric(Some(Numeric::new_with_scale((*v).into(), 0))),
            },
            Value::Float64(v) => ColumnData::F64(Some(*v)),
            Value::Decimal(v) => v.to_sql(),
            Value::Varchar(v) => ColumnData::String(Some(Cow::Borrowed(v.as_str()))),
            Value::Blob(v) => ColumnData::Binary(Some(Cow::Borrowed(&**v))),
            Value::Date(v) => v.to_sql(),
            Value::Time(v) => v.to_sql(),
            Value::Timestamp(v) => v.to_sql(),
            Value::TimestampWithTimezone(v) => v.to_sql(),
            Value::Uuid(v) => ColumnData::Guid(Some(*v)),
        }
    }
}

fn or_null<T>(value: Option<T>, f: impl FnOnce(T) -> Value) -> Value {
    value.map(f).unwrap_or(Value::Null)
}

fn numeric(value: Numeric) -> Result<Value> {
    Decimal::try_from_i128_with_scale(value.value(), value.scale().into())
        .map(Value::Decimal)
        .map_err(|e| Error::native(e, format!("While decoding the numeric `{value}`")))
}

/// Incoming cell.
pub(crate) fn decode(data: &ColumnData<'static>) -> Result<Value> {
    let context = || format!("While decoding `{data:?}`");
    Ok(match data {
        ColumnData::U8(v) => or_null(*v, |v| Value::Int64(v.into())),
        ColumnData::I16(v) => or_null(*v, |v| Value::Int64(v.into())),
        ColumnData::I32(v) => or_null(*v, |v| Value::Int64(v.into())),
        ColumnData::I64(v) => or_null(*v, Value::Int64),
        ColumnData::F32(v) => or_null(*v, |v| Value::Float64(v.into())),
        ColumnData::F64(v) => or_null(*v, Value::Float64),
        ColumnData::Bit(v) => or_null(*v, Value::Boolean),
        ColumnData::String(v) => or_null(v.as_ref(), |v| Value::Varchar(v.to_string())),
        ColumnData::Guid(v) => or_null(*v, Value::Uuid),
        ColumnData::Binary(v) => or_null(v.as_ref(), |v| Value::Blob(v.to_vec().into())),
        ColumnData::Numeric(Some(v)) => numeric(*v)?,
        ColumnData::Numeric(None) => Value::Null,
        ColumnData::Xml(v) => or_null(v.as_ref(), |v| {
            Value::Varchar(v.clone().into_owned().into_string())
        }),
        ColumnData::DateTime(..) | ColumnData::SmallDateTime(..) | ColumnData::DateTime2(..) => {
            or_null(
                PrimitiveDateTime::from_sql(data).map_err(|e| Error::native(e, context()))?,
                Value::Timestamp,
            )
        }
        ColumnData::Date(..) => or_null(
            Date::from_sql(data).map_err(|e| Error::native(e, context()))?,
            Value::Date,
        ),
        ColumnData::Time(..) => or_null(
            Time::from_sql(data).map_err(|e| Error::native(e, context()))?,
            Value::Time,
        ),
        ColumnData::DateTimeOffset(..) => or_null(
            OffsetDateTime::from_sql(data).map_err(|e| Error::native(e, context()))?,
            Value::TimestampWithTimezone,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_nulls() {
        let wrap = |sql_type| ValueWrap {
            value: Value::Null,
            sql_type,
        };
        assert!(matches!(wrap(SqlType::Binary).to_sql(), ColumnData::Binary(None)));
        assert!(matches!(wrap(SqlType::Text).to_sql(), ColumnData::String(None)));
        assert!(matches!(wrap(SqlType::Int).to_sql(), ColumnData::I64(None)));
    }

    #[test]
    fn decode_cells() {
        assert_eq!(decode(&ColumnData::I32(Some(7))).ok(), Some(Value::Int64(7)));
        assert_eq!(decode(&ColumnData::I32(None)).ok(), Some(Value::Null));
        assert_eq!(
            decode(&ColumnData::String(Some("abc".into()))).ok(),
            Some(Value::Varchar("abc".into()))
        );
        assert_eq!(
            decode(&ColumnData::Numeric(Some(Numeric::new_with_scale(12345, 2)))).ok(),
            Some(Value::Decimal(Decimal::new(12345, 2)))
        );
    }
}
