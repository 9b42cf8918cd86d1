use bytes::BytesMut;
use postgres_types::{FromSql, IsNull, ToSql, Type, to_sql_checked};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use sluice_core::{Error, Result, RowLabeled, RowNames, Value};
use std::error::Error as StdError;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use uuid::Uuid;

type BoxError = Box<dyn StdError + Sync + Send>;

/// Bridges [`Value`] and the Postgres wire types in both directions.
#[derive(Debug)]
pub(crate) struct ValueHolder(pub(crate) Value);

impl<'a> FromSql<'a> for ValueHolder {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, BoxError> {
        Self::from_sql_nullable(ty, Some(raw))
    }

    fn from_sql_null(ty: &Type) -> std::result::Result<Self, BoxError> {
        Self::from_sql_nullable(ty, None)
    }

    fn from_sql_nullable(
        ty: &Type,
        raw: Option<&'a [u8]>,
    ) -> std::result::Result<Self, BoxError> {
        let Some(raw) = raw else {
            return Ok(ValueHolder(Value::Null));
        };
        macro_rules! to_value {
            ($($($ty:path)|+ => ($variant:path, $source:ty),)+) => {
                match *ty {
                    $($($ty)|+ => $variant(<$source>::from_sql(ty, raw)?.into()),)+
                    _ => {
                        return Err(format!(
                            "Cannot decode sql type `{ty}`, value: `{}`",
                            String::from_utf8_lossy(raw)
                        )
                        .into());
                    }
                }
            };
        }
        let value = to_value!(
            Type::BOOL => (Value::Boolean, bool),
            Type::CHAR => (Value::Int64, i8),
            Type::INT2 => (Value::Int64, i16),
            Type::INT4 => (Value::Int64, i32),
            Type::INT8 => (Value::Int64, i64),
            Type::OID => (Value::Int64, u32),
            Type::FLOAT4 => (Value::Float64, f32),
            Type::FLOAT8 => (Value::Float64, f64),
            Type::NUMERIC => (Value::Decimal, Decimal),
            Type::VARCHAR
            | Type::TEXT
            | Type::NAME
            | Type::BPCHAR
            | Type::JSON
            | Type::XML
            | Type::UNKNOWN => (Value::Varchar, String),
            Type::BYTEA => (Value::Blob, Vec<u8>),
            Type::DATE => (Value::Date, Date),
            Type::TIME => (Value::Time, Time),
            Type::TIMESTAMP => (Value::Timestamp, PrimitiveDateTime),
            Type::TIMESTAMPTZ => (Value::TimestampWithTimezone, OffsetDateTime),
            Type::UUID => (Value::Uuid, Uuid),
        );
        Ok(ValueHolder(value))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Integers are coerced to the width the server inferred for the placeholder.
fn int_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::OID => u32::try_from(v)?.to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        Type::NUMERIC => Decimal::from(v).to_sql(ty, out),
        Type::BOOL => (v != 0).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => v.to_string().to_sql(ty, out),
        _ => v.to_sql(ty, out),
    }
}

impl ToSql for ValueHolder {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match &self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Boolean(v) => v.to_sql(ty, out),
            Value::Int64(v) => int_to_sql(*v, ty, out),
            Value::UInt64(v) => match i64::try_from(*v) {
                Ok(v) => int_to_sql(v, ty, out),
                Err(..) => Decimal::from(*v).to_sql(ty, out),
            },
            Value::Float64(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*v)?.to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::Decimal(v) => match *ty {
                Type::FLOAT4 | Type::FLOAT8 => v
                    .to_f64()
                    .ok_or_else(|| format!("Decimal `{v}` does not fit a float"))?
                    .to_sql(ty, out),
                Type::INT2 | Type::INT4 | Type::INT8 => int_to_sql(
                    v.to_i64()
                        .ok_or_else(|| format!("Decimal `{v}` does not fit an integer"))?,
                    ty,
                    out,
                ),
                _ => v.to_sql(ty, out),
            },
            Value::Varchar(v) => match *ty {
                Type::UUID => Uuid::parse_str(v)?.to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::Blob(v) => (&**v).to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Time(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMPTZ => v.assume_utc().to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            Value::TimestampWithTimezone(v) => match *ty {
                Type::TIMESTAMP => {
                    let v = v.to_offset(UtcOffset::UTC);
                    PrimitiveDateTime::new(v.date(), v.time()).to_sql(ty, out)
                }
                _ => v.to_sql(ty, out),
            },
            Value::Uuid(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool
    where
        Self: Sized,
    {
        true
    }

    to_sql_checked!();
}

pub(crate) fn row_to_labeled(row: &tokio_postgres::Row, labels: &RowNames) -> Result<RowLabeled> {
    let values = (0..row.len())
        .map(|i| match row.try_get::<_, ValueHolder>(i) {
            Ok(v) => Ok(v.0),
            Err(e) => {
                let column = &row.columns()[i];
                Err(Error::native(
                    e,
                    format!(
                        "Could not decode column {} `{}`: {}",
                        i,
                        column.name(),
                        column.type_()
                    ),
                ))
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RowLabeled::new(labels.clone(), values.into()))
}
