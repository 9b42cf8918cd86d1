use mysql_async::{
    Column, FromRowError, FromValueError, from_value_opt,
    consts::{ColumnFlags, ColumnType},
};
use rust_decimal::Decimal;
use sluice_core::{RowLabeled, RowNames, Value};
use time::{Date, PrimitiveDateTime, Time, UtcOffset};

type MySqlValue = mysql_async::Value;

const BINARY_CHARSET: u16 = 63;

pub(crate) struct ValueWrap(pub(crate) Value);

impl From<ValueWrap> for MySqlValue {
    fn from(value: ValueWrap) -> Self {
        match value.0 {
            Value::Null => MySqlValue::NULL,
            Value::Boolean(v) => MySqlValue::from(v),
            Value::Int64(v) => MySqlValue::from(v),
            Value::UInt64(v) => MySqlValue::from(v),
            Value::Float64(v) => MySqlValue::from(v),
            Value::Decimal(v) => MySqlValue::from(v),
            Value::Varchar(v) => MySqlValue::from(v),
            Value::Blob(v) => MySqlValue::Bytes(v.into_vec()),
            Value::Date(v) => MySqlValue::from(v),
            Value::Time(v) => MySqlValue::from(v),
            Value::Timestamp(v) => MySqlValue::from(v),
            Value::TimestampWithTimezone(v) => {
                let v = v.to_offset(UtcOffset::UTC);
                MySqlValue::from(PrimitiveDateTime::new(v.date(), v.time()))
            }
            Value::Uuid(v) => MySqlValue::from(v.hyphenated().to_string()),
        }
    }
}

/// Decodes a cell using the declared column type, the text protocol sends everything as bytes.
pub(crate) fn decode(value: MySqlValue, column: &Column) -> Value {
    if value == MySqlValue::NULL {
        return Value::Null;
    }
    let unsigned = column.flags().contains(ColumnFlags::UNSIGNED_FLAG);
    let decoded: Result<Value, FromValueError> = match column.column_type() {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => {
            if unsigned {
                from_value_opt::<u64>(value).map(Value::from_generated_id)
            } else {
                from_value_opt::<i64>(value).map(Value::Int64)
            }
        }
        ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => {
            from_value_opt::<f64>(value).map(Value::Float64)
        }
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
            from_value_opt::<Decimal>(value).map(Value::Decimal)
        }
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => {
            from_value_opt::<Date>(value).map(Value::Date)
        }
        ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_DATETIME2
        | ColumnType::MYSQL_TYPE_TIMESTAMP
        | ColumnType::MYSQL_TYPE_TIMESTAMP2 => {
            from_value_opt::<PrimitiveDateTime>(value).map(Value::Timestamp)
        }
        ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => {
            from_value_opt::<Time>(value).map(Value::Time)
        }
        _ => match value {
            MySqlValue::Bytes(v) if column.character_set() == BINARY_CHARSET => {
                Ok(Value::Blob(v.into()))
            }
            v => Err(FromValueError(v)),
        },
    };
    decoded.unwrap_or_else(|e| raw(e.0))
}

/// Decoding driven by the value alone.
fn raw(value: MySqlValue) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Bytes(v) => match String::from_utf8(v) {
            Ok(v) => Value::Varchar(v),
            Err(e) => Value::Blob(e.into_bytes().into()),
        },
        MySqlValue::Int(v) => Value::Int64(v),
        MySqlValue::UInt(v) => Value::from_generated_id(v),
        MySqlValue::Float(v) => Value::Float64(v.into()),
        MySqlValue::Double(v) => Value::Float64(v),
        // Negative or longer than a day times, zero dates
        v @ (MySqlValue::Date(..) | MySqlValue::Time(..)) => Value::Varchar(v.as_sql(true)),
    }
}

pub(crate) struct RowWrap(pub(crate) RowLabeled);

impl mysql_async::prelude::FromRow for RowWrap {
    fn from_row_opt(mut row: mysql_async::Row) -> Result<Self, FromRowError>
    where
        Self: Sized,
    {
        let columns = row.columns();
        let names: RowNames = columns
            .iter()
            .map(|v| v.name_str().into_owned())
            .collect();
        let values = columns
            .iter()
            .enumerate()
            .map(|(i, column)| decode(row.take(i).unwrap_or(MySqlValue::NULL), column))
            .collect();
        Ok(RowWrap(RowLabeled::new(names, values)))
    }
}
