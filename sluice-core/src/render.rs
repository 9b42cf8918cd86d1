use crate::{PLACEHOLDER, Params, Value};
use std::fmt::Write;
use time::{PrimitiveDateTime, Time, UtcOffset, macros::format_description};

/// Statement with every placeholder replaced by the literal of its parameter.
///
/// Meant for logs only, the output is never executed. Placeholders without a matching
/// parameter stay `?`, timezone aware timestamps are shifted to `offset` when given.
pub fn query_to_string(sql: &str, params: &Params, offset: Option<UtcOffset>) -> String {
    let mut out = String::with_capacity(sql.len() + params.len() * 8);
    for (i, piece) in sql.split(PLACEHOLDER).enumerate() {
        if i > 0 {
            match params.get(i - 1) {
                Some(value) => write_value(&mut out, value, offset),
                None => out.push(PLACEHOLDER),
            }
        }
        out.push_str(piece);
    }
    out
}

pub fn write_value(out: &mut String, value: &Value, offset: Option<UtcOffset>) {
    match value {
        Value::Null => out.push_str("NULL"),
        Value::Varchar(v) => write_escaped(out, v),
        Value::Date(v) => write_timestamp(out, PrimitiveDateTime::new(*v, Time::MIDNIGHT)),
        Value::Time(v) => {
            let _ = write!(
                out,
                "'{:02}:{:02}:{:02}.{:03}'",
                v.hour(),
                v.minute(),
                v.second(),
                v.millisecond()
            );
        }
        Value::Timestamp(v) => write_timestamp(out, *v),
        Value::TimestampWithTimezone(v) => {
            let v = offset.map_or(*v, |offset| v.to_offset(offset));
            write_timestamp(out, PrimitiveDateTime::new(v.date(), v.time()))
        }
        Value::Blob(v) => {
            let _ = write!(out, "X'{}'", hex::encode_upper(v));
        }
        Value::Uuid(v) => {
            let _ = write!(out, "'{v}'");
        }
        _ => {
            let _ = write!(out, "{value}");
        }
    }
}

fn write_timestamp(out: &mut String, value: PrimitiveDateTime) {
    let format = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    );
    match value.format(format) {
        Ok(v) => {
            out.push('\'');
            out.push_str(&v);
            out.push('\'');
        }
        Err(e) => {
            log::warn!("Could not render {value}: {e}");
            let _ = write!(out, "'{value}'");
        }
    }
}

/// Single-quoted string literal with backslash escapes.
pub fn write_escaped(out: &mut String, value: &str) {
    out.push('\'');
    for c in value.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\x08' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn substitution() {
        assert_eq!(query_to_string("WHERE id=?", &params![5], None), "WHERE id=5");
        assert_eq!(
            query_to_string("WHERE name=?", &params!["O'Brien"], None),
            "WHERE name='O\\'Brien'"
        );
    }

    #[test]
    fn surplus_placeholders() {
        assert_eq!(
            query_to_string("a=? AND b=?", &params![true], None),
            "a=true AND b=?"
        );
    }
}
