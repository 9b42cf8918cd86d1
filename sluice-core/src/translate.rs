use crate::{Error, Params, Result, SqlType, Value, infer_type, separated_by};
use std::fmt::Write;

/// Native placeholder syntax of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` kept as is.
    Positional,
    /// `$1`, `$2`, ...
    Numbered,
    /// `@param0`, `@param1`, ... with a type tag for each name.
    Named,
}

/// Value bound under a synthesized name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedBinding {
    pub name: String,
    pub sql_type: SqlType,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Bindings {
    Positional(Vec<Value>),
    Named(Vec<NamedBinding>),
}

impl Bindings {
    pub fn len(&self) -> usize {
        match self {
            Bindings::Positional(v) => v.len(),
            Bindings::Named(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a named binding.
    pub fn get(&self, name: &str) -> Option<&NamedBinding> {
        match self {
            Bindings::Positional(..) => None,
            Bindings::Named(v) => v.iter().find(|b| b.name == name),
        }
    }

    /// Values in binding order.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Bindings::Positional(v) => v,
            Bindings::Named(v) => v.into_iter().map(|b| b.value).collect(),
        }
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Bindings::Positional(Vec::new())
    }
}

/// Engine native statement with its aligned parameters, built fresh for every execution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslatedQuery {
    pub sql: String,
    pub bindings: Bindings,
}

impl TranslatedQuery {
    /// Statement without any parameter.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bindings: Default::default(),
        }
    }
}

pub const PLACEHOLDER: char = '?';
pub const NAMED_PREFIX: &str = "param";

/// Number of `?` in the text, literals included.
pub fn count_placeholders(sql: &str) -> usize {
    sql.chars().filter(|c| *c == PLACEHOLDER).count()
}

/// Rewrites the generic `?` placeholders of `sql` into the syntax of `style`.
///
/// The scan is naive: a `?` inside a string literal or a comment is a placeholder as well,
/// statements meant for this path must not contain any other question mark.
/// Surplus parameters are dropped, missing ones fail with [`Error::ParameterCount`].
pub fn translate(sql: &str, params: Params, style: PlaceholderStyle) -> Result<TranslatedQuery> {
    let expected = count_placeholders(sql);
    let actual = params.len();
    if actual < expected {
        return Err(Error::ParameterCount { expected, actual });
    }
    if actual > expected {
        log::trace!("Dropping {} surplus parameter(s)", actual - expected);
    }
    match style {
        PlaceholderStyle::Positional => {
            let mut values = params.into_values();
            values.truncate(expected);
            Ok(TranslatedQuery {
                sql: sql.to_owned(),
                bindings: Bindings::Positional(values),
            })
        }
        PlaceholderStyle::Numbered => {
            let mut values = params.into_values();
            values.truncate(expected);
            let mut out = String::with_capacity(sql.len() + expected * 2);
            for (i, piece) in sql.split(PLACEHOLDER).enumerate() {
                if i > 0 {
                    let _ = write!(out, "${i}");
                }
                out.push_str(piece);
            }
            Ok(TranslatedQuery {
                sql: out,
                bindings: Bindings::Positional(values),
            })
        }
        PlaceholderStyle::Named => {
            let typed: Vec<(SqlType, Value)> = match params {
                Params::Raw(v) => v
                    .into_iter()
                    .take(expected)
                    .map(|v| (infer_type(&v), v))
                    .collect(),
                Params::Typed(v) => v
                    .into_iter()
                    .take(expected)
                    .map(|p| (p.sql_type, p.value))
                    .collect(),
            };
            let mut out = String::with_capacity(sql.len() + expected * 8);
            let mut bindings = Vec::with_capacity(expected);
            let mut typed = typed.into_iter();
            for (i, piece) in sql.split(PLACEHOLDER).enumerate() {
                if i > 0 {
                    let name = format!("{NAMED_PREFIX}{}", i - 1);
                    out.push('@');
                    out.push_str(&name);
                    if let Some((sql_type, value)) = typed.next() {
                        bindings.push(NamedBinding {
                            name,
                            sql_type,
                            value,
                        });
                    }
                }
                out.push_str(piece);
            }
            Ok(TranslatedQuery {
                sql: out,
                bindings: Bindings::Named(bindings),
            })
        }
    }
}

/// Expands the single `?` of a bulk insert (`INSERT INTO t (a, b) VALUES ?`) into one
/// placeholder tuple per row, flattening the values in row order.
pub fn expand_bulk_values(sql: &str, rows: Vec<Vec<Value>>) -> Result<(String, Vec<Value>)> {
    let Some(position) = sql.find(PLACEHOLDER) else {
        return Err(Error::ParameterCount {
            expected: 0,
            actual: rows.len(),
        });
    };
    if rows.is_empty() {
        return Err(Error::ParameterCount {
            expected: 1,
            actual: 0,
        });
    }
    let mut out = String::with_capacity(sql.len() + rows.len() * 8);
    out.push_str(&sql[..position]);
    separated_by(
        &mut out,
        &rows,
        |out, row| {
            out.push('(');
            separated_by(out, row.iter(), |out, _| out.push(PLACEHOLDER), ", ");
            out.push(')');
        },
        ", ",
    );
    out.push_str(&sql[position + PLACEHOLDER.len_utf8()..]);
    Ok((out, rows.into_iter().flatten().collect()))
}
