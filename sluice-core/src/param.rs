use crate::{AsValue, SqlType, Value};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Input,
    Output,
}

/// A parameter carrying an explicit type tag and direction.
///
/// The name is used by stored procedures. Statements executed through the placeholder
/// path re-key typed parameters under synthesized names, keeping only type and value.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Cow<'static, str>,
    pub sql_type: SqlType,
    pub direction: Direction,
    pub value: Value,
}

impl Parameter {
    pub fn input(
        name: impl Into<Cow<'static, str>>,
        sql_type: SqlType,
        value: impl AsValue,
    ) -> Self {
        Self {
            name: name.into(),
            sql_type,
            direction: Direction::Input,
            value: value.as_value(),
        }
    }

    pub fn output(name: impl Into<Cow<'static, str>>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            direction: Direction::Output,
            value: Value::Null,
        }
    }

    /// Typed positional parameter, the name is irrelevant outside stored procedures.
    pub fn typed(sql_type: SqlType, value: impl AsValue) -> Self {
        Self::input("", sql_type, value)
    }

    /// Initial value for an output parameter (`INOUT` semantics).
    pub fn with_value(mut self, value: impl AsValue) -> Self {
        self.value = value.as_value();
        self
    }

    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }
}

/// Parameter list of one call: either entirely raw values or entirely typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Raw(Vec<Value>),
    Typed(Vec<Parameter>),
}

impl Params {
    pub fn len(&self) -> usize {
        match self {
            Params::Raw(v) => v.len(),
            Params::Typed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        match self {
            Params::Raw(v) => v.get(index),
            Params::Typed(v) => v.get(index).map(|p| &p.value),
        }
    }

    /// Values in order, type tags dropped.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Params::Raw(v) => v,
            Params::Typed(v) => v.into_iter().map(|p| p.value).collect(),
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::Raw(Vec::new())
    }
}

impl From<Vec<Value>> for Params {
    fn from(value: Vec<Value>) -> Self {
        Params::Raw(value)
    }
}

impl From<Vec<Parameter>> for Params {
    fn from(value: Vec<Parameter>) -> Self {
        Params::Typed(value)
    }
}

impl<const N: usize> From<[Parameter; N]> for Params {
    fn from(value: [Parameter; N]) -> Self {
        Params::Typed(value.into())
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Params::default()
    }
}

/// Builds a raw parameter list.
/// ```rust
/// use sluice_core::{Params, Value, params};
/// let params = params![5, "O'Brien", None::<i32>];
/// assert_eq!(params.get(2), Some(&Value::Null));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::Raw(::std::vec::Vec::new())
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Params::Raw(::std::vec![$($crate::Value::from($value)),+])
    };
}
