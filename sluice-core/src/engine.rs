use crate::{Error, PlaceholderStyle, RowIdStrategy};
use serde::Deserialize;
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// Identity of the backend every call is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Engine {
    /// Row-oriented engine with positional `?` placeholders and auto-increment ids.
    MySql,
    /// Engine with `$1`, `$2`, ... placeholders and native `RETURNING`.
    Postgres,
    /// Engine requiring typed, named parameters and reporting ids through output rows.
    Mssql,
}

impl Engine {
    pub const fn name(&self) -> &'static str {
        match self {
            Engine::MySql => "mysql",
            Engine::Postgres => "postgres",
            Engine::Mssql => "mssql",
        }
    }

    pub const fn placeholder_style(&self) -> PlaceholderStyle {
        match self {
            Engine::MySql => PlaceholderStyle::Positional,
            Engine::Postgres => PlaceholderStyle::Numbered,
            Engine::Mssql => PlaceholderStyle::Named,
        }
    }

    pub const fn row_id_strategy(&self) -> RowIdStrategy {
        match self {
            Engine::MySql => RowIdStrategy::AutoIncrement,
            Engine::Postgres => RowIdStrategy::Returning,
            Engine::Mssql => RowIdStrategy::OutputRow,
        }
    }

    pub const fn default_port(&self) -> u16 {
        match self {
            Engine::MySql => 3306,
            Engine::Postgres => 5432,
            Engine::Mssql => 1433,
        }
    }
}

impl Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Engine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Engine::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Engine::Postgres),
            "mssql" | "sqlserver" => Ok(Engine::Mssql),
            other => Err(Error::ConfigurationInvalid(format!(
                "unknown engine `{other}`"
            ))),
        }
    }
}

impl TryFrom<String> for Engine {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
