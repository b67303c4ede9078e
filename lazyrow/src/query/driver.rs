use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::Arguments;
use crate::{Error, Result};

/// `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An SQL engine family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Mysql,
    Postgres,
    Sqlite,
}

impl Dialect {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
    pub const fn default_param_marker(self) -> ParamMarker {
        match self {
            Self::Mysql | Self::Sqlite => ParamMarker::Positional,
            Self::Postgres => ParamMarker::Numbered,
        }
    }
    /// Whether `DELETE ... LIMIT n` is accepted.
    pub const fn supports_delete_limit(self) -> bool {
        matches!(self, Self::Mysql)
    }
    /// Infers the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let (scheme, _) = url.split_once(':')?;
        scheme.parse().ok()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match &*s.to_ascii_lowercase() {
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "postgres" | "postgresql" | "pgsql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(Error::Config(format!("unknown dialect `{s}`"))),
        }
    }
}

/// How a bound parameter is written into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamMarker {
    /// `?`
    Positional,
    /// `$1`, `$2`, ...
    Numbered,
    /// `:name`
    Named,
}

impl FromStr for ParamMarker {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match &*s.to_ascii_lowercase() {
            "positional" | "?" => Ok(Self::Positional),
            "numbered" | "$" => Ok(Self::Numbered),
            "named" | ":" => Ok(Self::Named),
            _ => Err(Error::Config(format!("unknown param marker `{s}`"))),
        }
    }
}

/// Renders identifiers and parameter markers for one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDriver {
    dialect: Dialect,
    param_marker: ParamMarker,
}

impl QueryDriver {
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            param_marker: dialect.default_param_marker(),
        }
    }
    pub const fn with_param_marker(mut self, param_marker: ParamMarker) -> Self {
        self.param_marker = param_marker;
        self
    }
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }
    pub const fn param_marker(&self) -> ParamMarker {
        self.param_marker
    }

    /// Identifiers are emitted bare, so only `[A-Za-z_][A-Za-z0-9_]*` is
    /// renderable.
    pub fn identifier<'a>(&self, name: &'a str) -> Result<&'a str> {
        if is_identifier(name) {
            Ok(name)
        } else {
            Err(self.failure(format!("`{name}` is not a valid identifier")))
        }
    }

    pub fn marker(&self, param: &str, arguments: &mut Arguments) -> Result<String> {
        let position = arguments.push(param);
        Ok(match self.param_marker {
            ParamMarker::Positional => "?".to_owned(),
            ParamMarker::Numbered => fmt2::fmt! { { str } => "$" {position} },
            ParamMarker::Named => {
                let param = self.identifier(param)?;
                fmt2::fmt! { { str } => ":" {param} }
            }
        })
    }

    pub(crate) fn failure(&self, reason: impl Into<String>) -> Error {
        Error::DriverRenderingFailure {
            dialect: self.dialect,
            reason: reason.into(),
        }
    }
}
