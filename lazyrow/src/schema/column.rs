use core::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The semantic type of a column, which decides how its accessor coerces.
///
/// Anything that is not one of the primitive kinds is `Other` and is handed to
/// the type inflator registered under its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Isa {
    Int,
    #[default]
    Str,
    Bool,
    Float,
    Json,
    Other(String),
}

impl Isa {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Json => "json",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for Isa {
    fn from(name: &str) -> Self {
        match name {
            "int" | "integer" => Self::Int,
            "str" | "string" | "text" => Self::Str,
            "bool" | "boolean" => Self::Bool,
            "float" | "double" => Self::Float,
            "json" => Self::Json,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for Isa {
    fn from(name: String) -> Self {
        match Self::from(name.as_str()) {
            Self::Other(_) => Self::Other(name),
            isa => isa,
        }
    }
}

impl From<Isa> for String {
    fn from(isa: Isa) -> Self {
        match isa {
            Isa::Other(name) => name,
            isa => isa.as_str().to_owned(),
        }
    }
}

impl FromStr for Isa {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Infallible> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn nullable_default() -> bool {
    true
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub isa: Isa,
    #[serde(default = "nullable_default")]
    pub nullable: bool,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub unique: bool,
    /// Gets a `loadBy{Column}` finder on the repository.
    #[serde(default)]
    pub findable: bool,
    /// Name of a column inflator, which overrides `isa` coercion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflator: Option<String>,
    /// Engine type as introspected, e.g. `varchar(128)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, isa: impl Into<Isa>) -> Self {
        Self {
            name: name.into(),
            isa: isa.into(),
            nullable: true,
            primary: false,
            unique: false,
            findable: false,
            inflator: None,
            sql_type: None,
            default: None,
        }
    }
    /// Marks the column as the primary key, which is never null.
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self.nullable = false;
        self
    }
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
    pub fn findable(mut self) -> Self {
        self.findable = true;
        self
    }
    pub fn inflator(mut self, inflator: impl Into<String>) -> Self {
        self.inflator = Some(inflator.into());
        self
    }
    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isa_aliases() {
        assert_eq!(Isa::from("integer"), Isa::Int);
        assert_eq!(Isa::from("text"), Isa::Str);
        assert_eq!(Isa::from("boolean"), Isa::Bool);
        assert_eq!(Isa::from("double"), Isa::Float);
        assert_eq!(Isa::from("DateTime"), Isa::Other("DateTime".to_owned()));
        assert_eq!(Isa::from("bool").to_string(), "bool");
    }

    #[test]
    fn column_deserializes_with_defaults() {
        let column: Column = serde_json::from_str(r#"{ "name": "title" }"#).unwrap();
        assert_eq!(column, Column::new("title", Isa::Str));

        let column: Column =
            serde_json::from_str(r#"{ "name": "created_on", "isa": "DateTime", "nullable": false }"#)
                .unwrap();
        assert_eq!(column.isa, Isa::Other("DateTime".to_owned()));
        assert!(!column.nullable);
    }

    #[test]
    fn primary_is_not_null() {
        let column = Column::new("id", Isa::Int).primary();
        assert!(column.primary);
        assert!(!column.nullable);
    }
}
