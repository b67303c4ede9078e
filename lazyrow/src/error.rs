use crate::{codegen::class::ConnectionRole, query::Dialect};

/// Result of a generation-time operation.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A schema that breaks one of the invariants the factories rely on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Violation {
    #[error("schema has no columns")]
    NoColumns,
    #[error("column name `{0}` is not an identifier with a usable property name")]
    InvalidColumnName(String),
    #[error("column `{0}` is declared more than once")]
    DuplicateColumn(String),
    #[error("no column is marked as primary key")]
    MissingPrimaryKey,
    #[error("primary key `{0}` is not a declared column")]
    PrimaryKeyNotDeclared(String),
    #[error("primary key is `{declared}` but the primary column is `{column}`")]
    PrimaryKeyMismatch { declared: String, column: String },
    #[error("columns `{0}` and `{1}` are both marked as primary key")]
    MultiplePrimaryKeys(String, String),
    #[error("column `{0}` is not declared")]
    UnknownColumn(String),
    #[error("accessor `{method}` for column `{column}` collides with {other}")]
    AccessorCollision {
        method: String,
        column: String,
        other: String,
    },
    #[error("column `{0}` collides with the model property of the same name")]
    PropertyCollision(String),
    #[error("finder `{method}` would be generated for both `{column}` and `{other}`")]
    FinderCollision {
        method: String,
        column: String,
        other: String,
    },
}

/// An error while declaring, introspecting or generating.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("schema for table `{table}` is invalid: {violation}")]
    SchemaInvariantViolation { table: String, violation: Violation },
    #[error("{dialect} driver cannot render query: {reason}")]
    DriverRenderingFailure { dialect: Dialect, reason: String },
    #[error("data source `{0}` is not configured")]
    UnknownDataSource(String),
    #[error("method template has no insertion point `{0}`")]
    UnknownInsertionPoint(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("toml error: {0}")]
    Toml(
        #[from]
        #[source]
        toml::de::Error,
    ),
    #[error("io error: {0}")]
    Io(
        #[from]
        #[source]
        std::io::Error,
    ),
    #[error("sql error: {0}")]
    Sql(
        #[from]
        #[source]
        sqlx::Error,
    ),
}

impl Error {
    pub(crate) fn violation(table: &str, violation: Violation) -> Self {
        Self::SchemaInvariantViolation {
            table: table.to_owned(),
            violation,
        }
    }
}

/// An error raised while evaluating a generated class.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// Stored text is not valid JSON.
    #[error("cannot decode json: {0}")]
    Decode(
        #[from]
        #[source]
        serde_json::Error,
    ),
    #[error("class `{class}` has no method `{method}`")]
    UnknownMethod { class: String, method: String },
    #[error("class `{0}` is not defined")]
    UnknownClass(String),
    #[error("class `{class}` has no constant `{name}`")]
    UnknownConstant { class: String, name: String },
    #[error("schema proxy `{0}` is not registered")]
    UnknownSchema(String),
    #[error("inflator `{0}` is not registered")]
    UnknownInflator(String),
    #[error("inflator `{inflator}` failed: {reason}")]
    Inflate { inflator: String, reason: String },
    #[error("statement slot `{0}` is not declared")]
    UnknownSlot(String),
    #[error("statement slot `{0}` is used before it is prepared")]
    UnpreparedSlot(String),
    #[error("missing argument `{0}`")]
    MissingArgument(String),
    #[error("instance has no {0} connection")]
    NoConnection(ConnectionRole),
    #[error("statement error: {0}")]
    Statement(String),
    #[error("expected {expected}, found {found}")]
    Type {
        expected: &'static str,
        found: String,
    },
    #[error(transparent)]
    Generation(#[from] Error),
}
