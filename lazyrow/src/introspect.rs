//! Reverse-engineers schemas from live databases.
//!
//! Introspected schemas carry columns, nullability, keys and the raw engine
//! type. Default values are seen but not carried over.

#[cfg(feature = "mysql")]
mod mysql;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "mysql")]
pub use mysql::MysqlTableParser;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteTableParser;

use heck::ToUpperCamelCase;
use log::{info, warn};

use crate::{
    Error, Result,
    query::Dialect,
    schema::{Column, Isa, Schema},
};

/// Reads table structure from one database.
pub trait TableParser {
    async fn tables(&self) -> Result<Vec<String>>;
    async fn table_schema(&self, table: &str) -> Result<Schema>;

    async fn schemas(&self) -> Result<Vec<Schema>> {
        let mut schemas = Vec::new();
        for table in self.tables().await? {
            schemas.push(self.table_schema(&table).await?);
        }
        Ok(schemas)
    }
}

/// Introspects every table behind `url` from synchronous code, e.g. a build
/// script.
pub fn introspect_url(url: &str) -> Result<Vec<Schema>> {
    let dialect = Dialect::from_url(url).ok_or_else(|| {
        Error::Config(fmt2::fmt! { { str } => "cannot tell the dialect of " {url} })
    })?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        match dialect {
            #[cfg(feature = "mysql")]
            Dialect::Mysql => MysqlTableParser::connect(url).await?.schemas().await,
            #[cfg(feature = "sqlite")]
            Dialect::Sqlite => SqliteTableParser::connect(url).await?.schemas().await,
            #[allow(unreachable_patterns)]
            dialect => Err(Error::Config(
                fmt2::fmt! { { str } => "no table parser for " {dialect.name()} },
            )),
        }
    })
}

/// What an engine type string says about a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// `None` for types without a known semantic type.
    pub isa: Option<Isa>,
    /// Lowercased type name without length or modifiers.
    pub base: String,
    pub length: Option<u32>,
    pub unsigned: bool,
}

/// Parses an engine type such as `int(11) unsigned` or `VARCHAR(255)`.
pub fn parse_type_info(sql_type: &str) -> TypeInfo {
    let sql_type = sql_type.trim().to_ascii_lowercase();
    let (name, rest) = match sql_type.find('(') {
        Some(open) => (&sql_type[..open], &sql_type[open..]),
        None => sql_type
            .split_once(' ')
            .unwrap_or((sql_type.as_str(), "")),
    };
    let base = name.trim().to_owned();
    let length = rest
        .strip_prefix('(')
        .and_then(|rest| rest.split([')', ',']).next())
        .and_then(|length| length.trim().parse().ok());
    let unsigned = rest.split_whitespace().any(|word| word == "unsigned");

    let isa = match base.as_str() {
        "tinyint" if length == Some(1) => Some(Isa::Bool),
        "bool" | "boolean" => Some(Isa::Bool),
        "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "serial"
        | "year" => Some(Isa::Int),
        "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum"
        | "set" | "clob" => Some(Isa::Str),
        "float" | "double" | "real" | "decimal" | "numeric" => Some(Isa::Float),
        "json" | "jsonb" => Some(Isa::Json),
        "date" | "datetime" | "timestamp" | "time" => Some(Isa::Other("DateTime".to_owned())),
        _ => None,
    };
    TypeInfo {
        isa,
        base,
        length,
        unsigned,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyRole {
    Primary,
    Unique,
    None,
}

/// One column as the engine reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnDescription {
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub key: KeyRole,
    pub default: Option<String>,
}

/// Builds the schema of `table` from its column descriptions.
pub(crate) fn describe(table: &str, columns: Vec<ColumnDescription>) -> Schema {
    let mut schema = Schema::new(table, table.to_upper_camel_case());
    for description in columns {
        let type_info = parse_type_info(&description.sql_type);
        let mut column = Column::new(description.name, type_info.isa.unwrap_or_default())
            .sql_type(description.sql_type);
        column.nullable = description.nullable;
        match description.key {
            KeyRole::Primary => column = column.primary(),
            KeyRole::Unique => column = column.unique(),
            KeyRole::None => {}
        }
        if let Some(default) = description.default {
            warn!(
                "{table}.{}: default value {default:?} is not carried into the schema",
                column.name
            );
        }
        schema.push_column(column);
    }
    info!("introspected table {table} ({} columns)", schema.columns.len());
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_info() {
        let info = parse_type_info("int(11) unsigned");
        assert_eq!(info.base, "int");
        assert_eq!(info.length, Some(11));
        assert!(info.unsigned);
        assert_eq!(info.isa, Some(Isa::Int));

        assert_eq!(parse_type_info("tinyint(1)").isa, Some(Isa::Bool));
        assert_eq!(parse_type_info("tinyint(4)").isa, Some(Isa::Int));
        assert_eq!(parse_type_info("VARCHAR(255)").isa, Some(Isa::Str));
        assert_eq!(parse_type_info("decimal(10,2)").length, Some(10));
        assert_eq!(parse_type_info("double precision").isa, Some(Isa::Float));
        assert_eq!(parse_type_info("INTEGER").isa, Some(Isa::Int));
        assert_eq!(
            parse_type_info("datetime").isa,
            Some(Isa::Other("DateTime".to_owned()))
        );
        assert_eq!(parse_type_info("blob").isa, None);
        assert_eq!(parse_type_info("").isa, None);
    }

    #[test]
    fn describes_columns() {
        let schema = describe(
            "order_item",
            vec![
                ColumnDescription {
                    name: "id".to_owned(),
                    sql_type: "int(11)".to_owned(),
                    nullable: false,
                    key: KeyRole::Primary,
                    default: None,
                },
                ColumnDescription {
                    name: "sku".to_owned(),
                    sql_type: "varchar(32)".to_owned(),
                    nullable: false,
                    key: KeyRole::Unique,
                    default: None,
                },
                ColumnDescription {
                    name: "note".to_owned(),
                    sql_type: "blob".to_owned(),
                    nullable: true,
                    key: KeyRole::None,
                    default: Some("''".to_owned()),
                },
            ],
        );
        assert_eq!(schema.model_name, "OrderItem");
        assert_eq!(schema.primary_key, "id");
        assert!(schema.validate().is_ok());
        assert!(schema.columns[1].unique);
        assert!(!schema.columns[1].nullable);
        assert_eq!(schema.columns[2].isa, Isa::Str);
        assert_eq!(schema.columns[2].sql_type.as_deref(), Some("blob"));
        assert_eq!(schema.columns[2].default, None);
    }
}
