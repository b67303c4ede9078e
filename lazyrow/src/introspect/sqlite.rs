use std::collections::HashSet;

use sqlx::{Row, SqlitePool};

use super::{ColumnDescription, KeyRole, TableParser, describe};
use crate::{
    Result,
    query::{Dialect, QueryDriver},
    schema::Schema,
};

/// Reads SQLite tables from `sqlite_master` and the `table_info` and
/// `index_list` pragmas.
#[derive(Debug, Clone)]
pub struct SqliteTableParser {
    pool: SqlitePool,
}

impl SqliteTableParser {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(SqlitePool::connect(url).await?))
    }

    /// Columns covered alone by a unique index.
    async fn unique_columns(&self, table: &str) -> Result<HashSet<String>> {
        let indexes = sqlx::query(&fmt2::fmt! { { str } => "PRAGMA index_list(\"" {table} "\")" })
            .fetch_all(&self.pool)
            .await?;
        let mut unique = HashSet::<String>::new();
        for index in indexes {
            if index.try_get::<i64, _>("unique")? == 0 {
                continue;
            }
            let name: String = index.try_get("name")?;
            let name = name.replace('"', "\"\"");
            let columns = sqlx::query(&fmt2::fmt! { { str } => "PRAGMA index_info(\"" {name.as_str()} "\")" })
                .fetch_all(&self.pool)
                .await?;
            if let [column] = columns.as_slice() {
                unique.insert(column.try_get("name")?);
            }
        }
        Ok(unique)
    }
}

impl TableParser for SqliteTableParser {
    async fn tables(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| row.try_get("name"))
            .collect::<Result<Vec<String>, sqlx::Error>>()?)
    }

    async fn table_schema(&self, table: &str) -> Result<Schema> {
        let table = QueryDriver::new(Dialect::Sqlite).identifier(table)?;
        let unique = self.unique_columns(table).await?;
        let rows = sqlx::query(&fmt2::fmt! { { str } => "PRAGMA table_info(\"" {table} "\")" })
            .fetch_all(&self.pool)
            .await?;
        let columns = rows
            .iter()
            .map(|row| -> Result<ColumnDescription, sqlx::Error> {
                let name: String = row.try_get("name")?;
                let primary = row.try_get::<i64, _>("pk")? > 0;
                let key = if primary {
                    KeyRole::Primary
                } else if unique.contains(&name) {
                    KeyRole::Unique
                } else {
                    KeyRole::None
                };
                Ok(ColumnDescription {
                    sql_type: row.try_get("type")?,
                    nullable: row.try_get::<i64, _>("notnull")? == 0 && !primary,
                    key,
                    default: row.try_get("dflt_value")?,
                    name,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(describe(table, columns))
    }
}
