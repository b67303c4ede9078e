use sqlx::{MySqlPool, Row, mysql::MySqlRow};

use super::{ColumnDescription, KeyRole, TableParser, describe};
use crate::{
    Result,
    query::{Dialect, QueryDriver},
    schema::Schema,
};

/// Reads MySQL tables with `SHOW TABLES` and `SHOW COLUMNS`.
#[derive(Debug, Clone)]
pub struct MysqlTableParser {
    pool: MySqlPool,
}

impl MysqlTableParser {
    pub const fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(MySqlPool::connect(url).await?))
    }
}

/// Some servers report `SHOW` columns as binary strings.
fn text(row: &MySqlRow, column: &str) -> Result<Option<String>> {
    match row.try_get::<Option<String>, _>(column) {
        Ok(text) => Ok(text),
        Err(_) => Ok(row
            .try_get::<Option<Vec<u8>>, _>(column)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())),
    }
}

impl TableParser for MysqlTableParser {
    async fn tables(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SHOW TABLES").fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| -> Result<String> {
                match row.try_get::<String, _>(0) {
                    Ok(table) => Ok(table),
                    Err(_) => Ok(String::from_utf8_lossy(&row.try_get::<Vec<u8>, _>(0)?).into_owned()),
                }
            })
            .collect()
    }

    async fn table_schema(&self, table: &str) -> Result<Schema> {
        let table = QueryDriver::new(Dialect::Mysql).identifier(table)?;
        let sql = fmt2::fmt! { { str } => "SHOW COLUMNS FROM `" {table} "`" };
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let columns = rows
            .iter()
            .map(|row| -> Result<ColumnDescription> {
                Ok(ColumnDescription {
                    name: text(row, "Field")?.unwrap_or_default(),
                    sql_type: text(row, "Type")?.unwrap_or_default(),
                    nullable: text(row, "Null")?.as_deref() == Some("YES"),
                    key: match text(row, "Key")?.as_deref() {
                        Some("PRI") => KeyRole::Primary,
                        Some("UNI") => KeyRole::Unique,
                        _ => KeyRole::None,
                    },
                    default: text(row, "Default")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(describe(table, columns))
    }
}
