//! A small SQL builder for the single-table statements the repository factory
//! precompiles: `SELECT` and `DELETE` filtered by column equality.

mod driver;

pub use driver::{Dialect, ParamMarker, QueryDriver};
pub(crate) use driver::is_identifier;

use crate::Result;

/// Parameter names, in the order their markers appear in the rendered SQL.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Arguments {
    names: Vec<String>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }
    /// Records a parameter and returns its 1-based position.
    pub(crate) fn push(&mut self, name: &str) -> usize {
        self.names.push(name.to_owned());
        self.names.len()
    }
    pub fn names(&self) -> &[String] {
        &self.names
    }
    pub fn len(&self) -> usize {
        self.names.len()
    }
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Equal {
    column: String,
    param: String,
}

fn render_filters(
    filters: &[Equal],
    driver: &QueryDriver,
    arguments: &mut Arguments,
) -> Result<Vec<(String, String)>> {
    filters
        .iter()
        .map(|filter| {
            let column = driver.identifier(&filter.column)?;
            let marker = driver.marker(&filter.param, arguments)?;
            Ok((column.to_owned(), marker))
        })
        .collect()
}

/// `SELECT {projection} FROM {table} [WHERE ...] [LIMIT n]`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    table: Option<String>,
    projection: Vec<String>,
    filters: Vec<Equal>,
    limit: Option<u64>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
    /// Adds a projected column. `*` selects every column, which is also the
    /// default when nothing is selected.
    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.projection.push(column.into());
        self
    }
    /// Adds `{column} = {marker}` joined with `AND`; the marker is bound to
    /// the parameter named `param`.
    pub fn where_equal(mut self, column: impl Into<String>, param: impl Into<String>) -> Self {
        self.filters.push(Equal {
            column: column.into(),
            param: param.into(),
        });
        self
    }
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_sql(&self, driver: &QueryDriver, arguments: &mut Arguments) -> Result<String> {
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| driver.failure("SELECT has no table"))?;
        let table = driver.identifier(table)?;
        let projection = if self.projection.is_empty() {
            vec!["*"]
        } else {
            self.projection
                .iter()
                .map(|column| match column.as_str() {
                    "*" => Ok("*"),
                    column => driver.identifier(column),
                })
                .collect::<Result<Vec<_>>>()?
        };
        let filters = render_filters(&self.filters, driver, arguments)?;

        let mut sql = fmt2::fmt! { { str } =>
            "SELECT " @..join(projection.iter().copied() => ", " => |column| {column}) " FROM " {table}
        };
        if !filters.is_empty() {
            sql.push_str(&fmt2::fmt! { { str } =>
                " WHERE " @..join(&filters => " AND " => |filter| {filter.0.as_str()} " = " {filter.1.as_str()})
            });
        }
        if let Some(limit) = self.limit {
            sql.push_str(&fmt2::fmt! { { str } => " LIMIT " {limit} });
        }
        Ok(sql)
    }
}

/// `DELETE FROM {table} WHERE ... [LIMIT n]`
///
/// The limit is only rendered for dialects that accept it on `DELETE`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteQuery {
    table: Option<String>,
    filters: Vec<Equal>,
    limit: Option<u64>,
}

impl DeleteQuery {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
    pub fn where_equal(mut self, column: impl Into<String>, param: impl Into<String>) -> Self {
        self.filters.push(Equal {
            column: column.into(),
            param: param.into(),
        });
        self
    }
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_sql(&self, driver: &QueryDriver, arguments: &mut Arguments) -> Result<String> {
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| driver.failure("DELETE has no table"))?;
        let table = driver.identifier(table)?;
        if self.filters.is_empty() {
            return Err(driver.failure("DELETE without a filter"));
        }
        let filters = render_filters(&self.filters, driver, arguments)?;

        let mut sql = fmt2::fmt! { { str } =>
            "DELETE FROM " {table}
            " WHERE " @..join(&filters => " AND " => |filter| {filter.0.as_str()} " = " {filter.1.as_str()})
        };
        if let Some(limit) = self.limit
            && driver.dialect().supports_delete_limit()
        {
            sql.push_str(&fmt2::fmt! { { str } => " LIMIT " {limit} });
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_renders_positional_markers() {
        let driver = QueryDriver::new(Dialect::Mysql);
        let mut arguments = Arguments::new();
        let sql = SelectQuery::new()
            .from("store")
            .select("*")
            .where_equal("id", "id")
            .limit(1)
            .to_sql(&driver, &mut arguments)
            .unwrap();
        assert_eq!(sql, "SELECT * FROM store WHERE id = ? LIMIT 1");
        assert_eq!(arguments.names(), ["id"]);
    }

    #[test]
    fn select_numbers_markers_in_order() {
        let driver = QueryDriver::new(Dialect::Postgres);
        let mut arguments = Arguments::new();
        let sql = SelectQuery::new()
            .from("account")
            .where_equal("email", "email")
            .where_equal("tenant_id", "tenant_id")
            .to_sql(&driver, &mut arguments)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM account WHERE email = $1 AND tenant_id = $2"
        );
        assert_eq!(arguments.names(), ["email", "tenant_id"]);
    }

    #[test]
    fn named_markers_use_the_parameter_name() {
        let driver = QueryDriver::new(Dialect::Sqlite).with_param_marker(ParamMarker::Named);
        let mut arguments = Arguments::new();
        let sql = SelectQuery::new()
            .from("store")
            .where_equal("code", "code")
            .limit(1)
            .to_sql(&driver, &mut arguments)
            .unwrap();
        assert_eq!(sql, "SELECT * FROM store WHERE code = :code LIMIT 1");
    }

    #[test]
    fn delete_limit_depends_on_dialect() {
        let query = DeleteQuery::new()
            .from("store")
            .where_equal("id", "id")
            .limit(1);
        let mysql = query
            .to_sql(&QueryDriver::new(Dialect::Mysql), &mut Arguments::new())
            .unwrap();
        let sqlite = query
            .to_sql(&QueryDriver::new(Dialect::Sqlite), &mut Arguments::new())
            .unwrap();
        let postgres = query
            .to_sql(&QueryDriver::new(Dialect::Postgres), &mut Arguments::new())
            .unwrap();
        assert_eq!(mysql, "DELETE FROM store WHERE id = ? LIMIT 1");
        assert_eq!(sqlite, "DELETE FROM store WHERE id = ?");
        assert_eq!(postgres, "DELETE FROM store WHERE id = $1");
    }

    #[test]
    fn unrenderable_identifiers_fail() {
        let driver = QueryDriver::new(Dialect::Mysql);
        let err = SelectQuery::new()
            .from("store; DROP TABLE store")
            .to_sql(&driver, &mut Arguments::new())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::DriverRenderingFailure {
                dialect: Dialect::Mysql,
                ..
            }
        ));

        let err = SelectQuery::new()
            .to_sql(&driver, &mut Arguments::new())
            .unwrap_err();
        assert!(matches!(err, crate::Error::DriverRenderingFailure { .. }));

        let err = DeleteQuery::new()
            .from("store")
            .to_sql(&driver, &mut Arguments::new())
            .unwrap_err();
        assert!(matches!(err, crate::Error::DriverRenderingFailure { .. }));
    }
}
