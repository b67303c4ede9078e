//! Precompiles the SQL of repository lookups and deletes.

use log::trace;

use crate::{
    Error, Result,
    error::Violation,
    query::{Arguments, DeleteQuery, QueryDriver, SelectQuery},
    schema::Schema,
};

/// A statement shape the repository factory needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// `SELECT * ... WHERE c1 = ? AND ... LIMIT 1`
    SelectByColumnsLimit1(Vec<String>),
    /// `DELETE ... WHERE c = ?`, limited to one row where the dialect allows.
    DeleteByColumnLimit1(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesized {
    pub sql: String,
    /// Parameter names in marker order.
    pub param_order: Vec<String>,
}

fn check_columns<'a>(schema: &Schema, columns: impl IntoIterator<Item = &'a String>) -> Result<()> {
    for column in columns {
        if schema.get_column(column).is_none() {
            return Err(Error::violation(
                &schema.table,
                Violation::UnknownColumn(column.clone()),
            ));
        }
    }
    Ok(())
}

pub fn synthesize(schema: &Schema, shape: &Shape, driver: &QueryDriver) -> Result<Synthesized> {
    let mut arguments = Arguments::new();
    let sql = match shape {
        Shape::SelectByColumnsLimit1(columns) => {
            if columns.is_empty() {
                return Err(driver.failure("lookup without columns"));
            }
            check_columns(schema, columns)?;
            columns
                .iter()
                .fold(
                    SelectQuery::new().from(schema.table.as_str()).select("*"),
                    |query, column| query.where_equal(column.as_str(), column.as_str()),
                )
                .limit(1)
                .to_sql(driver, &mut arguments)?
        }
        Shape::DeleteByColumnLimit1(column) => {
            check_columns(schema, [column])?;
            DeleteQuery::new()
                .from(schema.table.as_str())
                .where_equal(column.as_str(), column.as_str())
                .limit(1)
                .to_sql(driver, &mut arguments)?
        }
    };
    trace!("{} {shape:?}: {sql}", driver.dialect());
    Ok(Synthesized {
        sql,
        param_order: arguments.into_names(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        query::Dialect,
        schema::{Column, Isa},
    };

    fn store() -> Schema {
        Schema::new("store", "Store")
            .column(Column::new("id", Isa::Int).primary())
            .column(Column::new("code", Isa::Str))
    }

    #[test]
    fn select_by_primary_key() {
        let synthesized = synthesize(
            &store(),
            &Shape::SelectByColumnsLimit1(vec!["id".to_owned()]),
            &QueryDriver::new(Dialect::Mysql),
        )
        .unwrap();
        assert_eq!(synthesized.sql, "SELECT * FROM store WHERE id = ? LIMIT 1");
        assert_eq!(synthesized.param_order, ["id"]);
    }

    #[test]
    fn select_by_two_columns() {
        let synthesized = synthesize(
            &store(),
            &Shape::SelectByColumnsLimit1(vec!["code".to_owned(), "id".to_owned()]),
            &QueryDriver::new(Dialect::Postgres),
        )
        .unwrap();
        assert_eq!(
            synthesized.sql,
            "SELECT * FROM store WHERE code = $1 AND id = $2 LIMIT 1"
        );
        assert_eq!(synthesized.param_order, ["code", "id"]);
    }

    #[test]
    fn delete_by_primary_key() {
        let shape = Shape::DeleteByColumnLimit1("id".to_owned());
        let mysql = synthesize(&store(), &shape, &QueryDriver::new(Dialect::Mysql)).unwrap();
        let sqlite = synthesize(&store(), &shape, &QueryDriver::new(Dialect::Sqlite)).unwrap();
        assert_eq!(mysql.sql, "DELETE FROM store WHERE id = ? LIMIT 1");
        assert_eq!(sqlite.sql, "DELETE FROM store WHERE id = ?");
    }

    #[test]
    fn unknown_column() {
        let err = synthesize(
            &store(),
            &Shape::DeleteByColumnLimit1("ghost".to_owned()),
            &QueryDriver::new(Dialect::Mysql),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaInvariantViolation {
                violation: Violation::UnknownColumn(_),
                ..
            }
        ));
    }

    #[test]
    fn empty_lookup_cannot_render() {
        let err = synthesize(
            &store(),
            &Shape::SelectByColumnsLimit1(Vec::new()),
            &QueryDriver::new(Dialect::Mysql),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DriverRenderingFailure { .. }));
    }
}
