//! Accessor naming and coercion rules for model columns.

use std::collections::HashMap;

use heck::ToLowerCamelCase;

use super::class::{Coercion, Expr, Stmt};
use crate::{
    Error, Result,
    error::Violation,
    schema::{Column, Isa, Schema},
};

/// Methods every model class defines, which accessors must not shadow.
pub const RESERVED_MODEL_METHODS: [&str; 9] = [
    "getSchema",
    "createRepo",
    "getKeyName",
    "getKey",
    "hasKey",
    "setKey",
    "getData",
    "setData",
    "clear",
];

pub(crate) fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Camel-cased column name accessor and finder names derive from.
pub fn property_name(column: &str) -> String {
    column.to_lower_camel_case()
}

fn has_is_prefix(name: &str) -> bool {
    name.strip_prefix("is")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// `isActive` stays as is, boolean `active` becomes `isActive`, anything else
/// gets a `get` prefix.
pub fn accessor_name(column: &Column) -> String {
    let property = property_name(&column.name);
    if has_is_prefix(&property) {
        return property;
    }
    let prefix = if column.isa == Isa::Bool { "is" } else { "get" };
    let property = ucfirst(&property);
    fmt2::fmt! { { str } => {prefix} {property.as_str()} }
}

/// The accessor body: read the column property and coerce it.
pub fn accessor_body(column: &Column) -> Vec<Stmt> {
    let raw = || Expr::property(column.name.as_str());
    if column.inflator.is_some() {
        return vec![Stmt::Return(Expr::ColumnInflate {
            column: column.name.clone(),
            value: Box::new(raw()),
        })];
    }
    let value = match &column.isa {
        Isa::Int => Expr::coerce(Coercion::Int, raw()),
        Isa::Str => raw(),
        Isa::Bool => {
            return vec![
                Stmt::Let {
                    var: "value".to_owned(),
                    value: raw(),
                },
                Stmt::If {
                    condition: Expr::IsBlank(Box::new(Expr::var("value"))),
                    then: vec![Stmt::Return(Expr::Null)],
                },
                Stmt::Return(Expr::coerce(Coercion::Bool, Expr::var("value"))),
            ];
        }
        Isa::Float => Expr::coerce(Coercion::Float, raw()),
        Isa::Json => Expr::coerce(Coercion::Json, raw()),
        Isa::Other(type_name) => Expr::Inflate {
            type_name: type_name.clone(),
            value: Box::new(raw()),
        },
    };
    vec![Stmt::Return(value)]
}

/// Accessor names must be unique and leave the fixed model methods alone.
pub(crate) fn check_accessor_names(schema: &Schema) -> Result<()> {
    if !schema.enable_column_accessors {
        return Ok(());
    }
    let mut seen = HashMap::<String, &str>::with_capacity(schema.columns.len());
    for column in &schema.columns {
        let method = accessor_name(column);
        let other = if RESERVED_MODEL_METHODS.contains(&method.as_str()) {
            Some(fmt2::fmt! { { str } => "model method `" {method.as_str()} "`" })
        } else {
            seen.get(&method)
                .map(|other| fmt2::fmt! { { str } => "the accessor of `" {*other} "`" })
        };
        if let Some(other) = other {
            return Err(Error::violation(
                &schema.table,
                Violation::AccessorCollision {
                    method,
                    column: column.name.clone(),
                    other,
                },
            ));
        }
        seen.insert(method, &column.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(accessor_name(&Column::new("name", Isa::Str)), "getName");
        assert_eq!(
            accessor_name(&Column::new("created_on", Isa::Other("DateTime".into()))),
            "getCreatedOn"
        );
        assert_eq!(accessor_name(&Column::new("active", Isa::Bool)), "isActive");
        assert_eq!(
            accessor_name(&Column::new("is_active", Isa::Bool)),
            "isActive"
        );
        assert_eq!(accessor_name(&Column::new("isbn", Isa::Str)), "getIsbn");
        assert_eq!(accessor_name(&Column::new("user_ID", Isa::Int)), "getUserId");
        assert_eq!(
            accessor_name(&Column::new("is_visible", Isa::Int)),
            "isVisible"
        );
    }

    #[test]
    fn int_body() {
        assert_eq!(
            accessor_body(&Column::new("count", Isa::Int)),
            [Stmt::Return(Expr::coerce(
                Coercion::Int,
                Expr::property("count")
            ))]
        );
    }

    #[test]
    fn str_body_is_raw() {
        assert_eq!(
            accessor_body(&Column::new("display_name", Isa::Str)),
            [Stmt::Return(Expr::property("display_name"))]
        );
    }

    #[test]
    fn inflator_wins_over_isa() {
        let column = Column::new("price", Isa::Float).inflator("money");
        assert_eq!(
            accessor_body(&column),
            [Stmt::Return(Expr::ColumnInflate {
                column: "price".to_owned(),
                value: Box::new(Expr::property("price")),
            })]
        );
    }

    #[test]
    fn other_isa_inflates_by_type() {
        let column = Column::new("created_on", Isa::Other("DateTime".to_owned()));
        assert_eq!(
            accessor_body(&column),
            [Stmt::Return(Expr::Inflate {
                type_name: "DateTime".to_owned(),
                value: Box::new(Expr::property("created_on")),
            })]
        );
    }

    #[test]
    fn collisions() {
        let schema = Schema::new("t", "T")
            .column(Column::new("id", Isa::Int).primary())
            .column(Column::new("user_name", Isa::Str))
            .column(Column::new("userName", Isa::Str));
        assert!(matches!(
            check_accessor_names(&schema),
            Err(Error::SchemaInvariantViolation {
                violation: Violation::AccessorCollision { .. },
                ..
            })
        ));

        let schema = Schema::new("t", "T")
            .column(Column::new("id", Isa::Int).primary())
            .column(Column::new("data", Isa::Json));
        assert!(check_accessor_names(&schema).is_err());
        assert!(check_accessor_names(&schema.column_accessors(false)).is_ok());
    }
}
