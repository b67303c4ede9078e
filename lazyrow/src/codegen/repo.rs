use std::collections::HashMap;

use super::{
    DELETE_BY_PRIMARY_KEY_SQL, FIND_BY_PRIMARY_KEY_SQL,
    accessor::{property_name, ucfirst},
    class::{ClassSpec, ConnectionRole, Expr, Method, Param, Property, PropertyRole, Stmt, Visibility},
    synth::{self, Shape, Synthesized},
    template::MethodTemplate,
};
use crate::{
    Error, Result,
    error::Violation,
    query::QueryDriver,
    schema::{Column, Schema},
};

const LOAD_BY_PRIMARY_KEY: &str = "loadByPrimaryKey";

/// `loadBy` + UpperCamel(column).
pub fn finder_name(column: &str) -> String {
    let column = ucfirst(&property_name(column));
    fmt2::fmt! { { str } => "loadBy" {column.as_str()} }
}

fn slot_name(method: &str) -> String {
    fmt2::fmt! { { str } => {method} "Stm" }
}

pub(super) fn check_finder_names(schema: &Schema) -> Result<()> {
    let mut seen = HashMap::<String, &Column>::new();
    for column in schema.findable_columns() {
        let method = finder_name(&column.name);
        let other = if method == LOAD_BY_PRIMARY_KEY {
            Some(LOAD_BY_PRIMARY_KEY.to_owned())
        } else {
            seen.get(&method).map(|other| other.name.clone())
        };
        if let Some(other) = other {
            return Err(Error::violation(
                &schema.table,
                Violation::FinderCollision {
                    method,
                    column: column.name.clone(),
                    other,
                },
            ));
        }
        seen.insert(method, column);
    }
    Ok(())
}

fn slot(name: &str) -> Property {
    Property::new(
        name,
        Visibility::Protected,
        serde_json::Value::Null,
        PropertyRole::StatementSlot,
    )
}

/// Binds every synthesized parameter to the method parameter `param`.
fn bind(synthesized: &Synthesized, param: &str) -> Vec<(String, Expr)> {
    synthesized
        .param_order
        .iter()
        .map(|name| (name.clone(), Expr::param(param)))
        .collect()
}

fn prepare_once(slot: &str, connection: ConnectionRole, sql: Expr, fetch_class: Option<String>) -> Stmt {
    Stmt::InitOnce {
        slot: slot.to_owned(),
        init: Expr::Prepare {
            connection,
            sql: Box::new(sql),
            fetch_class,
        },
    }
}

pub(super) fn build(
    schema: &Schema,
    base_class: &str,
    read: &QueryDriver,
    write: &QueryDriver,
) -> Result<ClassSpec> {
    let primary_key = schema.primary_key.as_str();
    let model_class = schema.model_class();
    let mut class = ClassSpec::new(schema.base_repo_class());
    super::add_snapshot(&mut class, schema);

    class.add_property(slot("loadStm"));
    class.add_property(slot("deleteStm"));

    if let Some(directives) = &schema.codegen {
        class.add_method(MethodTemplate::base_create().apply(directives)?);
    }

    let find = synth::synthesize(
        schema,
        &Shape::SelectByColumnsLimit1(vec![primary_key.to_owned()]),
        read,
    )?;
    class.add_method(Method::public(LOAD_BY_PRIMARY_KEY).param(Param::new("pkId")).body(vec![
        prepare_once(
            "loadStm",
            ConnectionRole::Read,
            Expr::Const(FIND_BY_PRIMARY_KEY_SQL.to_owned()),
            Some(model_class.clone()),
        ),
        Stmt::Return(Expr::Fetch {
            statement: Box::new(Expr::Slot("loadStm".to_owned())),
            params: bind(&find, "pkId"),
        }),
    ]));
    class.add_const(FIND_BY_PRIMARY_KEY_SQL, find.sql);

    for column in schema.findable_columns() {
        let method = finder_name(&column.name);
        let stm = slot_name(&method);
        let find = synth::synthesize(
            schema,
            &Shape::SelectByColumnsLimit1(vec![column.name.clone()]),
            read,
        )?;
        class.add_property(slot(&stm));
        class.add_method(Method::public(method).param(Param::new("value")).body(vec![
            prepare_once(
                &stm,
                ConnectionRole::Read,
                Expr::literal(find.sql.as_str()),
                Some(model_class.clone()),
            ),
            Stmt::Return(Expr::Fetch {
                statement: Box::new(Expr::Slot(stm.clone())),
                params: bind(&find, "value"),
            }),
        ]));
    }

    let delete = synth::synthesize(
        schema,
        &Shape::DeleteByColumnLimit1(primary_key.to_owned()),
        write,
    )?;
    class.add_method(Method::public("deleteByPrimaryKey").param(Param::new("pkId")).body(vec![
        prepare_once(
            "deleteStm",
            ConnectionRole::Write,
            Expr::Const(DELETE_BY_PRIMARY_KEY_SQL.to_owned()),
            None,
        ),
        Stmt::Return(Expr::Execute {
            statement: Box::new(Expr::Slot("deleteStm".to_owned())),
            params: bind(&delete, "pkId"),
        }),
    ]));
    class.add_const(DELETE_BY_PRIMARY_KEY_SQL, delete.sql);

    class.extends = Some(base_class.to_owned());
    Ok(class)
}
