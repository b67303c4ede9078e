use serde_json::Value;

use super::{
    accessor,
    class::{ClassSpec, Expr, Method, Param, Property, PropertyRole, Stmt, Visibility},
};
use crate::{Error, Result, error::Violation, schema::Schema};

const READ_SOURCE_ID_PROPERTY: &str = "readSourceId";
const WRITE_SOURCE_ID_PROPERTY: &str = "writeSourceId";

/// Properties every model class defines besides its columns.
pub(super) const FIXED_PROPERTIES: [&str; 3] =
    ["table", READ_SOURCE_ID_PROPERTY, WRITE_SOURCE_ID_PROPERTY];

pub(super) fn check_property_names(schema: &Schema) -> Result<()> {
    match schema
        .column_names()
        .find(|name| FIXED_PROPERTIES.contains(name))
    {
        Some(name) => Err(Error::violation(
            &schema.table,
            Violation::PropertyCollision(name.to_owned()),
        )),
        None => Ok(()),
    }
}

pub(super) fn build(schema: &Schema, base_class: &str) -> ClassSpec {
    let primary_key = schema.primary_key.as_str();
    let mut class = ClassSpec::new(schema.base_model_class());
    super::add_snapshot(&mut class, schema);

    class.add_property(Property::new(
        READ_SOURCE_ID_PROPERTY,
        Visibility::Public,
        schema.read_source_id(),
        PropertyRole::SourceId,
    ));
    class.add_property(Property::new(
        WRITE_SOURCE_ID_PROPERTY,
        Visibility::Public,
        schema.write_source_id(),
        PropertyRole::SourceId,
    ));

    class.traits.clone_from(&schema.model_traits);
    class.add_method(
        Method::public_static("createRepo")
            .param(Param::new("write").with_default(Value::Null))
            .param(Param::new("read").with_default(Value::Null))
            .body(vec![Stmt::Return(Expr::NewRepository {
                class: schema.base_repo_class(),
                write: Box::new(Expr::param("write")),
                read: Box::new(Expr::param("read")),
            })]),
    );
    class.extends = Some(base_class.to_owned());
    class.interfaces.clone_from(&schema.model_interfaces);

    for column in &schema.columns {
        class.add_property(Property::new(
            column.name.as_str(),
            Visibility::Public,
            Value::Null,
            PropertyRole::Column,
        ));
        if schema.enable_column_accessors {
            class.add_method(
                Method::public(accessor::accessor_name(column)).body(accessor::accessor_body(column)),
            );
        }
    }

    class.add_method(
        Method::public("getKeyName").body(vec![Stmt::Return(Expr::literal(primary_key))]),
    );
    class.add_method(
        Method::public("getKey").body(vec![Stmt::Return(Expr::property(primary_key))]),
    );
    class.add_method(Method::public("hasKey").body(vec![Stmt::Return(Expr::IsSet(Box::new(
        Expr::property(primary_key),
    )))]));
    class.add_method(Method::public("setKey").param(Param::new("key")).body(vec![
        Stmt::Assign {
            property: primary_key.to_owned(),
            value: Expr::param("key"),
        },
        Stmt::Return(Expr::param("key")),
    ]));

    class.add_method(
        Method::public("getData").body(vec![Stmt::Return(Expr::Mapping(
            schema
                .column_names()
                .map(|name| (name.to_owned(), Expr::property(name)))
                .collect(),
        ))]),
    );
    // Only keys present in `data` are written.
    class.add_method(
        Method::public("setData").param(Param::map("data")).body(
            schema
                .column_names()
                .map(|name| Stmt::If {
                    condition: Expr::HasKey {
                        map: Box::new(Expr::param("data")),
                        key: name.to_owned(),
                    },
                    then: vec![Stmt::Assign {
                        property: name.to_owned(),
                        value: Expr::Get {
                            map: Box::new(Expr::param("data")),
                            key: name.to_owned(),
                        },
                    }],
                })
                .collect(),
        ),
    );
    class.add_method(
        Method::public("clear").body(
            schema
                .column_names()
                .map(|name| Stmt::Assign {
                    property: name.to_owned(),
                    value: Expr::Null,
                })
                .collect(),
        ),
    );

    class
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Isa};

    fn book() -> Schema {
        Schema::new("book", "Book")
            .namespace("Shelf")
            .column(Column::new("id", Isa::Int).primary())
            .column(Column::new("title", Isa::Str))
            .column(Column::new("published", Isa::Bool))
            .mixin("Timestamps")
            .mixin("SoftDelete")
            .model_interface("Shelf::Sellable")
            .model_trait("Shelf::Priced")
    }

    #[test]
    fn header() {
        let class = build(&book(), "App::BaseModel");
        assert_eq!(class.name, "Shelf::BookBase");
        assert_eq!(class.extends.as_deref(), Some("App::BaseModel"));
        assert_eq!(class.interfaces, ["Shelf::Sellable"]);
        assert_eq!(class.traits, ["Shelf::Priced"]);
        assert_eq!(class.requires, ["BookSchemaProxy"]);
        assert_eq!(class.const_value("MODEL_CLASS"), Some("Shelf::Book"));
        assert_eq!(class.const_value("TABLE_ALIAS"), Some("m"));
        assert_eq!(
            class.static_var("mixinClasses"),
            Some(&serde_json::json!(["SoftDelete", "Timestamps"]))
        );
        assert_eq!(
            class.static_var("columnHash"),
            Some(&serde_json::json!({ "id": 1, "title": 1, "published": 1 }))
        );
    }

    #[test]
    fn columns_must_not_shadow_fixed_properties() {
        assert!(check_property_names(&book()).is_ok());
        for name in FIXED_PROPERTIES {
            let schema = book().column(Column::new(name, Isa::Str)).column_accessors(false);
            assert!(matches!(
                check_property_names(&schema),
                Err(Error::SchemaInvariantViolation {
                    violation: Violation::PropertyCollision(column),
                    ..
                }) if column == name
            ));
        }
    }

    #[test]
    fn accessors_follow_the_switch() {
        let class = build(&book(), "App::BaseModel");
        assert!(class.method("getTitle").is_some());
        assert!(class.method("isPublished").is_some());
        let class = build(&book().column_accessors(false), "App::BaseModel");
        assert!(class.method("getTitle").is_none());
        assert!(class.property("title").is_some());
    }
}
