mod common;

use common::{MockConnection, MockResolver};
use lazyrow::{
    Column, ConnectionManager, DataSourceConfig, Dialect, Error, GeneratedClasses, Generator,
    Isa, RuntimeContext, Schema, Violation,
    codegen::{DELETE_BY_PRIMARY_KEY_SQL, FIND_BY_PRIMARY_KEY_SQL},
};
use serde_json::{Value, json};

fn store() -> Schema {
    Schema::new("store", "Store")
        .namespace("Shop")
        .column(Column::new("id", Isa::Int).primary())
        .column(Column::new("code", Isa::Str).unique().findable())
        .column(Column::new("name", Isa::Str))
        .column(Column::new("active", Isa::Bool))
        .column(Column::new("rating", Isa::Float))
        .column(Column::new("settings", Isa::Json))
}

fn connections(dialect: Dialect) -> ConnectionManager {
    ConnectionManager::new().with_source("default", DataSourceConfig::new(dialect))
}

fn generate(dialect: Dialect) -> GeneratedClasses {
    Generator::new(&connections(dialect))
        .generate(&store())
        .unwrap()
}

#[test]
fn mysql_store_classes() {
    common::init_logging();
    let GeneratedClasses { model, repository } = generate(Dialect::Mysql);

    assert_eq!(model.name, "Shop::StoreBase");
    assert_eq!(model.extends.as_deref(), Some("lazyrow::BaseModel"));
    assert_eq!(repository.name, "Shop::StoreRepoBase");
    assert_eq!(repository.extends.as_deref(), Some("lazyrow::BaseRepo"));

    for class in [&model, &repository] {
        assert_eq!(class.const_value("TABLE"), Some("store"));
        assert_eq!(class.const_value("PRIMARY_KEY"), Some("id"));
        assert_eq!(class.const_value("READ_SOURCE_ID"), Some("default"));
        assert_eq!(class.const_value("WRITE_SOURCE_ID"), Some("default"));
        assert_eq!(class.const_value("SCHEMA_PROXY_CLASS"), Some("Shop::StoreSchemaProxy"));
        assert_eq!(
            class.static_var("columnNames"),
            Some(&json!(["id", "code", "name", "active", "rating", "settings"]))
        );
    }

    for accessor in ["getId", "getCode", "getName", "isActive", "getRating", "getSettings"] {
        assert!(model.method(accessor).is_some(), "missing {accessor}");
    }

    assert_eq!(
        repository.const_value(FIND_BY_PRIMARY_KEY_SQL),
        Some("SELECT * FROM store WHERE id = ? LIMIT 1")
    );
    assert_eq!(
        repository.const_value(DELETE_BY_PRIMARY_KEY_SQL),
        Some("DELETE FROM store WHERE id = ? LIMIT 1")
    );
    assert!(repository.method("loadByCode").is_some());
    assert!(repository.method("loadByName").is_none());
    assert!(repository.method("create").is_none());

    let slots: Vec<_> = repository.slots().map(|slot| slot.name.as_str()).collect();
    assert_eq!(slots, ["loadStm", "deleteStm", "loadByCodeStm"]);
}

#[test]
fn postgres_store_uses_numbered_markers_and_no_delete_limit() {
    let GeneratedClasses { repository, .. } = generate(Dialect::Postgres);
    assert_eq!(
        repository.const_value(FIND_BY_PRIMARY_KEY_SQL),
        Some("SELECT * FROM store WHERE id = $1 LIMIT 1")
    );
    assert_eq!(
        repository.const_value(DELETE_BY_PRIMARY_KEY_SQL),
        Some("DELETE FROM store WHERE id = $1")
    );
}

#[test]
fn classes_serialize() {
    let classes = generate(Dialect::Sqlite);
    let value = serde_json::to_value(&classes).unwrap();
    let back: GeneratedClasses = serde_json::from_value(value).unwrap();
    assert_eq!(back, classes);
}

#[test]
fn unknown_source_fails_both_builds() {
    let connections = connections(Dialect::Mysql);
    let generator = Generator::new(&connections);
    let schema = store().read_source("replica");
    assert!(matches!(
        generator.build_model(&schema, "lazyrow::BaseModel"),
        Err(Error::UnknownDataSource(id)) if id == "replica"
    ));
    assert!(matches!(
        generator.build_repository(&schema, "lazyrow::BaseRepo"),
        Err(Error::UnknownDataSource(id)) if id == "replica"
    ));
}

#[test]
fn invalid_schema_is_rejected_before_building() {
    let connections = connections(Dialect::Mysql);
    let generator = Generator::new(&connections);

    let schema = store().column(Column::new("code", Isa::Str));
    assert!(matches!(
        generator.generate(&schema),
        Err(Error::SchemaInvariantViolation {
            violation: Violation::DuplicateColumn(column),
            ..
        }) if column == "code"
    ));

    let schema = store().column(Column::new("data", Isa::Str));
    assert!(matches!(
        generator.generate(&schema),
        Err(Error::SchemaInvariantViolation {
            violation: Violation::AccessorCollision { .. },
            ..
        })
    ));
}

#[test]
fn columns_shadowing_model_properties_are_rejected() {
    let connections = connections(Dialect::Mysql);
    let generator = Generator::new(&connections);
    let seat = Schema::new("seat", "Seat")
        .column(Column::new("id", Isa::Int).primary())
        .column(Column::new("table", Isa::Str))
        .column(Column::new("readSourceId", Isa::Str));
    assert!(matches!(
        generator.build_model(&seat, "App::BaseModel"),
        Err(Error::SchemaInvariantViolation {
            violation: Violation::PropertyCollision(column),
            ..
        }) if column == "table"
    ));
    assert!(generator.generate(&seat.column_accessors(false)).is_err());
}

#[test]
fn column_names_must_be_identifiers() {
    let connections = connections(Dialect::Sqlite);
    let generator = Generator::new(&connections);
    for name in ["first name", "__"] {
        assert!(matches!(
            generator.generate(&store().column(Column::new(name, Isa::Str))),
            Err(Error::SchemaInvariantViolation {
                violation: Violation::InvalidColumnName(column),
                ..
            }) if column == name
        ));
    }
}

#[test]
fn store_round_trip() {
    common::init_logging();
    let connection = MockConnection::with_rows([
        json!({ "id": 1, "code": "A1", "name": "Main", "active": "1", "rating": "4.5", "settings": "{\"open\":true}" }),
        json!({ "id": 2, "code": "B2", "name": "Annex", "active": "0", "rating": null, "settings": null }),
    ]);
    let mut context = RuntimeContext::new();
    context.define_classes(generate(Dialect::Mysql));
    context.set_connection_resolver(MockResolver::default().with("default", connection.clone()));

    let descriptor = context
        .instantiate("Shop::StoreBase")
        .unwrap()
        .call("createRepo", &[])
        .unwrap();
    assert_eq!(
        descriptor,
        json!({ "repository": "Shop::StoreRepoBase", "write": null, "read": null })
    );
    let mut repo = context.open_repository(&descriptor).unwrap();

    let row = repo.call("loadByPrimaryKey", &[json!(1)]).unwrap();
    assert_eq!(row["code"], "A1");
    assert_eq!(repo.call("loadByPrimaryKey", &[json!(3)]).unwrap(), Value::Null);
    assert_eq!(repo.call("loadByCode", &[json!("B2")]).unwrap()["id"], 2);
    assert_eq!(repo.call("deleteByPrimaryKey", &[json!(2)]).unwrap(), json!(1));

    assert_eq!(
        connection.prepared(),
        [
            "SELECT * FROM store WHERE id = ? LIMIT 1",
            "SELECT * FROM store WHERE code = ? LIMIT 1",
            "DELETE FROM store WHERE id = ? LIMIT 1",
        ]
    );
    assert_eq!(
        connection.fetched()[1].1,
        [("id".to_owned(), json!(3))]
    );

    let mut store = context.hydrate("Shop::StoreBase", row).unwrap();
    assert_eq!(store.get("code"), Some(&json!("A1")));
    assert_eq!(store.call("getId", &[]).unwrap(), json!(1));
    assert_eq!(store.call("isActive", &[]).unwrap(), json!(true));
    assert_eq!(store.call("getRating", &[]).unwrap(), json!(4.5));
    assert_eq!(store.call("getSettings", &[]).unwrap(), json!({ "open": true }));
    assert_eq!(store.call("getKey", &[]).unwrap(), json!(1));
    assert_eq!(store.call("hasKey", &[]).unwrap(), json!(true));
}
