#![cfg(feature = "sqlite")]

mod common;

use lazyrow::{
    ConnectionManager, DataSourceConfig, Dialect, Error, Generator, Isa,
    introspect::{SqliteTableParser, TableParser, introspect_url},
};
use sqlx::sqlite::SqlitePoolOptions;

async fn parser() -> SqliteTableParser {
    common::init_logging();
    // Every connection to `:memory:` is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    for ddl in [
        "CREATE TABLE store (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code VARCHAR(32) NOT NULL UNIQUE,
            name TEXT,
            active BOOLEAN NOT NULL DEFAULT 1,
            rating REAL,
            created_on DATETIME
        )",
        "CREATE TABLE tag (id INTEGER PRIMARY KEY, label TEXT)",
    ] {
        sqlx::query(ddl).execute(&pool).await.unwrap();
    }
    SqliteTableParser::new(pool)
}

#[tokio::test]
async fn lists_user_tables() {
    let parser = parser().await;
    assert_eq!(parser.tables().await.unwrap(), ["store", "tag"]);
}

#[tokio::test]
async fn describes_columns() {
    let parser = parser().await;
    let schema = parser.table_schema("store").await.unwrap();
    assert_eq!(schema.model_name, "Store");
    assert_eq!(schema.primary_key, "id");
    assert!(schema.validate().is_ok());

    let isa: Vec<_> = schema.columns.iter().map(|column| column.isa.clone()).collect();
    assert_eq!(
        isa,
        [
            Isa::Int,
            Isa::Str,
            Isa::Str,
            Isa::Bool,
            Isa::Float,
            Isa::Other("DateTime".to_owned()),
        ]
    );
    let code = schema.get_column("code").unwrap();
    assert!(code.unique);
    assert!(!code.nullable);
    assert!(schema.get_column("name").unwrap().nullable);
    assert_eq!(schema.get_column("active").unwrap().default, None);
}

#[tokio::test]
async fn introspected_schemas_generate() {
    let parser = parser().await;
    let schemas = parser.schemas().await.unwrap();
    assert_eq!(schemas.len(), 2);

    let connections =
        ConnectionManager::new().with_source("default", DataSourceConfig::new(Dialect::Sqlite));
    let generator = Generator::new(&connections);
    for schema in &schemas {
        let classes = generator.generate(schema).unwrap();
        assert_eq!(
            classes.repository.const_value("DELETE_BY_PRIMARY_KEY_SQL"),
            Some(format!("DELETE FROM {} WHERE id = ?", schema.table).as_str())
        );
    }
}

#[test]
fn introspect_from_sync_code() {
    common::init_logging();
    assert!(introspect_url("sqlite::memory:").unwrap().is_empty());
    assert!(matches!(
        introspect_url("postgres://localhost/shop"),
        Err(Error::Config(_))
    ));
    assert!(matches!(introspect_url("shop.db"), Err(Error::Config(_))));
}
