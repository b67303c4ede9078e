//! Class factories: a schema in, the class descriptions of its model and
//! repository classes out.
//!
//! Generation is a single synchronous pass. The schema is validated before
//! anything is built, so a failing schema never yields a partial class.

pub mod accessor;
pub mod class;
mod model;
mod repo;
pub mod synth;
pub mod template;

pub use repo::finder_name;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use self::class::{ClassSpec, Expr, Method, Property, PropertyRole, Stmt, Visibility};
use crate::{
    Result,
    config::{DEFAULT_BASE_MODEL_CLASS, DEFAULT_BASE_REPO_CLASS, GeneratorConfig},
    connection::{ConnectionManager, DataSource},
    schema::Schema,
};

pub const SCHEMA_CLASS: &str = "SCHEMA_CLASS";
pub const SCHEMA_PROXY_CLASS: &str = "SCHEMA_PROXY_CLASS";
pub const COLLECTION_CLASS: &str = "COLLECTION_CLASS";
pub const MODEL_CLASS: &str = "MODEL_CLASS";
pub const TABLE: &str = "TABLE";
pub const READ_SOURCE_ID: &str = "READ_SOURCE_ID";
pub const WRITE_SOURCE_ID: &str = "WRITE_SOURCE_ID";
pub const PRIMARY_KEY: &str = "PRIMARY_KEY";
pub const TABLE_ALIAS: &str = "TABLE_ALIAS";
pub const FIND_BY_PRIMARY_KEY_SQL: &str = "FIND_BY_PRIMARY_KEY_SQL";
pub const DELETE_BY_PRIMARY_KEY_SQL: &str = "DELETE_BY_PRIMARY_KEY_SQL";

pub const COLUMN_NAMES: &str = "columnNames";
pub const COLUMN_HASH: &str = "columnHash";
pub const MIXIN_CLASSES: &str = "mixinClasses";

/// The model and repository of one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedClasses {
    pub model: ClassSpec,
    pub repository: ClassSpec,
}

#[derive(Debug, Clone)]
pub struct Generator<'a> {
    connections: &'a ConnectionManager,
    base_model_class: String,
    base_repo_class: String,
}

impl<'a> Generator<'a> {
    pub fn new(connections: &'a ConnectionManager) -> Self {
        Self {
            connections,
            base_model_class: DEFAULT_BASE_MODEL_CLASS.to_owned(),
            base_repo_class: DEFAULT_BASE_REPO_CLASS.to_owned(),
        }
    }
    pub fn from_config(connections: &'a ConnectionManager, config: &GeneratorConfig) -> Self {
        Self::new(connections)
            .with_base_classes(config.base_model_class.as_str(), config.base_repo_class.as_str())
    }
    pub fn with_base_classes(
        mut self,
        base_model_class: impl Into<String>,
        base_repo_class: impl Into<String>,
    ) -> Self {
        self.base_model_class = base_model_class.into();
        self.base_repo_class = base_repo_class.into();
        self
    }

    fn sources(&self, schema: &Schema) -> Result<(&'a DataSource, &'a DataSource)> {
        let read = self.connections.resolve(schema.read_source_id())?;
        let write = self.connections.resolve(schema.write_source_id())?;
        Ok((read, write))
    }

    /// Builds the base model class of `schema`, extending `base_class`.
    pub fn build_model(&self, schema: &Schema, base_class: &str) -> Result<ClassSpec> {
        check_schema(schema)?;
        self.sources(schema)?;
        let class = model::build(schema, base_class);
        debug!(
            "generated model {} for table {} ({} methods)",
            class.name,
            schema.table,
            class.methods.len()
        );
        Ok(class)
    }

    /// Builds the base repository class of `schema`, extending `base_class`.
    pub fn build_repository(&self, schema: &Schema, base_class: &str) -> Result<ClassSpec> {
        check_schema(schema)?;
        let (read, write) = self.sources(schema)?;
        let class = repo::build(schema, base_class, read.query_driver(), write.query_driver())?;
        debug!(
            "generated repository {} for table {} ({} methods)",
            class.name,
            schema.table,
            class.methods.len()
        );
        Ok(class)
    }

    pub fn generate(&self, schema: &Schema) -> Result<GeneratedClasses> {
        Ok(GeneratedClasses {
            model: self.build_model(schema, &self.base_model_class)?,
            repository: self.build_repository(schema, &self.base_repo_class)?,
        })
    }
}

fn check_schema(schema: &Schema) -> Result<()> {
    schema.validate()?;
    model::check_property_names(schema)?;
    accessor::check_accessor_names(schema)?;
    repo::check_finder_names(schema)
}

/// The constants, snapshots and schema accessor both classes carry.
fn add_snapshot(class: &mut ClassSpec, schema: &Schema) {
    class.requires.push(schema.schema_proxy_file());

    let schema_proxy_class = schema.schema_proxy_class();
    class.add_const(SCHEMA_CLASS, schema.schema_class());
    class.add_const(SCHEMA_PROXY_CLASS, schema_proxy_class.as_str());
    class.add_const(COLLECTION_CLASS, schema.collection_class());
    class.add_const(MODEL_CLASS, schema.model_class());
    class.add_const(TABLE, schema.table.as_str());
    class.add_const(READ_SOURCE_ID, schema.read_source_id());
    class.add_const(WRITE_SOURCE_ID, schema.write_source_id());
    class.add_const(PRIMARY_KEY, schema.primary_key.as_str());
    class.add_const(TABLE_ALIAS, "m");

    class.add_property(Property::new(
        "table",
        Visibility::Protected,
        schema.table.as_str(),
        PropertyRole::Table,
    ));

    class.add_static_var(COLUMN_NAMES, schema.column_names().collect());
    class.add_static_var(
        COLUMN_HASH,
        Value::Object(
            schema
                .column_names()
                .map(|name| (name.to_owned(), Value::from(1)))
                .collect::<Map<_, _>>(),
        ),
    );
    class.add_static_var(
        MIXIN_CLASSES,
        schema
            .mixin_classes
            .iter()
            .rev()
            .map(String::as_str)
            .collect(),
    );

    class.add_method(
        Method::public_static("getSchema").body(vec![Stmt::Return(Expr::SchemaProxy {
            class: schema_proxy_class,
        })]),
    );
}
