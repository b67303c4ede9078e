//! The schema IR: the structure of one table as the class factories see it.
//!
//! A schema is declared with the builder methods, with the `#[schema]`
//! attribute macro, deserialized from a file, or produced by
//! [`crate::introspect`].

mod column;
mod directive;

pub use column::{Column, Isa};
pub use directive::{CODEGEN_INSERTION_POINT, CodegenDirectives};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result, codegen::accessor::property_name, error::Violation, query::is_identifier,
};

/// Source id used when a schema does not name one.
pub const DEFAULT_SOURCE_ID: &str = "default";
const NAMESPACE_SEPARATOR: &str = "::";

/// A type that declares the schema of its table.
pub trait DeclareSchema {
    fn schema() -> Schema;
}

const fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub table: String,
    #[serde(default)]
    pub namespace: String,
    pub model_name: String,
    /// Set from the first primary column when left empty.
    #[serde(default)]
    pub primary_key: String,
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_source_id: Option<String>,
    #[serde(default)]
    pub mixin_classes: Vec<String>,
    #[serde(default)]
    pub model_interfaces: Vec<String>,
    #[serde(default)]
    pub model_traits: Vec<String>,
    #[serde(default = "enabled")]
    pub enable_column_accessors: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codegen: Option<CodegenDirectives>,
}

impl Schema {
    pub fn new(table: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            namespace: String::new(),
            model_name: model_name.into(),
            primary_key: String::new(),
            columns: Vec::new(),
            read_source_id: None,
            write_source_id: None,
            mixin_classes: Vec::new(),
            model_interfaces: Vec::new(),
            model_traits: Vec::new(),
            enable_column_accessors: true,
            codegen: None,
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
    pub fn primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }
    pub fn column(mut self, column: Column) -> Self {
        self.push_column(column);
        self
    }
    pub fn push_column(&mut self, column: Column) {
        if column.primary && self.primary_key.is_empty() {
            self.primary_key.clone_from(&column.name);
        }
        self.columns.push(column);
    }
    pub fn read_source(mut self, source_id: impl Into<String>) -> Self {
        self.read_source_id = Some(source_id.into());
        self
    }
    pub fn write_source(mut self, source_id: impl Into<String>) -> Self {
        self.write_source_id = Some(source_id.into());
        self
    }
    pub fn mixin(mut self, class: impl Into<String>) -> Self {
        self.mixin_classes.push(class.into());
        self
    }
    pub fn model_interface(mut self, interface: impl Into<String>) -> Self {
        self.model_interfaces.push(interface.into());
        self
    }
    pub fn model_trait(mut self, model_trait: impl Into<String>) -> Self {
        self.model_traits.push(model_trait.into());
        self
    }
    pub fn column_accessors(mut self, enable: bool) -> Self {
        self.enable_column_accessors = enable;
        self
    }
    pub fn codegen(mut self, directives: CodegenDirectives) -> Self {
        self.codegen = Some(directives);
        self
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }
    pub fn findable_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.findable)
    }
    pub fn read_source_id(&self) -> &str {
        self.read_source_id.as_deref().unwrap_or(DEFAULT_SOURCE_ID)
    }
    pub fn write_source_id(&self) -> &str {
        self.write_source_id.as_deref().unwrap_or(DEFAULT_SOURCE_ID)
    }

    fn qualify(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_owned()
        } else {
            fmt2::fmt! { { str } => {self.namespace.as_str()} {NAMESPACE_SEPARATOR} {name} }
        }
    }
    fn suffixed(&self, suffix: &str) -> String {
        self.qualify(&fmt2::fmt! { { str } => {self.model_name.as_str()} {suffix} })
    }
    pub fn model_class(&self) -> String {
        self.qualify(&self.model_name)
    }
    pub fn schema_class(&self) -> String {
        self.suffixed("Schema")
    }
    pub fn schema_proxy_class(&self) -> String {
        self.suffixed("SchemaProxy")
    }
    pub fn collection_class(&self) -> String {
        self.suffixed("Collection")
    }
    pub fn base_model_class(&self) -> String {
        self.suffixed("Base")
    }
    pub fn base_repo_class(&self) -> String {
        self.suffixed("RepoBase")
    }
    /// File the generated classes require to load the schema proxy.
    pub fn schema_proxy_file(&self) -> String {
        fmt2::fmt! { { str } => {self.model_name.as_str()} "SchemaProxy" }
    }

    /// Checks the structural invariants every factory relies on.
    pub fn validate(&self) -> Result<()> {
        let violation = |violation| Err(Error::violation(&self.table, violation));

        if self.columns.is_empty() {
            return violation(Violation::NoColumns);
        }
        let mut names = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !is_identifier(&column.name) || property_name(&column.name).is_empty() {
                return violation(Violation::InvalidColumnName(column.name.clone()));
            }
            if !names.insert(column.name.as_str()) {
                return violation(Violation::DuplicateColumn(column.name.clone()));
            }
        }

        let mut primary = self.columns.iter().filter(|column| column.primary);
        let Some(primary_column) = primary.next() else {
            return violation(Violation::MissingPrimaryKey);
        };
        if let Some(other) = primary.next() {
            return violation(Violation::MultiplePrimaryKeys(
                primary_column.name.clone(),
                other.name.clone(),
            ));
        }
        if primary_column.name != self.primary_key {
            return violation(if names.contains(self.primary_key.as_str()) {
                Violation::PrimaryKeyMismatch {
                    declared: self.primary_key.clone(),
                    column: primary_column.name.clone(),
                }
            } else {
                Violation::PrimaryKeyNotDeclared(self.primary_key.clone())
            });
        }
        Ok(())
    }
}
