//! Resolves logical source ids to configured data sources.

use std::collections::BTreeMap;

use crate::{
    Error, Result,
    config::{DataSourceConfig, GeneratorConfig},
    query::QueryDriver,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    id: String,
    config: DataSourceConfig,
    driver: QueryDriver,
}

impl DataSource {
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }
    pub fn dsn(&self) -> Option<&str> {
        self.config.dsn.as_deref()
    }
    pub fn query_driver(&self) -> &QueryDriver {
        &self.driver
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionManager {
    sources: BTreeMap<String, DataSource>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn from_config(config: &GeneratorConfig) -> Self {
        config
            .data_sources
            .iter()
            .fold(Self::new(), |manager, (id, source)| {
                manager.with_source(id.as_str(), source.clone())
            })
    }
    pub fn add(&mut self, source_id: impl Into<String>, config: DataSourceConfig) {
        let id = source_id.into();
        let driver = config.query_driver();
        self.sources
            .insert(id.clone(), DataSource { id, config, driver });
    }
    pub fn with_source(mut self, source_id: impl Into<String>, config: DataSourceConfig) -> Self {
        self.add(source_id, config);
        self
    }
    pub fn resolve(&self, source_id: &str) -> Result<&DataSource> {
        self.sources
            .get(source_id)
            .ok_or_else(|| Error::UnknownDataSource(source_id.to_owned()))
    }
    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}
