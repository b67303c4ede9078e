//! Generator configuration, read from TOML or from the environment.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result, env,
    query::{Dialect, ParamMarker, QueryDriver},
};

pub const DEFAULT_BASE_MODEL_CLASS: &str = "lazyrow::BaseModel";
pub const DEFAULT_BASE_REPO_CLASS: &str = "lazyrow::BaseRepo";

/// One logical database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub dialect: Dialect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsn: Option<String>,
    /// Overrides the dialect's placeholder style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_marker: Option<ParamMarker>,
}

impl DataSourceConfig {
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            dsn: None,
            param_marker: None,
        }
    }
    pub fn from_url(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let dialect = Dialect::from_url(&url)
            .ok_or_else(|| Error::Config(format!("cannot infer dialect of `{url}`")))?;
        Ok(Self {
            dsn: Some(url),
            ..Self::new(dialect)
        })
    }
    pub const fn with_param_marker(mut self, param_marker: ParamMarker) -> Self {
        self.param_marker = Some(param_marker);
        self
    }
    pub fn query_driver(&self) -> QueryDriver {
        let driver = QueryDriver::new(self.dialect);
        match self.param_marker {
            Some(param_marker) => driver.with_param_marker(param_marker),
            None => driver,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub data_sources: BTreeMap<String, DataSourceConfig>,
    pub base_model_class: String,
    pub base_repo_class: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            data_sources: BTreeMap::new(),
            base_model_class: DEFAULT_BASE_MODEL_CLASS.to_owned(),
            base_repo_class: DEFAULT_BASE_REPO_CLASS.to_owned(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
    /// `DATABASE_URL` defines the source named by `LAZYROW_SOURCE_ID`
    /// (`default` when unset), `LAZYROW_PARAM_MARKER` overrides placeholders.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = env::database_url()? {
            let source_id = env::default_source_id()?;
            config = config.with_data_source(source_id, DataSourceConfig::from_url(url)?);
        }
        if let Some(param_marker) = env::param_marker()? {
            let param_marker: ParamMarker = param_marker.parse()?;
            for source in config.data_sources.values_mut() {
                source.param_marker = Some(param_marker);
            }
        }
        Ok(config)
    }
    pub fn with_data_source(
        mut self,
        source_id: impl Into<String>,
        source: DataSourceConfig,
    ) -> Self {
        self.data_sources.insert(source_id.into(), source);
        self
    }
}
