//! Named conversions from stored values to richer ones.

use std::{collections::HashMap, fmt, sync::Arc};

use serde_json::Value;

use super::Instance;
use crate::RuntimeError;

/// Inflates values of a column `isa` the generator has no coercion for.
pub type TypeInflator = Arc<dyn Fn(&Value) -> Result<Value, RuntimeError> + Send + Sync>;
/// Inflates one column, with access to the model instance it belongs to.
pub type ColumnInflator =
    Arc<dyn Fn(&Value, &Instance<'_>) -> Result<Value, RuntimeError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct InflatorRegistry {
    types: HashMap<String, TypeInflator>,
    columns: HashMap<String, ColumnInflator>,
}

impl fmt::Debug for InflatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InflatorRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("columns", &self.columns.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl InflatorRegistry {
    /// A registry with the built-in type inflators.
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::default();
        #[cfg(feature = "chrono")]
        registry.register_type("DateTime", datetime::inflate);
        registry
    }

    pub fn register_type(
        &mut self,
        type_name: impl Into<String>,
        inflator: impl Fn(&Value) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    ) {
        self.types.insert(type_name.into(), Arc::new(inflator));
    }

    pub fn register_column(
        &mut self,
        name: impl Into<String>,
        inflator: impl Fn(&Value, &Instance<'_>) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    ) {
        self.columns.insert(name.into(), Arc::new(inflator));
    }

    /// Values of unregistered types pass through unchanged.
    pub fn inflate(&self, value: &Value, type_name: &str) -> Result<Value, RuntimeError> {
        match self.types.get(type_name) {
            Some(inflator) => inflator(value),
            None => Ok(value.clone()),
        }
    }

    pub fn inflate_column(
        &self,
        name: &str,
        value: &Value,
        instance: &Instance<'_>,
    ) -> Result<Value, RuntimeError> {
        let inflator = self
            .columns
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownInflator(name.to_owned()))?;
        inflator(value, instance)
    }
}

#[cfg(feature = "chrono")]
mod datetime {
    use chrono::{DateTime, NaiveDateTime};
    use serde_json::Value;

    use crate::RuntimeError;

    const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

    /// Normalizes stored timestamps to RFC 3339. Naive timestamps are UTC.
    pub(super) fn inflate(value: &Value) -> Result<Value, RuntimeError> {
        let Value::String(s) = value else {
            return Ok(value.clone());
        };
        if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
            return Ok(Value::String(datetime.to_rfc3339()));
        }
        FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            .map(|naive| Value::String(naive.and_utc().to_rfc3339()))
            .ok_or_else(|| RuntimeError::Inflate {
                inflator: "DateTime".to_owned(),
                reason: format!("`{s}` is not a timestamp"),
            })
    }

    #[cfg(test)]
    mod tests {
        use serde_json::json;

        use super::*;

        #[test]
        fn normalizes() {
            assert_eq!(
                inflate(&json!("2024-02-29 13:45:00")).unwrap(),
                json!("2024-02-29T13:45:00+00:00")
            );
            assert_eq!(inflate(&Value::Null).unwrap(), Value::Null);
            assert!(inflate(&json!("yesterday")).is_err());
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_type_passes_through() {
        let registry = InflatorRegistry::new();
        assert_eq!(registry.inflate(&json!("x"), "Money").unwrap(), json!("x"));
    }

    #[test]
    fn registered_type() {
        let mut registry = InflatorRegistry::new();
        registry.register_type("Cents", |value| {
            Ok(json!(crate::runtime::to_int(value) as f64 / 100.0))
        });
        assert_eq!(registry.inflate(&json!("1250"), "Cents").unwrap(), json!(12.5));
    }
}
