use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use log::debug;
use serde_json::Value;

use super::{Connection, ConnectionResolver, InflatorRegistry, Instance};
use crate::{
    RuntimeError,
    codegen::{GeneratedClasses, READ_SOURCE_ID, WRITE_SOURCE_ID, class::ClassSpec},
    schema::{DEFAULT_SOURCE_ID, DeclareSchema, Schema},
};

/// Behaviour a generated class does not define itself: mixins and base
/// classes.
pub trait Capability: Send + Sync {
    /// `None` when `method` is not provided.
    fn call(
        &self,
        method: &str,
        instance: &mut Instance<'_>,
        args: &[Value],
    ) -> Option<Result<Value, RuntimeError>>;
}

impl<F> Capability for F
where
    F: Fn(&str, &mut Instance<'_>, &[Value]) -> Option<Result<Value, RuntimeError>> + Send + Sync,
{
    fn call(
        &self,
        method: &str,
        instance: &mut Instance<'_>,
        args: &[Value],
    ) -> Option<Result<Value, RuntimeError>> {
        self(method, instance, args)
    }
}

type SchemaLoader = Box<dyn Fn() -> Schema + Send + Sync>;

/// Everything generated classes share while they run: class definitions,
/// schema proxies, mixins, inflators and connections.
pub struct RuntimeContext {
    classes: HashMap<String, Arc<ClassSpec>>,
    schema_loaders: HashMap<String, SchemaLoader>,
    schema_proxies: Mutex<HashMap<String, Arc<Schema>>>,
    capabilities: HashMap<String, Arc<dyn Capability>>,
    inflators: InflatorRegistry,
    resolver: Option<Arc<dyn ConnectionResolver>>,
}

impl fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .field("schema_loaders", &self.schema_loaders.keys().collect::<Vec<_>>())
            .field("capabilities", &self.capabilities.keys().collect::<Vec<_>>())
            .field("inflators", &self.inflators)
            .finish_non_exhaustive()
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
            schema_loaders: HashMap::new(),
            schema_proxies: Mutex::new(HashMap::new()),
            capabilities: HashMap::new(),
            inflators: InflatorRegistry::new(),
            resolver: None,
        }
    }

    pub fn define_class(&mut self, class: ClassSpec) -> Arc<ClassSpec> {
        let class = Arc::new(class);
        self.classes.insert(class.name.clone(), Arc::clone(&class));
        class
    }
    pub fn define_classes(&mut self, classes: GeneratedClasses) {
        self.define_class(classes.model);
        self.define_class(classes.repository);
    }
    pub fn class(&self, name: &str) -> Result<Arc<ClassSpec>, RuntimeError> {
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownClass(name.to_owned()))
    }

    /// Registers the schema of `S` under its proxy class.
    pub fn register_schema<S: DeclareSchema + 'static>(&mut self) {
        let proxy_class = S::schema().schema_proxy_class();
        self.register_schema_loader(proxy_class, S::schema);
    }
    pub fn register_schema_loader(
        &mut self,
        proxy_class: impl Into<String>,
        loader: impl Fn() -> Schema + Send + Sync + 'static,
    ) {
        self.schema_loaders
            .insert(proxy_class.into(), Box::new(loader));
    }
    /// The schema proxy of `proxy_class`, loaded on first access and shared
    /// afterwards.
    pub fn schema_proxy(&self, proxy_class: &str) -> Result<Arc<Schema>, RuntimeError> {
        let mut proxies = self
            .schema_proxies
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(schema) = proxies.get(proxy_class) {
            return Ok(Arc::clone(schema));
        }
        let loader = self
            .schema_loaders
            .get(proxy_class)
            .ok_or_else(|| RuntimeError::UnknownSchema(proxy_class.to_owned()))?;
        debug!("loading schema proxy {proxy_class}");
        let schema = Arc::new(loader());
        proxies.insert(proxy_class.to_owned(), Arc::clone(&schema));
        Ok(schema)
    }

    pub fn register_capability(
        &mut self,
        name: impl Into<String>,
        capability: impl Capability + 'static,
    ) {
        self.capabilities.insert(name.into(), Arc::new(capability));
    }
    pub fn capability(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(name).cloned()
    }

    pub fn inflators(&self) -> &InflatorRegistry {
        &self.inflators
    }
    pub fn inflators_mut(&mut self) -> &mut InflatorRegistry {
        &mut self.inflators
    }

    pub fn set_connection_resolver(&mut self, resolver: impl ConnectionResolver + 'static) {
        self.resolver = Some(Arc::new(resolver));
    }
    pub fn connection(&self, source_id: &str) -> Result<Arc<dyn Connection>, RuntimeError> {
        let resolver = self.resolver.as_ref().ok_or_else(|| {
            RuntimeError::Generation(crate::Error::UnknownDataSource(source_id.to_owned()))
        })?;
        resolver.resolve(source_id)
    }

    /// A fresh instance of `class`, without connections.
    pub fn instantiate(&self, class: &str) -> Result<Instance<'_>, RuntimeError> {
        Ok(Instance::new(self, self.class(class)?))
    }

    /// An instance of `class` loaded with `row` through its `setData`.
    pub fn hydrate(&self, class: &str, row: Value) -> Result<Instance<'_>, RuntimeError> {
        let mut instance = self.instantiate(class)?;
        instance.call("setData", &[row])?;
        Ok(instance)
    }

    /// Opens the repository a `createRepo` call describes. Null source ids
    /// fall back to the class's own.
    pub fn open_repository(&self, descriptor: &Value) -> Result<Instance<'_>, RuntimeError> {
        let class_name = descriptor
            .get("repository")
            .and_then(Value::as_str)
            .ok_or_else(|| RuntimeError::Type {
                expected: "repository descriptor",
                found: descriptor.to_string(),
            })?;
        let class = self.class(class_name)?;
        let read = self.connection(source_id(descriptor, "read", &class, READ_SOURCE_ID)?)?;
        let write = self.connection(source_id(descriptor, "write", &class, WRITE_SOURCE_ID)?)?;
        Ok(Instance::new(self, class).with_connections(read, write))
    }
}

fn source_id<'a>(
    descriptor: &'a Value,
    key: &str,
    class: &'a ClassSpec,
    constant: &str,
) -> Result<&'a str, RuntimeError> {
    match descriptor.get(key) {
        Some(Value::String(source_id)) => Ok(source_id),
        None | Some(Value::Null) => Ok(class.const_value(constant).unwrap_or(DEFAULT_SOURCE_ID)),
        Some(other) => Err(RuntimeError::Type {
            expected: "source id",
            found: other.to_string(),
        }),
    }
}
