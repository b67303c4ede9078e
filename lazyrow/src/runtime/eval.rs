use std::{collections::BTreeMap, fmt, sync::Arc};

use serde_json::{Map, Value, json};

use super::{
    Connection, RuntimeContext, Statement, StatementSlots, decode_json, float_value, to_bool,
    to_float, to_int,
};
use crate::{
    RuntimeError,
    codegen::{
        MIXIN_CLASSES, SCHEMA_PROXY_CLASS,
        class::{ClassSpec, Coercion, ConnectionRole, Expr, Method, Stmt},
    },
};

type Result<T, E = RuntimeError> = core::result::Result<T, E>;

#[derive(Default)]
struct Frame {
    params: BTreeMap<String, Value>,
    vars: BTreeMap<String, Value>,
}

enum Flow {
    Next,
    Return(Value),
}

/// A live object of a generated class.
pub struct Instance<'ctx> {
    context: &'ctx RuntimeContext,
    class: Arc<ClassSpec>,
    properties: BTreeMap<String, Value>,
    read: Option<Arc<dyn Connection>>,
    write: Option<Arc<dyn Connection>>,
    slots: StatementSlots,
}

impl fmt::Debug for Instance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

impl<'ctx> Instance<'ctx> {
    /// Properties start at their declared defaults.
    pub fn new(context: &'ctx RuntimeContext, class: Arc<ClassSpec>) -> Self {
        let properties = class
            .properties
            .iter()
            .map(|property| (property.name.clone(), property.default.clone()))
            .collect();
        let slots = StatementSlots::for_class(&class);
        Self {
            context,
            class,
            properties,
            read: None,
            write: None,
            slots,
        }
    }
    pub fn with_connections(
        mut self,
        read: Arc<dyn Connection>,
        write: Arc<dyn Connection>,
    ) -> Self {
        self.read = Some(read);
        self.write = Some(write);
        self
    }

    pub fn class(&self) -> &ClassSpec {
        &self.class
    }
    pub fn context(&self) -> &'ctx RuntimeContext {
        self.context
    }
    pub fn slots(&self) -> &StatementSlots {
        &self.slots
    }
    /// Raw property value.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)
    }
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(property.into(), value.into());
    }

    /// Calls `method`: the class's own first, then its mixins, then its base
    /// class.
    pub fn call(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        let class = Arc::clone(&self.class);
        if let Some(own) = class.method(method) {
            return self.invoke(own, args);
        }
        let context = self.context;
        let mixins = class
            .static_var(MIXIN_CLASSES)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for mixin in mixins.iter().filter_map(Value::as_str) {
            if let Some(capability) = context.capability(mixin)
                && let Some(result) = capability.call(method, self, args)
            {
                return result;
            }
        }
        self.call_parent(method, args)
    }

    fn call_parent(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        let context = self.context;
        let class = Arc::clone(&self.class);
        class
            .extends
            .as_deref()
            .and_then(|base| context.capability(base))
            .and_then(|capability| capability.call(method, self, args))
            .unwrap_or_else(|| {
                Err(RuntimeError::UnknownMethod {
                    class: class.name.clone(),
                    method: method.to_owned(),
                })
            })
    }

    fn invoke(&mut self, method: &Method, args: &[Value]) -> Result<Value> {
        let mut frame = Frame::default();
        for (i, param) in method.params.iter().enumerate() {
            let value = match args.get(i) {
                Some(value) => value.clone(),
                None => param
                    .default
                    .clone()
                    .ok_or_else(|| RuntimeError::MissingArgument(param.name.clone()))?,
            };
            frame.params.insert(param.name.clone(), value);
        }
        match self.exec(&method.body, &mut frame)? {
            Flow::Return(value) => Ok(value),
            Flow::Next => Ok(Value::Null),
        }
    }

    fn exec(&mut self, body: &[Stmt], frame: &mut Frame) -> Result<Flow> {
        for stmt in body {
            match stmt {
                Stmt::Return(expr) => return Ok(Flow::Return(self.eval(expr, frame)?)),
                Stmt::Assign { property, value } => {
                    let value = self.eval(value, frame)?;
                    self.properties.insert(property.clone(), value);
                }
                Stmt::Let { var, value } => {
                    let value = self.eval(value, frame)?;
                    frame.vars.insert(var.clone(), value);
                }
                Stmt::SetKey { var, key, value } => {
                    let value = self.eval(value, frame)?;
                    let target = frame.vars.entry(var.clone()).or_insert(Value::Null);
                    if !target.is_object() {
                        *target = Value::Object(Map::new());
                    }
                    if let Value::Object(map) = target {
                        map.insert(key.clone(), value);
                    }
                }
                Stmt::If { condition, then } => {
                    if to_bool(&self.eval(condition, frame)?)
                        && let Flow::Return(value) = self.exec(then, frame)?
                    {
                        return Ok(Flow::Return(value));
                    }
                }
                Stmt::InitOnce { slot, init } => {
                    self.prepare_slot(slot, init, frame)?;
                }
            }
        }
        Ok(Flow::Next)
    }

    fn eval(&mut self, expr: &Expr, frame: &mut Frame) -> Result<Value> {
        Ok(match expr {
            Expr::Null => Value::Null,
            Expr::Literal(value) => value.clone(),
            Expr::Var(name) => frame.vars.get(name).cloned().unwrap_or_default(),
            Expr::Param(name) => frame
                .params
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::MissingArgument(name.clone()))?,
            Expr::Property(name) => self.properties.get(name).cloned().unwrap_or_default(),
            Expr::Const(name) => Value::from(self.const_value(name)?),
            Expr::Slot(_) | Expr::Prepare { .. } => {
                return Err(RuntimeError::Type {
                    expected: "value",
                    found: "statement".to_owned(),
                });
            }
            Expr::Coerce { rule, value } => {
                let value = self.eval(value, frame)?;
                match rule {
                    Coercion::Int => Value::from(to_int(&value)),
                    Coercion::Float => float_value(to_float(&value)),
                    Coercion::Bool => Value::Bool(to_bool(&value)),
                    Coercion::Json => decode_json(&value)?,
                }
            }
            Expr::IsBlank(value) => {
                let value = self.eval(value, frame)?;
                Value::Bool(value.is_null() || value.as_str() == Some(""))
            }
            Expr::IsSet(value) => Value::Bool(!self.eval(value, frame)?.is_null()),
            Expr::Not(value) => Value::Bool(!to_bool(&self.eval(value, frame)?)),
            Expr::HasKey { map, key } => Value::Bool(
                self.eval(map, frame)?
                    .as_object()
                    .is_some_and(|map| map.contains_key(key)),
            ),
            Expr::Get { map, key } => self
                .eval(map, frame)?
                .get(key.as_str())
                .cloned()
                .unwrap_or_default(),
            Expr::Mapping(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), self.eval(value, frame)?);
                }
                Value::Object(map)
            }
            Expr::Inflate { type_name, value } => {
                let value = self.eval(value, frame)?;
                self.context.inflators().inflate(&value, type_name)?
            }
            Expr::ColumnInflate { column, value } => {
                let value = self.eval(value, frame)?;
                self.inflate_column(column, value)?
            }
            Expr::SchemaProxy { class } => serde_json::to_value(&*self.context.schema_proxy(class)?)?,
            Expr::NewRepository { class, write, read } => {
                let write = self.eval(write, frame)?;
                let read = self.eval(read, frame)?;
                json!({ "repository": class, "write": write, "read": read })
            }
            Expr::Fetch { statement, params } => {
                let statement = self.statement(statement)?;
                let params = self.bind(params, frame)?;
                statement
                    .fetch_one(&params)?
                    .map_or(Value::Null, Value::Object)
            }
            Expr::Execute { statement, params } => {
                let statement = self.statement(statement)?;
                let params = self.bind(params, frame)?;
                Value::from(statement.execute(&params)?)
            }
            Expr::CallParent { method, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, frame))
                    .collect::<Result<Vec<_>>>()?;
                self.call_parent(method, &args)?
            }
        })
    }

    fn const_value(&self, name: &str) -> Result<&str> {
        self.class
            .const_value(name)
            .ok_or_else(|| RuntimeError::UnknownConstant {
                class: self.class.name.clone(),
                name: name.to_owned(),
            })
    }

    fn bind(&mut self, params: &[(String, Expr)], frame: &mut Frame) -> Result<Vec<(String, Value)>> {
        params
            .iter()
            .map(|(name, value)| Ok((name.clone(), self.eval(value, frame)?)))
            .collect()
    }

    fn statement(&self, expr: &Expr) -> Result<Arc<dyn Statement>> {
        match expr {
            Expr::Slot(slot) => self.slots.get(slot),
            other => Err(RuntimeError::Type {
                expected: "statement slot",
                found: format!("{other:?}"),
            }),
        }
    }

    fn connection(&self, role: ConnectionRole) -> Result<Arc<dyn Connection>> {
        match role {
            ConnectionRole::Read => self.read.clone(),
            ConnectionRole::Write => self.write.clone(),
        }
        .ok_or(RuntimeError::NoConnection(role))
    }

    fn prepare_slot(&mut self, slot: &str, init: &Expr, frame: &mut Frame) -> Result<()> {
        let Expr::Prepare {
            connection,
            sql,
            fetch_class,
        } = init
        else {
            return Err(RuntimeError::Type {
                expected: "prepare expression",
                found: format!("{init:?}"),
            });
        };
        if self.slots.is_prepared(slot) {
            return Ok(());
        }
        let sql = self.eval(sql, frame)?;
        let sql = sql.as_str().ok_or_else(|| RuntimeError::Type {
            expected: "sql string",
            found: sql.to_string(),
        })?;
        let connection = self.connection(*connection)?;
        self.slots
            .get_or_prepare(slot, || connection.prepare(sql, fetch_class.as_deref()))?;
        Ok(())
    }

    /// A column without an inflator in the live schema reads raw.
    fn inflate_column(&self, column: &str, value: Value) -> Result<Value> {
        let schema = self.context.schema_proxy(self.const_value(SCHEMA_PROXY_CLASS)?)?;
        match schema
            .get_column(column)
            .and_then(|column| column.inflator.as_deref())
        {
            Some(inflator) => self
                .context
                .inflators()
                .inflate_column(inflator, &value, self),
            None => Ok(value),
        }
    }
}
