//! The language-neutral description of a generated class.
//!
//! Method bodies are a small statement IR rather than source text, so the
//! description can be emitted by any backend or evaluated directly by
//! [`crate::runtime`].

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// What an instance property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyRole {
    Column,
    Table,
    SourceId,
    StatementSlot,
}

/// Which of the two connections a repository statement runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionRole {
    Read,
    Write,
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub visibility: Visibility,
    pub default: Value,
    pub role: PropertyRole,
}

impl Property {
    pub fn new(
        name: impl Into<String>,
        visibility: Visibility,
        default: impl Into<Value>,
        role: PropertyRole,
    ) -> Self {
        Self {
            name: name.into(),
            visibility,
            default: default.into(),
            role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticVar {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    #[default]
    Any,
    /// An associative array.
    Map,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default)]
    pub kind: ParamKind,
    /// `Some` makes the parameter optional. A `null` default stays `Some`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub default: Option<Value>,
}

fn present<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Any,
            default: None,
        }
    }
    pub fn map(name: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::Map,
            ..Self::new(name)
        }
    }
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub visibility: Visibility,
    pub is_static: bool,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

impl Method {
    pub fn public(name: impl Into<String>) -> Self {
        Self {
            visibility: Visibility::Public,
            is_static: false,
            name: name.into(),
            params: Vec::new(),
            body: Vec::new(),
        }
    }
    pub fn public_static(name: impl Into<String>) -> Self {
        Self {
            is_static: true,
            ..Self::public(name)
        }
    }
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }
    pub fn body(mut self, body: Vec<Stmt>) -> Self {
        self.body = body;
        self
    }
}

/// How a raw column value is converted before it is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coercion {
    Int,
    Float,
    Bool,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Return(Expr),
    /// Writes an instance property.
    Assign { property: String, value: Expr },
    /// Binds a method-local variable.
    Let { var: String, value: Expr },
    /// Writes `var[key]`; `var` becomes a mapping if it is not one.
    SetKey { var: String, key: String, value: Expr },
    If { condition: Expr, then: Vec<Stmt> },
    /// Prepares the statement slot unless it already holds a statement.
    InitOnce { slot: String, init: Expr },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Null,
    Literal(Value),
    Var(String),
    Param(String),
    Property(String),
    Const(String),
    Slot(String),
    Coerce {
        rule: Coercion,
        value: Box<Expr>,
    },
    /// `null` or `""`.
    IsBlank(Box<Expr>),
    /// Not `null`.
    IsSet(Box<Expr>),
    Not(Box<Expr>),
    HasKey {
        map: Box<Expr>,
        key: String,
    },
    Get {
        map: Box<Expr>,
        key: String,
    },
    Mapping(Vec<(String, Expr)>),
    /// Runs the type inflator registered for `type_name`.
    Inflate {
        type_name: String,
        value: Box<Expr>,
    },
    /// Runs the inflator the live schema declares for `column`.
    ColumnInflate {
        column: String,
        value: Box<Expr>,
    },
    /// The memoized schema proxy of `class`.
    SchemaProxy {
        class: String,
    },
    NewRepository {
        class: String,
        write: Box<Expr>,
        read: Box<Expr>,
    },
    Prepare {
        connection: ConnectionRole,
        sql: Box<Expr>,
        fetch_class: Option<String>,
    },
    /// Binds `params` and fetches one row as a mapping, or `null`.
    Fetch {
        statement: Box<Expr>,
        params: Vec<(String, Expr)>,
    },
    /// Binds `params` and executes, yielding the affected row count.
    Execute {
        statement: Box<Expr>,
        params: Vec<(String, Expr)>,
    },
    CallParent {
        method: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }
    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }
    pub fn property(name: impl Into<String>) -> Self {
        Self::Property(name.into())
    }
    pub fn coerce(rule: Coercion, value: Self) -> Self {
        Self::Coerce {
            rule,
            value: Box::new(value),
        }
    }
}

/// A generated class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub name: String,
    pub extends: Option<String>,
    pub interfaces: Vec<String>,
    pub traits: Vec<String>,
    pub requires: Vec<String>,
    pub consts: Vec<Constant>,
    pub properties: Vec<Property>,
    pub static_vars: Vec<StaticVar>,
    pub methods: Vec<Method>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            interfaces: Vec::new(),
            traits: Vec::new(),
            requires: Vec::new(),
            consts: Vec::new(),
            properties: Vec::new(),
            static_vars: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn const_value(&self, name: &str) -> Option<&str> {
        self.consts
            .iter()
            .find(|constant| constant.name == name)
            .map(|constant| constant.value.as_str())
    }
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }
    pub fn static_var(&self, name: &str) -> Option<&Value> {
        self.static_vars
            .iter()
            .find(|var| var.name == name)
            .map(|var| &var.value)
    }
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }
    pub fn slots(&self) -> impl Iterator<Item = &Property> {
        self.properties
            .iter()
            .filter(|property| property.role == PropertyRole::StatementSlot)
    }

    pub(crate) fn add_const(&mut self, name: &str, value: impl Into<String>) {
        self.consts.push(Constant {
            name: name.to_owned(),
            value: value.into(),
        });
    }
    pub(crate) fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }
    pub(crate) fn add_static_var(&mut self, name: &str, value: Value) {
        self.static_vars.push(StaticVar {
            name: name.to_owned(),
            value,
        });
    }
    pub(crate) fn add_method(&mut self, method: Method) {
        self.methods.push(method);
    }
}
