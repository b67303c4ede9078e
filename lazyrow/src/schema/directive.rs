use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codegen::class::{Expr, Stmt};

/// The insertion point the base `create` template exposes.
pub const CODEGEN_INSERTION_POINT: &str = "codegen";

fn codegen_insertion_point() -> String {
    CODEGEN_INSERTION_POINT.to_owned()
}

/// Statements spliced into a repository method template at a named
/// insertion point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodegenDirectives {
    #[serde(default = "codegen_insertion_point")]
    pub insertion_point: String,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

impl Default for CodegenDirectives {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CodegenDirectives {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self::at(CODEGEN_INSERTION_POINT, body)
    }
    pub fn at(insertion_point: impl Into<String>, body: Vec<Stmt>) -> Self {
        Self {
            insertion_point: insertion_point.into(),
            body,
        }
    }
    pub fn push(mut self, stmt: Stmt) -> Self {
        self.body.push(stmt);
        self
    }
    /// `args[key] = value` unless the caller passed `key`.
    pub fn default_arg(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        self.push(Stmt::If {
            condition: Expr::Not(Box::new(Expr::HasKey {
                map: Box::new(Expr::var("args")),
                key: key.clone(),
            })),
            then: vec![Stmt::SetKey {
                var: "args".to_owned(),
                key,
                value: Expr::literal(value),
            }],
        })
    }
}
