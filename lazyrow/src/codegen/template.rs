//! Method templates with named insertion points.

use super::class::{Expr, Method, Param, Stmt};
use crate::{Error, Result, schema::CodegenDirectives};

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateElement {
    Stmt(Stmt),
    InsertionPoint(String),
}

/// A method whose body has slots that directives fill.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodTemplate {
    pub method: Method,
    pub elements: Vec<TemplateElement>,
}

impl MethodTemplate {
    /// `create(args, options)`: copy the arguments, run the inserted code,
    /// then delegate to the base repository.
    pub fn base_create() -> Self {
        Self {
            method: Method::public("create")
                .param(Param::map("args"))
                .param(Param::map("options").with_default(serde_json::json!({}))),
            elements: vec![
                TemplateElement::Stmt(Stmt::Let {
                    var: "args".to_owned(),
                    value: Expr::param("args"),
                }),
                TemplateElement::InsertionPoint(
                    crate::schema::CODEGEN_INSERTION_POINT.to_owned(),
                ),
                TemplateElement::Stmt(Stmt::Return(Expr::CallParent {
                    method: "create".to_owned(),
                    args: vec![Expr::var("args"), Expr::param("options")],
                })),
            ],
        }
    }

    pub fn insertion_points(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            TemplateElement::InsertionPoint(name) => Some(name.as_str()),
            TemplateElement::Stmt(_) => None,
        })
    }

    /// Splices the directive body at its insertion point. Other insertion
    /// points render empty.
    pub fn apply(&self, directives: &CodegenDirectives) -> Result<Method> {
        if !self
            .insertion_points()
            .any(|name| name == directives.insertion_point)
        {
            return Err(Error::UnknownInsertionPoint(
                directives.insertion_point.clone(),
            ));
        }
        let body = self
            .elements
            .iter()
            .flat_map(|element| match element {
                TemplateElement::Stmt(stmt) => core::slice::from_ref(stmt),
                TemplateElement::InsertionPoint(name) if *name == directives.insertion_point => {
                    directives.body.as_slice()
                }
                TemplateElement::InsertionPoint(_) => &[],
            })
            .cloned()
            .collect();
        Ok(self.method.clone().body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splices_at_codegen() {
        let directives = CodegenDirectives::new(Vec::new()).default_arg("status", "draft");
        let method = MethodTemplate::base_create().apply(&directives).unwrap();
        assert_eq!(method.name, "create");
        assert_eq!(method.body.len(), 3);
        assert!(matches!(method.body[0], Stmt::Let { .. }));
        assert!(matches!(method.body[1], Stmt::If { .. }));
        assert!(matches!(
            method.body[2],
            Stmt::Return(Expr::CallParent { .. })
        ));
    }

    #[test]
    fn unknown_insertion_point() {
        let directives = CodegenDirectives::at("before_save", Vec::new());
        assert!(matches!(
            MethodTemplate::base_create().apply(&directives),
            Err(Error::UnknownInsertionPoint(name)) if name == "before_save"
        ));
    }
}
