#![doc = include_str!("../../README.md")]
#![allow(async_fn_in_trait)]

pub mod codegen;
pub mod config;
pub mod connection;
mod env;
pub mod error;
pub mod introspect;
pub mod query;
pub mod runtime;
pub mod schema;

pub use codegen::{GeneratedClasses, Generator, class::ClassSpec};
pub use config::{DataSourceConfig, GeneratorConfig};
pub use connection::{ConnectionManager, DataSource};
pub use error::{Error, Result, RuntimeError, Violation};
pub use query::{Dialect, ParamMarker, QueryDriver};
pub use runtime::{Instance, RuntimeContext};
pub use schema::{CodegenDirectives, Column, DeclareSchema, Isa, Schema};

#[cfg(feature = "macros")]
pub use lazyrow_macros::schema;
