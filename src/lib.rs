//! # query-templates
//!
//! Turns typed expression trees into rendered text such as SQL.
//!
//! The crate has two halves:
//!
//! - **The template compiler.** Pattern strings like `"{0} = {1}"` or
//!   `"lower({0})"` are parsed into [`Template`]s by a [`TemplateFactory`],
//!   which caches them by pattern. A template renders itself against an
//!   argument list and a caller-supplied stringify callback.
//! - **The expression tree.** [`Operation`]s apply an [`Operator`] to
//!   ordered argument [`Expr`]s. Renderers walk trees through the
//!   [`Visitor`] trait, so new output targets never touch the node types.
//!
//! [`Serializer`] ties both together: it is a visitor that looks up each
//! operator's pattern in a [`TemplateSource`] (a dialect table), compiles
//! it through the factory and collects bound constants.
//!
//! ## Quick start
//!
//! ```rust
//! use query_templates::TemplateFactory;
//!
//! let factory = TemplateFactory::new();
//! let template = factory.compile("{0} like {1l}").unwrap();
//! let out = template.render(&["name", "'ACME%'"], |arg, _| arg.to_string()).unwrap();
//! assert_eq!(out, "name like 'acme%'");
//! ```
//!
//! ## Rendering an expression tree
//!
//! ```rust
//! use query_templates::{SimpleTemplates, TemplateFactory, Value, ops, path, serialize};
//!
//! let factory = TemplateFactory::new();
//! let templates = SimpleTemplates::new()
//!     .with(ops::EQ, "{0} = {1}")
//!     .with(ops::LOWER, "lower({0})");
//!
//! let name = path::<String>(["companies", "name"]);
//! let out = serialize(&name.lower().eq("acme"), &factory, &templates).unwrap();
//! assert_eq!(out.text, "lower(companies.name) = ?");
//! assert_eq!(out.constants, vec![Value::from("acme")]);
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (cache hits and compilations in the
//! factory, per-operation events in the serializer) and installs no
//! subscriber of its own.

pub mod ast;
pub mod error;
pub mod factory;
pub mod ops;
mod parser;
pub mod serialize;

pub use ast::expr::{
    AnyOperator, Expr, ExprKind, Operation, Operator, OperatorId, Path, TemplateExpr, TypedExpr,
    Visitable, Visitor, constant, make_operation, path, template_expr,
};
pub use ast::span::{Span, Spanned};
pub use ast::template::{ArgumentHint, Element, ElementKind, Template, Transform};
pub use ast::value::{Any, ExprType, TypeKind, Value};
pub use error::{CompileError, RenderError, RenderErrorKind};
pub use factory::TemplateFactory;
pub use ops::IntoExpr;
pub use serialize::{
    SerializeOptions, Serialized, Serializer, SimpleTemplates, TemplateSource, serialize,
    serialize_with_options,
};

/// Combined error type for operations that both compile patterns and render
/// them, such as [`serialize`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pattern failed to compile.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// Rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl Error {
    /// The render error kind, if this is a render error.
    pub fn render_kind(&self) -> Option<RenderErrorKind> {
        match self {
            Error::Render(e) => Some(e.kind),
            Error::Compile(_) => None,
        }
    }
}
