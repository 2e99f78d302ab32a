//! Reference renderer: expression tree to text plus bound constants.
//!
//! The [`Serializer`] is a [`Visitor`]. For each [`Operation`] it asks its
//! [`TemplateSource`] for the operator's pattern, compiles that pattern
//! through the shared [`TemplateFactory`], and renders it with the
//! already-serialized arguments. Constants become bind markers and are
//! collected in order, unless [`SerializeOptions::use_literals`] inlines
//! them.
//!
//! Dialect-specific tables live outside this crate and plug in through
//! [`TemplateSource`].

use crate::Error;
use crate::ast::expr::{Expr, ExprKind, Operation, Path, TemplateExpr, Visitable, Visitor};
use crate::ast::template::{ArgumentHint, Template};
use crate::ast::value::Value;
use crate::error::RenderError;
use crate::factory::TemplateFactory;

mod templates;

pub use templates::{SimpleTemplates, TemplateSource};

/// Serialize `expr` with default options.
///
/// ```rust
/// use query_templates::{SimpleTemplates, TemplateFactory, Value, ops, path, serialize};
///
/// let factory = TemplateFactory::new();
/// let templates = SimpleTemplates::new()
///     .with(ops::EQ, "{0} = {1}")
///     .with(ops::AND, "{0} and {1}");
///
/// let id = path::<i64>(["companies", "id"]);
/// let cond = id.eq(1).and(id.eq(2));
///
/// let out = serialize(&cond, &factory, &templates).unwrap();
/// assert_eq!(out.text, "companies.id = ? and companies.id = ?");
/// assert_eq!(out.constants, vec![Value::Integer(1), Value::Integer(2)]);
/// ```
pub fn serialize<S: TemplateSource + ?Sized>(
    expr: &Expr,
    factory: &TemplateFactory,
    templates: &S,
) -> Result<Serialized, Error> {
    serialize_with_options(expr, factory, templates, SerializeOptions::default())
}

/// Serialize `expr` with custom options.
///
/// ```rust
/// use query_templates::{SerializeOptions, SimpleTemplates, TemplateFactory, ops, path};
/// use query_templates::serialize_with_options;
///
/// let factory = TemplateFactory::new();
/// let templates = SimpleTemplates::new().with(ops::EQ, "{0} = {1}");
/// let cond = path::<String>(["t", "name"]).eq("O'Brien");
///
/// let opts = SerializeOptions::new().use_literals(true);
/// let out = serialize_with_options(&cond, &factory, &templates, opts).unwrap();
/// assert_eq!(out.text, "t.name = 'O''Brien'");
/// assert!(out.constants.is_empty());
/// ```
pub fn serialize_with_options<S: TemplateSource + ?Sized>(
    expr: &Expr,
    factory: &TemplateFactory,
    templates: &S,
    options: SerializeOptions,
) -> Result<Serialized, Error> {
    Serializer::new(factory, templates, options).serialize(expr)
}

// ── Options ─────────────────────────────────────────────────────────────

/// Configuration for a [`Serializer`].
///
/// ```rust
/// use query_templates::SerializeOptions;
///
/// let opts = SerializeOptions::new()
///     .use_literals(false)
///     .bind_marker("$?")
///     .max_depth(64);
/// ```
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Inline constants as literals instead of binding them.
    pub use_literals: bool,

    /// Text emitted in place of each bound constant.
    pub bind_marker: String,

    /// Maximum nesting of operations and template expressions before
    /// serialization fails with
    /// [`DepthLimit`](crate::RenderErrorKind::DepthLimit). `None` means
    /// unlimited.
    pub max_depth: Option<usize>,
}

impl SerializeOptions {
    /// Bound constants, `?` marker, no depth limit.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_literals(mut self, use_literals: bool) -> Self {
        self.use_literals = use_literals;
        self
    }

    pub fn bind_marker(mut self, marker: impl Into<String>) -> Self {
        self.bind_marker = marker.into();
        self
    }

    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            use_literals: false,
            bind_marker: "?".to_string(),
            max_depth: None,
        }
    }
}

/// Output of a [`Serializer`]: rendered text and the constants bound to its
/// markers, in marker order.
#[derive(Debug, Clone, PartialEq)]
pub struct Serialized {
    pub text: String,
    pub constants: Vec<Value>,
}

// ── Serializer ──────────────────────────────────────────────────────────

/// Walks an expression tree and renders it through compiled templates.
///
/// A serializer is single-use: [`serialize`](Serializer::serialize)
/// consumes it. The factory and template source are borrowed, so one
/// factory can back any number of serializers on any number of threads.
pub struct Serializer<'a, S: TemplateSource + ?Sized> {
    factory: &'a TemplateFactory,
    templates: &'a S,
    options: SerializeOptions,
    constants: Vec<Value>,
    depth: usize,
}

impl<'a, S: TemplateSource + ?Sized> Serializer<'a, S> {
    pub fn new(factory: &'a TemplateFactory, templates: &'a S, options: SerializeOptions) -> Self {
        Self {
            factory,
            templates,
            options,
            constants: Vec::new(),
            depth: 0,
        }
    }

    pub fn serialize(mut self, expr: &Expr) -> Result<Serialized, Error> {
        let text = expr.accept(&mut self)?;
        Ok(Serialized {
            text,
            constants: self.constants,
        })
    }

    /// Render one template argument. As-string arguments that are constants
    /// or paths are inlined as plain text and never bound.
    fn render_arg(&mut self, arg: &Expr, hint: ArgumentHint) -> Result<String, Error> {
        match (hint, arg.kind()) {
            (ArgumentHint::AsString, ExprKind::Constant(value)) => Ok(value.to_string()),
            (ArgumentHint::AsString, ExprKind::Path(path)) => Ok(path.to_string()),
            _ => arg.accept(self),
        }
    }

    fn render_nested(&mut self, template: &Template, args: &[Expr]) -> Result<String, Error> {
        if let Some(limit) = self.options.max_depth {
            if self.depth >= limit {
                tracing::debug!(limit, template = template.source(), "expression nesting limit hit");
                return Err(RenderError::depth_limit(limit).into());
            }
        }

        self.depth += 1;
        let rendered = template.try_render(args, |arg, hint| self.render_arg(arg, hint));
        self.depth -= 1;
        rendered
    }
}

impl<S: TemplateSource + ?Sized> Visitor for Serializer<'_, S> {
    type Output = Result<String, Error>;

    fn visit_constant(&mut self, value: &Value) -> Self::Output {
        if self.options.use_literals {
            return Ok(value.to_literal());
        }
        self.constants.push(value.clone());
        Ok(self.options.bind_marker.clone())
    }

    fn visit_path(&mut self, path: &Path) -> Self::Output {
        Ok(path.to_string())
    }

    fn visit_operation(&mut self, operation: &Operation) -> Self::Output {
        let operator = operation.operator();
        tracing::trace!(
            operator = operator.name(),
            args = operation.args().len(),
            "serializing operation"
        );

        let templates = self.templates;
        let pattern = templates.pattern(&operator).ok_or_else(|| {
            tracing::debug!(operator = operator.name(), "no template for operator");
            RenderError::missing_template(operator.name())
        })?;
        let template = self.factory.compile(pattern)?;
        self.render_nested(&template, operation.args())
    }

    fn visit_template(&mut self, template: &TemplateExpr) -> Self::Output {
        self.render_nested(template.template(), template.args())
    }
}
