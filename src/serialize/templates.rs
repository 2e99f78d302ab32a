use std::collections::HashMap;

use crate::ast::expr::{AnyOperator, Operator, OperatorId};
use crate::ast::value::ExprType;

/// Supplies the pattern each operator renders with.
///
/// This is the seam for dialect tables: a SQL dialect maps `EQ` to
/// `"{0} = {1}"`, `LOWER` to `"lower({0})"` and so on. The
/// [`Serializer`](crate::Serializer) compiles whatever pattern comes back
/// through its [`TemplateFactory`](crate::TemplateFactory), so returning the
/// same static string on every call is all an implementation needs to do.
pub trait TemplateSource {
    /// The pattern for `operator`, or `None` if this source cannot render
    /// it.
    fn pattern(&self, operator: &AnyOperator) -> Option<&str>;
}

/// An in-memory [`TemplateSource`], for tests and small embedded dialects.
///
/// ```rust
/// use query_templates::{SimpleTemplates, TemplateSource, ops};
///
/// let templates = SimpleTemplates::new()
///     .with(ops::EQ, "{0} = {1}")
///     .with(ops::LOWER, "lower({0})");
/// assert_eq!(templates.pattern(&ops::EQ.erase()), Some("{0} = {1}"));
/// assert_eq!(templates.pattern(&ops::NE.erase()), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimpleTemplates {
    patterns: HashMap<OperatorId, String>,
}

impl SimpleTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the pattern for `operator`, replacing any previous one.
    pub fn add<T: ExprType>(&mut self, operator: Operator<T>, pattern: impl Into<String>) {
        self.patterns.insert(operator.id(), pattern.into());
    }

    /// Builder form of [`add`](SimpleTemplates::add).
    pub fn with<T: ExprType>(mut self, operator: Operator<T>, pattern: impl Into<String>) -> Self {
        self.add(operator, pattern);
        self
    }
}

impl TemplateSource for SimpleTemplates {
    fn pattern(&self, operator: &AnyOperator) -> Option<&str> {
        self.patterns.get(&operator.id()).map(String::as_str)
    }
}
