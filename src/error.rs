//! Error types for template compilation and rendering.
//!
//! [`CompileError`] is produced while parsing a pattern string and carries
//! the pattern plus the span of the offending placeholder.
//! [`RenderError`] is produced while rendering a template or walking an
//! expression tree. Both indicate a structural defect in the caller's
//! patterns or trees rather than a transient condition, so nothing in the
//! crate retries or swallows them.

use crate::ast::span::Span;
use std::sync::Arc;
use thiserror::Error;

// ── Compile errors ──────────────────────────────────────────────────────

/// A pattern string could not be compiled into a template.
#[derive(Debug, Clone, Error)]
#[error("malformed template {pattern:?}: {message}")]
pub struct CompileError {
    pub pattern: String,
    pub span: Span,
    pub message: String,
}

impl CompileError {
    pub fn new(pattern: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            span,
            message: message.into(),
        }
    }

    /// Format the error with the pattern line and a caret under the span.
    pub fn format_with_source(&self) -> String {
        let (line, col) = offset_to_line_col(&self.pattern, self.span.start);
        let source_line = self.pattern.lines().nth(line.saturating_sub(1)).unwrap_or("");

        let pointer = " ".repeat(col.saturating_sub(1)) + &"^".repeat(self.span.len().max(1));

        format!(
            "Error: {}\n --> {line}:{col}\n  |\n{line:>3} | {source_line}\n    | {pointer}",
            self.message
        )
    }
}

fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

// ── Render errors ───────────────────────────────────────────────────────

/// An error raised while rendering a template or serializing an expression.
///
/// Carries a structured [`RenderErrorKind`], a message naming what went
/// wrong (pattern, index, operator), an optional [`Span`] into the pattern,
/// and an optional underlying cause.
///
/// Renderers whose stringification can fail for their own reasons can
/// attach the original error with [`with_source`](RenderError::with_source):
///
/// ```rust
/// use query_templates::RenderError;
///
/// let cause = std::fmt::Error;
/// let err = RenderError::host_error("could not format argument").with_source(cause);
/// assert!(std::error::Error::source(&err).is_some());
/// ```
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RenderError {
    pub kind: RenderErrorKind,
    pub span: Option<Span>,
    pub message: String,
    /// Wrapped in `Arc` so that `RenderError` remains `Clone`.
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl RenderError {
    pub fn new(kind: RenderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            span: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::new(
            RenderErrorKind::IndexOutOfRange,
            format!("argument index {index} out of range for {len} argument(s)"),
        )
    }

    pub fn missing_template(operator: &str) -> Self {
        Self::new(
            RenderErrorKind::MissingTemplate,
            format!("no template registered for operator {operator}"),
        )
    }

    pub fn depth_limit(limit: usize) -> Self {
        Self::new(
            RenderErrorKind::DepthLimit,
            format!("expression nesting exceeds the limit of {limit}"),
        )
    }

    pub fn host_error(message: impl Into<String>) -> Self {
        Self::new(RenderErrorKind::HostError, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderErrorKind {
    /// A placeholder or `arg(i)` referred past the end of the arguments.
    IndexOutOfRange,
    /// The template source has no pattern for an operator.
    MissingTemplate,
    /// The expression tree is nested deeper than the configured limit.
    DepthLimit,
    /// Raised by a renderer's own stringification.
    HostError,
}
