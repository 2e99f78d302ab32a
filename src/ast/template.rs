use std::fmt;

use super::span::Spanned;
use crate::error::RenderError;

/// A compiled pattern: the source string plus the ordered elements that
/// render it.
///
/// Templates are produced by [`TemplateFactory::compile`](crate::TemplateFactory::compile)
/// and are immutable afterwards. Rendering concatenates the output of each
/// element in order.
///
/// ```rust
/// use query_templates::TemplateFactory;
///
/// let factory = TemplateFactory::new();
/// let template = factory.compile("{0} = {1}").unwrap();
/// let out = template.render(&["a", "b"], |arg, _| arg.to_string()).unwrap();
/// assert_eq!(out, "a = b");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    elements: Vec<Element>,
}

pub type Element = Spanned<ElementKind>;

/// The two kinds of render instruction a pattern compiles to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// Verbatim text between placeholders.
    Text(String),

    /// A positional reference such as `{1}` or `{0u}`. The index is not
    /// checked against anything until render time.
    Argument { index: usize, transform: Transform },
}

/// What a placeholder modifier asks of its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transform {
    #[default]
    None,
    /// `{0s}`: stringify the argument as plain text rather than in the
    /// renderer's usual form (e.g. inline instead of bound).
    AsString,
    /// `{0l}`: lower-case the stringified argument.
    ToLower,
    /// `{0u}`: upper-case the stringified argument.
    ToUpper,
}

impl Transform {
    /// Hint passed to the stringify callback for this transform.
    pub fn hint(self) -> ArgumentHint {
        match self {
            Transform::AsString => ArgumentHint::AsString,
            _ => ArgumentHint::Default,
        }
    }

    fn apply(self, text: String) -> String {
        match self {
            Transform::ToLower => text.to_lowercase(),
            Transform::ToUpper => text.to_uppercase(),
            Transform::None | Transform::AsString => text,
        }
    }
}

/// How the renderer should stringify one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentHint {
    Default,
    AsString,
}

impl Template {
    pub(crate) fn new(source: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            source: source.into(),
            elements,
        }
    }

    /// The pattern string this template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Render against `args`, stringifying each referenced argument with
    /// `stringify`.
    ///
    /// Fails with [`IndexOutOfRange`](crate::RenderErrorKind::IndexOutOfRange)
    /// if a placeholder refers past the end of `args`.
    pub fn render<A, F>(&self, args: &[A], mut stringify: F) -> Result<String, RenderError>
    where
        F: FnMut(&A, ArgumentHint) -> String,
    {
        self.try_render(args, |arg, hint| Ok::<_, RenderError>(stringify(arg, hint)))
    }

    /// Like [`render`](Template::render), for stringify callbacks that can
    /// fail themselves, such as a serializer recursing into sub-expressions.
    pub fn try_render<A, F, E>(&self, args: &[A], mut stringify: F) -> Result<String, E>
    where
        F: FnMut(&A, ArgumentHint) -> Result<String, E>,
        E: From<RenderError>,
    {
        let mut out = String::with_capacity(self.source.len());
        for element in &self.elements {
            match &element.node {
                ElementKind::Text(text) => out.push_str(text),
                ElementKind::Argument { index, transform } => {
                    let arg = args.get(*index).ok_or_else(|| {
                        let err = RenderError::index_out_of_range(*index, args.len());
                        let message = format!("{} in template {:?}", err.message, self.source);
                        RenderError { message, ..err }.with_span(element.span)
                    })?;
                    let text = stringify(arg, transform.hint())?;
                    out.push_str(&transform.apply(text));
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
