//! Pattern parser, built on [pest](https://pest.rs/).
//!
//! The grammar lives in `pattern.pest`. A pattern is a run of text with
//! placeholders of the form `{<digits>}` plus an optional `s`, `l` or `u`
//! modifier (case-insensitive). Matching is leftmost and non-overlapping,
//! so `{0}{1}` is two placeholders and `{a}` or `{0x}` are plain text.
//!
//! Use [`parse`] to turn a pattern into a [`Template`]. Callers normally go
//! through [`TemplateFactory`](crate::TemplateFactory), which caches the
//! result.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::ast::span::{Span, Spanned};
use crate::ast::template::{Element, ElementKind, Template, Transform};
use crate::error::CompileError;

#[derive(Parser)]
#[grammar = "parser/pattern.pest"]
struct PatternParser;

/// Parse a pattern string into a [`Template`].
///
/// The grammar accepts every input, so the only failure is a placeholder
/// whose index does not fit in a `usize`.
pub fn parse(pattern: &str) -> Result<Template, CompileError> {
    let pairs = PatternParser::parse(Rule::pattern, pattern).map_err(|e| {
        let span = pest_span_to_span(&e);
        CompileError::new(pattern, span, format!("parse error: {e}"))
    })?;

    let mut elements = Vec::new();
    for pair in pairs.flat_map(Pair::into_inner) {
        match pair.as_rule() {
            Rule::text => {
                let span = pair_span(&pair);
                elements.push(Spanned::new(ElementKind::Text(pair.as_str().to_string()), span));
            }
            Rule::placeholder => elements.push(build_placeholder(pattern, pair)?),
            _ => {}
        }
    }

    Ok(Template::new(pattern, elements))
}

fn pest_span_to_span(e: &pest::error::Error<Rule>) -> Span {
    match &e.location {
        pest::error::InputLocation::Pos(p) => Span::new(*p, *p),
        pest::error::InputLocation::Span((s, e)) => Span::new(*s, *e),
    }
}

fn pair_span(pair: &Pair<Rule>) -> Span {
    let s = pair.as_span();
    Span::new(s.start(), s.end())
}

fn build_placeholder(pattern: &str, pair: Pair<Rule>) -> Result<Element, CompileError> {
    let span = pair_span(&pair);
    let mut index = None;
    let mut transform = Transform::None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::index => {
                let digits = inner.as_str();
                let parsed = digits.parse::<usize>().map_err(|e| {
                    CompileError::new(pattern, span, format!("invalid placeholder index {digits}: {e}"))
                })?;
                index = Some(parsed);
            }
            Rule::modifier => transform = modifier_transform(inner.as_str()),
            _ => {}
        }
    }

    let index = index.ok_or_else(|| CompileError::new(pattern, span, "placeholder without index"))?;
    Ok(Spanned::new(ElementKind::Argument { index, transform }, span))
}

fn modifier_transform(modifier: &str) -> Transform {
    match modifier.to_ascii_lowercase().as_str() {
        "s" => Transform::AsString,
        "l" => Transform::ToLower,
        "u" => Transform::ToUpper,
        _ => Transform::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(pattern: &str) -> Vec<ElementKind> {
        parse(pattern)
            .expect("parse failed")
            .elements()
            .iter()
            .map(|e| e.node.clone())
            .collect()
    }

    fn text(s: &str) -> ElementKind {
        ElementKind::Text(s.to_string())
    }

    fn arg(index: usize, transform: Transform) -> ElementKind {
        ElementKind::Argument { index, transform }
    }

    #[test]
    fn test_empty_pattern() {
        assert!(kinds("").is_empty());
    }

    #[test]
    fn test_plain_text_is_one_element() {
        assert_eq!(kinds("select 1"), vec![text("select 1")]);
    }

    #[test]
    fn test_infix_pattern() {
        assert_eq!(
            kinds("{0} = {1}"),
            vec![arg(0, Transform::None), text(" = "), arg(1, Transform::None)]
        );
    }

    #[test]
    fn test_adjacent_placeholders() {
        assert_eq!(kinds("{0}{1}"), vec![arg(0, Transform::None), arg(1, Transform::None)]);
    }

    #[test]
    fn test_modifiers_case_insensitive() {
        assert_eq!(
            kinds("{0s}{1S}{2l}{3L}{4u}{5U}"),
            vec![
                arg(0, Transform::AsString),
                arg(1, Transform::AsString),
                arg(2, Transform::ToLower),
                arg(3, Transform::ToLower),
                arg(4, Transform::ToUpper),
                arg(5, Transform::ToUpper),
            ]
        );
    }

    #[test]
    fn test_multi_digit_index() {
        assert_eq!(kinds("{12}"), vec![arg(12, Transform::None)]);
    }

    #[test]
    fn test_unmatched_braces_are_text() {
        assert_eq!(kinds("{a}"), vec![text("{a}")]);
        assert_eq!(kinds("{0x}"), vec![text("{0x}")]);
        assert_eq!(kinds("{}"), vec![text("{}")]);
        assert_eq!(kinds("{0"), vec![text("{0")]);
        assert_eq!(kinds("{0ss}"), vec![text("{0ss}")]);
    }

    #[test]
    fn test_placeholder_inside_braces() {
        // The scan resumes right after the unmatched `{` and finds `{0}`.
        assert_eq!(kinds("{{0}}"), vec![text("{"), arg(0, Transform::None), text("}")]);
    }

    #[test]
    fn test_trailing_and_leading_text() {
        assert_eq!(
            kinds("x{0}y{1}z"),
            vec![
                text("x"),
                arg(0, Transform::None),
                text("y"),
                arg(1, Transform::None),
                text("z"),
            ]
        );
    }

    #[test]
    fn test_non_ascii_digits_are_text() {
        assert_eq!(kinds("{\u{0663}}"), vec![text("{\u{0663}}")]);
    }

    #[test]
    fn test_spans_cover_source() {
        let template = parse("a{0}bc").unwrap();
        let spans: Vec<_> = template.elements().iter().map(|e| e.span).collect();
        assert_eq!(spans, vec![Span::new(0, 1), Span::new(1, 4), Span::new(4, 6)]);
    }

    #[test]
    fn test_index_overflow_is_malformed() {
        let pattern = "x = {999999999999999999999999999}";
        let err = parse(pattern).unwrap_err();
        assert_eq!(err.pattern, pattern);
        assert_eq!(err.span, Span::new(4, pattern.len()));
        assert!(err.message.contains("invalid placeholder index"));
    }
}
