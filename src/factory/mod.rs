//! Compiled-template cache.
//!
//! [`TemplateFactory`] turns pattern strings into [`Template`]s and keeps
//! every compiled template for the lifetime of the factory, keyed by the
//! exact pattern string. The factory is an ordinary value: construct one,
//! share it by reference (or `Arc`) with every renderer that compiles
//! patterns, and drop it when done. Tests construct their own isolated
//! instances.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::ast::template::Template;
use crate::error::CompileError;
use crate::parser;

/// Parses pattern strings into shared, immutable [`Template`]s and caches
/// them by pattern.
///
/// ```rust
/// use std::sync::Arc;
/// use query_templates::TemplateFactory;
///
/// let factory = TemplateFactory::new();
/// let a = factory.compile("lower({0})").unwrap();
/// let b = factory.compile("lower({0})").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(factory.compilations(), 1);
/// ```
///
/// # Concurrency
///
/// Lookups take a read lock. A miss compiles outside any lock and then
/// inserts under the write lock only if no other thread got there first, so
/// two threads racing on a new pattern may both parse it, but both receive
/// the single template that ended up in the cache.
pub struct TemplateFactory {
    cache: RwLock<HashMap<String, Arc<Template>>>,
    compilations: AtomicU64,
}

impl TemplateFactory {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a factory whose cache is pre-sized for `capacity` patterns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::with_capacity(capacity)),
            compilations: AtomicU64::new(0),
        }
    }

    /// Compile `pattern`, or return the cached template if it was compiled
    /// before.
    ///
    /// Returns a [`CompileError`] if a placeholder index does not fit in a
    /// `usize`. Failed patterns are not cached.
    pub fn compile(&self, pattern: &str) -> Result<Arc<Template>, CompileError> {
        if let Some(template) = self.cache.read().get(pattern) {
            tracing::trace!(pattern, "template cache hit");
            return Ok(Arc::clone(template));
        }

        let compiled = Arc::new(parser::parse(pattern)?);
        self.compilations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            pattern,
            elements = compiled.elements().len(),
            "compiled template"
        );

        let mut cache = self.cache.write();
        let cached = cache
            .entry(pattern.to_string())
            .or_insert_with(|| Arc::clone(&compiled));
        if !Arc::ptr_eq(cached, &compiled) {
            tracing::debug!(pattern, "template compiled concurrently, using cached copy");
        }
        Ok(Arc::clone(cached))
    }

    /// Whether `pattern` has already been compiled by this factory.
    pub fn contains(&self, pattern: &str) -> bool {
        self.cache.read().contains_key(pattern)
    }

    /// Number of distinct patterns in the cache.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Number of times a pattern was actually parsed. Cache hits do not
    /// count.
    pub fn compilations(&self) -> u64 {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Drop every cached template. Templates already handed out stay valid.
    pub fn clear(&self) {
        self.cache.write().clear();
    }
}

impl Default for TemplateFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateFactory")
            .field("patterns", &self.len())
            .field("compilations", &self.compilations())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::template::ArgumentHint;
    use crate::error::RenderErrorKind;

    fn identity(arg: &&str, _: ArgumentHint) -> String {
        arg.to_string()
    }

    #[test]
    fn test_compile_is_cached() {
        let factory = TemplateFactory::new();
        let first = factory.compile("{0} = {1}").unwrap();
        let second = factory.compile("{0} = {1}").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.compilations(), 1);
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn test_distinct_patterns_get_distinct_entries() {
        let factory = TemplateFactory::new();
        factory.compile("{0}").unwrap();
        factory.compile("{0} ").unwrap();
        assert_eq!(factory.len(), 2);
        assert!(factory.contains("{0}"));
        assert!(!factory.contains("{1}"));
    }

    #[test]
    fn test_empty_pattern_compiles_to_no_elements() {
        let factory = TemplateFactory::new();
        let template = factory.compile("").unwrap();
        assert!(template.elements().is_empty());
        assert_eq!(template.render::<&str, _>(&[], identity).unwrap(), "");
    }

    #[test]
    fn test_plain_text_round_trip() {
        let factory = TemplateFactory::new();
        for pattern in ["select 1", "a {b} c", "{ 0 }", "100%"] {
            let template = factory.compile(pattern).unwrap();
            assert_eq!(template.render::<&str, _>(&[], identity).unwrap(), pattern);
        }
    }

    #[test]
    fn test_placeholder_substitution() {
        let factory = TemplateFactory::new();
        let template = factory.compile("{0} = {1}").unwrap();
        assert_eq!(template.render(&["a", "b"], identity).unwrap(), "a = b");
    }

    #[test]
    fn test_case_transforms() {
        let factory = TemplateFactory::new();
        let lower = factory.compile("{0l}").unwrap();
        let upper = factory.compile("{0u}").unwrap();
        assert_eq!(lower.render(&["ABC"], identity).unwrap(), "abc");
        assert_eq!(upper.render(&["abc"], identity).unwrap(), "ABC");
    }

    #[test]
    fn test_as_string_hint_only_for_marked_argument() {
        let factory = TemplateFactory::new();
        let template = factory.compile("{0s} + {1}").unwrap();
        let mut hints = Vec::new();
        let out = template
            .render(&[42, 7], |n, hint| {
                hints.push((*n, hint));
                match hint {
                    ArgumentHint::AsString => format!("'{n}'"),
                    ArgumentHint::Default => n.to_string(),
                }
            })
            .unwrap();
        assert_eq!(out, "'42' + 7");
        assert_eq!(hints, vec![(42, ArgumentHint::AsString), (7, ArgumentHint::Default)]);
    }

    #[test]
    fn test_mixed_literal_and_placeholder() {
        let factory = TemplateFactory::new();
        let template = factory.compile("x{0}y{1}z").unwrap();
        assert_eq!(template.render(&["1", "2"], identity).unwrap(), "x1y2z");
    }

    #[test]
    fn test_adjacent_placeholders() {
        let factory = TemplateFactory::new();
        let template = factory.compile("{0}{1}").unwrap();
        assert_eq!(template.elements().len(), 2);
        assert_eq!(template.render(&["p", "q"], identity).unwrap(), "pq");
    }

    #[test]
    fn test_out_of_range_argument() {
        let factory = TemplateFactory::new();
        let template = factory.compile("{0} between {1} and {2}").unwrap();
        let err = template.render(&["x"], identity).unwrap_err();
        assert_eq!(err.kind, RenderErrorKind::IndexOutOfRange);
    }

    #[test]
    fn test_malformed_pattern_not_cached() {
        let factory = TemplateFactory::new();
        let pattern = "{99999999999999999999999999}";
        assert!(factory.compile(pattern).is_err());
        assert!(!factory.contains(pattern));
        assert_eq!(factory.compilations(), 0);
    }

    #[test]
    fn test_clear_keeps_handed_out_templates() {
        let factory = TemplateFactory::new();
        let template = factory.compile("not {0}").unwrap();
        factory.clear();
        assert!(factory.is_empty());
        assert_eq!(template.render(&["a"], identity).unwrap(), "not a");

        factory.compile("not {0}").unwrap();
        assert_eq!(factory.compilations(), 2);
    }
}
