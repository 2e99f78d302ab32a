use std::sync::Arc;
use std::sync::Barrier;

use query_templates::{ArgumentHint, ElementKind, RenderErrorKind, TemplateFactory, Transform};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn plain(arg: &&str, _: ArgumentHint) -> String {
    arg.to_string()
}

// ── Compilation ─────────────────────────────────────────────────────────

#[test]
fn test_repeated_compile_renders_identically() {
    init_tracing();
    let factory = TemplateFactory::new();
    let patterns = ["{0} = {1}", "x{0}y{1}z", "{1u}:{0l}", "coalesce({0}, {1})"];

    for pattern in patterns {
        let first = factory.compile(pattern).unwrap();
        let first_out = first.render(&["Ab", "Cd"], plain).unwrap();
        for _ in 0..3 {
            let again = factory.compile(pattern).unwrap();
            assert!(Arc::ptr_eq(&first, &again));
            assert_eq!(again.render(&["Ab", "Cd"], plain).unwrap(), first_out);
        }
    }
    assert_eq!(factory.compilations(), patterns.len() as u64);
}

#[test]
fn test_separate_factories_are_isolated() {
    let a = TemplateFactory::new();
    let b = TemplateFactory::with_capacity(8);
    a.compile("{0}").unwrap();
    assert!(a.contains("{0}"));
    assert!(b.is_empty());
}

#[test]
fn test_element_structure() {
    let factory = TemplateFactory::new();
    let template = factory.compile("substr({0},{1s},{2U})").unwrap();
    let kinds: Vec<_> = template.elements().iter().map(|e| e.node.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            ElementKind::Text("substr(".to_string()),
            ElementKind::Argument { index: 0, transform: Transform::None },
            ElementKind::Text(",".to_string()),
            ElementKind::Argument { index: 1, transform: Transform::AsString },
            ElementKind::Text(",".to_string()),
            ElementKind::Argument { index: 2, transform: Transform::ToUpper },
            ElementKind::Text(")".to_string()),
        ]
    );
    assert_eq!(template.source(), "substr({0},{1s},{2U})");
}

#[test]
fn test_multiline_pattern() {
    let factory = TemplateFactory::new();
    let pattern = "select {0}\nfrom {1} {1}\nwhere {2}";
    let template = factory.compile(pattern).unwrap();
    let out = template.render(&["NAME", "COMPANIES", "ID = ?"], plain).unwrap();
    assert_eq!(out, "select NAME\nfrom COMPANIES COMPANIES\nwhere ID = ?");
}

#[test]
fn test_out_of_range_never_renders_empty() {
    let factory = TemplateFactory::new();
    let template = factory.compile("{0} between {1} and {2}").unwrap();
    let err = template.render(&["x"], plain).unwrap_err();
    assert_eq!(err.kind, RenderErrorKind::IndexOutOfRange);
    assert!(err.span.is_some());
}

#[test]
fn test_compile_error_diagnostic() {
    let factory = TemplateFactory::new();
    let err = factory.compile("f({0}, {99999999999999999999999})").unwrap_err();
    let report = err.format_with_source();
    assert!(report.contains("invalid placeholder index"));
    assert!(report.contains("f({0}, {99999999999999999999999})"));
}

// ── Concurrency ─────────────────────────────────────────────────────────

#[test]
fn test_concurrent_compile_converges_to_one_entry() {
    init_tracing();
    let factory = TemplateFactory::new();
    let threads = 8;
    let barrier = Barrier::new(threads);

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    factory.compile("{0} in ({1})").unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(factory.len(), 1);
    assert!(factory.compilations() >= 1);
    let cached = factory.compile("{0} in ({1})").unwrap();
    for template in &results {
        assert!(Arc::ptr_eq(template, &cached));
    }
}

#[test]
fn test_concurrent_distinct_patterns() {
    let factory = TemplateFactory::new();
    std::thread::scope(|s| {
        for t in 0..4 {
            let factory = &factory;
            s.spawn(move || {
                for i in 0..50 {
                    let pattern = format!("{{0}} op{} {{1}}", (t * 50 + i) % 100);
                    let template = factory.compile(&pattern).unwrap();
                    let out = template.render(&["a", "b"], plain).unwrap();
                    assert_eq!(out, format!("a op{} b", (t * 50 + i) % 100));
                }
            });
        }
    });
    assert_eq!(factory.len(), 100);
}
