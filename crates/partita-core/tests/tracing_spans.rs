#![forbid(unsafe_code)]

//! Tracing instrumentation tests for hierarchy building.
//!
//!   cargo test -p partita-core --test tracing_spans

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use partita_core::{Key, KeyAccessor, build_hierarchy};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    message: String,
    parent_span: Option<String>,
}

#[derive(Default, Clone)]
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .into_iter()
            .find(|(name, _)| name == "message")
            .map(|(_, v)| v)
            .unwrap_or_default();
        let parent_span = ctx.event_span(event).map(|s| s.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            message,
            parent_span,
        });
    }
}

fn with_capture(f: impl FnOnce()) -> Capture {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    capture
}

fn label(f: &(&'static str, f64), _: usize) -> Key {
    Key::from(f.0)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn build_emits_span_with_input_sizes() {
    let facts = [("a", 1.0), ("b", 2.0), ("c", -1.0)];
    let capture = with_capture(|| {
        let levels: [KeyAccessor<'_, (&'static str, f64)>; 1] = [&label];
        let tree = build_hierarchy(&facts, |f: &(&'static str, f64)| f.1, &levels);
        assert_eq!(tree.len(), 3);
    });

    let spans = capture.spans.lock().unwrap().clone();
    let build = spans
        .iter()
        .find(|s| s.name == "hierarchy_build")
        .expect("hierarchy_build span");
    assert_eq!(build.fields.get("facts").map(String::as_str), Some("3"));
    assert_eq!(build.fields.get("levels").map(String::as_str), Some("1"));

    let events = capture.events.lock().unwrap().clone();
    assert!(
        events
            .iter()
            .any(|e| e.message == "hierarchy built"
                && e.parent_span.as_deref() == Some("hierarchy_build"))
    );
}

#[test]
fn empty_fast_path_is_logged() {
    let facts = [("a", 0.0)];
    let capture = with_capture(|| {
        let levels: [KeyAccessor<'_, (&'static str, f64)>; 1] = [&label];
        let tree = build_hierarchy(&facts, |f: &(&'static str, f64)| f.1, &levels);
        assert!(tree.is_empty());
    });

    let events = capture.events.lock().unwrap().clone();
    assert!(events.iter().any(|e| e.message.contains("empty hierarchy")));
    assert!(events.iter().all(|e| e.message != "hierarchy built"));
}
