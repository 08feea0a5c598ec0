//! Tracing output of discovery and rendering.

use std::sync::{Arc, Mutex};

use rbar_core::{BarConfig, MemoryStorage};
use rbar_dom::{MemoryDocument, ResizableBar};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Default)]
struct Captured {
    spans: Vec<String>,
    messages: Vec<(tracing::Level, String)>,
}

struct Capture {
    state: Arc<Mutex<Captured>>,
}

impl<S> Layer<S> for Capture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::Id,
        _ctx: Context<'_, S>,
    ) {
        self.state
            .lock()
            .expect("capture lock")
            .spans
            .push(attrs.metadata().name().to_owned());
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Msg {
            message: Option<String>,
        }
        impl tracing::field::Visit for Msg {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = Some(value.to_owned());
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_owned());
                }
            }
        }
        let mut msg = Msg { message: None };
        event.record(&mut msg);
        if let Some(message) = msg.message {
            self.state
                .lock()
                .expect("capture lock")
                .messages
                .push((*event.metadata().level(), message));
        }
    }
}

fn capture() -> (Arc<Mutex<Captured>>, tracing::subscriber::DefaultGuard) {
    let state = Arc::new(Mutex::new(Captured::default()));
    let subscriber = tracing_subscriber::registry().with(Capture {
        state: Arc::clone(&state),
    });
    (state, tracing::subscriber::set_default(subscriber))
}

#[test]
fn render_span_and_duplicate_warning() {
    let (state, _guard) = capture();

    let mut doc = MemoryDocument::new();
    let body = doc.body();
    doc.append_element(body, "aside", &[("js-resizable_bar", "toc")]);
    doc.append_element(body, "aside", &[("js-resizable_bar", "toc")]);
    let mut bars = ResizableBar::new(BarConfig::default(), doc, MemoryStorage::new()).unwrap();
    bars.render();

    let captured = state.lock().expect("capture lock");
    assert!(captured.spans.iter().any(|name| name == "rbar.render"));
    assert!(
        captured
            .messages
            .iter()
            .any(|(level, msg)| *level == tracing::Level::WARN && msg == "duplicate bar id skipped"),
        "got: {:?}",
        captured.messages
    );
}

#[test]
fn unknown_position_is_reported() {
    let (state, _guard) = capture();

    let mut doc = MemoryDocument::new();
    let body = doc.body();
    doc.append_element(
        body,
        "aside",
        &[("js-resizable_bar", "nav"), ("data-position", "middle")],
    );
    let mut bars = ResizableBar::new(BarConfig::default(), doc, MemoryStorage::new()).unwrap();
    bars.render();

    let captured = state.lock().expect("capture lock");
    assert!(
        captured
            .messages
            .iter()
            .any(|(level, msg)| *level == tracing::Level::WARN
                && msg == "falling back to left position")
    );
}

#[test]
fn failed_storage_write_is_a_warning() {
    let (state, _guard) = capture();

    let mut doc = MemoryDocument::new();
    let body = doc.body();
    doc.append_element(body, "aside", &[("js-resizable_bar", "toc")]);
    let mut storage = MemoryStorage::new();
    storage.set_fail_writes(true);
    let mut bars = ResizableBar::new(BarConfig::default(), doc, storage).unwrap();
    bars.render();
    bars.toggle("toc", rbar_core::PointerButton::Primary);

    let captured = state.lock().expect("capture lock");
    assert!(
        captured
            .messages
            .iter()
            .any(|(level, msg)| *level == tracing::Level::WARN
                && msg == "skipping bar persistence write")
    );
}
