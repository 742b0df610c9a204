//! In-memory event capture for log assertions
//!
//! `init_test_capture()` installs a layer that appends every event to a
//! shared buffer. All tests in one binary share that buffer, so assertions
//! should filter by an op name or entity id unique to the test.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

type EventLog = Arc<Mutex<Vec<CapturedEvent>>>;

/// One recorded event, every field rendered to a string
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Whether this is the `event` boundary of operation `op`
    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }

    fn from_fields(level: Level, fields: HashMap<String, String>) -> Self {
        let component = fields.get("component").cloned();
        let op = fields.get("op").cloned();
        let event = fields.get("event").cloned();
        Self {
            level,
            component,
            op,
            event,
            fields,
        }
    }
}

/// Renders each field as text; strings and integers without Debug quoting
#[derive(Default)]
struct FieldCollector(HashMap<String, String>);

impl FieldCollector {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

/// Layer that feeds a [`TestCapture`]
pub struct TestCaptureLayer {
    log: EventLog,
}

impl TestCaptureLayer {
    /// A layer and the handle reading what it records
    pub fn new() -> (Self, TestCapture) {
        let log = EventLog::default();
        (Self { log: log.clone() }, TestCapture { log })
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        let captured = CapturedEvent::from_fields(*event.metadata().level(), collector.0);

        if let Ok(mut log) = self.log.lock() {
            log.push(captured);
        }
    }
}

/// Read handle over captured events
#[derive(Clone)]
pub struct TestCapture {
    log: EventLog,
}

impl TestCapture {
    /// Snapshot of everything captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Assert that operation `op` logged an `event` boundary
    ///
    /// # Panics
    ///
    /// Panics if no such event was captured
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "no {event:?} event for op {op:?} among {} captured events",
            events.len()
        );
    }

    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.log
            .lock()
            .map(|log| log.iter().filter(|e| predicate(e)).count())
            .unwrap_or(0)
    }
}

static SHARED_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer once per process and return its handle
///
/// # Example
///
/// ```
/// use canopy_core::logging_facility::test_capture::init_test_capture;
/// use canopy_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("rebuild_index");
/// capture.assert_event_exists("rebuild_index", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    SHARED_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            // Another global subscriber may already be installed
            let _ = tracing_subscriber::registry().with(layer).try_init();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_fields_are_lifted() {
        let fields: HashMap<String, String> = [
            ("op", "resolve_slot"),
            ("event", "end"),
            ("page_id", "p1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let event = CapturedEvent::from_fields(Level::INFO, fields);

        assert!(event.is("resolve_slot", "end"));
        assert!(!event.is("resolve_slot", "start"));
        assert_eq!(event.field("page_id"), Some("p1"));
        assert_eq!(event.component, None);
    }

    #[test]
    fn test_handle_sees_layer_events() {
        let (layer, capture) = TestCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(op = "walk", event = "end", depth = 3u32, "stopped");
        });

        let events = capture.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::WARN);
        assert_eq!(events[0].field("depth"), Some("3"));
        capture.clear();
        assert_eq!(capture.count_events(|_| true), 0);
    }
}
