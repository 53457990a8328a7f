//! In-memory capture of tracing events, keyed by engine instance.
//!
//! Engines tag every event with their `sim_id`. Tests running in parallel
//! share one global subscriber, so queries here always go through a
//! `sim_id` or a unique op name.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;
use unitsim_core_types::schema::{
    EVENT_END_ERROR, EVENT_REPORT, FIELD_EVENT, FIELD_LINE, FIELD_OP, FIELD_SIM_ID,
};

/// One recorded event with every field rendered to text
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub op: Option<String>,
    pub event: Option<String>,
    pub sim_id: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn is(&self, event: &str) -> bool {
        self.event.as_deref() == Some(event)
    }
}

#[derive(Default)]
struct FieldText(HashMap<String, String>);

impl Visit for FieldText {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut text = FieldText::default();
        event.record(&mut text);
        let fields = text.0;

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            sim_id: fields.get(FIELD_SIM_ID).cloned(),
            fields,
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(captured);
        }
    }
}

/// Shared handle onto the captured events
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events emitted by one engine instance, in emission order
    pub fn events_for_sim(&self, sim_id: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.sim_id.as_deref() == Some(sim_id))
            .collect()
    }

    /// The failure report one engine wrote through `TracingLogger`
    pub fn report_lines(&self, sim_id: &str) -> Vec<String> {
        self.events_for_sim(sim_id)
            .into_iter()
            .filter(|e| e.is(EVENT_REPORT))
            .filter_map(|e| e.field(FIELD_LINE).map(str::to_string))
            .collect()
    }

    /// `end_error` events one engine emitted
    pub fn errors_for_sim(&self, sim_id: &str) -> Vec<CapturedEvent> {
        self.events_for_sim(sim_id)
            .into_iter()
            .filter(|e| e.is(EVENT_END_ERROR))
            .collect()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber, once per process.
///
/// If a host already installed a subscriber the handle stays empty.
///
/// ```
/// use unitsim_core_types::SimId;
/// use unitsim_logging::test_capture::init_test_capture;
/// use unitsim_logging::{DebugLogger, TracingLogger};
///
/// let capture = init_test_capture();
/// let sim_id = SimId::new();
/// TracingLogger::new().with_sim_id(sim_id.clone()).log("EXPECT: 1");
/// assert_eq!(capture.report_lines(sim_id.as_str()), vec!["EXPECT: 1"]);
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let events = Arc::new(Mutex::new(Vec::new()));
            let layer = CaptureLayer {
                events: events.clone(),
            };
            tracing_subscriber::registry().with(layer).try_init().ok();
            TestCapture { events }
        })
        .clone()
}
