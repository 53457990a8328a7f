#![allow(clippy::unwrap_used, clippy::expect_used)]

use unitsim_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START, OP_REPORT};
use unitsim_core_types::SimId;
use unitsim_errors::{SimError, Track};
use unitsim_logging::test_capture::init_test_capture;
use unitsim_logging::{log_op_end, log_op_error, log_op_start, DebugLogger, TracingLogger};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let events = capture.events();
    let start_events: Vec<_> = events
        .iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START))
        .collect();

    assert!(
        !start_events.is_empty(),
        "Should have captured at least one start event"
    );
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42u64);

    let events = capture.events();
    let end_events: Vec<_> = events
        .iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_kind_and_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = SimError::Cancelled {
        track: Track::Actual,
        reason: "timeout".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10u64);

    let events = capture.events();
    let error_events: Vec<_> = events
        .iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();

    assert_eq!(error_events.len(), 1, "Should have exactly one error event");
    assert_eq!(error_events[0].field("err.code"), Some("ERR_CANCELLATION"));
    assert_eq!(error_events[0].field("err.kind"), Some("Cancellation"));
}

#[test]
fn test_tracing_logger_tags_lines_with_sim_id() {
    let capture = init_test_capture();
    let sim_id = SimId::new();
    let logger = TracingLogger::new().with_sim_id(sim_id.clone());

    logger.log("EXPECT: 1");
    logger.log("ACTUAL: 2");

    assert_eq!(capture.report_lines(sim_id.as_str()), vec!["EXPECT: 1", "ACTUAL: 2"]);
    let events = capture.events_for_sim(sim_id.as_str());
    assert!(events.iter().all(|e| e.op.as_deref() == Some(OP_REPORT)));
}
