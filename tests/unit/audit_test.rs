//! Tests for audit sink

use island_queue::core::{build_audit_event, AuditSink, InMemoryAuditSink, TracingAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event("042", "tenant:1", "user:7", "join", Some("position=1".to_string()));

    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0], event);
    assert_eq!(events[0].action, "join");
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event("001", "tenant:1", "user:1", "create", None));
    sink.record(build_audit_event("002", "tenant:1", "user:2", "create", None));
    sink.record(build_audit_event("003", "tenant:1", "user:3", "create", None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].island, "002"); // First one popped
    assert_eq!(events[1].island, "003");
}

#[test]
fn test_zero_capacity_sink_keeps_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event("001", "tenant:1", "sweep", "evict", None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event("042", "tenant:9", "sweep", "auto_close", Some("age".to_string()));

    assert_eq!(event.island, "042");
    assert_eq!(event.tenant, "tenant:9");
    assert_eq!(event.actor, "sweep");
    assert_eq!(event.action, "auto_close");
    assert_eq!(event.payload, Some("age".to_string()));
    assert_eq!(event.event_id.len(), 36);
    assert!(event.created_at_ms > 0);

    let other = build_audit_event("042", "tenant:9", "sweep", "auto_close", None);
    assert_ne!(event.event_id, other.event_id);
}

#[test]
fn test_tracing_audit_sink_as_trait_object() {
    island_queue::util::init_tracing();
    let mut sinks: Vec<Box<dyn AuditSink>> =
        vec![Box::new(TracingAuditSink), Box::new(InMemoryAuditSink::new(4))];
    for sink in &mut sinks {
        sink.record(build_audit_event("042", "tenant:1", "user:7", "close", None));
        sink.record(build_audit_event("042", "tenant:1", "sweep", "evict", Some("user:8".to_string())));
    }
    assert_eq!(sinks.len(), 2);
}
