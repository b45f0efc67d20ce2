//! Tests for error types

use island_queue::core::QueueError;

#[test]
fn test_not_found_error() {
    let err = QueueError::NotFound("island999 is not a valid island ID".to_string());
    assert_eq!(format!("{err}"), "not found: island999 is not a valid island ID");
}

#[test]
fn test_not_open_error() {
    let err = QueueError::NotOpen("island042".to_string());
    assert_eq!(format!("{err}"), "island island042 is not open yet");
}

#[test]
fn test_not_admitted_error() {
    let err = QueueError::NotAdmitted { position: 4, total: 6 };
    assert_eq!(format!("{err}"), "not admitted yet: position 4 of 6");
}

#[test]
fn test_backend_error() {
    let err = QueueError::Backend("connection failed".to_string());
    assert_eq!(format!("{err}"), "backend error: connection failed");
}

#[test]
fn test_internal_errors() {
    assert!(QueueError::Conflict("x".into()).is_internal());
    assert!(!QueueError::SelfReference.is_internal());
    assert!(!QueueError::IdSpaceExhausted(1000).is_internal());
}
