//! Tests for utility functions

use island_queue::util::{
    is_sunday, ChannelKind, Clock, Identity, IslandId, ManualClock, UserId, HOUR_MS, MINUTE_MS,
};

#[test]
fn test_island_reference_parsing() {
    assert_eq!(IslandId::from_reference("042"), Some(IslandId::new("042")));
    assert_eq!(IslandId::from_reference("island042"), Some(IslandId::new("042")));
    assert_eq!(IslandId::from_reference(" island7 "), Some(IslandId::new("7")));
    assert_eq!(IslandId::from_reference("island"), None);
    assert_eq!(IslandId::from_reference("isle042"), None);
    assert_eq!(IslandId::new("042").to_string(), "island042");
}

#[test]
fn test_identity_keyed_by_user() {
    let a = Identity::new(5, "Tom");
    let b = Identity::new(5, "Tom Nook");
    assert_eq!(a, b);
    assert_eq!(a.id, UserId(5));
}

#[test]
fn test_channel_kind_for_price() {
    assert_eq!(ChannelKind::for_price(Some(0)), ChannelKind::Turnip);
    assert_eq!(ChannelKind::for_price(None), ChannelKind::General);
}

#[test]
fn test_manual_clock() {
    let clock = ManualClock::new(1_000);
    clock.advance_minutes(2);
    assert_eq!(clock.now_ms(), 1_000 + 2 * MINUTE_MS);
    clock.set_ms(5);
    assert_eq!(clock.now_ms(), 5);
}

#[test]
fn test_sunday_detection() {
    let day = 24 * HOUR_MS;
    // 1970-01-04 was a Sunday.
    assert!(is_sunday(3 * day));
    assert!(is_sunday(3 * day + 23 * HOUR_MS));
    assert!(!is_sunday(0));
    assert!(!is_sunday(4 * day));
    assert!(is_sunday(10 * day));
}
