//! Tests for notifier backends and dispatch

use island_queue::core::{Envelope, Target};
use island_queue::infra::{dispatch, InMemoryNotifier, TracingNotifier};
use island_queue::util::{ChannelId, UserId};

fn envelope(target: Target, text: &str) -> Envelope {
    Envelope {
        target,
        text: text.to_string(),
    }
}

#[tokio::test]
async fn test_dispatch_delivers_in_order() {
    let notifier = InMemoryNotifier::new();
    let report = dispatch(
        &notifier,
        vec![
            envelope(Target::User(UserId(1)), "first"),
            envelope(Target::Channel(ChannelId(2)), "post"),
            envelope(Target::User(UserId(1)), "second"),
        ],
    )
    .await;

    assert_eq!(report.delivered, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(notifier.messages_for(UserId(1)), vec!["first", "second"]);
    assert_eq!(notifier.posts_in(ChannelId(2)), vec!["post"]);
    assert_eq!(notifier.deliveries().len(), 3);
}

#[tokio::test]
async fn test_unreachable_target_does_not_stop_dispatch() {
    let notifier = InMemoryNotifier::new();
    notifier.mark_unreachable(Target::User(UserId(1)));
    let report = dispatch(
        &notifier,
        vec![
            envelope(Target::User(UserId(1)), "lost"),
            envelope(Target::User(UserId(2)), "kept"),
        ],
    )
    .await;

    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed, 1);
    assert!(notifier.messages_for(UserId(1)).is_empty());
    assert_eq!(notifier.messages_for(UserId(2)), vec!["kept"]);

    notifier.clear();
    assert!(notifier.deliveries().is_empty());
}

#[tokio::test]
async fn test_tracing_notifier_accepts_everything() {
    let report = dispatch(
        &TracingNotifier,
        vec![envelope(Target::Channel(ChannelId(3)), "hello")],
    )
    .await;
    assert_eq!(report.delivered, 1);
}
