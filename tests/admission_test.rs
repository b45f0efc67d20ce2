//! Randomized admission-window tests.
//!
//! A seeded generator drives long sequences of joins, leaves, removals,
//! resizes and evictions against a single island while a simple model tracks
//! who should hold the dodo code. After every step:
//! - the active set is exactly the first `min(k, len)` entries;
//! - queue order is join order;
//! - everyone inside the window has been sent the code exactly once since
//!   their last demotion, and nobody outside holds it.

use std::collections::HashSet;

use island_queue::core::{AdmitReason, Island, Notice};
use island_queue::util::{Identity, IslandId, TenantId, UserId, MINUTE_MS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const OWNER: u64 = 1;

fn user(n: u64) -> Identity {
    Identity::new(n, format!("visitor{n}"))
}

struct Model {
    order: Vec<UserId>,
    holds_code: HashSet<UserId>,
    size: usize,
}

impl Model {
    fn apply(&mut self, notices: &[Notice]) {
        for notice in notices {
            match notice {
                Notice::Admitted {
                    visitor, reason, ..
                } => match reason {
                    AdmitReason::CodeUpdated | AdmitReason::Resent => {
                        assert!(
                            self.holds_code.contains(&visitor.id),
                            "{reason:?} sent to {} outside the window",
                            visitor.id
                        );
                    }
                    _ => {
                        assert!(
                            self.holds_code.insert(visitor.id),
                            "{} admitted twice",
                            visitor.id
                        );
                    }
                },
                Notice::WindowShrank { visitor, .. } => {
                    assert!(self.holds_code.remove(&visitor.id));
                }
                Notice::TurnExpired { visitor, .. } | Notice::RemovedByOwner { visitor, .. } => {
                    self.forget(visitor.id);
                }
                other => panic!("unexpected notice {other:?}"),
            }
        }
    }

    fn forget(&mut self, user: UserId) {
        self.order.retain(|u| *u != user);
        self.holds_code.remove(&user);
    }

    fn check(&self, island: &Island) {
        let ids: Vec<UserId> = island.visitors().iter().map(|v| v.identity.id).collect();
        assert_eq!(ids, self.order, "queue order diverged");

        let expected_active = self.size.min(self.order.len());
        assert_eq!(island.active_count(), expected_active);
        let active: HashSet<UserId> = island.active().iter().map(|v| v.identity.id).collect();
        let leading: HashSet<UserId> = self.order[..expected_active].iter().copied().collect();
        assert_eq!(active, leading, "active set is not the queue head");
        assert_eq!(active, self.holds_code, "code holders differ from active set");
    }
}

fn run(seed: u64, steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let initial = rng.random_range(1..=7u8);
    let mut island = Island::new(user(OWNER), Some(100), IslandId::new("042"), TenantId(1), 0);
    island.open("DODO0", initial).unwrap();

    let mut model = Model {
        order: Vec::new(),
        holds_code: HashSet::new(),
        size: usize::from(initial),
    };
    let mut now = 0u128;

    for step in 0..steps {
        now += u128::from(rng.random_range(0..5u64)) * MINUTE_MS;
        match rng.random_range(0..100u32) {
            0..=44 => {
                let who = user(rng.random_range(2..40));
                let queued = model.order.contains(&who.id);
                let outcome = island.join(who.clone(), 0, now, false).unwrap();
                assert_eq!(outcome.value.already_queued, queued);
                if queued {
                    assert!(outcome.notices.is_empty());
                } else {
                    model.order.push(who.id);
                }
                model.apply(&outcome.notices);
            }
            45..=69 => {
                let who = UserId(rng.random_range(2..40));
                let queued = model.order.contains(&who);
                let outcome = island.leave(who, now);
                assert_eq!(outcome.value, queued);
                model.forget(who);
                model.apply(&outcome.notices);
            }
            70..=79 => {
                if model.order.is_empty() {
                    assert!(island.remove_at(1, now).is_err());
                } else {
                    let position = rng.random_range(1..=model.order.len());
                    let outcome = island.remove_at(position, now).unwrap();
                    assert_eq!(outcome.value.identity.id, model.order[position - 1]);
                    model.apply(&outcome.notices);
                }
            }
            80..=89 => {
                let size = rng.random_range(1..=7u8);
                let notices = island.update_admission_size(size, now).unwrap();
                model.size = usize::from(size);
                model.apply(&notices);
            }
            90..=94 => {
                let notices = island.update_code(format!("DODO{step}")).unwrap();
                assert_eq!(notices.len(), island.active_count());
                model.apply(&notices);
            }
            _ => {
                let outcome = island.evict_stale(rng.random_range(1..30), now);
                model.apply(&outcome.notices);
            }
        }
        model.check(&island);
    }
}

#[test]
fn window_invariants_hold_across_random_operations() {
    for seed in 0..32 {
        run(seed, 400);
    }
}

#[test]
fn promotions_match_freed_active_slots() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
        let size = rng.random_range(1..=7u8);
        let mut island = Island::new(user(OWNER), None, IslandId::new("007"), TenantId(1), 0);
        island.open("CODE", size).unwrap();
        let joined = rng.random_range(0..15u64);
        for n in 0..joined {
            island.join(user(n + 2), 0, 0, false).unwrap();
        }
        let k = usize::from(size);
        let len = island.total_count();
        if len == 0 {
            continue;
        }
        let position = rng.random_range(1..=len);
        let outcome = island.remove_at(position, 0).unwrap();
        let promoted = outcome.notices.iter().filter(|n| n.is_admission()).count();
        let expected = usize::from(position <= k && len > k);
        assert_eq!(promoted, expected, "size {k}, len {len}, removed {position}");
    }
}

#[test]
fn grow_from_two_to_five_with_six_waiting() {
    let mut island = Island::new(user(OWNER), None, IslandId::new("001"), TenantId(1), 0);
    island.open("CODE", 2).unwrap();
    for n in 2..10 {
        island.join(user(n), 0, 0, false).unwrap();
    }
    assert_eq!(island.waiting().len(), 6);

    let notices = island.update_admission_size(5, 0).unwrap();
    let admitted: Vec<u64> = notices
        .iter()
        .map(|n| match n {
            Notice::Admitted {
                visitor,
                reason: AdmitReason::WindowGrew,
                ..
            } => visitor.id.0,
            other => panic!("unexpected notice {other:?}"),
        })
        .collect();
    assert_eq!(admitted, vec![4, 5, 6]);
    assert_eq!(island.active_count(), 5);
}

#[test]
fn shrink_keeps_everyone_queued() {
    let mut island = Island::new(user(OWNER), None, IslandId::new("001"), TenantId(1), 0);
    island.open("CODE", 5).unwrap();
    for n in 2..6 {
        island.join(user(n), 0, 0, false).unwrap();
    }
    assert_eq!(island.active_count(), 4);

    let notices = island.update_admission_size(2, 0).unwrap();
    let positions: Vec<usize> = notices
        .iter()
        .map(|n| match n {
            Notice::WindowShrank { position, .. } => *position,
            other => panic!("unexpected notice {other:?}"),
        })
        .collect();
    assert_eq!(positions, vec![3, 4]);
    assert_eq!(island.total_count(), 4);
    assert_eq!(island.active_count(), 2);
}
