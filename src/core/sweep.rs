//! One sweep cycle over every island in the directory.
//!
//! The periodic driver lives in [`crate::runtime::sweep_task`]; this module
//! only decides what a single cycle does so it can be tested with a fixed
//! clock.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::core::directory::{ClosedIsland, Directory};
use crate::core::notice::{CloseReason, Notice};
use crate::util::types::{Identity, IslandId, TenantId};

/// Result of one sweep cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Islands closed for exceeding the lifetime limit.
    pub closed: Vec<ClosedIsland>,
    /// Visitors evicted for exceeding their tenant's timeout, with the
    /// island and tenant they were evicted from.
    pub evicted: Vec<(IslandId, TenantId, Identity)>,
    /// Visitors admitted because an eviction freed their slot.
    pub promoted: usize,
    /// Islands whose processing failed and were skipped.
    pub failures: usize,
    /// Notifications to dispatch.
    #[serde(skip)]
    pub notices: Vec<Notice>,
}

impl SweepReport {
    /// Whether the cycle changed anything.
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty() && self.evicted.is_empty() && self.failures == 0
    }
}

/// Run one cycle: close islands at least `max_age_hours` old, then evict
/// active visitors over their tenant's timeout on the rest.
pub fn sweep_once(dir: &mut Directory, max_age_hours: u64, now_ms: u128) -> SweepReport {
    let snapshot: Vec<(TenantId, IslandId, u64)> = dir
        .tenants()
        .flat_map(|t| {
            let timeout = t.visitor_timeout_minutes();
            t.islands()
                .iter()
                .map(move |i| (t.id(), i.id().clone(), timeout))
        })
        .collect();

    let mut report = SweepReport::default();
    for (tenant, id, timeout) in snapshot {
        let Some(island) = dir.find_by_id_mut(&id) else {
            debug!(island = %id, "island vanished before sweep reached it");
            continue;
        };

        if island.age_in_hours(now_ms) >= max_age_hours {
            match dir.close_island(&id, CloseReason::Expired) {
                Ok(outcome) => {
                    info!(island = %id, %tenant, max_age_hours, "island auto-closed");
                    report.notices.extend(outcome.notices);
                    report.notices.push(Notice::AutoClosed {
                        owner: outcome.value.owner.clone(),
                        island: id.clone(),
                        max_age_hours,
                    });
                    report.closed.push(outcome.value);
                }
                Err(e) => {
                    error!(island = %id, %tenant, error = %e, "failed to auto-close island");
                    report.failures += 1;
                }
            }
            continue;
        }

        let outcome = island.evict_stale(timeout, now_ms);
        report.promoted += outcome.notices.iter().filter(|n| n.is_admission()).count();
        report.notices.extend(outcome.notices);
        report
            .evicted
            .extend(outcome.value.into_iter().map(|who| (id.clone(), tenant, who)));
    }

    if !report.is_empty() {
        info!(
            closed = report.closed.len(),
            evicted = report.evicted.len(),
            promoted = report.promoted,
            failures = report.failures,
            "sweep cycle finished"
        );
    }
    report
}
