//! Queue service facade used by the command layer and the sweep driver.
//!
//! Every mutating call follows the same path:
//! 1. take the operation gate (held until delivery finishes, so two
//!    operations never interleave their notifications);
//! 2. lock the directory, mutate, route the resulting notices, unlock;
//! 3. dispatch the envelopes; delivery failures are logged only.
//!
//! Role checks and config-store I/O happen outside the directory lock.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::{ServiceConfig, TenantSettings};
use crate::core::{
    build_audit_event, sweep_once, AdmissionSize, AuditSink, ClosedIsland, CloseReason,
    ConfigStore, Directory, Island, Notifier, Outcome, QueueError, RoleCheck, RouteContext,
    SweepReport,
};
use crate::infra::notifier::dispatch;
use crate::runtime::api::{IslandSnapshot, IslandSummary, JoinResponse, RemovedVisitor};
use crate::util::clock::Clock;
use crate::util::types::{ChannelId, ChannelKind, Identity, IslandId, TenantId, UserId};

/// Actor label used in audit events written by the sweep.
const SWEEP_ACTOR: &str = "sweep";

/// The queue engine plus its collaborators.
pub struct QueueService {
    config: ServiceConfig,
    directory: Mutex<Directory>,
    gate: tokio::sync::Mutex<()>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn ConfigStore>,
    roles: Arc<dyn RoleCheck>,
    clock: Arc<dyn Clock>,
    audit: Option<Mutex<Box<dyn AuditSink>>>,
}

impl std::fmt::Debug for QueueService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueService")
            .field("config", &self.config)
            .field("islands", &self.directory.lock().island_count())
            .finish_non_exhaustive()
    }
}

impl QueueService {
    /// Create a service with an empty directory.
    pub fn new(
        config: ServiceConfig,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn ConfigStore>,
        roles: Arc<dyn RoleCheck>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory: Mutex::new(Directory::from_config(&config)),
            config,
            gate: tokio::sync::Mutex::new(()),
            notifier,
            store,
            roles,
            clock,
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Mutex::new(audit));
        self
    }

    /// Service configuration.
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Current time from the injected clock.
    pub fn now_ms(&self) -> u128 {
        self.clock.now_ms()
    }

    /// Run `f` against a read-only view of the directory.
    pub fn with_directory<R>(&self, f: impl FnOnce(&Directory) -> R) -> R {
        f(&*self.directory.lock())
    }

    fn record(
        &self,
        island: &IslandId,
        tenant: TenantId,
        actor: &str,
        action: &str,
        payload: Option<String>,
    ) {
        if let Some(sink) = &self.audit {
            sink.lock().record(build_audit_event(
                island.to_string(),
                tenant.to_string(),
                actor,
                action,
                payload,
            ));
        }
    }

    /// Serialize, mutate, route, then deliver.
    async fn apply<T, F>(&self, origin: Option<ChannelId>, f: F) -> Result<T, QueueError>
    where
        F: FnOnce(&mut Directory, u128) -> Result<Outcome<T>, QueueError>,
    {
        let _gate = self.gate.lock().await;
        let now_ms = self.clock.now_ms();
        let (value, envelopes) = {
            let mut dir = self.directory.lock();
            let outcome = f(&mut *dir, now_ms)?;
            let ctx = RouteContext {
                prefix: &self.config.command_prefix,
                now_ms,
                origin,
                suppress_origin_echo: self.config.suppress_origin_echo,
            };
            let envelopes = dir.route(&outcome.notices, &ctx);
            (outcome.value, envelopes)
        };
        if !envelopes.is_empty() {
            let report = dispatch(self.notifier.as_ref(), envelopes).await;
            if report.failed > 0 {
                warn!(delivered = report.delivered, failed = report.failed, "some notifications were not delivered");
            }
        }
        Ok(value)
    }

    /// Whether `actor` may act on an island owned by `owner` in `tenant`.
    async fn authorize(&self, actor: UserId, owner: UserId, tenant: TenantId) -> Result<(), QueueError> {
        if actor == owner || self.roles.is_admin(actor, tenant).await {
            return Ok(());
        }
        Err(QueueError::Forbidden(format!("{actor} does not own this island and is not an admin")))
    }

    async fn require_admin(&self, actor: UserId, tenant: TenantId) -> Result<(), QueueError> {
        if self.roles.is_admin(actor, tenant).await {
            Ok(())
        } else {
            Err(QueueError::Forbidden(format!("{actor} is not an admin of {tenant}")))
        }
    }

    /// Owner, tenant and id of the island `target` names, or of `actor`'s
    /// own island when `target` is `None`.
    fn resolve_target(&self, actor: UserId, target: Option<&IslandId>) -> Result<(UserId, TenantId, IslandId), QueueError> {
        let dir = self.directory.lock();
        let island = match target {
            Some(id) => dir
                .find_by_id(id)
                .ok_or_else(|| QueueError::NotFound(format!("{id} is not a valid island ID")))?,
            None => dir
                .find_by_owner(actor)
                .ok_or_else(|| QueueError::NotFound(format!("{actor} has no open island queue")))?,
        };
        Ok((island.owner().id, island.tenant(), island.id().clone()))
    }

    // ---------------------------------------------------------------------
    // Tenants
    // ---------------------------------------------------------------------

    /// Make `tenant` known, loading its stored settings and writing a default
    /// row when none exists. Calling it again for a known tenant is a no-op.
    pub async fn register_tenant(&self, tenant: TenantId) -> Result<TenantSettings, QueueError> {
        let _gate = self.gate.lock().await;
        let known = self
            .directory
            .lock()
            .tenant(tenant)
            .map(|t| t.settings().clone());
        if let Some(settings) = known {
            return Ok(settings);
        }
        let settings = match self.store.load(tenant).await? {
            Some(row) => row,
            None => {
                let row = TenantSettings::with_timeout(self.config.default_visitor_timeout_minutes);
                self.store.save(tenant, &row).await?;
                info!(%tenant, "created default tenant settings");
                row
            }
        };
        self.directory.lock().register_tenant(tenant, settings.clone());
        Ok(settings)
    }

    /// Forget `tenant` and its islands. Stored settings are kept. Returns how
    /// many islands were discarded.
    pub async fn unregister_tenant(&self, tenant: TenantId) -> Result<usize, QueueError> {
        let _gate = self.gate.lock().await;
        let removed = self
            .directory
            .lock()
            .unregister_tenant(tenant)
            .ok_or_else(|| QueueError::NotFound(format!("{tenant} is not registered")))?;
        Ok(removed.islands().len())
    }

    async fn update_settings(
        &self,
        tenant: TenantId,
        next: impl FnOnce(&crate::core::Tenant) -> Result<TenantSettings, QueueError>,
    ) -> Result<TenantSettings, QueueError> {
        let _gate = self.gate.lock().await;
        let settings = {
            let dir = self.directory.lock();
            let registry = dir
                .tenant(tenant)
                .ok_or_else(|| QueueError::NotFound(format!("{tenant} is not registered")))?;
            next(registry)?
        };
        self.store.save(tenant, &settings).await?;
        if let Some(registry) = self.directory.lock().tenant_mut(tenant) {
            registry.apply_settings(settings.clone());
        }
        Ok(settings)
    }

    /// Route `kind` announcements for `tenant` to `channel` (or nowhere).
    /// Admin only.
    pub async fn set_channel(
        &self,
        actor: UserId,
        tenant: TenantId,
        kind: ChannelKind,
        channel: Option<ChannelId>,
    ) -> Result<TenantSettings, QueueError> {
        self.require_admin(actor, tenant).await?;
        self.update_settings(tenant, |t| Ok(t.with_channel(kind, channel)))
            .await
    }

    /// Set how long an active visitor may hold a slot in `tenant`. Admin only.
    pub async fn set_timeout(
        &self,
        actor: UserId,
        tenant: TenantId,
        minutes: u64,
    ) -> Result<TenantSettings, QueueError> {
        self.require_admin(actor, tenant).await?;
        let (min, max) = (
            self.config.min_visitor_timeout_minutes,
            self.config.max_visitor_timeout_minutes,
        );
        self.update_settings(tenant, |t| t.with_timeout(minutes, min, max))
            .await
    }

    // ---------------------------------------------------------------------
    // Owner operations
    // ---------------------------------------------------------------------

    /// Register an island for `owner` that does not accept joins yet.
    pub async fn create_island(
        &self,
        owner: Identity,
        tenant: TenantId,
        price: Option<u32>,
    ) -> Result<IslandSummary, QueueError> {
        let summary = self
            .apply(None, |dir, now_ms| {
                let island = dir.create_island(owner, price, tenant, now_ms, &mut rand::rng())?;
                Ok(Outcome::quiet(IslandSummary::from(island)))
            })
            .await?;
        self.record(&summary.id, tenant, &summary.owner.id.to_string(), "create", None);
        Ok(summary)
    }

    /// Open the caller's island with `code` and a window of `size`
    /// (default 3).
    pub async fn open_island(
        &self,
        owner: UserId,
        code: String,
        size: Option<u8>,
    ) -> Result<IslandSnapshot, QueueError> {
        let size = size.unwrap_or_else(|| AdmissionSize::default().get());
        let snapshot = self
            .apply(None, |dir, now_ms| {
                let island = find_owned_mut(dir, owner)?;
                let notices = island.open(code, size)?;
                Ok(Outcome {
                    value: IslandSnapshot::capture(island, now_ms),
                    notices,
                })
            })
            .await?;
        self.record(&snapshot.id, snapshot.tenant, &owner.to_string(), "open", Some(format!("size={size}")));
        Ok(snapshot)
    }

    /// Register and open in one step.
    pub async fn create_and_open(
        &self,
        owner: Identity,
        tenant: TenantId,
        code: String,
        price: Option<u32>,
        size: Option<u8>,
    ) -> Result<IslandSnapshot, QueueError> {
        let size = size.unwrap_or_else(|| AdmissionSize::default().get());
        AdmissionSize::new(size)?;
        let owner_id = owner.id;
        let snapshot = self
            .apply(None, |dir, now_ms| {
                let id = dir
                    .create_island(owner, price, tenant, now_ms, &mut rand::rng())?
                    .id()
                    .clone();
                let island = dir
                    .find_by_id_mut(&id)
                    .ok_or_else(|| QueueError::Conflict(format!("{id} vanished after creation")))?;
                let notices = island.open(code, size)?;
                Ok(Outcome {
                    value: IslandSnapshot::capture(island, now_ms),
                    notices,
                })
            })
            .await?;
        self.record(&snapshot.id, tenant, &owner_id.to_string(), "create_open", Some(format!("size={size}")));
        Ok(snapshot)
    }

    /// Close an island. Without `target` the actor's own island is closed;
    /// with one, the actor must own it or administer its tenant. `origin` is
    /// the channel the command came from.
    pub async fn close_island(
        &self,
        actor: Identity,
        target: Option<IslandId>,
        origin: Option<ChannelId>,
    ) -> Result<ClosedIsland, QueueError> {
        let (owner, tenant, id) = self.resolve_target(actor.id, target.as_ref())?;
        self.authorize(actor.id, owner, tenant).await?;
        let reason = if actor.id == owner {
            CloseReason::Owner
        } else {
            CloseReason::Admin(actor.clone())
        };
        let closed = self
            .apply(origin, |dir, _| {
                find_checked_mut(dir, &id, owner, tenant)?;
                dir.close_island(&id, reason)
            })
            .await?;
        self.record(
            &closed.island,
            closed.tenant,
            &actor.id.to_string(),
            "close",
            Some(format!("remaining={}", closed.remaining.len())),
        );
        Ok(closed)
    }

    /// Force-remove the visitor at 1-based `position`.
    pub async fn remove_visitor(
        &self,
        actor: Identity,
        position: usize,
        target: Option<IslandId>,
    ) -> Result<RemovedVisitor, QueueError> {
        let (owner, tenant, id) = self.resolve_target(actor.id, target.as_ref())?;
        self.authorize(actor.id, owner, tenant).await?;
        let removed = self
            .apply(None, |dir, now_ms| {
                let island = find_checked_mut(dir, &id, owner, tenant)?;
                let outcome = island.remove_at(position, now_ms)?;
                Ok(Outcome {
                    value: RemovedVisitor {
                        island: id.clone(),
                        visitor: outcome.value.identity,
                        position,
                    },
                    notices: outcome.notices,
                })
            })
            .await?;
        self.record(
            &removed.island,
            tenant,
            &actor.id.to_string(),
            "remove",
            Some(removed.visitor.id.to_string()),
        );
        Ok(removed)
    }

    /// Replace the dodo code; returns how many active visitors were re-sent it.
    pub async fn update_code(&self, owner: UserId, code: String) -> Result<usize, QueueError> {
        let (count, id, tenant) = self
            .apply(None, |dir, _| {
                let island = find_owned_mut(dir, owner)?;
                let notices = island.update_code(code)?;
                Ok(Outcome {
                    value: (notices.len(), island.id().clone(), island.tenant()),
                    notices,
                })
            })
            .await?;
        self.record(&id, tenant, &owner.to_string(), "update_code", None);
        Ok(count)
    }

    /// Replace the price.
    pub async fn update_price(&self, owner: UserId, price: Option<u32>) -> Result<(), QueueError> {
        self.apply(None, |dir, _| {
            find_owned_mut(dir, owner)?.update_price(price);
            Ok(Outcome::quiet(()))
        })
        .await
    }

    /// Resize the active window.
    pub async fn update_admission_size(&self, owner: UserId, size: u8) -> Result<IslandSnapshot, QueueError> {
        let snapshot = self
            .apply(None, |dir, now_ms| {
                let island = find_owned_mut(dir, owner)?;
                let notices = island.update_admission_size(size, now_ms)?;
                Ok(Outcome {
                    value: IslandSnapshot::capture(island, now_ms),
                    notices,
                })
            })
            .await?;
        self.record(&snapshot.id, snapshot.tenant, &owner.to_string(), "update_size", Some(format!("size={size}")));
        Ok(snapshot)
    }

    // ---------------------------------------------------------------------
    // Visitor operations
    // ---------------------------------------------------------------------

    /// Join the queue of `island`. `trips` of `0` means unspecified.
    pub async fn join(&self, visitor: Identity, island: &IslandId, trips: u32) -> Result<JoinResponse, QueueError> {
        let allow_self = self.config.allow_self_join;
        let user = visitor.id;
        let (response, tenant) = self
            .apply(None, |dir, now_ms| {
                let target = find_island_mut(dir, island)?;
                let outcome = target.join(visitor, trips, now_ms, allow_self)?;
                let receipt = outcome.value;
                Ok(Outcome {
                    value: (
                        JoinResponse {
                            island: target.id().clone(),
                            owner: target.owner().clone(),
                            position: receipt.position + 1,
                            total: receipt.total,
                            already_queued: receipt.already_queued,
                            admitted: receipt.admitted,
                        },
                        target.tenant(),
                    ),
                    notices: outcome.notices,
                })
            })
            .await?;
        if !response.already_queued {
            self.record(&response.island, tenant, &user.to_string(), "join", Some(format!("position={}", response.position)));
        }
        Ok(response)
    }

    /// Leave the queue of `island`. `Ok(false)` when the visitor was not in it.
    pub async fn leave(&self, visitor: UserId, island: &IslandId) -> Result<bool, QueueError> {
        let (removed, tenant) = self
            .apply(None, |dir, now_ms| {
                let target = find_island_mut(dir, island)?;
                let outcome = target.leave(visitor, now_ms);
                Ok(Outcome {
                    value: (outcome.value, target.tenant()),
                    notices: outcome.notices,
                })
            })
            .await?;
        if removed {
            self.record(island, tenant, &visitor.to_string(), "leave", None);
        }
        Ok(removed)
    }

    /// Send the dodo code again to an active visitor.
    pub async fn resend_code(&self, visitor: UserId, island: &IslandId) -> Result<(), QueueError> {
        self.apply(None, |dir, _| {
            let notice = find_island_mut(dir, island)?.resend_code(visitor)?;
            Ok(Outcome {
                value: (),
                notices: vec![notice],
            })
        })
        .await
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Snapshot of one island.
    pub fn queue_info(&self, island: &IslandId) -> Result<IslandSnapshot, QueueError> {
        let now_ms = self.clock.now_ms();
        let dir = self.directory.lock();
        dir.find_by_id(island)
            .map(|i| IslandSnapshot::capture(i, now_ms))
            .ok_or_else(|| QueueError::NotFound(format!("{island} is not a valid island ID")))
    }

    /// Snapshot of the island `owner` holds, if any.
    pub fn island_of(&self, owner: UserId) -> Option<IslandSnapshot> {
        let now_ms = self.clock.now_ms();
        self.directory
            .lock()
            .find_by_owner(owner)
            .map(|i| IslandSnapshot::capture(i, now_ms))
    }

    /// Every island in `tenant`, in creation order.
    pub fn list_islands(&self, tenant: TenantId) -> Result<Vec<IslandSummary>, QueueError> {
        let dir = self.directory.lock();
        let registry = dir
            .tenant(tenant)
            .ok_or_else(|| QueueError::NotFound(format!("{tenant} is not registered")))?;
        Ok(registry.islands().iter().map(IslandSummary::from).collect())
    }

    // ---------------------------------------------------------------------
    // Sweep
    // ---------------------------------------------------------------------

    /// Run one sweep cycle now.
    pub async fn sweep(&self) -> SweepReport {
        let max_age_hours = self.config.max_island_age_hours;
        let result = self
            .apply(None, |dir, now_ms| {
                let mut report = sweep_once(dir, max_age_hours, now_ms);
                let notices = std::mem::take(&mut report.notices);
                Ok(Outcome {
                    value: report,
                    notices,
                })
            })
            .await;
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "sweep cycle failed");
                return SweepReport::default();
            }
        };
        for closed in &report.closed {
            self.record(&closed.island, closed.tenant, SWEEP_ACTOR, "auto_close", None);
        }
        for (island, tenant, who) in &report.evicted {
            self.record(island, *tenant, SWEEP_ACTOR, "evict", Some(who.id.to_string()));
        }
        report
    }
}

fn find_owned_mut(dir: &mut Directory, owner: UserId) -> Result<&mut Island, QueueError> {
    dir.find_by_owner_mut(owner)
        .ok_or_else(|| QueueError::NotFound(format!("{owner} has no open island queue")))
}

/// The island at `id`, provided it still belongs to `owner` in `tenant`.
///
/// Permission checks run before the gate is taken, so the id may have been
/// freed and handed to another owner by the time the mutation runs.
fn find_checked_mut<'a>(
    dir: &'a mut Directory,
    id: &IslandId,
    owner: UserId,
    tenant: TenantId,
) -> Result<&'a mut Island, QueueError> {
    match dir.find_by_id_mut(id) {
        Some(island) if island.owner().id == owner && island.tenant() == tenant => Ok(island),
        _ => Err(QueueError::NotFound(format!("{id} is not a valid island ID"))),
    }
}

fn find_island_mut<'a>(dir: &'a mut Directory, id: &IslandId) -> Result<&'a mut Island, QueueError> {
    dir.find_by_id_mut(id)
        .ok_or_else(|| QueueError::NotFound(format!("{id} is not a valid island ID")))
}
