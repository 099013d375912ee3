// ── Bridge handle ──
//
// Pairs a provider with the group store. Both the relay session and the
// HTTP handlers go through this handle, so every read of provider state
// lands in the same snapshot.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::DeviceGroup;
use crate::protocol::UpdateCommand;
use crate::provider::DeviceGroupProvider;
use crate::store::{GroupChange, GroupStore};

/// Cheaply cloneable handle over a provider and its cached snapshot.
pub struct Bridge<P> {
    inner: Arc<BridgeInner<P>>,
}

struct BridgeInner<P> {
    provider: P,
    store: GroupStore,
}

impl<P> Clone for Bridge<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: DeviceGroupProvider> Bridge<P> {
    pub fn new(provider: P) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                provider,
                store: GroupStore::new(),
            }),
        }
    }

    pub fn provider(&self) -> &P {
        &self.inner.provider
    }

    pub fn store(&self) -> &GroupStore {
        &self.inner.store
    }

    pub fn snapshot(&self) -> Arc<Vec<DeviceGroup>> {
        self.inner.store.snapshot()
    }

    // ── Provider round trips ─────────────────────────────────────────

    /// Fetch the group list and make it the current snapshot.
    pub async fn refresh(&self) -> Result<Arc<Vec<DeviceGroup>>, CoreError> {
        let groups = self.inner.provider.list_groups().await?;
        debug!(count = groups.len(), "group snapshot refreshed");
        self.inner.store.replace(groups);
        Ok(self.inner.store.snapshot())
    }

    /// Like [`refresh`](Self::refresh), but a provider failure is logged
    /// and the last good snapshot is returned instead.
    pub async fn refresh_or_cached(&self) -> Arc<Vec<DeviceGroup>> {
        match self.refresh().await {
            Ok(groups) => groups,
            Err(e) => {
                let cached = self.inner.store.snapshot();
                warn!(error = %e, cached = cached.len(), "group refresh failed, using cached snapshot");
                cached
            }
        }
    }

    /// Apply an update command to every group whose name matches exactly.
    ///
    /// Each matched group gets `set_power`, then `set_brightness` when the
    /// command carries one. Provider failures are logged per call and do
    /// not stop the remaining calls. Only the calls the provider accepted
    /// are folded into the cached snapshot; a failed call leaves the last
    /// known value in place.
    ///
    /// Returns the number of groups that matched.
    pub async fn apply_update(&self, cmd: &UpdateCommand) -> usize {
        let targets = self.inner.store.matching(&cmd.group);
        if targets.is_empty() {
            debug!(group = %cmd.group, "update names no known group");
            return 0;
        }

        let mut changes = Vec::with_capacity(targets.len());
        for group in &targets {
            let mut change = GroupChange::new(group.id.clone());
            match self.inner.provider.set_power(group, cmd.is_on).await {
                Ok(()) => change.is_on = Some(cmd.is_on),
                Err(e) => {
                    warn!(group = %group.name, id = %group.id, error = %e, "set power failed");
                }
            }
            if let Some(bri) = cmd.brightness {
                match self.inner.provider.set_brightness(group, bri).await {
                    Ok(()) => change.brightness = Some(bri),
                    Err(e) => {
                        warn!(group = %group.name, id = %group.id, error = %e, "set brightness failed");
                    }
                }
            }
            if !change.is_empty() {
                changes.push(change);
            }
        }

        let applied = self.inner.store.apply_changes(&changes);
        debug!(group = %cmd.group, matched = targets.len(), applied, "update applied");
        targets.len()
    }
}
