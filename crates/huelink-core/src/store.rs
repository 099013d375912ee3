// ── Group state store ──
//
// Lock-free holder of the current group snapshot. Readers always see a
// complete list; every mutation publishes a new immutable value.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::DeviceGroup;

/// A change the provider has accepted for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupChange {
    pub id: String,
    pub is_on: Option<bool>,
    pub brightness: Option<u8>,
}

impl GroupChange {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_on: None,
            brightness: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.is_on.is_none() && self.brightness.is_none()
    }

    fn apply_to(&self, group: &mut DeviceGroup) {
        if let Some(on) = self.is_on {
            group.is_on = on;
        }
        if let Some(bri) = self.brightness {
            group.brightness = bri;
        }
    }
}

/// Shared snapshot of every device group, in provider order.
pub struct GroupStore {
    groups: ArcSwap<Vec<DeviceGroup>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl GroupStore {
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);
        Self {
            groups: ArcSwap::from_pointee(Vec::new()),
            last_refresh,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Vec<DeviceGroup>> {
        self.groups.load_full()
    }

    /// Every group whose name equals `name` exactly.
    pub fn matching(&self, name: &str) -> Vec<DeviceGroup> {
        self.groups
            .load()
            .iter()
            .filter(|g| g.name == name)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.load().is_empty()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Replace the whole snapshot with a fresh provider listing.
    pub fn replace(&self, groups: Vec<DeviceGroup>) {
        self.groups.store(Arc::new(groups));
        self.last_refresh.send_replace(Some(Utc::now()));
    }

    /// Fold provider-confirmed changes into the snapshot, keyed by group id.
    ///
    /// Runs as a compare-and-swap loop, so a concurrent [`replace`](Self::replace)
    /// is never overwritten with an edited copy of the older list. Returns
    /// the number of groups changed; the snapshot is left untouched when
    /// none of the ids are present.
    pub fn apply_changes(&self, changes: &[GroupChange]) -> usize {
        if changes.is_empty() {
            return 0;
        }

        let mut applied = 0;
        self.groups.rcu(|current| {
            applied = 0;
            if !current.iter().any(|g| changes.iter().any(|c| c.id == g.id)) {
                return Arc::clone(current);
            }
            let next: Vec<DeviceGroup> = current
                .iter()
                .map(|g| {
                    let mut g = g.clone();
                    if let Some(change) = changes.iter().find(|c| c.id == g.id) {
                        change.apply_to(&mut g);
                        applied += 1;
                    }
                    g
                })
                .collect();
            Arc::new(next)
        });
        applied
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    pub fn subscribe_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }

    /// How long ago the last provider refresh happened, or `None` if never.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for GroupStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Vec<DeviceGroup> {
        vec![
            DeviceGroup::new("1", "Office", false, 10),
            DeviceGroup::new("2", "Kitchen", true, 200),
            DeviceGroup::new("3", "Office", false, 50),
        ]
    }

    #[test]
    fn starts_empty_and_never_refreshed() {
        let store = GroupStore::new();
        assert!(store.is_empty());
        assert_eq!(store.last_refresh(), None);
        assert!(store.data_age().is_none());
    }

    #[test]
    fn replace_publishes_snapshot_and_refresh_time() {
        let store = GroupStore::new();
        let mut rx = store.subscribe_refresh();

        store.replace(sample());

        assert_eq!(store.len(), 3);
        assert_eq!(*store.snapshot(), sample());
        assert!(store.last_refresh().is_some());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_some());
    }

    #[test]
    fn old_snapshots_are_unaffected_by_replacement() {
        let store = GroupStore::new();
        store.replace(sample());
        let before = store.snapshot();

        store.replace(vec![DeviceGroup::new("9", "Hall", true, 1)]);

        assert_eq!(before.len(), 3);
        assert_eq!(store.len(), 1);
    }

    fn change(id: &str, is_on: Option<bool>, brightness: Option<u8>) -> GroupChange {
        GroupChange {
            id: id.into(),
            is_on,
            brightness,
        }
    }

    #[test]
    fn apply_changes_touches_only_listed_ids() {
        let store = GroupStore::new();
        store.replace(sample());

        let applied = store.apply_changes(&[
            change("1", Some(true), Some(128)),
            change("3", Some(true), None),
        ]);

        assert_eq!(applied, 2);
        let snap = store.snapshot();
        assert_eq!(snap[0], DeviceGroup::new("1", "Office", true, 128));
        assert_eq!(snap[1], DeviceGroup::new("2", "Kitchen", true, 200));
        assert_eq!(snap[2], DeviceGroup::new("3", "Office", true, 50));
    }

    #[test]
    fn brightness_only_change_keeps_power() {
        let store = GroupStore::new();
        store.replace(sample());

        store.apply_changes(&[change("2", None, Some(40))]);

        let snap = store.snapshot();
        assert!(snap[1].is_on);
        assert_eq!(snap[1].brightness, 40);
    }

    #[test]
    fn unknown_ids_leave_the_snapshot_untouched() {
        let store = GroupStore::new();
        store.replace(sample());
        let before = store.snapshot();

        assert_eq!(store.apply_changes(&[change("42", Some(true), None)]), 0);
        assert_eq!(store.apply_changes(&[]), 0);
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn concurrent_replace_is_not_lost() {
        let store = Arc::new(GroupStore::new());
        store.replace(sample());

        let writers: Vec<_> = (0..4u8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for bri in 0..50u8 {
                        store.apply_changes(&[change("1", Some(true), Some(bri.wrapping_add(i)))]);
                    }
                })
            })
            .collect();
        store.replace(vec![
            DeviceGroup::new("1", "Office", false, 10),
            DeviceGroup::new("7", "Hall", true, 1),
        ]);
        for w in writers {
            w.join().unwrap();
        }

        // Whatever the interleaving, the replacement listing survives.
        let snap = store.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[1], DeviceGroup::new("7", "Hall", true, 1));
    }

    #[test]
    fn matching_returns_all_duplicates_in_order() {
        let store = GroupStore::new();
        store.replace(sample());

        let ids: Vec<_> = store.matching("Office").into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec!["1".to_owned(), "3".to_owned()]);
        assert!(store.matching("Garage").is_empty());
    }
}
