use chrono::Local;
use tracing::debug;

use crate::models::{Host, Item, ItemKey, MoveDirection, SelectionEvent};

/// Default bound on the number of tracked entries.
pub const MAX_ITEMS: usize = 50;

/// Bounded, ordered history of recently selected items.
///
/// Layout invariants: unlocked entries form a contiguous recency zone at the
/// front of the list (index 0 = oldest, the entry adjacent to the pinned zone
/// = most recently touched); locked entries form a contiguous pinned zone at
/// the back, ordered only by explicit move operations. Eviction removes from
/// the front and never touches a locked entry, so the list may exceed the
/// bound when the pinned zone alone is larger than `max_items`.
pub struct HistoryStore {
    entries: Vec<Item>,
    active: Option<ItemKey>,
    max_items: usize,
}

impl HistoryStore {
    pub fn new(max_items: usize) -> Self {
        HistoryStore {
            entries: Vec::new(),
            active: None,
            max_items,
        }
    }

    pub fn entries(&self) -> &[Item] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active(&self) -> Option<&ItemKey> {
        self.active.as_ref()
    }

    pub fn get(&self, key: &ItemKey) -> Option<&Item> {
        self.entries.iter().find(|e| &e.key == key)
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.get(key).is_some()
    }

    /// Index of the first locked entry, i.e. the recency-zone boundary.
    fn first_locked(&self) -> usize {
        self.entries
            .iter()
            .position(|e| e.locked)
            .unwrap_or(self.entries.len())
    }

    fn position(&self, key: &ItemKey) -> Option<usize> {
        self.entries.iter().position(|e| &e.key == key)
    }

    fn insert_at_boundary(&mut self, item: Item) {
        let at = self.first_locked();
        self.entries.insert(at, item);
    }

    fn evict(&mut self) {
        while self.entries.len() > self.max_items && !self.entries[0].locked {
            let gone = self.entries.remove(0);
            debug!(key = gone.key.as_str(), "evicted oldest unpinned entry");
        }
    }

    /// Host selection changed. `None` clears the active item without touching
    /// the list. Reselecting the already-active item is a no-op; touching an
    /// existing unlocked entry refreshes its recency; locked entries keep
    /// their position. New items are inserted unlocked at the recency
    /// boundary, after which the size bound is enforced.
    pub fn on_selection_changed(&mut self, sel: Option<&SelectionEvent>, host: &dyn Host) {
        let Some(sel) = sel else {
            self.active = None;
            return;
        };
        if self.active.as_ref() == Some(&sel.key) {
            return;
        }

        match self.position(&sel.key) {
            Some(i) => {
                if !self.entries[i].locked {
                    let mut item = self.entries.remove(i);
                    item.touched_at = Local::now();
                    self.insert_at_boundary(item);
                }
            }
            None => {
                let mut item = Item::new(sel.key.clone(), sel.name.clone());
                item.path = sel.path.clone().or_else(|| host.resolve_path(&sel.key));
                item.transient = !host.is_persisted(&sel.key);
                self.insert_at_boundary(item);
                self.evict();
            }
        }
        self.active = Some(sel.key.clone());
    }

    /// Mark a key as the active selection without reordering anything.
    pub fn select(&mut self, key: &ItemKey) {
        if self.contains(key) {
            self.active = Some(key.clone());
        }
    }

    /// Flip the pin flag and reinsert at the boundary: a newly pinned item
    /// becomes the most-recently-pinned entry, an unpinned one the most
    /// recent of the recency zone. Never evicts.
    pub fn toggle_pin(&mut self, key: &ItemKey) {
        let Some(i) = self.position(key) else { return };
        let mut item = self.entries.remove(i);
        item.locked = !item.locked;
        debug!(key = key.as_str(), locked = item.locked, "pin toggled");
        self.insert_at_boundary(item);
    }

    /// Entry point for inbound drag: always arrives pre-locked at the pinned
    /// boundary. Duplicates are ignored.
    pub fn insert_pinned_from_external(&mut self, mut item: Item) {
        if self.contains(&item.key) {
            return;
        }
        item.locked = true;
        debug!(key = item.key.as_str(), "pinned insert from external source");
        self.insert_at_boundary(item);
    }

    /// Remove every unlocked entry. Idempotent.
    pub fn clear_unpinned(&mut self) {
        self.entries.retain(|e| e.locked);
    }

    /// Reorder within the pinned zone. A no-op when the item is unlocked,
    /// absent, or already at the requested boundary.
    pub fn move_pinned(&mut self, key: &ItemKey, dir: MoveDirection) {
        let Some(i) = self.position(key) else { return };
        if !self.entries[i].locked {
            return;
        }
        match dir {
            MoveDirection::TowardRecency => {
                if i > self.first_locked() {
                    self.entries.swap(i, i - 1);
                }
            }
            MoveDirection::AwayFromRecency => {
                if i + 1 < self.entries.len() {
                    self.entries.swap(i, i + 1);
                }
            }
        }
    }

    /// Relocate a locked item to the pinned-zone boundary adjacent to the
    /// recency zone in one step.
    pub fn move_to_top_of_pinned(&mut self, key: &ItemKey) {
        let Some(i) = self.position(key) else { return };
        if !self.entries[i].locked || i == self.first_locked() {
            return;
        }
        let item = self.entries.remove(i);
        let at = self.first_locked();
        self.entries.insert(at, item);
    }

    /// Whether a pinned move in `dir` would actually change the order.
    /// Drives the enabled state of the move menu entries.
    pub fn can_move_pinned(&self, key: &ItemKey, dir: MoveDirection) -> bool {
        let Some(i) = self.position(key) else {
            return false;
        };
        if !self.entries[i].locked {
            return false;
        }
        match dir {
            MoveDirection::TowardRecency => i > self.first_locked(),
            MoveDirection::AwayFromRecency => i + 1 < self.entries.len(),
        }
    }

    pub fn at_top_of_pinned(&self, key: &ItemKey) -> bool {
        self.position(key)
            .is_some_and(|i| self.entries[i].locked && i == self.first_locked())
    }

    /// Number of unlocked entries, used to place the zone separator.
    pub fn recency_len(&self) -> usize {
        self.first_locked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct StubHost {
        persisted: bool,
    }

    impl Host for StubHost {
        fn is_persisted(&self, _key: &ItemKey) -> bool {
            self.persisted
        }
        fn resolve_path(&self, key: &ItemKey) -> Option<PathBuf> {
            Some(PathBuf::from(key.as_str()))
        }
    }

    fn host() -> StubHost {
        StubHost { persisted: true }
    }

    fn sel(name: &str) -> SelectionEvent {
        SelectionEvent {
            key: ItemKey::new(name),
            name: name.to_string(),
            path: None,
        }
    }

    fn keys(store: &HistoryStore) -> Vec<&str> {
        store.entries().iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn insert_orders_most_recent_at_boundary() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        for name in ["a", "b", "c"] {
            store.on_selection_changed(Some(&sel(name)), &host());
        }
        // oldest at the front, newest adjacent to the (empty) pinned zone
        assert_eq!(keys(&store), vec!["a", "b", "c"]);
        assert_eq!(store.active().unwrap().as_str(), "c");
    }

    #[test]
    fn reselect_refreshes_recency_of_unlocked() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        for name in ["a", "b", "c"] {
            store.on_selection_changed(Some(&sel(name)), &host());
        }
        store.on_selection_changed(Some(&sel("a")), &host());
        assert_eq!(keys(&store), vec!["b", "c", "a"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn reselect_active_is_a_noop() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        store.on_selection_changed(Some(&sel("a")), &host());
        store.on_selection_changed(Some(&sel("b")), &host());
        store.on_selection_changed(Some(&sel("b")), &host());
        assert_eq!(keys(&store), vec!["a", "b"]);
    }

    #[test]
    fn null_selection_clears_active_only() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        store.on_selection_changed(Some(&sel("a")), &host());
        store.on_selection_changed(None, &host());
        assert!(store.active().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn reselect_locked_keeps_position() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        for name in ["a", "b", "c"] {
            store.on_selection_changed(Some(&sel(name)), &host());
        }
        store.toggle_pin(&ItemKey::new("a"));
        let before = keys(&store)
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        store.on_selection_changed(Some(&sel("a")), &host());
        assert_eq!(keys(&store), before);
    }

    #[test]
    fn bound_holds_after_every_insert() {
        let mut store = HistoryStore::new(5);
        for i in 0..200 {
            store.on_selection_changed(Some(&sel(&format!("f{i}"))), &host());
            assert!(store.len() <= 5);
        }
    }

    #[test]
    fn eviction_removes_oldest_first() {
        let mut store = HistoryStore::new(3);
        for name in ["d", "e", "f", "g"] {
            store.on_selection_changed(Some(&sel(name)), &host());
        }
        assert_eq!(store.len(), 3);
        assert_eq!(keys(&store), vec!["e", "f", "g"]);
        assert!(store.entries().iter().all(|e| !e.locked));
    }

    #[test]
    fn eviction_never_removes_locked() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        for name in ["a", "b", "c"] {
            store.on_selection_changed(Some(&sel(name)), &host());
        }
        store.toggle_pin(&ItemKey::new("c"));
        for i in 0..60 {
            store.on_selection_changed(Some(&sel(&format!("n{i}"))), &host());
        }
        assert_eq!(store.len(), MAX_ITEMS);
        let c = store.get(&ItemKey::new("c")).expect("pinned entry survives");
        assert!(c.locked);
    }

    #[test]
    fn pinned_only_overflow_is_tolerated() {
        let mut store = HistoryStore::new(2);
        for name in ["a", "b"] {
            store.on_selection_changed(Some(&sel(name)), &host());
            store.toggle_pin(&ItemKey::new(name));
        }
        store.insert_pinned_from_external(Item::new(ItemKey::new("c"), "c"));
        // three pinned entries, bound of two: no eviction candidate
        assert_eq!(store.len(), 3);
        // a further unlocked insert is evicted back down, pins untouched
        store.on_selection_changed(Some(&sel("d")), &host());
        assert_eq!(store.len(), 3);
        assert!(store.entries().iter().all(|e| e.locked));
    }

    #[test]
    fn toggle_pin_preserves_size_and_partitions_zones() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        for name in ["a", "b", "c", "d"] {
            store.on_selection_changed(Some(&sel(name)), &host());
        }
        store.toggle_pin(&ItemKey::new("b"));
        assert_eq!(store.len(), 4);
        assert!(store.get(&ItemKey::new("b")).unwrap().locked);
        // pinned zone contiguous at the back
        let locked: Vec<bool> = store.entries().iter().map(|e| e.locked).collect();
        assert_eq!(locked, vec![false, false, false, true]);

        store.toggle_pin(&ItemKey::new("d"));
        // newly pinned lands adjacent to the recency zone, before b
        assert_eq!(keys(&store), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn unpin_reenters_recency_zone_as_most_recent() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        for name in ["a", "b", "c"] {
            store.on_selection_changed(Some(&sel(name)), &host());
        }
        store.toggle_pin(&ItemKey::new("a"));
        store.toggle_pin(&ItemKey::new("a"));
        assert_eq!(keys(&store), vec!["b", "c", "a"]);
        assert!(!store.get(&ItemKey::new("a")).unwrap().locked);
    }

    #[test]
    fn external_insert_is_pinned_and_dedups() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        store.on_selection_changed(Some(&sel("a")), &host());
        let item = Item::new(ItemKey::new("x"), "x");
        store.insert_pinned_from_external(item.clone());
        assert!(store.get(&ItemKey::new("x")).unwrap().locked);

        store.insert_pinned_from_external(item);
        assert_eq!(store.len(), 2);

        // already-present unlocked key is left alone too
        store.insert_pinned_from_external(Item::new(ItemKey::new("a"), "a"));
        assert!(!store.get(&ItemKey::new("a")).unwrap().locked);
    }

    #[test]
    fn clear_unpinned_is_idempotent() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        for name in ["a", "b", "c"] {
            store.on_selection_changed(Some(&sel(name)), &host());
        }
        store.toggle_pin(&ItemKey::new("b"));
        store.clear_unpinned();
        assert_eq!(keys(&store), vec!["b"]);
        store.clear_unpinned();
        assert_eq!(keys(&store), vec!["b"]);
    }

    #[test]
    fn move_pinned_within_zone_only() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        for name in ["a", "b", "c", "d"] {
            store.on_selection_changed(Some(&sel(name)), &host());
        }
        for name in ["b", "c", "d"] {
            store.toggle_pin(&ItemKey::new(name));
        }
        // pin order after pinning b, c, d: each lands at the boundary
        assert_eq!(keys(&store), vec!["a", "d", "c", "b"]);

        store.move_pinned(&ItemKey::new("c"), MoveDirection::TowardRecency);
        assert_eq!(keys(&store), vec!["a", "c", "d", "b"]);

        // already at the recency-adjacent boundary: no-op
        store.move_pinned(&ItemKey::new("c"), MoveDirection::TowardRecency);
        assert_eq!(keys(&store), vec!["a", "c", "d", "b"]);

        store.move_pinned(&ItemKey::new("b"), MoveDirection::AwayFromRecency);
        assert_eq!(keys(&store), vec!["a", "c", "d", "b"]);

        // unlocked items never move
        store.move_pinned(&ItemKey::new("a"), MoveDirection::AwayFromRecency);
        assert_eq!(keys(&store), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn move_to_top_of_pinned_relocates_in_one_step() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        for name in ["a", "b", "c", "d"] {
            store.on_selection_changed(Some(&sel(name)), &host());
            store.toggle_pin(&ItemKey::new(name));
        }
        assert_eq!(keys(&store), vec!["d", "c", "b", "a"]);
        store.move_to_top_of_pinned(&ItemKey::new("a"));
        assert_eq!(keys(&store), vec!["a", "d", "c", "b"]);
        assert!(store.at_top_of_pinned(&ItemKey::new("a")));

        // no-op when already there
        store.move_to_top_of_pinned(&ItemKey::new("a"));
        assert_eq!(keys(&store), vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn can_move_reports_boundaries() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        for name in ["a", "b", "c"] {
            store.on_selection_changed(Some(&sel(name)), &host());
        }
        store.toggle_pin(&ItemKey::new("b"));
        store.toggle_pin(&ItemKey::new("c"));
        // zone layout: [a | c b]
        let c = ItemKey::new("c");
        let b = ItemKey::new("b");
        assert!(!store.can_move_pinned(&c, MoveDirection::TowardRecency));
        assert!(store.can_move_pinned(&c, MoveDirection::AwayFromRecency));
        assert!(store.can_move_pinned(&b, MoveDirection::TowardRecency));
        assert!(!store.can_move_pinned(&b, MoveDirection::AwayFromRecency));
        assert!(!store.can_move_pinned(&ItemKey::new("a"), MoveDirection::TowardRecency));
    }

    #[test]
    fn transient_flag_follows_host_persistence() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        store.on_selection_changed(Some(&sel("a")), &StubHost { persisted: false });
        assert!(store.get(&ItemKey::new("a")).unwrap().transient);
        store.on_selection_changed(Some(&sel("b")), &StubHost { persisted: true });
        assert!(!store.get(&ItemKey::new("b")).unwrap().transient);
    }
}
