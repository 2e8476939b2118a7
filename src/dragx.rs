use std::path::PathBuf;

use tracing::debug;

use crate::history::HistoryStore;
use crate::models::{Item, ItemKey};

/// One reference inside a drag payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragRef {
    pub key: ItemKey,
    pub name: String,
    pub path: Option<PathBuf>,
}

/// Ordered set of references travelling with a drag, shared by the outbound
/// and inbound flows.
#[derive(Debug, Clone, Default)]
pub struct DragPayload {
    pub refs: Vec<DragRef>,
}

impl DragPayload {
    pub fn single(key: ItemKey, name: impl Into<String>, path: Option<PathBuf>) -> Self {
        DragPayload {
            refs: vec![DragRef {
                key,
                name: name.into(),
                path,
            }],
        }
    }

    /// Whether a hovering view should advertise acceptance.
    pub fn accepts(&self) -> bool {
        !self.refs.is_empty()
    }
}

/// Package a log entry for an external drop target. Move semantics: the
/// entry itself stays where it is, only the reference travels.
pub fn begin_outbound(item: &Item) -> DragPayload {
    debug!(key = item.key.as_str(), "outbound drag");
    DragPayload::single(item.key.clone(), item.name.clone(), item.path.clone())
}

/// Drop an external payload into the log: every distinct reference not
/// already present is inserted pre-pinned. Returns whether the drop was
/// consumed (payload non-empty); hovering without dropping leaves no trace.
pub fn drop_into(store: &mut HistoryStore, payload: &DragPayload) -> bool {
    if !payload.accepts() {
        return false;
    }
    let mut seen: Vec<&ItemKey> = Vec::new();
    for r in &payload.refs {
        if seen.contains(&&r.key) {
            continue;
        }
        seen.push(&r.key);
        let mut item = Item::new(r.key.clone(), r.name.clone());
        item.path = r.path.clone();
        store.insert_pinned_from_external(item);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MAX_ITEMS;
    use crate::models::{Host, SelectionEvent};

    struct NullHost;
    impl Host for NullHost {
        fn is_persisted(&self, _key: &ItemKey) -> bool {
            true
        }
        fn resolve_path(&self, _key: &ItemKey) -> Option<PathBuf> {
            None
        }
    }

    fn dref(name: &str) -> DragRef {
        DragRef {
            key: ItemKey::new(name),
            name: name.to_string(),
            path: None,
        }
    }

    #[test]
    fn empty_payload_is_not_consumed() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        assert!(!drop_into(&mut store, &DragPayload::default()));
        assert!(store.is_empty());
    }

    #[test]
    fn drop_inserts_each_new_ref_pinned() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        let payload = DragPayload {
            refs: vec![dref("x"), dref("y")],
        };
        assert!(drop_into(&mut store, &payload));
        assert_eq!(store.len(), 2);
        assert!(store.entries().iter().all(|e| e.locked));
    }

    #[test]
    fn drop_skips_present_and_duplicate_refs() {
        let mut store = HistoryStore::new(MAX_ITEMS);
        store.on_selection_changed(
            Some(&SelectionEvent {
                key: ItemKey::new("x"),
                name: "x".into(),
                path: None,
            }),
            &NullHost,
        );
        let payload = DragPayload {
            refs: vec![dref("x"), dref("y"), dref("y")],
        };
        assert!(drop_into(&mut store, &payload));
        assert_eq!(store.len(), 2);
        // the pre-existing entry keeps its unlocked state
        assert!(!store.get(&ItemKey::new("x")).unwrap().locked);
        assert!(store.get(&ItemKey::new("y")).unwrap().locked);
    }

    #[test]
    fn outbound_packages_key_name_and_path() {
        let mut item = Item::new(ItemKey::new("src/lib.rs"), "lib.rs");
        item.path = Some(PathBuf::from("src/lib.rs"));
        let payload = begin_outbound(&item);
        assert!(payload.accepts());
        assert_eq!(payload.refs.len(), 1);
        assert_eq!(payload.refs[0].path.as_deref(), Some(std::path::Path::new("src/lib.rs")));
    }
}
