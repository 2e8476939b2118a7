use std::path::PathBuf;

use chrono::{DateTime, Local};

/// Stable identity for a tracked item. For file-backed items this is the
/// canonical path string; equality on the key stands in for host reference
/// equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey(pub String);

impl ItemKey {
    pub fn new(s: impl Into<String>) -> Self {
        ItemKey(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&std::path::Path> for ItemKey {
    fn from(p: &std::path::Path) -> Self {
        ItemKey(p.to_string_lossy().into_owned())
    }
}

/// One entry in the selection log. The log never copies backing data, it
/// only holds the key plus display attributes.
#[derive(Debug, Clone)]
pub struct Item {
    pub key: ItemKey,
    pub name: String,
    pub path: Option<PathBuf>,
    pub locked: bool,
    /// Display-only marker: the host's persistence layer does not contain
    /// this item (e.g. an untracked file). Rendered with a `*` suffix.
    pub transient: bool,
    pub touched_at: DateTime<Local>,
}

impl Item {
    pub fn new(key: ItemKey, name: impl Into<String>) -> Self {
        Item {
            key,
            name: name.into(),
            path: None,
            locked: false,
            transient: false,
            touched_at: Local::now(),
        }
    }
}

/// Selection-change notification from the host pane.
#[derive(Debug, Clone)]
pub struct SelectionEvent {
    pub key: ItemKey,
    pub name: String,
    pub path: Option<PathBuf>,
}

/// Queries against the host's persistence layer. Used only to classify the
/// transient flag and to resolve paths for menu actions.
pub trait Host {
    fn is_persisted(&self, key: &ItemKey) -> bool;
    fn resolve_path(&self, key: &ItemKey) -> Option<PathBuf>;
}

/// Direction for reordering inside the pinned zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    TowardRecency,
    AwayFromRecency,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FocusArea {
    Browser,
    Log,
}
