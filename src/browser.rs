use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::models::{ItemKey, SelectionEvent};

#[derive(Debug, Clone)]
pub struct BrowserEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// File browser over the project tree. This pane plays the host role:
/// every cursor move over a file is a selection-change event for the log.
pub struct Browser {
    root: PathBuf,
    dir: PathBuf,
    entries: Vec<BrowserEntry>,
    pub cursor: usize,
    pub offset: usize,
    show_hidden: bool,
}

impl Browser {
    pub fn new(root: PathBuf, show_hidden: bool) -> Result<Self> {
        let mut b = Browser {
            dir: root.clone(),
            root,
            entries: Vec::new(),
            cursor: 0,
            offset: 0,
            show_hidden,
        };
        b.refresh()?;
        Ok(b)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[BrowserEntry] {
        &self.entries
    }

    /// Read one directory into entries without touching any state, so a
    /// failed read leaves the browser where it was.
    fn list(&self, dir: &Path) -> Result<Vec<BrowserEntry>> {
        let mut entries = Vec::new();
        if dir != self.root {
            entries.push(BrowserEntry {
                name: "..".into(),
                path: dir.parent().unwrap_or(&self.root).to_path_buf(),
                is_dir: true,
            });
        }
        let mut listed: Vec<BrowserEntry> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.show_hidden && name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            let is_dir = path.is_dir();
            listed.push(BrowserEntry { name, path, is_dir });
        }
        listed.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then(a.name.cmp(&b.name)));
        entries.extend(listed);
        Ok(entries)
    }

    pub fn refresh(&mut self) -> Result<()> {
        let entries = self.list(&self.dir)?;
        self.entries = entries;
        self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
        Ok(())
    }

    pub fn current(&self) -> Option<&BrowserEntry> {
        self.entries.get(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let last = self.entries.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn set_cursor(&mut self, index: usize) {
        if index < self.entries.len() {
            self.cursor = index;
        }
    }

    /// Keep the cursor inside the visible window of `height` rows.
    pub fn adjust_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
    }

    /// Descend into the directory under the cursor (or go back up via the
    /// `..` entry). Files are left to the selection/activation path. The
    /// target is listed before anything is committed, so a directory that
    /// vanished since the last draw leaves the browser in place.
    pub fn enter(&mut self) -> Result<()> {
        let Some(entry) = self.current().cloned() else {
            return Ok(());
        };
        if entry.is_dir {
            let entries = self.list(&entry.path)?;
            self.dir = entry.path;
            self.entries = entries;
            self.cursor = 0;
            self.offset = 0;
        }
        Ok(())
    }

    /// The host's active selection, `None` while the cursor is on a
    /// directory.
    pub fn selection_event(&self) -> Option<SelectionEvent> {
        let entry = self.current()?;
        if entry.is_dir {
            return None;
        }
        Some(SelectionEvent {
            key: ItemKey::from(entry.path.as_path()),
            name: entry.name.clone(),
            path: Some(entry.path.clone()),
        })
    }

    /// Navigate to the directory containing `path` and put the cursor on
    /// it. Used as the drop target of an outbound drag from the log.
    pub fn reveal(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if parent.starts_with(&self.root) {
                let entries = self.list(parent)?;
                self.dir = parent.to_path_buf();
                self.entries = entries;
                self.offset = 0;
                if let Some(i) = self.entries.iter().position(|e| e.path == path) {
                    self.cursor = i;
                }
                self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
            }
        }
        Ok(())
    }
}
