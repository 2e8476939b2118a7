use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use arboard::Clipboard;
use ratatui::layout::Rect;
use tokio::runtime::Runtime;
use tracing::warn;

use crate::browser::Browser;
use crate::checkout::{
    self, CheckoutMode, ConfirmToken, ConfirmationQueue, PendingCheckoutRequest,
};
use crate::config::Settings;
use crate::dragx::{self, DragPayload};
use crate::gesture::PointerGestureTracker;
use crate::git::{self, GitHost};
use crate::history::HistoryStore;
use crate::models::{FocusArea, ItemKey, MoveDirection};
use crate::theme::Theme;

/// Context-menu actions for a log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    OpenFolder,
    CopyPath,
    CopyName,
    MoveUp,
    MoveDown,
    MoveToTop,
    CheckoutMain,
    CheckoutSha,
}

pub enum MenuEntry {
    Action {
        label: &'static str,
        action: MenuAction,
        enabled: bool,
    },
    Separator,
}

pub struct ContextMenu {
    pub key: ItemKey,
    pub anchor: (u16, u16),
    pub entries: Vec<MenuEntry>,
    pub cursor: usize,
}

impl ContextMenu {
    fn first_enabled(entries: &[MenuEntry]) -> usize {
        entries
            .iter()
            .position(|e| matches!(e, MenuEntry::Action { enabled: true, .. }))
            .unwrap_or(0)
    }

    /// Move the cursor to the next enabled entry in `delta` direction,
    /// skipping separators and disabled entries.
    pub fn step(&mut self, delta: isize) {
        let len = self.entries.len() as isize;
        let mut i = self.cursor as isize;
        for _ in 0..len {
            i = (i + delta).rem_euclid(len);
            if matches!(self.entries[i as usize], MenuEntry::Action { enabled: true, .. }) {
                self.cursor = i as usize;
                return;
            }
        }
    }

    pub fn selected_action(&self) -> Option<MenuAction> {
        match self.entries.get(self.cursor) {
            Some(MenuEntry::Action {
                action,
                enabled: true,
                ..
            }) => Some(*action),
            _ => None,
        }
    }
}

/// An in-flight drag, either out of the log or into it.
pub struct DragState {
    pub payload: DragPayload,
    pub from: FocusArea,
    pub pos: (u16, u16),
}

/// State of the checkout confirmation popup. Shared with the worker thread
/// that runs the external command, which writes the captured output back.
pub struct CheckoutPopup {
    pub req: PendingCheckoutRequest,
    pub sha_input: String,
    pub running: bool,
    pub output: Option<String>,
    pub error: Option<String>,
    pub scroll: u16,
}

impl CheckoutPopup {
    fn new(req: PendingCheckoutRequest) -> Self {
        CheckoutPopup {
            req,
            sha_input: String::new(),
            running: false,
            output: None,
            error: None,
            scroll: 0,
        }
    }

    /// Revision the command would run with right now, `None` while the SHA
    /// field is still empty.
    pub fn revision(&self) -> Option<String> {
        match &self.req.revision {
            Some(rev) => Some(rev.clone()),
            None => {
                let sha = self.sha_input.trim();
                (!sha.is_empty()).then(|| sha.to_string())
            }
        }
    }
}

pub type SharedPopup = Arc<Mutex<Option<CheckoutPopup>>>;

/// What a visible log row stands for; filled in by the renderer, used by
/// mouse hit-testing on the next event.
#[derive(Clone, PartialEq, Eq)]
pub enum LogRow {
    Entry(ItemKey),
    Clear,
}

#[derive(Default)]
pub struct LayoutMap {
    /// Inner (borderless) area of the browser pane.
    pub browser: Rect,
    /// Inner area of the log pane.
    pub log: Rect,
    /// One element per visible log row, top to bottom.
    pub log_rows: Vec<LogRow>,
    pub menu: Option<Rect>,
    pub popup: Option<Rect>,
}

pub struct App {
    pub settings: Settings,
    pub theme: Theme,
    pub store: HistoryStore,
    pub browser: Browser,
    pub host: GitHost,
    pub focus: FocusArea,
    pub log_tracker: PointerGestureTracker,
    pub browser_tracker: PointerGestureTracker,
    pub drag: Option<DragState>,
    pub menu: Option<ContextMenu>,
    pub confirm: ConfirmationQueue,
    pending_show: Option<ConfirmToken>,
    pub popup: SharedPopup,
    pub log_cursor: Option<usize>,
    pub log_offset: usize,
    pub layout: LayoutMap,
    pub should_quit: bool,
}

impl App {
    pub fn new(settings: Settings, root: PathBuf, repo_root: PathBuf) -> Result<Self> {
        let browser = Browser::new(root, settings.show_hidden)?;
        Ok(App {
            store: HistoryStore::new(settings.max_items),
            browser,
            host: GitHost::new(repo_root),
            focus: FocusArea::Browser,
            log_tracker: PointerGestureTracker::new(),
            browser_tracker: PointerGestureTracker::new(),
            drag: None,
            menu: None,
            confirm: ConfirmationQueue::default(),
            pending_show: None,
            popup: Arc::new(Mutex::new(None)),
            log_cursor: None,
            log_offset: 0,
            layout: LayoutMap::default(),
            theme: Theme::default(),
            settings,
            should_quit: false,
        })
    }

    /// Push the browser's current selection into the log, as the host's
    /// selection-changed notification.
    pub fn sync_host_selection(&mut self) {
        let sel = self.browser.selection_event();
        self.store.on_selection_changed(sel.as_ref(), &self.host);
    }

    /// Select gesture on a log row: highlight it and steer the host there.
    /// The position in the list is deliberately untouched.
    pub fn select_item(&mut self, key: &ItemKey) {
        self.store.select(key);
        if let Some(path) = self.store.get(key).and_then(|i| i.path.clone()) {
            if let Err(e) = self.browser.reveal(&path) {
                warn!(error = %e, "reveal failed");
            }
        }
    }

    /// Activate gesture (double click / open key): select plus open in the
    /// configured editor.
    pub fn activate_item(&mut self, key: &ItemKey) {
        self.select_item(key);
        let Some(path) = self.store.get(key).and_then(|i| i.path.clone()) else {
            return;
        };
        let Some(editor) = self.settings.editor_command() else {
            warn!("no editor configured and $EDITOR unset");
            return;
        };
        let mut parts = editor.split_whitespace();
        let Some(program) = parts.next() else { return };
        let args: Vec<&str> = parts.collect();
        if let Err(e) = std::process::Command::new(program)
            .args(&args)
            .arg(&path)
            .spawn()
        {
            warn!(error = %e, editor = program, "failed to launch editor");
        }
    }

    pub fn begin_drag(&mut self, from: FocusArea, payload: DragPayload, pos: (u16, u16)) {
        self.drag = Some(DragState { payload, from, pos });
    }

    /// Resolve a finished drag against the pane under `pos`. Outbound drops
    /// reveal the item in the browser; inbound drops insert pinned entries.
    pub fn finish_drag(&mut self, pos: (u16, u16)) {
        let Some(drag) = self.drag.take() else { return };
        let over_log = crate::utils::rect_contains(self.layout.log, pos.0, pos.1);
        let over_browser = crate::utils::rect_contains(self.layout.browser, pos.0, pos.1);
        match drag.from {
            FocusArea::Log if over_browser => {
                if let Some(path) = drag.payload.refs.first().and_then(|r| r.path.clone()) {
                    if let Err(e) = self.browser.reveal(&path) {
                        warn!(error = %e, "drag-out reveal failed");
                    }
                }
            }
            FocusArea::Browser if over_log => {
                dragx::drop_into(&mut self.store, &drag.payload);
            }
            _ => {} // dropped nowhere interesting
        }
    }

    pub fn open_menu(&mut self, key: ItemKey, anchor: (u16, u16)) {
        let Some(item) = self.store.get(&key) else { return };
        let resolvable = item.path.as_deref().is_some_and(Path::exists);
        let locked = item.locked;

        let mut entries = vec![
            MenuEntry::Action {
                label: "Open Containing Folder",
                action: MenuAction::OpenFolder,
                enabled: resolvable,
            },
            MenuEntry::Action {
                label: "Copy Path",
                action: MenuAction::CopyPath,
                enabled: resolvable,
            },
            MenuEntry::Action {
                label: "Copy Name",
                action: MenuAction::CopyName,
                enabled: true,
            },
        ];
        if locked {
            entries.push(MenuEntry::Separator);
            entries.push(MenuEntry::Action {
                label: "↑ Move Up",
                action: MenuAction::MoveUp,
                enabled: self.store.can_move_pinned(&key, MoveDirection::TowardRecency),
            });
            entries.push(MenuEntry::Action {
                label: "↓ Move Down",
                action: MenuAction::MoveDown,
                enabled: self
                    .store
                    .can_move_pinned(&key, MoveDirection::AwayFromRecency),
            });
            entries.push(MenuEntry::Separator);
            entries.push(MenuEntry::Action {
                label: "⇡ Move to Top",
                action: MenuAction::MoveToTop,
                enabled: !self.store.at_top_of_pinned(&key),
            });
        }
        entries.push(MenuEntry::Separator);
        entries.push(MenuEntry::Action {
            label: "Git: Checkout from main",
            action: MenuAction::CheckoutMain,
            enabled: resolvable,
        });
        entries.push(MenuEntry::Action {
            label: "Git: Checkout from SHA…",
            action: MenuAction::CheckoutSha,
            enabled: resolvable,
        });

        let cursor = ContextMenu::first_enabled(&entries);
        self.menu = Some(ContextMenu {
            key,
            anchor,
            entries,
            cursor,
        });
    }

    pub fn run_menu_action(&mut self, action: MenuAction, key: &ItemKey) {
        match action {
            MenuAction::OpenFolder => {
                if let Some(parent) = self
                    .store
                    .get(key)
                    .and_then(|i| i.path.as_deref())
                    .and_then(Path::parent)
                {
                    open_in_file_manager(parent);
                }
            }
            MenuAction::CopyPath => {
                if let Some(path) = self.store.get(key).and_then(|i| i.path.as_deref()) {
                    copy_to_clipboard(&path.to_string_lossy());
                }
            }
            MenuAction::CopyName => {
                if let Some(item) = self.store.get(key) {
                    copy_to_clipboard(&item.name);
                }
            }
            MenuAction::MoveUp => self.store.move_pinned(key, MoveDirection::TowardRecency),
            MenuAction::MoveDown => self.store.move_pinned(key, MoveDirection::AwayFromRecency),
            MenuAction::MoveToTop => self.store.move_to_top_of_pinned(key),
            MenuAction::CheckoutMain => self.request_checkout(CheckoutMode::MainBranch, key),
            MenuAction::CheckoutSha => self.request_checkout(CheckoutMode::Sha, key),
        }
        self.menu = None;
    }

    /// Phase one of the confirmation hand-off: park the pending request and
    /// remember the token; the popup opens on the next frame.
    pub fn request_checkout(&mut self, mode: CheckoutMode, key: &ItemKey) {
        let Some(item) = self.store.get(key) else { return };
        let workdir = self.host.root().to_path_buf();
        let pending = match mode {
            CheckoutMode::MainBranch => {
                checkout::begin_main_checkout(item, &workdir, &self.settings.default_branch)
            }
            CheckoutMode::Sha => checkout::begin_sha_checkout(item, &workdir),
        };
        if let Some(pending) = pending {
            let token = self.confirm.request(pending);
            self.pending_show = Some(token);
        }
    }

    /// Phase two, called once per frame from the event loop: redeem the
    /// token and surface the popup.
    pub fn promote_pending_popup(&mut self) {
        let Some(token) = self.pending_show.take() else {
            return;
        };
        if let Some(req) = self.confirm.show(token) {
            *self.popup.lock().unwrap() = Some(CheckoutPopup::new(req));
        }
    }

    pub fn popup_visible(&self) -> bool {
        self.popup.lock().unwrap().is_some()
    }

    pub fn dismiss_popup(&mut self) {
        *self.popup.lock().unwrap() = None;
    }

    /// Confirmation: run the checkout off the UI thread and marshal the
    /// captured output back into the popup.
    pub fn run_confirmed_checkout(&mut self, rt: &Runtime) {
        let (req, revision) = {
            let mut guard = self.popup.lock().unwrap();
            let Some(popup) = guard.as_mut() else { return };
            if popup.running {
                return;
            }
            let Some(revision) = popup.revision() else {
                popup.error = Some("Enter a commit SHA first.".to_string());
                return;
            };
            popup.running = true;
            popup.output = None;
            popup.error = None;
            popup.scroll = 0;
            (popup.req.clone(), revision)
        };

        let shared = Arc::clone(&self.popup);
        rt.spawn_blocking(move || {
            let result = git::run_checkout(&req, &revision);
            let mut guard = shared.lock().unwrap();
            let Some(popup) = guard.as_mut() else {
                return; // dismissed while the command ran
            };
            popup.running = false;
            match result {
                Ok(out) => {
                    popup.output = Some(if out.stdout.trim().is_empty() {
                        out.stderr.clone()
                    } else {
                        out.stdout.clone()
                    });
                    if !out.stderr.trim().is_empty() {
                        popup.error = Some(out.stderr);
                    }
                }
                Err(e) => {
                    popup.error = Some(e.to_string());
                }
            }
        });
    }

    /// Move the keyboard cursor in the log pane and keep it visible.
    pub fn log_move_cursor(&mut self, delta: isize) {
        let len = self.store.len();
        if len == 0 {
            self.log_cursor = None;
            return;
        }
        let next = match self.log_cursor {
            Some(i) => i.saturating_add_signed(delta).min(len - 1),
            None => 0,
        };
        self.log_cursor = Some(next);
        let height = self.layout.log.height as usize;
        if height > 0 {
            // one extra row for the clear separator
            if next < self.log_offset {
                self.log_offset = next;
            } else if next + 1 >= self.log_offset + height {
                self.log_offset = next + 2 - height;
            }
        }
    }

    pub fn log_cursor_key(&self) -> Option<ItemKey> {
        self.log_cursor
            .and_then(|i| self.store.entries().get(i))
            .map(|e| e.key.clone())
    }

    /// Hit-test a screen position against the visible log rows.
    pub fn log_row_at(&self, x: u16, y: u16) -> Option<LogRow> {
        if !crate::utils::rect_contains(self.layout.log, x, y) {
            return None;
        }
        let i = (y - self.layout.log.y) as usize;
        self.layout.log_rows.get(i).cloned()
    }

    pub fn browser_index_at(&self, x: u16, y: u16) -> Option<usize> {
        if !crate::utils::rect_contains(self.layout.browser, x, y) {
            return None;
        }
        let i = self.browser.offset + (y - self.layout.browser.y) as usize;
        (i < self.browser.entries().len()).then_some(i)
    }
}

fn copy_to_clipboard(text: &str) {
    let mut clipboard = Clipboard::new().ok();
    if let Some(cb) = clipboard.as_mut() {
        let _ = cb.set_text(text.to_string());
    }
}

fn open_in_file_manager(dir: &Path) {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(target_os = "windows")]
    let opener = "explorer";
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let opener = "xdg-open";

    if let Err(e) = std::process::Command::new(opener).arg(dir).spawn() {
        warn!(error = %e, "failed to open file manager");
    }
}
