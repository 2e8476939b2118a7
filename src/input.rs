use std::time::Instant;

use anyhow::Result;
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tokio::runtime::Runtime;
use tracing::warn;

use crate::app::{App, LogRow, MenuEntry};
use crate::checkout::CheckoutMode;
use crate::dragx::{self, DragPayload};
use crate::gesture::Gesture;
use crate::models::{FocusArea, ItemKey, MoveDirection};
use crate::utils::rect_contains;

pub fn handle_key(app: &mut App, rt: &Runtime, key: KeyEvent) -> Result<()> {
    if app.popup_visible() {
        popup_key(app, rt, key);
        return Ok(());
    }
    if app.menu.is_some() {
        menu_key(app, key);
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusArea::Browser => FocusArea::Log,
                FocusArea::Log => FocusArea::Browser,
            };
        }
        KeyCode::Char('h') | KeyCode::Left => app.focus = FocusArea::Browser,
        KeyCode::Char('l') | KeyCode::Right => app.focus = FocusArea::Log,
        _ => match app.focus {
            FocusArea::Browser => browser_key(app, key),
            FocusArea::Log => log_key(app, key),
        },
    }
    Ok(())
}

/// A directory that disappears between draw and Enter is not fatal: the
/// browser stays where it is and the failure is only logged.
fn enter_directory(app: &mut App) {
    match app.browser.enter() {
        Ok(()) => app.sync_host_selection(),
        Err(e) => warn!(error = %e, "enter failed"),
    }
}

fn browser_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.browser.move_cursor(1);
            app.sync_host_selection();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.browser.move_cursor(-1);
            app.sync_host_selection();
        }
        KeyCode::Enter => {
            let is_dir = app.browser.current().is_some_and(|e| e.is_dir);
            if is_dir {
                enter_directory(app);
            } else if let Some(sel) = app.browser.selection_event() {
                app.activate_item(&sel.key);
            }
        }
        KeyCode::Char('o') => {
            if let Some(sel) = app.browser.selection_event() {
                app.activate_item(&sel.key);
            }
        }
        _ => {}
    }
}

fn log_key(app: &mut App, key: KeyEvent) {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down if !shift => app.log_move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up if !shift => app.log_move_cursor(-1),
        KeyCode::Enter => {
            if let Some(k) = app.log_cursor_key() {
                app.select_item(&k);
            }
        }
        KeyCode::Char(' ') => {
            if let Some(k) = app.log_cursor_key() {
                app.store.toggle_pin(&k);
                follow_cursor(app, &k);
            }
        }
        KeyCode::Char('o') => {
            if let Some(k) = app.log_cursor_key() {
                app.activate_item(&k);
            }
        }
        KeyCode::Char('c') => {
            app.store.clear_unpinned();
            app.log_cursor = None;
            app.log_offset = 0;
        }
        KeyCode::Char('m') => {
            if let (Some(i), Some(k)) = (app.log_cursor, app.log_cursor_key()) {
                let row = i.saturating_sub(app.log_offset) as u16;
                let anchor = (app.layout.log.x + 4, app.layout.log.y + row);
                app.open_menu(k, anchor);
            }
        }
        KeyCode::Char('K') | KeyCode::Up => {
            if let Some(k) = app.log_cursor_key() {
                app.store.move_pinned(&k, MoveDirection::TowardRecency);
                follow_cursor(app, &k);
            }
        }
        KeyCode::Char('J') | KeyCode::Down => {
            if let Some(k) = app.log_cursor_key() {
                app.store.move_pinned(&k, MoveDirection::AwayFromRecency);
                follow_cursor(app, &k);
            }
        }
        KeyCode::Char('t') => {
            if let Some(k) = app.log_cursor_key() {
                app.store.move_to_top_of_pinned(&k);
                follow_cursor(app, &k);
            }
        }
        _ => {}
    }
}

/// Keep the keyboard cursor on the same entry after a reorder.
fn follow_cursor(app: &mut App, key: &ItemKey) {
    app.log_cursor = app.store.entries().iter().position(|e| &e.key == key);
}

fn menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.menu = None,
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(menu) = &mut app.menu {
                menu.step(1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(menu) = &mut app.menu {
                menu.step(-1);
            }
        }
        KeyCode::Enter => {
            if let Some(menu) = &app.menu {
                if let Some(action) = menu.selected_action() {
                    let target = menu.key.clone();
                    app.run_menu_action(action, &target);
                }
            }
        }
        _ => {}
    }
}

fn popup_key(app: &mut App, rt: &Runtime, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.dismiss_popup(),
        KeyCode::Enter => app.run_confirmed_checkout(rt),
        KeyCode::Up => {
            let mut guard = app.popup.lock().unwrap();
            if let Some(p) = guard.as_mut() {
                p.scroll = p.scroll.saturating_sub(1);
            }
        }
        KeyCode::Down => {
            let mut guard = app.popup.lock().unwrap();
            if let Some(p) = guard.as_mut() {
                p.scroll = p.scroll.saturating_add(1);
            }
        }
        KeyCode::Char(c) => {
            let mut guard = app.popup.lock().unwrap();
            if let Some(p) = guard.as_mut() {
                if p.req.mode == CheckoutMode::Sha && !p.running {
                    p.sha_input.push(c);
                }
            }
        }
        KeyCode::Backspace => {
            let mut guard = app.popup.lock().unwrap();
            if let Some(p) = guard.as_mut() {
                if p.req.mode == CheckoutMode::Sha && !p.running {
                    p.sha_input.pop();
                }
            }
        }
        _ => {}
    }
}

pub fn handle_mouse(app: &mut App, ev: MouseEvent) -> Result<()> {
    let pos = (ev.column, ev.row);

    if app.popup_visible() {
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let inside = app
                    .layout
                    .popup
                    .is_some_and(|r| rect_contains(r, pos.0, pos.1));
                if !inside {
                    app.dismiss_popup();
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let mut guard = app.popup.lock().unwrap();
                if let Some(p) = guard.as_mut() {
                    p.scroll = if ev.kind == MouseEventKind::ScrollUp {
                        p.scroll.saturating_sub(1)
                    } else {
                        p.scroll.saturating_add(1)
                    };
                }
            }
            _ => {}
        }
        return Ok(());
    }

    if app.menu.is_some() {
        menu_mouse(app, ev, pos);
        return Ok(());
    }

    match ev.kind {
        MouseEventKind::Down(MouseButton::Left) => mouse_down(app, pos),
        MouseEventKind::Down(MouseButton::Right) => {
            if let Some(LogRow::Entry(key)) = app.log_row_at(pos.0, pos.1) {
                app.open_menu(key, pos);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => mouse_drag(app, pos),
        MouseEventKind::Up(MouseButton::Left) => mouse_up(app, pos),
        MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
            let delta: isize = if ev.kind == MouseEventKind::ScrollUp {
                -1
            } else {
                1
            };
            if rect_contains(app.layout.log, pos.0, pos.1) {
                app.log_offset = app.log_offset.saturating_add_signed(delta);
            } else if rect_contains(app.layout.browser, pos.0, pos.1) {
                app.browser.move_cursor(delta);
                app.sync_host_selection();
            }
        }
        _ => {}
    }
    Ok(())
}

fn menu_mouse(app: &mut App, ev: MouseEvent, pos: (u16, u16)) {
    let Some(rect) = app.layout.menu else {
        app.menu = None;
        return;
    };
    let entry_at = |y: u16| -> Option<usize> {
        (y > rect.y && y < rect.y + rect.height - 1).then(|| (y - rect.y - 1) as usize)
    };
    match ev.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => {
            if let Some(i) = entry_at(pos.1) {
                if let Some(menu) = &mut app.menu {
                    if matches!(
                        menu.entries.get(i),
                        Some(MenuEntry::Action { enabled: true, .. })
                    ) {
                        menu.cursor = i;
                    }
                }
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if !rect_contains(rect, pos.0, pos.1) {
                app.menu = None;
                return;
            }
            let Some(i) = entry_at(pos.1) else { return };
            let Some(menu) = &app.menu else { return };
            if let Some(MenuEntry::Action {
                action,
                enabled: true,
                ..
            }) = menu.entries.get(i)
            {
                let action = *action;
                let target = menu.key.clone();
                app.run_menu_action(action, &target);
            }
        }
        MouseEventKind::Down(MouseButton::Right) | MouseEventKind::ScrollUp
        | MouseEventKind::ScrollDown => {
            app.menu = None;
        }
        _ => {}
    }
}

fn mouse_down(app: &mut App, pos: (u16, u16)) {
    if let Some(row) = app.log_row_at(pos.0, pos.1) {
        app.focus = FocusArea::Log;
        match row {
            LogRow::Clear => {
                app.store.clear_unpinned();
                app.log_cursor = None;
                app.log_offset = 0;
            }
            LogRow::Entry(key) => {
                follow_cursor(app, &key);
                // the narrow leading column is the pin toggle
                if pos.0 < app.layout.log.x + 2 {
                    app.store.toggle_pin(&key);
                    follow_cursor(app, &key);
                } else {
                    app.log_tracker.on_down(&key, pos, Instant::now());
                }
            }
        }
    } else if let Some(i) = app.browser_index_at(pos.0, pos.1) {
        app.focus = FocusArea::Browser;
        app.browser.set_cursor(i);
        app.sync_host_selection();
        if let Some(entry) = app.browser.current() {
            let key = ItemKey::from(entry.path.as_path());
            app.browser_tracker.on_down(&key, pos, Instant::now());
        }
    }
}

fn mouse_drag(app: &mut App, pos: (u16, u16)) {
    if let Some(drag) = &mut app.drag {
        drag.pos = pos;
        return;
    }
    if let Some(Gesture::DragStart(key)) = app.log_tracker.on_move(pos) {
        if let Some(item) = app.store.get(&key) {
            let payload = dragx::begin_outbound(item);
            app.begin_drag(FocusArea::Log, payload, pos);
        }
        return;
    }
    if let Some(Gesture::DragStart(key)) = app.browser_tracker.on_move(pos) {
        let entry = app
            .browser
            .entries()
            .iter()
            .find(|e| ItemKey::from(e.path.as_path()) == key)
            .cloned();
        match entry {
            // only files travel into the log
            Some(e) if !e.is_dir => {
                let payload = DragPayload::single(key, e.name, Some(e.path));
                app.begin_drag(FocusArea::Browser, payload, pos);
            }
            _ => app.browser_tracker.cancel(),
        }
    }
}

fn mouse_up(app: &mut App, pos: (u16, u16)) {
    if app.drag.is_some() {
        app.log_tracker.on_up(None);
        app.browser_tracker.on_up(None);
        app.finish_drag(pos);
        return;
    }

    let log_hit = match app.log_row_at(pos.0, pos.1) {
        Some(LogRow::Entry(key)) => Some(key),
        _ => None,
    };
    match app.log_tracker.on_up(log_hit.as_ref()) {
        Some(Gesture::Select(key)) => app.select_item(&key),
        Some(Gesture::Activate(key)) => app.activate_item(&key),
        _ => {}
    }

    let browser_hit = app
        .browser_index_at(pos.0, pos.1)
        .and_then(|i| app.browser.entries().get(i))
        .map(|e| ItemKey::from(e.path.as_path()));
    if let Some(Gesture::Activate(key)) = app.browser_tracker.on_up(browser_hit.as_ref()) {
        let is_dir = app.browser.current().is_some_and(|e| e.is_dir);
        if is_dir {
            enter_directory(app);
        } else {
            app.activate_item(&key);
        }
    }
}
