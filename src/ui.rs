use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, CheckoutPopup, ContextMenu, LogRow, MenuEntry};
use crate::checkout::CheckoutMode;
use crate::models::FocusArea;
use crate::theme::Theme;
use crate::utils::{centered_rect, relative_time};

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(f.area());
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[0]);

    draw_browser(f, app, panes[0]);
    draw_log(f, app, panes[1]);
    draw_footer(f, app, chunks[1]);

    app.layout.menu = None;
    app.layout.popup = None;
    if let Some(menu) = &app.menu {
        app.layout.menu = Some(draw_menu(f, &app.theme, menu));
    }

    let popup = app.popup.clone();
    let guard = popup.lock().unwrap();
    if let Some(popup) = guard.as_ref() {
        app.layout.popup = Some(draw_checkout_popup(f, &app.theme, popup));
    }
}

fn pane_block<'a>(app: &App, title: String, focused: bool, drop_target: bool) -> Block<'a> {
    let theme = &app.theme;
    let mut block = Block::default().borders(Borders::ALL).title(title);
    if drop_target {
        block = block
            .border_style(theme.drop_hint)
            .title_bottom(Line::from(" drop here ").style(theme.drop_hint));
    } else if focused {
        block = block.border_style(Style::default().fg(theme.focus_border));
    } else {
        block = block.border_style(Style::default().fg(theme.blurred_border));
    }
    block
}

fn draw_browser(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = app.theme.clone();
    let title = format!(" {} ", app.browser.dir().display());
    let dragging_in = app
        .drag
        .as_ref()
        .is_some_and(|d| d.from == FocusArea::Log && d.payload.accepts());
    let block = pane_block(app, title, app.focus == FocusArea::Browser, dragging_in);
    let inner = block.inner(area);
    f.render_widget(block, area);
    app.layout.browser = inner;

    app.browser.adjust_scroll(inner.height as usize);
    let offset = app.browser.offset;
    let mut lines: Vec<Line> = Vec::new();
    for (i, entry) in app
        .browser
        .entries()
        .iter()
        .enumerate()
        .skip(offset)
        .take(inner.height as usize)
    {
        let style = if entry.is_dir {
            theme.dir_entry
        } else {
            theme.file_entry
        };
        let label = if entry.is_dir && entry.name != ".." {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        let mut line = Line::from(Span::styled(format!(" {label}"), style));
        if i == app.browser.cursor {
            line = line.style(
                Style::default()
                    .bg(theme.selection_bg)
                    .add_modifier(Modifier::BOLD),
            );
        }
        lines.push(line);
    }
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_log(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = app.theme.clone();
    let title = format!(
        " Selection Log ({}/{}) ",
        app.store.len(),
        app.settings.max_items
    );
    let dragging_in = app
        .drag
        .as_ref()
        .is_some_and(|d| d.from == FocusArea::Browser && d.payload.accepts());
    let block = pane_block(app, title, app.focus == FocusArea::Log, dragging_in);
    let inner = block.inner(area);
    f.render_widget(block, area);
    app.layout.log = inner;

    // Row model: recency zone, then the clear row, then the pinned zone.
    let recency = app.store.recency_len();
    let mut rows: Vec<LogRow> = Vec::with_capacity(app.store.len() + 1);
    for (i, entry) in app.store.entries().iter().enumerate() {
        if i == recency {
            rows.push(LogRow::Clear);
        }
        rows.push(LogRow::Entry(entry.key.clone()));
    }
    if rows.len() == app.store.len() {
        rows.push(LogRow::Clear);
    }

    let height = inner.height as usize;
    app.log_offset = app.log_offset.min(rows.len().saturating_sub(height));
    let visible: Vec<LogRow> = rows
        .iter()
        .skip(app.log_offset)
        .take(height)
        .cloned()
        .collect();

    let mut lines: Vec<Line> = Vec::new();
    for row in &visible {
        match row {
            LogRow::Clear => {
                let bar = "─".repeat(6);
                lines.push(Line::from(vec![
                    Span::styled(format!("{bar}[ "), theme.separator),
                    Span::styled("Clear", theme.separator.add_modifier(Modifier::BOLD)),
                    Span::styled(format!(" ]{bar}"), theme.separator),
                ]));
            }
            LogRow::Entry(key) => {
                let Some(item) = app.store.get(key) else {
                    lines.push(Line::default());
                    continue;
                };
                let pin = if item.locked { "⚑ " } else { "  " };
                let mut spans = vec![
                    Span::styled(pin, theme.pin_glyph),
                    Span::raw(item.name.clone()),
                ];
                if item.transient {
                    spans.push(Span::styled("*", theme.transient_marker));
                }
                spans.push(Span::styled(
                    format!("  {}", relative_time(item.touched_at)),
                    theme.touched_at,
                ));

                let mut line = Line::from(spans);
                let index = app.store.entries().iter().position(|e| &e.key == key);
                if app.store.active() == Some(key) {
                    line = line.style(Style::default().fg(theme.selection_fg));
                }
                if app.focus == FocusArea::Log && index == app.log_cursor {
                    line = line.style(
                        Style::default()
                            .bg(theme.selection_bg)
                            .add_modifier(Modifier::BOLD),
                    );
                }
                lines.push(line);
            }
        }
    }
    f.render_widget(Paragraph::new(lines), inner);
    app.layout.log_rows = visible;
}

fn draw_menu(f: &mut Frame, theme: &Theme, menu: &ContextMenu) -> Rect {
    let width = menu
        .entries
        .iter()
        .map(|e| match e {
            MenuEntry::Action { label, .. } => label.chars().count() as u16 + 4,
            MenuEntry::Separator => 4,
        })
        .max()
        .unwrap_or(20);
    let height = menu.entries.len() as u16 + 2;
    let screen = f.area();
    let x = menu.anchor.0.min(screen.width.saturating_sub(width));
    let y = menu.anchor.1.min(screen.height.saturating_sub(height));
    let rect = Rect::new(x, y, width.min(screen.width), height.min(screen.height));

    let mut lines: Vec<Line> = Vec::new();
    for (i, entry) in menu.entries.iter().enumerate() {
        match entry {
            MenuEntry::Separator => lines.push(Line::from(Span::styled(
                "─".repeat(width.saturating_sub(2) as usize),
                theme.separator,
            ))),
            MenuEntry::Action { label, enabled, .. } => {
                let marker = if i == menu.cursor { "› " } else { "  " };
                let style = if !enabled {
                    theme.menu_entry_disabled
                } else if i == menu.cursor {
                    theme.menu_cursor
                } else {
                    theme.menu_entry
                };
                lines.push(Line::from(Span::styled(format!("{marker}{label}"), style)));
            }
        }
    }

    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.menu_border);
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    f.render_widget(Paragraph::new(lines), inner);
    rect
}

fn draw_checkout_popup(f: &mut Frame, theme: &Theme, popup: &CheckoutPopup) -> Rect {
    let rect = centered_rect(70, 70, f.area());
    f.render_widget(Clear, rect);

    let title = match popup.req.mode {
        CheckoutMode::MainBranch => format!(
            " Checkout from '{}' ",
            popup.req.revision.as_deref().unwrap_or("origin/main")
        ),
        CheckoutMode::Sha => " Checkout from a specific commit (SHA) ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.popup_border)
        .title(Span::styled(title, theme.popup_title));
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let mut header: Vec<Line> = vec![
        Line::from(Span::styled(
            "This will overwrite the local files below. It cannot be undone.",
            theme.popup_warning,
        )),
        Line::default(),
    ];
    for path in &popup.req.paths {
        header.push(Line::from(format!("    {path}")));
    }
    header.push(Line::default());
    if popup.req.mode == CheckoutMode::Sha {
        header.push(Line::from(format!("  SHA: {}▏", popup.sha_input)));
    }
    let shown_rev = popup.revision().unwrap_or_else(|| "<sha>".to_string());
    header.push(Line::from(Span::styled(
        format!("  > git {}", popup.req.display_command(&shown_rev)),
        theme.popup_output,
    )));
    header.push(Line::default());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header.len() as u16),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    f.render_widget(Paragraph::new(header), chunks[0]);

    let body: Paragraph = if popup.running {
        Paragraph::new(Line::from(Span::styled(
            "  running…",
            theme.popup_warning,
        )))
    } else if let Some(error) = &popup.error {
        Paragraph::new(error.as_str())
            .style(theme.popup_error)
            .wrap(Wrap { trim: false })
            .scroll((popup.scroll, 0))
    } else if let Some(output) = &popup.output {
        Paragraph::new(output.as_str())
            .style(theme.popup_output)
            .wrap(Wrap { trim: false })
            .scroll((popup.scroll, 0))
    } else {
        Paragraph::new("")
    };
    f.render_widget(body, chunks[1]);

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            " [Enter] run   [Esc] close   [↑/↓] scroll output",
            theme.footer,
        ))),
        chunks[2],
    );
    rect
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let help = match app.focus {
        FocusArea::Browser => {
            "  j/k move · Enter open dir · o edit · Tab log pane · drag a file right to pin · q quit"
        }
        FocusArea::Log => {
            "  j/k move · Enter select · Space pin · o edit · m menu · c clear · Tab files · q quit"
        }
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.blurred_border));
    f.render_widget(Paragraph::new(help).style(app.theme.footer).block(block), area);
}
