use ratatui::style::{Color, Modifier, Style};

/// All styling in one place, owned by the app and handed to the renderer.
/// Rebuilt together with the terminal surface, never a process-wide static.
#[derive(Clone)]
pub struct Theme {
    pub focus_border: Color,
    pub blurred_border: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,

    pub pin_glyph: Style,
    pub transient_marker: Style,
    pub touched_at: Style,
    pub dir_entry: Style,
    pub file_entry: Style,
    pub separator: Style,
    pub drop_hint: Style,

    pub menu_border: Style,
    pub menu_entry: Style,
    pub menu_entry_disabled: Style,
    pub menu_cursor: Style,

    pub popup_title: Style,
    pub popup_border: Style,
    pub popup_warning: Style,
    pub popup_error: Style,
    pub popup_output: Style,
    pub footer: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focus_border: Color::Cyan,
            blurred_border: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::Yellow,

            pin_glyph: Style::default().fg(Color::Yellow),
            transient_marker: Style::default().fg(Color::Magenta),
            touched_at: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            dir_entry: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            file_entry: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),
            drop_hint: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),

            menu_border: Style::default().fg(Color::Magenta),
            menu_entry: Style::default().fg(Color::White),
            menu_entry_disabled: Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            menu_cursor: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),

            popup_title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            popup_border: Style::default().fg(Color::Magenta).bg(Color::Black),
            popup_warning: Style::default().fg(Color::Yellow),
            popup_error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            popup_output: Style::default().fg(Color::White),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_and_blur_are_distinguishable() {
        let t = Theme::default();
        assert_ne!(t.focus_border, t.blurred_border);
        assert_ne!(t.menu_entry, t.menu_entry_disabled);
    }
}
