use chrono::{DateTime, Local};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Centers a rectangle within another rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r)[1];
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical)[1]
}

pub fn rect_contains(r: Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height
}

/// Compact "how long ago" label for a log row.
pub fn relative_time(t: DateTime<Local>) -> String {
    let secs = (Local::now() - t).num_seconds().max(0);
    match secs {
        0..=59 => "now".to_string(),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn relative_time_buckets() {
        let now = Local::now();
        assert_eq!(relative_time(now), "now");
        assert_eq!(relative_time(now - Duration::minutes(5)), "5m");
        assert_eq!(relative_time(now - Duration::hours(2)), "2h");
        assert_eq!(relative_time(now - Duration::days(3)), "3d");
        // clock skew never panics
        assert_eq!(relative_time(now + Duration::minutes(5)), "now");
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(2, 2, 4, 2);
        assert!(rect_contains(r, 2, 2));
        assert!(rect_contains(r, 5, 3));
        assert!(!rect_contains(r, 6, 3));
        assert!(!rect_contains(r, 2, 4));
    }
}
