use std::time::{Duration, Instant};

use crate::models::ItemKey;

/// Squared displacement (in cells) past which a held button becomes a drag.
const DRAG_THRESHOLD_SQ: i32 = 16;

/// Window for counting consecutive downs on the same row as a multi-click.
const MULTI_CLICK_WINDOW: Duration = Duration::from_millis(300);

/// Resolved pointer interaction for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    Select(ItemKey),
    Activate(ItemKey),
    DragStart(ItemKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    /// Button is down on a row, select-on-up is armed.
    Armed {
        key: ItemKey,
        down: (u16, u16),
        click_count: u8,
    },
    /// Threshold crossed, drag emitted; nothing more fires until the button
    /// is released.
    Dragging,
}

/// Disambiguates a pointer-down / move / up sequence on a single row into
/// exactly one of select, activate (double click) or drag-start.
///
/// Drag strictly preempts select: once the displacement threshold is
/// crossed, the release can no longer select. Terminals do not report a
/// platform click count, so the count is reconstructed at down-time from a
/// short same-row window.
pub struct PointerGestureTracker {
    state: State,
    last_down: Option<(ItemKey, Instant, u8)>,
}

impl PointerGestureTracker {
    pub fn new() -> Self {
        PointerGestureTracker {
            state: State::Idle,
            last_down: None,
        }
    }

    /// Button pressed on a row: arm select-on-up and record the click count.
    pub fn on_down(&mut self, key: &ItemKey, pos: (u16, u16), now: Instant) {
        let click_count = match &self.last_down {
            Some((k, t, n)) if k == key && now.duration_since(*t) <= MULTI_CLICK_WINDOW => {
                n.saturating_add(1)
            }
            _ => 1,
        };
        self.last_down = Some((key.clone(), now, click_count));
        self.state = State::Armed {
            key: key.clone(),
            down: pos,
            click_count,
        };
    }

    /// Pointer moved with the button held. Crossing the threshold while
    /// armed emits `DragStart` and permanently disarms select for this
    /// gesture.
    pub fn on_move(&mut self, pos: (u16, u16)) -> Option<Gesture> {
        let State::Armed { key, down, .. } = &self.state else {
            return None;
        };
        let dx = i32::from(pos.0) - i32::from(down.0);
        let dy = i32::from(pos.1) - i32::from(down.1);
        if dx * dx + dy * dy > DRAG_THRESHOLD_SQ {
            let key = key.clone();
            self.state = State::Dragging;
            return Some(Gesture::DragStart(key));
        }
        None
    }

    /// Button released. Resolves to select (or activate on a double click)
    /// only while still armed and over the same row; anything else is
    /// silently ignored. The gesture always ends here.
    pub fn on_up(&mut self, hit: Option<&ItemKey>) -> Option<Gesture> {
        let state = std::mem::replace(&mut self.state, State::Idle);
        let State::Armed {
            key, click_count, ..
        } = state
        else {
            return None;
        };
        if hit != Some(&key) {
            return None;
        }
        if click_count == 2 {
            Some(Gesture::Activate(key))
        } else {
            Some(Gesture::Select(key))
        }
    }

    /// Abort the current gesture (row disappeared, focus lost).
    pub fn cancel(&mut self) {
        self.state = State::Idle;
    }

    pub fn is_dragging(&self) -> bool {
        self.state == State::Dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_50: Duration = Duration::from_millis(50);
    const MS_400: Duration = Duration::from_millis(400);

    fn key(s: &str) -> ItemKey {
        ItemKey::new(s)
    }

    #[test]
    fn small_move_then_up_selects() {
        let mut tr = PointerGestureTracker::new();
        let t = Instant::now();
        let a = key("a");
        tr.on_down(&a, (10, 5), t);
        // 3 cells of travel: squared displacement 9, below threshold
        assert_eq!(tr.on_move((13, 5)), None);
        assert_eq!(tr.on_up(Some(&a)), Some(Gesture::Select(a)));
    }

    #[test]
    fn threshold_crossing_emits_drag_and_mutes_up() {
        let mut tr = PointerGestureTracker::new();
        let t = Instant::now();
        let a = key("a");
        tr.on_down(&a, (10, 5), t);
        // 10 cells: squared displacement 100 > 16
        assert_eq!(tr.on_move((20, 5)), Some(Gesture::DragStart(a.clone())));
        assert!(tr.is_dragging());
        // drag preempts select for the rest of the gesture
        assert_eq!(tr.on_up(Some(&a)), None);
        assert!(!tr.is_dragging());
    }

    #[test]
    fn drag_fires_once_per_gesture() {
        let mut tr = PointerGestureTracker::new();
        let a = key("a");
        tr.on_down(&a, (0, 0), Instant::now());
        assert!(tr.on_move((5, 5)).is_some());
        assert_eq!(tr.on_move((9, 9)), None);
    }

    #[test]
    fn diagonal_just_over_threshold() {
        let mut tr = PointerGestureTracker::new();
        let a = key("a");
        tr.on_down(&a, (10, 10), Instant::now());
        // 4 cells in one axis is exactly 16, still a click
        assert_eq!(tr.on_move((14, 10)), None);
        // one more cell in the other axis tips it over
        assert!(tr.on_move((14, 11)).is_some());
    }

    #[test]
    fn double_click_activates() {
        let mut tr = PointerGestureTracker::new();
        let t = Instant::now();
        let a = key("a");
        tr.on_down(&a, (3, 3), t);
        assert_eq!(tr.on_up(Some(&a)), Some(Gesture::Select(a.clone())));
        tr.on_down(&a, (3, 3), t + MS_50);
        assert_eq!(tr.on_up(Some(&a)), Some(Gesture::Activate(a)));
    }

    #[test]
    fn slow_second_click_is_a_plain_select() {
        let mut tr = PointerGestureTracker::new();
        let t = Instant::now();
        let a = key("a");
        tr.on_down(&a, (3, 3), t);
        tr.on_up(Some(&a));
        tr.on_down(&a, (3, 3), t + MS_400);
        assert_eq!(tr.on_up(Some(&a)), Some(Gesture::Select(a)));
    }

    #[test]
    fn second_click_on_other_row_resets_count() {
        let mut tr = PointerGestureTracker::new();
        let t = Instant::now();
        let a = key("a");
        let b = key("b");
        tr.on_down(&a, (3, 3), t);
        tr.on_up(Some(&a));
        tr.on_down(&b, (3, 4), t + MS_50);
        assert_eq!(tr.on_up(Some(&b)), Some(Gesture::Select(b)));
    }

    #[test]
    fn up_outside_row_is_ignored() {
        let mut tr = PointerGestureTracker::new();
        let a = key("a");
        tr.on_down(&a, (3, 3), Instant::now());
        assert_eq!(tr.on_up(Some(&key("b"))), None);
        assert_eq!(tr.on_up(None), None);
    }

    #[test]
    fn up_without_down_is_ignored() {
        let mut tr = PointerGestureTracker::new();
        assert_eq!(tr.on_up(Some(&key("a"))), None);
    }

    #[test]
    fn move_without_down_is_ignored() {
        let mut tr = PointerGestureTracker::new();
        assert_eq!(tr.on_move((50, 50)), None);
    }

    #[test]
    fn cancel_disarms() {
        let mut tr = PointerGestureTracker::new();
        let a = key("a");
        tr.on_down(&a, (3, 3), Instant::now());
        tr.cancel();
        assert_eq!(tr.on_up(Some(&a)), None);
    }

    #[test]
    fn new_down_after_drag_starts_fresh() {
        let mut tr = PointerGestureTracker::new();
        let t = Instant::now();
        let a = key("a");
        tr.on_down(&a, (0, 0), t);
        tr.on_move((10, 0));
        tr.on_up(Some(&a));
        tr.on_down(&a, (0, 0), t + MS_400);
        assert_eq!(tr.on_up(Some(&a)), Some(Gesture::Select(a)));
    }
}
