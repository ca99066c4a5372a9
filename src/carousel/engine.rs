//! Circular carousel navigation with drag preview.
//!
//! The engine is a two-state machine (idle, dragging) over a list of `len`
//! cards. It performs no I/O; callers feed it pointer events and timestamps
//! and read back the index and drag offset to render.

use std::time::Instant;

use super::gesture::{classify_gesture, Direction, Gesture, GestureConfig};
use super::layout::{card_layout, CardLayout, INTERACTIVE_RADIUS};

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// A card, by list position
    Card(usize),
    /// Empty track space between or around cards
    Track,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    start_x: f64,
    start_index: usize,
    offset: f64,
    /// Set once the pointer leaves the click threshold; never cleared
    moved: bool,
    started_at: Instant,
}

/// Index used when a list of `len` cards is first shown.
///
/// With two or more cards the second one is active so a preceding card is
/// visible as context.
pub fn initial_index(len: usize) -> Option<usize> {
    match len {
        0 => None,
        1 => Some(0),
        _ => Some(1),
    }
}

#[derive(Debug, Clone)]
pub struct CarouselEngine {
    len: usize,
    current_index: usize,
    drag: Option<DragState>,
    last_commit: Option<Instant>,
    config: GestureConfig,
}

impl CarouselEngine {
    pub fn new(len: usize) -> Self {
        Self::with_config(len, GestureConfig::default())
    }

    pub fn with_config(len: usize, config: GestureConfig) -> Self {
        Self {
            len,
            current_index: initial_index(len).unwrap_or(0),
            drag: None,
            last_commit: None,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Active card, or `None` for an empty carousel.
    pub fn current_index(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.current_index)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Current drag displacement; 0 when idle.
    pub fn drag_offset(&self) -> f64 {
        self.drag.map_or(0.0, |drag| drag.offset)
    }

    pub fn start_drag_index(&self) -> Option<usize> {
        self.drag.map(|drag| drag.start_index)
    }

    /// Replace the underlying list, re-applying the initial index policy.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.current_index = initial_index(len).unwrap_or(0);
        self.drag = None;
        self.last_commit = None;
    }

    pub fn go_to_next(&mut self) {
        self.step(Direction::Forward);
    }

    pub fn go_to_previous(&mut self) {
        self.step(Direction::Backward);
    }

    /// Cards more than [`INTERACTIVE_RADIUS`] away from the active one are inert.
    fn is_interactive(&self, index: usize) -> bool {
        index < self.len && index.abs_diff(self.current_index) as u64 <= INTERACTIVE_RADIUS
    }

    fn step(&mut self, direction: Direction) {
        if self.is_empty() {
            return;
        }
        self.current_index = direction.step(self.current_index, self.len);
    }

    /// Jump to `index`. Returns whether the active card changed.
    ///
    /// Targeting the active card does nothing, so interacting with its
    /// content never re-navigates. Out-of-range indices are ignored.
    pub fn go_to_index(&mut self, index: usize) -> bool {
        if index >= self.len || index == self.current_index {
            return false;
        }
        self.current_index = index;
        true
    }

    /// Handle a click on the card at `index`.
    ///
    /// Clicks arriving within the cooldown after a committed drag are the
    /// tail of that drag and are dropped, as are clicks on inert cards.
    pub fn click(&mut self, index: usize, now: Instant) -> bool {
        if !self.is_interactive(index) {
            return false;
        }
        if self.in_cooldown(now) {
            tracing::trace!(index, "Click suppressed after drag");
            return false;
        }
        self.go_to_index(index)
    }

    fn in_cooldown(&self, now: Instant) -> bool {
        self.last_commit
            .is_some_and(|at| now.saturating_duration_since(at) < self.config.click_cooldown())
    }

    /// Start a gesture at `pointer_x`. Returns whether a drag began.
    pub fn begin_drag(&mut self, pointer_x: f64, target: PointerTarget, now: Instant) -> bool {
        if self.is_empty() {
            return false;
        }
        if let PointerTarget::Card(index) = target {
            if index == self.current_index || !self.is_interactive(index) {
                return false;
            }
        }
        self.drag = Some(DragState {
            start_x: pointer_x,
            start_index: self.current_index,
            offset: 0.0,
            moved: false,
            started_at: now,
        });
        true
    }

    pub fn update_drag(&mut self, pointer_x: f64) {
        if let Some(drag) = self.drag.as_mut() {
            drag.offset = pointer_x - drag.start_x;
            drag.moved |= drag.offset.abs() > self.config.click_threshold;
        }
    }

    /// Finish the gesture in progress. Returns `None` when no drag was active.
    ///
    /// A [`Gesture::Click`] result leaves the index alone; the caller should
    /// route the release to [`CarouselEngine::click`]. A gesture that once
    /// moved past the click threshold never resolves to a click.
    pub fn end_drag(&mut self, now: Instant) -> Option<Gesture> {
        let drag = self.drag.take()?;
        let elapsed = now.saturating_duration_since(drag.started_at);
        let gesture = match classify_gesture(drag.offset, elapsed, &self.config) {
            Gesture::Click if drag.moved => Gesture::Cancel,
            gesture => gesture,
        };

        self.current_index = match gesture {
            Gesture::Commit { direction } => {
                self.last_commit = Some(now);
                direction.step(drag.start_index, self.len)
            }
            Gesture::Click | Gesture::Cancel => drag.start_index,
        };

        Some(gesture)
    }

    /// Account for the card at `index` having been removed from the list.
    pub fn remove(&mut self, index: usize) {
        if index >= self.len {
            return;
        }
        self.len -= 1;
        self.drag = None;
        if self.len == 0 {
            self.current_index = 0;
        } else if self.current_index >= self.len {
            self.current_index = self.len - 1;
        }
    }

    /// Layout of every card for the current state.
    pub fn layouts(&self) -> Vec<CardLayout> {
        (0..self.len)
            .map(|index| {
                card_layout(
                    index,
                    self.current_index,
                    self.drag_offset(),
                    &self.config,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn drag(engine: &mut CarouselEngine, delta: f64) -> Option<Gesture> {
        let start = Instant::now();
        engine.begin_drag(400.0, PointerTarget::Track, start);
        engine.update_drag(400.0 + delta);
        engine.end_drag(start + Duration::from_millis(200))
    }

    #[test]
    fn test_initial_index() {
        assert_eq!(CarouselEngine::new(0).current_index(), None);
        assert_eq!(CarouselEngine::new(1).current_index(), Some(0));
        assert_eq!(CarouselEngine::new(2).current_index(), Some(1));
        assert_eq!(CarouselEngine::new(7).current_index(), Some(1));
    }

    #[test]
    fn test_next_and_previous_wrap() {
        // [A, B, C, D] starting on B
        let mut engine = CarouselEngine::new(4);
        engine.go_to_next();
        assert_eq!(engine.current_index(), Some(2));
        engine.go_to_next();
        engine.go_to_next();
        assert_eq!(engine.current_index(), Some(0));
        engine.go_to_previous();
        assert_eq!(engine.current_index(), Some(3));
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        for len in 1..9 {
            let mut engine = CarouselEngine::new(len);
            let start = engine.current_index();
            for _ in 0..len {
                engine.go_to_next();
                assert!(engine.current_index().unwrap() < len);
            }
            assert_eq!(engine.current_index(), start);
            for _ in 0..len {
                engine.go_to_previous();
                assert!(engine.current_index().unwrap() < len);
            }
            assert_eq!(engine.current_index(), start);
        }
    }

    #[test]
    fn test_empty_carousel_ignores_navigation() {
        let mut engine = CarouselEngine::new(0);
        engine.go_to_next();
        engine.go_to_previous();
        assert!(!engine.go_to_index(0));
        assert!(!engine.begin_drag(10.0, PointerTarget::Track, Instant::now()));
        assert_eq!(engine.current_index(), None);
        assert!(engine.layouts().is_empty());
    }

    #[test]
    fn test_go_to_index() {
        let mut engine = CarouselEngine::new(4);
        assert!(!engine.go_to_index(1));
        assert!(engine.go_to_index(3));
        assert_eq!(engine.current_index(), Some(3));
        assert!(!engine.go_to_index(4));
        assert_eq!(engine.current_index(), Some(3));
    }

    #[test]
    fn test_drag_past_threshold_commits_forward() {
        let mut engine = CarouselEngine::new(4);
        let gesture = drag(&mut engine, -150.0);
        assert_eq!(gesture, Some(Gesture::Commit { direction: Direction::Forward }));
        assert_eq!(engine.current_index(), Some(2));
        assert!(!engine.is_dragging());
        assert_eq!(engine.drag_offset(), 0.0);
    }

    #[test]
    fn test_drag_right_commits_backward_with_wrap() {
        let mut engine = CarouselEngine::new(4);
        engine.go_to_index(0);
        drag(&mut engine, 220.0);
        assert_eq!(engine.current_index(), Some(3));
    }

    #[test]
    fn test_short_drag_reverts() {
        let mut engine = CarouselEngine::new(4);
        assert_eq!(drag(&mut engine, -50.0), Some(Gesture::Cancel));
        assert_eq!(engine.current_index(), Some(1));
    }

    #[test]
    fn test_tiny_drag_is_click() {
        let mut engine = CarouselEngine::new(4);
        assert_eq!(drag(&mut engine, 4.0), Some(Gesture::Click));
        assert_eq!(engine.current_index(), Some(1));
    }

    #[test]
    fn test_drag_state_during_gesture() {
        let mut engine = CarouselEngine::new(4);
        let now = Instant::now();
        assert!(engine.begin_drag(300.0, PointerTarget::Card(2), now));
        assert!(engine.is_dragging());
        assert_eq!(engine.start_drag_index(), Some(1));
        engine.update_drag(260.0);
        assert_eq!(engine.drag_offset(), -40.0);
        engine.update_drag(330.0);
        assert_eq!(engine.drag_offset(), 30.0);
    }

    #[test]
    fn test_drag_on_active_card_is_ignored() {
        let mut engine = CarouselEngine::new(4);
        assert!(!engine.begin_drag(300.0, PointerTarget::Card(1), Instant::now()));
        assert!(!engine.is_dragging());
        engine.update_drag(0.0);
        assert_eq!(engine.end_drag(Instant::now()), None);
        assert_eq!(engine.current_index(), Some(1));
    }

    #[test]
    fn test_single_card_drag_resolves_to_same_index() {
        let mut engine = CarouselEngine::new(1);
        engine.go_to_next();
        assert_eq!(engine.current_index(), Some(0));
        let gesture = drag(&mut engine, -300.0);
        assert!(matches!(gesture, Some(Gesture::Commit { .. })));
        assert_eq!(engine.current_index(), Some(0));
    }

    #[test]
    fn test_click_suppressed_during_cooldown() {
        let mut engine = CarouselEngine::new(5);
        let start = Instant::now();
        engine.begin_drag(400.0, PointerTarget::Track, start);
        engine.update_drag(200.0);
        let released = start + Duration::from_millis(300);
        engine.end_drag(released);
        assert_eq!(engine.current_index(), Some(2));

        assert!(!engine.click(4, released + Duration::from_millis(50)));
        assert_eq!(engine.current_index(), Some(2));

        assert!(engine.click(4, released + Duration::from_millis(150)));
        assert_eq!(engine.current_index(), Some(4));
    }

    #[test]
    fn test_cancelled_drag_does_not_start_cooldown() {
        let mut engine = CarouselEngine::new(5);
        drag(&mut engine, -30.0);
        assert!(engine.click(3, Instant::now()));
    }

    #[test]
    fn test_drag_returning_to_start_is_not_a_click() {
        let mut engine = CarouselEngine::new(4);
        let start = Instant::now();
        assert!(engine.begin_drag(400.0, PointerTarget::Track, start));
        engine.update_drag(350.0);
        engine.update_drag(398.0);
        assert_eq!(engine.drag_offset(), -2.0);
        assert_eq!(
            engine.end_drag(start + Duration::from_millis(200)),
            Some(Gesture::Cancel)
        );
        assert_eq!(engine.current_index(), Some(1));
    }

    #[test]
    fn test_far_cards_ignore_input() {
        let mut engine = CarouselEngine::new(10);
        let now = Instant::now();
        assert!(!engine.layouts()[8].interactive);

        assert!(!engine.click(8, now));
        assert_eq!(engine.current_index(), Some(1));
        assert!(!engine.begin_drag(300.0, PointerTarget::Card(8), now));
        assert!(!engine.is_dragging());

        // two away is still reachable
        assert!(engine.begin_drag(300.0, PointerTarget::Card(3), now));
        engine.end_drag(now);
        assert!(engine.click(3, now));
        assert_eq!(engine.current_index(), Some(3));
    }

    #[test]
    fn test_remove_last_active_clamps() {
        let mut engine = CarouselEngine::new(4);
        engine.go_to_index(3);
        engine.remove(3);
        assert_eq!(engine.len(), 3);
        assert_eq!(engine.current_index(), Some(2));
    }

    #[test]
    fn test_remove_non_final_keeps_index() {
        let mut engine = CarouselEngine::new(4);
        engine.remove(1);
        assert_eq!(engine.current_index(), Some(1));
    }

    #[test]
    fn test_remove_sole_card_empties() {
        let mut engine = CarouselEngine::new(1);
        engine.remove(0);
        assert!(engine.is_empty());
        assert_eq!(engine.current_index(), None);
        engine.set_len(3);
        assert_eq!(engine.current_index(), Some(1));
    }
}
