//! Gesture classification for carousel drag/swipe input.
//!
//! A release is classified purely from the horizontal displacement of the
//! pointer, so the same rules apply to mouse and touch input.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Tunables for gesture classification and card layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GestureConfig {
    /// Layout width of one card in pixels
    pub card_width: f64,
    /// Fraction of `card_width` a drag must exceed to change the active card
    pub commit_ratio: f64,
    /// Displacement (px) at or below which a release counts as a click
    pub click_threshold: f64,
    /// Window after a committed drag during which clicks are ignored
    pub click_cooldown_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            card_width: 500.0,
            commit_ratio: 0.2,
            click_threshold: 5.0,
            click_cooldown_ms: 100,
        }
    }
}

impl GestureConfig {
    /// Drag distance beyond which a release commits a move.
    pub fn commit_threshold(&self) -> f64 {
        self.card_width * self.commit_ratio
    }

    pub fn click_cooldown(&self) -> Duration {
        Duration::from_millis(self.click_cooldown_ms)
    }
}

/// Direction of a one-step move through the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Dragging left (negative delta) pulls the next card in.
    pub fn from_drag(delta_x: f64) -> Self {
        if delta_x < 0.0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Move `index` one step in this direction over `len` items, wrapping.
    ///
    /// `len` must be non-zero.
    pub fn step(self, index: usize, len: usize) -> usize {
        debug_assert!(len > 0);
        match self {
            Direction::Forward => (index + 1) % len,
            Direction::Backward => (index + len - 1) % len,
        }
    }
}

/// Outcome of a finished pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gesture {
    /// Pointer barely moved; the release is a click on whatever is under it.
    Click,
    /// A real drag that fell short of the commit threshold.
    Cancel,
    /// A drag long enough to move the active card one step.
    Commit { direction: Direction },
}

/// Classify a released gesture from its total horizontal displacement.
pub fn classify_gesture(delta_x: f64, delta_time: Duration, config: &GestureConfig) -> Gesture {
    let distance = delta_x.abs();

    let gesture = if distance <= config.click_threshold {
        Gesture::Click
    } else if distance > config.commit_threshold() {
        Gesture::Commit {
            direction: Direction::from_drag(delta_x),
        }
    } else {
        Gesture::Cancel
    };

    tracing::trace!(
        delta_x,
        elapsed_ms = delta_time.as_millis() as u64,
        ?gesture,
        "Classified gesture"
    );

    gesture
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(delta_x: f64) -> Gesture {
        classify_gesture(delta_x, Duration::from_millis(120), &GestureConfig::default())
    }

    #[test]
    fn test_small_movement_is_click() {
        assert_eq!(classify(0.0), Gesture::Click);
        assert_eq!(classify(5.0), Gesture::Click);
        assert_eq!(classify(-5.0), Gesture::Click);
    }

    #[test]
    fn test_short_drag_is_cancelled() {
        assert_eq!(classify(5.5), Gesture::Cancel);
        assert_eq!(classify(-50.0), Gesture::Cancel);
        // Exactly at the threshold does not commit
        assert_eq!(classify(100.0), Gesture::Cancel);
    }

    #[test]
    fn test_long_drag_commits_opposite_to_drag() {
        assert_eq!(
            classify(-150.0),
            Gesture::Commit { direction: Direction::Forward }
        );
        assert_eq!(
            classify(100.5),
            Gesture::Commit { direction: Direction::Backward }
        );
    }

    #[test]
    fn test_threshold_follows_card_width() {
        let config = GestureConfig {
            card_width: 600.0,
            ..GestureConfig::default()
        };
        assert_eq!(config.commit_threshold(), 120.0);
        assert_eq!(
            classify_gesture(-110.0, Duration::ZERO, &config),
            Gesture::Cancel
        );
    }

    #[test]
    fn test_direction_step_wraps() {
        assert_eq!(Direction::Forward.step(3, 4), 0);
        assert_eq!(Direction::Backward.step(0, 4), 3);
        assert_eq!(Direction::Forward.step(0, 1), 0);
        assert_eq!(Direction::Backward.step(0, 1), 0);
    }
}
