//! Visual state of each card, derived from engine state.

use serde::Serialize;
use utoipa::ToSchema;

use super::gesture::GestureConfig;

/// Cards further than this from the active one ignore pointer input.
pub const INTERACTIVE_RADIUS: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardLayout {
    pub index: usize,
    /// Signed distance from the active card
    pub offset: i64,
    /// Horizontal translation in pixels
    pub translate_x: f64,
    pub opacity: f64,
    pub scale: f64,
    pub z_index: i32,
    pub interactive: bool,
    pub is_active: bool,
}

pub fn card_layout(
    index: usize,
    current_index: usize,
    drag_offset: f64,
    config: &GestureConfig,
) -> CardLayout {
    let offset = index as i64 - current_index as i64;
    let distance = offset.unsigned_abs();

    let (opacity, scale) = match distance {
        0 => (1.0, 1.0),
        1 => (0.6, 0.85),
        2 => (0.3, 0.7),
        _ => (0.0, 0.6),
    };

    CardLayout {
        index,
        offset,
        translate_x: offset as f64 * config.card_width + drag_offset,
        opacity,
        scale,
        z_index: 10_i32.saturating_sub(distance.min(10) as i32),
        interactive: distance <= INTERACTIVE_RADIUS,
        is_active: distance == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::{CarouselEngine, PointerTarget};

    #[test]
    fn test_active_card_is_centered_and_on_top() {
        let layout = card_layout(2, 2, 0.0, &GestureConfig::default());
        assert_eq!(layout.offset, 0);
        assert_eq!(layout.translate_x, 0.0);
        assert_eq!(layout.opacity, 1.0);
        assert_eq!(layout.scale, 1.0);
        assert_eq!(layout.z_index, 10);
        assert!(layout.is_active);
    }

    #[test]
    fn test_falloff_is_monotonic() {
        let config = GestureConfig::default();
        let layouts: Vec<_> = (0..6).map(|i| card_layout(i, 0, 0.0, &config)).collect();
        for pair in layouts.windows(2) {
            assert!(pair[0].opacity >= pair[1].opacity);
            assert!(pair[0].scale >= pair[1].scale);
            assert!(pair[0].z_index >= pair[1].z_index);
        }
        assert!(layouts[2].interactive);
        assert!(!layouts[3].interactive);
        assert_eq!(layouts[1].translate_x, 500.0);
    }

    #[test]
    fn test_drag_offset_shifts_every_card() {
        let mut engine = CarouselEngine::new(3);
        let now = std::time::Instant::now();
        engine.begin_drag(100.0, PointerTarget::Track, now);
        engine.update_drag(70.0);
        let layouts = engine.layouts();
        assert_eq!(layouts[0].translate_x, -530.0);
        assert_eq!(layouts[1].translate_x, -30.0);
        assert_eq!(layouts[2].translate_x, 470.0);

        engine.end_drag(now);
        assert_eq!(engine.layouts()[1].translate_x, 0.0);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(card_layout(0, 1, 0.0, &GestureConfig::default())).unwrap();
        assert_eq!(value["translateX"], -500.0);
        assert_eq!(value["zIndex"], 9);
        assert_eq!(value["isActive"], false);
        assert_eq!(value["interactive"], true);
    }
}
