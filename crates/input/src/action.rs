use donutfield_common::MaterialSlot;
use glam::Vec2;

use crate::pointer::PointerSample;

/// A high-level action produced by the host from raw window events.
///
/// The application context consumes actions, never raw window events, so the
/// desktop host and the headless CLI drive the same logic.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Window surface changed size (logical pixels) or scale factor.
    Resize {
        width: f32,
        height: f32,
        pixel_ratio: f64,
    },
    /// A pointer moved to client coordinates (logical pixels).
    PointerMoved(PointerSample),
    /// Click anywhere: pick new matcaps for both materials.
    RandomizeAppearance,
    /// Orbit drag delta in logical pixels.
    Orbit(Vec2),
    /// Pan drag delta in logical pixels.
    Pan(Vec2),
    /// Wheel zoom; positive zooms in.
    Zoom(f32),
    /// Debug panel: axes helper visibility.
    SetAxesVisible(bool),
    /// Debug panel: material opacity.
    SetOpacity { slot: MaterialSlot, opacity: f32 },
    /// Stop the frame loop.
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_resize_is_constructible() {
        let a = Action::Resize {
            width: 800.0,
            height: 600.0,
            pixel_ratio: 1.0,
        };
        assert!(matches!(a, Action::Resize { .. }));
    }

    #[test]
    fn action_opacity_carries_slot() {
        let a = Action::SetOpacity {
            slot: MaterialSlot::Donut,
            opacity: 0.5,
        };
        match a {
            Action::SetOpacity { slot, opacity } => {
                assert_eq!(slot, MaterialSlot::Donut);
                assert_eq!(opacity, 0.5);
            }
            _ => panic!("wrong variant"),
        }
    }
}
