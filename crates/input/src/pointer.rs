use donutfield_common::{PointerOffset, ViewportState};
use glam::Vec2;

/// Scale applied to the pixel distance from the viewport center.
pub const DEFAULT_SENSITIVITY: f32 = 0.02;

/// Identity of a pointer as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

/// One pointer-move observation in client (logical pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
    pub is_primary: bool,
}

/// Resolves which touch is primary: the first finger down owns the role until
/// it lifts or is cancelled. The mouse is always primary.
#[derive(Debug, Clone, Default)]
pub struct PrimaryPointer {
    touch: Option<u64>,
}

impl PrimaryPointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A touch started; it becomes primary if no other touch holds the role.
    pub fn touch_started(&mut self, id: u64) -> bool {
        match self.touch {
            Some(current) => current == id,
            None => {
                self.touch = Some(id);
                true
            }
        }
    }

    /// A touch ended or was cancelled.
    pub fn touch_ended(&mut self, id: u64) {
        if self.touch == Some(id) {
            self.touch = None;
        }
    }

    pub fn is_primary(&self, id: PointerId) -> bool {
        match id {
            PointerId::Mouse => true,
            PointerId::Touch(t) => self.touch == Some(t),
        }
    }

    pub fn sample(&self, id: PointerId, position: Vec2) -> PointerSample {
        PointerSample {
            position,
            is_primary: self.is_primary(id),
        }
    }
}

/// Converts pointer positions into a camera target offset.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    sensitivity: f32,
    offset: PointerOffset,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

impl PointerTracker {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            offset: PointerOffset::default(),
        }
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Current target offset consumed by the frame loop.
    pub fn offset(&self) -> PointerOffset {
        self.offset
    }

    /// Apply a move. Returns `false` and leaves the offset untouched for
    /// non-primary pointers.
    pub fn on_move(&mut self, sample: PointerSample, viewport: &ViewportState) -> bool {
        if !sample.is_primary {
            tracing::trace!("ignoring secondary pointer move");
            return false;
        }
        let d = (sample.position - viewport.center()) * self.sensitivity;
        self.offset = PointerOffset::new(d.x, d.y);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary(x: f32, y: f32) -> PointerSample {
        PointerSample {
            position: Vec2::new(x, y),
            is_primary: true,
        }
    }

    #[test]
    fn offset_from_center() {
        let viewport = ViewportState::new(1000.0, 800.0);
        let mut tracker = PointerTracker::default();
        assert!(tracker.on_move(primary(600.0, 300.0), &viewport));
        let o = tracker.offset();
        assert!((o.x - 2.0).abs() < 1e-6);
        assert!((o.y + 2.0).abs() < 1e-6);
    }

    #[test]
    fn secondary_pointer_ignored() {
        let viewport = ViewportState::new(1000.0, 800.0);
        let mut tracker = PointerTracker::default();
        tracker.on_move(primary(700.0, 100.0), &viewport);
        let before = tracker.offset();
        let moved = tracker.on_move(
            PointerSample {
                position: Vec2::new(0.0, 0.0),
                is_primary: false,
            },
            &viewport,
        );
        assert!(!moved);
        assert_eq!(tracker.offset(), before);
    }

    #[test]
    fn offset_is_unbounded() {
        let viewport = ViewportState::new(100.0, 100.0);
        let mut tracker = PointerTracker::default();
        tracker.on_move(primary(100_050.0, 50.0), &viewport);
        assert!((tracker.offset().x - 2000.0).abs() < 1e-2);
    }

    #[test]
    fn first_touch_is_primary() {
        let mut primary = PrimaryPointer::new();
        assert!(primary.touch_started(7));
        assert!(!primary.touch_started(8));
        assert!(primary.is_primary(PointerId::Touch(7)));
        assert!(!primary.is_primary(PointerId::Touch(8)));
        assert!(primary.is_primary(PointerId::Mouse));

        primary.touch_ended(8);
        assert!(primary.is_primary(PointerId::Touch(7)));
        primary.touch_ended(7);
        assert!(!primary.is_primary(PointerId::Touch(7)));
        assert!(primary.touch_started(8));
    }
}
