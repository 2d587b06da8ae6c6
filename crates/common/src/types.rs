use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Upper bound applied to the device pixel ratio before sizing the render target.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Clamp a host-reported pixel ratio to `MAX_PIXEL_RATIO`.
pub fn clamp_pixel_ratio(device_pixel_ratio: f64) -> f64 {
    device_pixel_ratio.min(MAX_PIXEL_RATIO)
}

/// Window dimensions in logical pixels plus their halves.
///
/// Always rebuilt as a whole through [`ViewportState::new`]; there is no way to
/// update one field without the others.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    width: f32,
    height: f32,
    half_width: f32,
    half_height: f32,
}

impl ViewportState {
    /// Build the state for a surface. Non-positive sizes (minimized windows) clamp to 1.
    pub fn new(width: f32, height: f32) -> Self {
        let width = if width > 0.0 { width } else { 1.0 };
        let height = if height > 0.0 { height } else { 1.0 };
        Self {
            width,
            height,
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Physical render-target size for the given pixel ratio (clamped, at least 1×1).
    pub fn render_size(&self, device_pixel_ratio: f64) -> (u32, u32) {
        let ratio = clamp_pixel_ratio(device_pixel_ratio);
        let w = (self.width as f64 * ratio).round().max(1.0) as u32;
        let h = (self.height as f64 * ratio).round().max(1.0) as u32;
        (w, h)
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Pointer displacement from the viewport center, already scaled by sensitivity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerOffset {
    pub x: f32,
    pub y: f32,
}

impl PointerOffset {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Camera-space target: screen y grows downward, so it is negated.
    pub fn camera_target(&self) -> Vec2 {
        Vec2::new(self.x, -self.y)
    }
}

/// Which matcap-textured material a texture or reload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialSlot {
    Text,
    Donut,
}

impl MaterialSlot {
    pub const ALL: [MaterialSlot; 2] = [MaterialSlot::Text, MaterialSlot::Donut];

    pub fn index(self) -> usize {
        match self {
            MaterialSlot::Text => 0,
            MaterialSlot::Donut => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MaterialSlot::Text => "text",
            MaterialSlot::Donut => "donut",
        }
    }
}

impl std::fmt::Display for MaterialSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Placement of one instanced copy: position, x/y Euler angles, uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstanceTransform {
    pub position: Vec3,
    /// Rotation around x then y, in radians.
    pub rotation: Vec2,
    pub scale: f32,
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl InstanceTransform {
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0)
    }

    pub fn scale_vec(&self) -> Vec3 {
        Vec3::splat(self.scale)
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale_vec(), self.rotation_quat(), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_halves() {
        let v = ViewportState::new(1000.0, 800.0);
        assert_eq!(v.half_width(), 500.0);
        assert_eq!(v.half_height(), 400.0);
        assert_eq!(v.aspect(), 1000.0 / 800.0);
    }

    #[test]
    fn viewport_zero_size_clamps() {
        let v = ViewportState::new(0.0, -5.0);
        assert_eq!(v.width(), 1.0);
        assert_eq!(v.height(), 1.0);
        assert_eq!(v.half_height(), 0.5);
    }

    #[test]
    fn pixel_ratio_clamped() {
        assert_eq!(clamp_pixel_ratio(1.0), 1.0);
        assert_eq!(clamp_pixel_ratio(3.0), 2.0);
        let v = ViewportState::new(100.0, 50.0);
        assert_eq!(v.render_size(1.5), (150, 75));
        assert_eq!(v.render_size(3.0), (200, 100));
    }

    #[test]
    fn pointer_target_negates_y() {
        let p = PointerOffset::new(2.0, -2.0);
        assert_eq!(p.camera_target(), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn instance_scale_is_uniform() {
        let t = InstanceTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec2::new(0.5, 1.0),
            scale: 0.25,
        };
        let (scale, _, translation) = t.model_matrix().to_scale_rotation_translation();
        assert!((scale.x - 0.25).abs() < 1e-5);
        assert!((scale.y - 0.25).abs() < 1e-5);
        assert!((scale.z - 0.25).abs() < 1e-5);
        assert!(translation.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
    }

    #[test]
    fn slot_indices_distinct() {
        assert_ne!(MaterialSlot::Text.index(), MaterialSlot::Donut.index());
        assert_eq!(MaterialSlot::Donut.to_string(), "donut");
    }
}
