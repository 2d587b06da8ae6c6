use donutfield_common::MaterialSlot;
use donutfield_scene::{MeshKind, Scene};
use glam::{Mat4, Quat, Vec3};
use std::fmt::Write;

/// Snapshot of the camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub position: Vec3,
    pub rotation: Quat,
    pub view: Mat4,
    pub projection: Mat4,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl RenderView {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Depth of a world-space point along the view direction; larger is farther.
    pub fn depth_of(&self, point: Vec3) -> f32 {
        -self.view.transform_point3(point).z
    }
}

impl Default for RenderView {
    fn default() -> Self {
        let position = Vec3::new(1.0, 1.0, 2.0);
        let view = Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y);
        Self {
            position,
            rotation: Quat::from_mat4(&view.inverse()),
            view,
            projection: Mat4::perspective_rh(75f32.to_radians(), 16.0 / 9.0, 0.1, 100.0),
            fov_degrees: 75.0,
        }
    }
}

/// Renderer-agnostic interface.
///
/// A renderer reads the scene and a view, then produces output. It may keep
/// its own resources (uploaded textures, buffers) but never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` from `view`.
    fn render(&mut self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Headless renderer that describes each frame as text.
///
/// Tracks texture versions the same way the GPU renderer does, so the
/// "uploaded" column shows when a swapped matcap would reach the screen.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    uploaded: [u64; 2],
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &Scene, view: &RenderView) -> String {
        self.frames += 1;
        let mut out = String::new();
        let p = view.position;
        let _ = writeln!(out, "=== frame {} ===", self.frames);
        let _ = writeln!(out, "{}", scene.summary());
        let _ = writeln!(
            out,
            "Camera: pos=({:.4}, {:.4}, {:.4}) fov={:.0}",
            p.x, p.y, p.z, view.fov_degrees
        );

        for slot in MaterialSlot::ALL {
            let texture = scene.texture(slot);
            let uploaded = &mut self.uploaded[slot.index()];
            let updated = texture.needs_update(*uploaded);
            *uploaded = texture.version();
            let index = texture
                .index()
                .map_or_else(|| "-".to_string(), |i| i.to_string());
            let opacity = scene
                .opacity(slot)
                .map_or_else(|| "-".to_string(), |o| format!("{o:.2}"));
            let _ = writeln!(
                out,
                "  {slot}: matcap={index} opacity={opacity}{}",
                if updated { " (uploaded)" } else { "" }
            );
        }

        if let Some(text) = scene.meshes_of(MeshKind::Text).next() {
            if let Some(bounds) = scene.geometry(text.geometry).and_then(|g| g.bounding_box()) {
                let s = bounds.size();
                let _ = writeln!(out, "  text: size=({:.3}, {:.3}, {:.3})", s.x, s.y, s.z);
            }
        }
        if scene.axes_visible() {
            let _ = writeln!(out, "  axes: visible");
        }

        tracing::trace!(frame = self.frames, "text frame rendered");
        out
    }
}
