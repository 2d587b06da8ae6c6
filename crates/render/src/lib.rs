//! Rendering Adapter: renderer-agnostic interface and the camera rig.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Each frame the orbit controls update before pointer easing is applied.
//!
//! The GPU backend lives in `donutfield-render-wgpu`; the text renderer here
//! drives the same frame procedure headlessly.

mod camera;
mod renderer;

pub use camera::{CameraConfig, CameraRig, OrbitControls, PerspectiveCamera};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "donutfield-render v0.1.0"
}
