//! wgpu render backend for the donut field.
//!
//! Draws every mesh with a matcap shader: the view-space normal picks a texel
//! from the material's matcap image. Translucent meshes are sorted back to
//! front each frame and consecutive meshes sharing geometry and material are
//! drawn as one instanced call.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - A matcap is uploaded at most once per texture version; until then the
//!   previous image (or plain white) stays bound.

mod draw;
mod gpu;
mod shaders;

pub use draw::{DrawBatch, DrawList, InstanceData, LineVertex, axes_vertices};
pub use gpu::{WgpuFrame, WgpuRenderer};
