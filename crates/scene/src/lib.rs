//! Scene: geometry generation, matcap materials and the two-phase builder.
//!
//! # Invariants
//! - Geometry and material are created once and shared by every donut.
//! - Nothing is ever removed from the scene.
//! - Text geometry is recentered on the geometry, not on the mesh transform.

pub mod builder;
pub mod geometry;
pub mod material;
pub mod scene;
pub mod text;
pub mod torus;

pub use builder::{SceneBuilder, SceneConfig, SceneState, random_instance_transform};
pub use geometry::{Aabb, Geometry};
pub use material::{MatcapMaterial, MatcapTexture};
pub use scene::{GeometryHandle, MaterialHandle, Mesh, MeshKind, Scene, SceneSummary};
pub use text::{Contour, TextParams, extrude_contours, extrude_text, glyph_contours};
pub use torus::{TorusParams, torus};

/// Errors from scene construction.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("font could not be parsed: {0}")]
    InvalidFont(String),
    #[error("tessellation failed: {0}")]
    Tessellation(String),
    #[error("text {0:?} produced no outline")]
    EmptyText(String),
}

pub fn crate_info() -> &'static str {
    "donutfield-scene v0.1.0"
}
