use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::Geometry;

/// Ring dimensions and tessellation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorusParams {
    /// Distance from the torus center to the tube center.
    pub radius: f32,
    /// Tube radius.
    pub tube: f32,
    /// Segments around the tube cross-section.
    pub radial_segments: u32,
    /// Segments around the ring.
    pub tubular_segments: u32,
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            radius: 0.3,
            tube: 0.2,
            radial_segments: 20,
            tubular_segments: 45,
        }
    }
}

/// Build a torus lying in the XY plane, counter-clockwise front faces.
pub fn torus(params: &TorusParams) -> Geometry {
    let radial = params.radial_segments.max(3);
    let tubular = params.tubular_segments.max(3);
    let ring = tubular + 1;

    let mut geometry = Geometry::default();
    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let r = params.radius + params.tube * v.cos();
            let position = Vec3::new(r * u.cos(), r * u.sin(), params.tube * v.sin());
            let center = Vec3::new(params.radius * u.cos(), params.radius * u.sin(), 0.0);
            geometry.positions.push(position);
            let normal = (position - center).normalize_or_zero();
            geometry.normals.push(normal);
        }
    }

    for j in 1..=radial {
        for i in 1..=tubular {
            let a = ring * j + i - 1;
            let b = ring * (j - 1) + i - 1;
            let c = ring * (j - 1) + i;
            let d = ring * j + i;
            geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    geometry
}
