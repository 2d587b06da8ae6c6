use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Indexed triangle mesh with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Aabb { min, max })
    }

    /// Move every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Translate the vertices so the bounding box is centered on the origin.
    /// Returns the offset that was applied.
    pub fn center(&mut self) -> Vec3 {
        let Some(bounds) = self.bounding_box() else {
            return Vec3::ZERO;
        };
        let offset = -bounds.center();
        self.translate(offset);
        offset
    }

    /// Append one triangle with a shared flat normal.
    pub(crate) fn push_flat_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, normal: Vec3) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&[a, b, c]);
        self.normals.extend_from_slice(&[normal, normal, normal]);
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Geometry {
        let mut g = Geometry::default();
        g.push_flat_triangle(
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(3.0, 1.0, 1.0),
            Vec3::new(1.0, 5.0, 2.0),
            Vec3::Z,
        );
        g
    }

    #[test]
    fn bounding_box_of_triangle() {
        let b = triangle().bounding_box().unwrap();
        assert_eq!(b.min, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(b.max, Vec3::new(3.0, 5.0, 2.0));
    }

    #[test]
    fn center_moves_vertices_not_transform() {
        let mut g = triangle();
        let offset = g.center();
        assert_eq!(offset, Vec3::new(-2.0, -3.0, -1.5));
        let b = g.bounding_box().unwrap();
        assert!(b.center().abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!((b.min + b.max).abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn empty_geometry_has_no_bounds() {
        let mut g = Geometry::default();
        assert!(g.bounding_box().is_none());
        assert_eq!(g.center(), Vec3::ZERO);
        assert!(g.is_empty());
    }
}
