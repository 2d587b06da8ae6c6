use donutfield_assets::MatcapImage;
use donutfield_common::{InstanceTransform, MaterialSlot};

use crate::material::MIN_OPACITY;
use crate::{Geometry, MatcapMaterial, MatcapTexture};

/// Index of a geometry owned by a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryHandle(pub usize);

/// Index of a material owned by a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Text,
    Donut,
}

/// A placed mesh: shared geometry and material plus its own transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mesh {
    pub kind: MeshKind,
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub transform: InstanceTransform,
}

/// The scene graph root. Append-only: meshes, geometries and materials are
/// never removed.
#[derive(Debug, Clone)]
pub struct Scene {
    geometries: Vec<Geometry>,
    materials: Vec<MatcapMaterial>,
    meshes: Vec<Mesh>,
    textures: [MatcapTexture; 2],
    axes_visible: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            geometries: Vec::new(),
            materials: Vec::new(),
            meshes: Vec::new(),
            textures: [MatcapTexture::default(), MatcapTexture::default()],
            axes_visible: false,
        }
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        self.geometries.push(geometry);
        GeometryHandle(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, material: MatcapMaterial) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle(self.materials.len() - 1)
    }

    /// Insert a mesh and return its index.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn geometry(&self, handle: GeometryHandle) -> Option<&Geometry> {
        self.geometries.get(handle.0)
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&MatcapMaterial> {
        self.materials.get(handle.0)
    }

    pub fn materials(&self) -> &[MatcapMaterial] {
        &self.materials
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn meshes_of(&self, kind: MeshKind) -> impl Iterator<Item = &Mesh> {
        self.meshes.iter().filter(move |m| m.kind == kind)
    }

    /// Set the opacity of every material bound to `slot`. Values are clamped
    /// to the slider range. Returns whether any material matched.
    pub fn set_opacity(&mut self, slot: MaterialSlot, opacity: f32) -> bool {
        let opacity = opacity.clamp(MIN_OPACITY, 1.0);
        let mut found = false;
        for m in self.materials.iter_mut().filter(|m| m.slot == slot) {
            m.opacity = opacity;
            found = true;
        }
        found
    }

    pub fn opacity(&self, slot: MaterialSlot) -> Option<f32> {
        self.materials
            .iter()
            .find(|m| m.slot == slot)
            .map(|m| m.opacity)
    }

    pub fn texture(&self, slot: MaterialSlot) -> &MatcapTexture {
        &self.textures[slot.index()]
    }

    /// New pixels arrived for `slot`: store them and flag the texture for upload.
    pub fn apply_matcap(&mut self, slot: MaterialSlot, index: u32, image: MatcapImage) {
        self.textures[slot.index()].set(index, image);
        tracing::debug!(%slot, index, "matcap texture needs update");
    }

    pub fn axes_visible(&self) -> bool {
        self.axes_visible
    }

    pub fn set_axes_visible(&mut self, visible: bool) {
        self.axes_visible = visible;
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            meshes: self.meshes.len(),
            text_meshes: self.meshes_of(MeshKind::Text).count(),
            donut_meshes: self.meshes_of(MeshKind::Donut).count(),
            geometries: self.geometries.len(),
            materials: self.materials.len(),
            triangles: self
                .meshes
                .iter()
                .filter_map(|m| self.geometry(m.geometry))
                .map(Geometry::triangle_count)
                .sum(),
        }
    }
}

/// Counts for logs, the CLI and the debug panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneSummary {
    pub meshes: usize,
    pub text_meshes: usize,
    pub donut_meshes: usize,
    pub geometries: usize,
    pub materials: usize,
    /// Triangles drawn per frame, counting every instance.
    pub triangles: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: meshes={} (text={}, donuts={}) geometries={} materials={} triangles={}",
            self.meshes,
            self.text_meshes,
            self.donut_meshes,
            self.geometries,
            self.materials,
            self.triangles
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::torus::{TorusParams, torus};

    fn donut_scene(n: usize) -> Scene {
        let mut scene = Scene::new();
        let g = scene.add_geometry(torus(&TorusParams::default()));
        let m = scene.add_material(MatcapMaterial::translucent(MaterialSlot::Donut, 0.7));
        for _ in 0..n {
            scene.add_mesh(Mesh {
                kind: MeshKind::Donut,
                geometry: g,
                material: m,
                transform: InstanceTransform::default(),
            });
        }
        scene
    }

    #[test]
    fn empty_scene() {
        let scene = Scene::new();
        assert!(scene.meshes().is_empty());
        assert!(!scene.axes_visible());
        assert_eq!(scene.texture(MaterialSlot::Text).version(), 0);
    }

    #[test]
    fn summary_counts_shared_resources_once() {
        let scene = donut_scene(10);
        let s = scene.summary();
        assert_eq!(s.meshes, 10);
        assert_eq!(s.donut_meshes, 10);
        assert_eq!(s.geometries, 1);
        assert_eq!(s.materials, 1);
        assert_eq!(s.triangles, 10 * 20 * 45 * 2);
        assert!(s.to_string().contains("donuts=10"));
    }

    #[test]
    fn opacity_clamped_to_slider_range() {
        let mut scene = donut_scene(1);
        assert!(scene.set_opacity(MaterialSlot::Donut, 0.0));
        assert_eq!(scene.opacity(MaterialSlot::Donut), Some(MIN_OPACITY));
        assert!(!scene.set_opacity(MaterialSlot::Text, 0.5));
        assert_eq!(scene.opacity(MaterialSlot::Text), None);
    }

    #[test]
    fn apply_matcap_flags_only_its_slot() {
        let mut scene = Scene::new();
        scene.apply_matcap(
            MaterialSlot::Text,
            9,
            MatcapImage {
                width: 1,
                height: 1,
                rgba: vec![0, 0, 0, 255],
            },
        );
        assert!(scene.texture(MaterialSlot::Text).needs_update(0));
        assert!(!scene.texture(MaterialSlot::Donut).needs_update(0));
    }
}
