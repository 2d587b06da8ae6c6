use bytemuck::{Pod, Zeroable};
use donutfield_common::InstanceTransform;
use donutfield_render::RenderView;
use donutfield_scene::{GeometryHandle, MaterialHandle, Mesh, Scene};
use std::ops::Range;

/// Per-instance model matrix, one column per vertex attribute.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
}

impl From<&InstanceTransform> for InstanceData {
    fn from(t: &InstanceTransform) -> Self {
        Self {
            model: t.model_matrix().to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// One instanced draw: a run of consecutive instances sharing geometry and material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawBatch {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub instances: Range<u32>,
}

/// Everything a frame draws, in submission order.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub instances: Vec<InstanceData>,
    pub batches: Vec<DrawBatch>,
}

impl DrawList {
    /// Opaque meshes first in scene order, then translucent meshes from the
    /// farthest to the nearest so blending composites correctly.
    pub fn build(scene: &Scene, view: &RenderView) -> Self {
        let is_transparent = |m: &Mesh| {
            scene
                .material(m.material)
                .is_some_and(|material| material.transparent)
        };

        let mut ordered: Vec<&Mesh> = scene
            .meshes()
            .iter()
            .filter(|m| !is_transparent(m))
            .collect();
        let mut translucent: Vec<(f32, &Mesh)> = scene
            .meshes()
            .iter()
            .filter(|m| is_transparent(m))
            .map(|m| (view.depth_of(m.transform.position), m))
            .collect();
        translucent.sort_by(|a, b| b.0.total_cmp(&a.0));
        ordered.extend(translucent.into_iter().map(|(_, m)| m));

        let mut list = DrawList {
            instances: Vec::with_capacity(ordered.len()),
            batches: Vec::new(),
        };
        for mesh in ordered {
            let index = list.instances.len() as u32;
            list.instances.push(InstanceData::from(&mesh.transform));
            match list.batches.last_mut() {
                Some(batch)
                    if batch.geometry == mesh.geometry && batch.material == mesh.material =>
                {
                    batch.instances.end = index + 1;
                }
                _ => list.batches.push(DrawBatch {
                    geometry: mesh.geometry,
                    material: mesh.material,
                    instances: index..index + 1,
                }),
            }
        }
        list
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Axes helper: x red, y green, z blue, each `size` long from the origin.
pub fn axes_vertices(size: f32) -> Vec<LineVertex> {
    let axes = [
        ([size, 0.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
        ([0.0, size, 0.0], [0.0, 1.0, 0.0, 1.0]),
        ([0.0, 0.0, size], [0.0, 0.0, 1.0, 1.0]),
    ];
    axes.iter()
        .flat_map(|&(end, color)| {
            [
                LineVertex {
                    position: [0.0; 3],
                    color,
                },
                LineVertex {
                    position: end,
                    color,
                },
            ]
        })
        .collect()
}
