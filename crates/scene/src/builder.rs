use donutfield_assets::FontAsset;
use donutfield_common::{InstanceTransform, MaterialSlot};
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::ops::Range;
use std::time::Instant;

use crate::{
    Geometry, MatcapMaterial, Mesh, MeshKind, Scene, SceneError, TextParams, TorusParams,
    extrude_text, torus,
};

/// Scene composition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub text: String,
    pub text_params: TextParams,
    pub torus: TorusParams,
    pub instance_count: usize,
    /// Edge length of the cube the donuts are scattered in, centered on the origin.
    pub spread: f32,
    pub text_opacity: f32,
    pub donut_opacity: f32,
    /// Fixed seed for a reproducible donut field; random when unset.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            text: "Click to change".into(),
            text_params: TextParams::default(),
            torus: TorusParams::default(),
            instance_count: 1000,
            spread: 15.0,
            text_opacity: 1.0,
            donut_opacity: 0.7,
            seed: None,
        }
    }
}

/// How far scene construction has progressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneState {
    /// The glyph load has not completed yet; the scene has no content.
    AwaitingAssets,
    /// Both phases ran. `text` is the text mesh index when extrusion succeeded.
    Populated {
        text: Option<usize>,
        instances: Range<usize>,
    },
    /// The glyph load failed; the scene stays empty for the session.
    Degraded { reason: String },
}

/// Draw one donut placement: position uniform in `[-spread/2, spread/2]`
/// per axis, x/y rotation in `[0, π]`, one scale for all three axes.
pub fn random_instance_transform<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> InstanceTransform {
    let position = Vec3::new(
        (rng.random::<f32>() - 0.5) * spread,
        (rng.random::<f32>() - 0.5) * spread,
        (rng.random::<f32>() - 0.5) * spread,
    );
    let rotation = Vec2::new(rng.random::<f32>() * PI, rng.random::<f32>() * PI);
    let scale = rng.random::<f32>();
    InstanceTransform {
        position,
        rotation,
        scale,
    }
}

/// Builds the scene once the font arrives. Each phase runs at most once.
pub struct SceneBuilder {
    config: SceneConfig,
    state: SceneState,
    rng: StdRng,
}

impl SceneBuilder {
    pub fn new(config: SceneConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            state: SceneState::AwaitingAssets,
            rng,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Glyph load completed: extrude the text, then place the donuts.
    pub fn on_font_loaded(&mut self, scene: &mut Scene, font: &FontAsset) -> &SceneState {
        if self.state != SceneState::AwaitingAssets {
            tracing::debug!("scene already built, ignoring font");
            return &self.state;
        }
        let text = {
            let _span = tracing::info_span!("text_phase").entered();
            extrude_text(&self.config.text, &font.data, &self.config.text_params)
        };
        self.populate(scene, text)
    }

    /// Glyph load failed: no content will ever be added.
    pub fn on_font_failed(&mut self, reason: impl Into<String>) -> &SceneState {
        if self.state == SceneState::AwaitingAssets {
            let reason = reason.into();
            tracing::error!(%reason, "font failed to load, scene stays empty");
            self.state = SceneState::Degraded { reason };
        }
        &self.state
    }

    /// Run both phases from an already extruded (and centered) text geometry.
    /// A text error only omits the text; the donuts are still placed.
    pub fn populate(
        &mut self,
        scene: &mut Scene,
        text: Result<Geometry, SceneError>,
    ) -> &SceneState {
        if self.state != SceneState::AwaitingAssets {
            return &self.state;
        }

        let text = match text {
            Ok(geometry) => Some(self.add_text(scene, geometry)),
            Err(e) => {
                tracing::warn!("text omitted: {e}");
                None
            }
        };
        let instances = self.add_instances(scene);

        tracing::info!(
            text = text.is_some(),
            donuts = instances.len(),
            "scene populated"
        );
        self.state = SceneState::Populated { text, instances };
        &self.state
    }

    fn add_text(&mut self, scene: &mut Scene, geometry: Geometry) -> usize {
        tracing::debug!(
            vertices = geometry.vertex_count(),
            triangles = geometry.triangle_count(),
            "text geometry ready"
        );
        let geometry = scene.add_geometry(geometry);
        let material = scene.add_material(MatcapMaterial::translucent(
            MaterialSlot::Text,
            self.config.text_opacity,
        ));
        scene.add_mesh(Mesh {
            kind: MeshKind::Text,
            geometry,
            material,
            transform: InstanceTransform::default(),
        })
    }

    fn add_instances(&mut self, scene: &mut Scene) -> Range<usize> {
        let _span = tracing::info_span!("instance_phase").entered();
        let started = Instant::now();

        // One geometry and one material shared by every donut.
        let geometry = scene.add_geometry(torus(&self.config.torus));
        let material = scene.add_material(MatcapMaterial::translucent(
            MaterialSlot::Donut,
            self.config.donut_opacity,
        ));

        let first = scene.meshes().len();
        for _ in 0..self.config.instance_count {
            let transform = random_instance_transform(&mut self.rng, self.config.spread);
            scene.add_mesh(Mesh {
                kind: MeshKind::Donut,
                geometry,
                material,
                transform,
            });
        }
        let range = first..scene.meshes().len();

        tracing::info!(
            count = range.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "donuts"
        );
        range
    }
}
