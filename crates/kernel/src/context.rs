use donutfield_assets::{AssetLoader, LoadEvent, LoadRequest, ReloadRequest, TextureSelector};
use donutfield_common::{PointerOffset, ViewportState, clamp_pixel_ratio};
use donutfield_input::{Action, PointerTracker, PrimaryPointer};
use donutfield_render::{CameraRig, Renderer};
use donutfield_scene::{Scene, SceneBuilder, SceneState};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

use crate::{DemoConfig, FrameControl, FrameInfo, FrameLoop, KernelError, StopHandle};

/// All logical state of a running demo.
///
/// The host owns one context, feeds it [`Action`]s translated from window
/// events and calls [`AppContext::frame`] once per display refresh with its
/// renderer. Asset loads submitted through the context complete on a
/// background thread and are applied at the start of the next frame.
pub struct AppContext {
    config: DemoConfig,
    viewport: ViewportState,
    pixel_ratio: f64,
    pointer: PointerTracker,
    primary: PrimaryPointer,
    selector: TextureSelector,
    scene: Scene,
    builder: SceneBuilder,
    rig: CameraRig,
    loader: AssetLoader,
    rng: StdRng,
    frames: FrameLoop,
}

impl AppContext {
    pub fn new(config: DemoConfig, viewport: ViewportState) -> Result<Self, KernelError> {
        let rng = match config.scene.seed {
            // Separate stream from the instance placement.
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            viewport,
            pixel_ratio: 1.0,
            pointer: PointerTracker::new(config.pointer_sensitivity),
            primary: PrimaryPointer::new(),
            selector: TextureSelector::new(&config.assets),
            scene: Scene::new(),
            builder: SceneBuilder::new(config.scene.clone()),
            rig: CameraRig::new(&config.camera, &viewport),
            loader: AssetLoader::new()?,
            rng,
            frames: FrameLoop::new(),
            config,
        })
    }

    /// Kick off the font load and the initial matcap loads.
    pub fn start(&mut self) -> Result<(), KernelError> {
        let font = self.config.assets.font.clone();
        tracing::info!(font = %font.display(), "requesting assets");
        self.loader.request(LoadRequest::Font(font))?;
        for request in self.selector.current_requests() {
            self.loader.request(LoadRequest::Matcap(request))?;
        }
        Ok(())
    }

    pub fn apply(&mut self, action: Action) -> Result<(), KernelError> {
        match action {
            Action::Resize {
                width,
                height,
                pixel_ratio,
            } => self.resize(width, height, pixel_ratio),
            Action::PointerMoved(sample) => {
                self.pointer.on_move(sample, &self.viewport);
            }
            Action::RandomizeAppearance => {
                self.randomize_appearance()?;
            }
            Action::Orbit(delta) => {
                self.rig
                    .controls
                    .rotate(delta.x, delta.y, self.viewport.height());
            }
            Action::Pan(delta) => {
                let rig = &mut self.rig;
                rig.controls
                    .pan(delta.x, delta.y, self.viewport.height(), &rig.camera);
            }
            Action::Zoom(steps) => self.rig.controls.zoom(steps),
            Action::SetAxesVisible(visible) => self.scene.set_axes_visible(visible),
            Action::SetOpacity { slot, opacity } => {
                if !self.scene.set_opacity(slot, opacity) {
                    tracing::debug!(%slot, "no material yet, opacity ignored");
                }
            }
            Action::Quit => {
                tracing::info!("stop requested");
                self.frames.stop_handle().stop();
            }
        }
        Ok(())
    }

    fn resize(&mut self, width: f32, height: f32, pixel_ratio: f64) {
        self.viewport = ViewportState::new(width, height);
        self.pixel_ratio = clamp_pixel_ratio(pixel_ratio);
        self.rig.resize(&self.viewport);
        tracing::debug!(
            width = self.viewport.width(),
            height = self.viewport.height(),
            pixel_ratio = self.pixel_ratio,
            "viewport resized"
        );
    }

    /// Pick new matcaps for both slots and queue their loads. The previous
    /// images stay bound until the new pixels arrive.
    pub fn randomize_appearance(&mut self) -> Result<[ReloadRequest; 2], KernelError> {
        let requests = self.selector.randomize(&mut self.rng);
        for request in &requests {
            self.loader.request(LoadRequest::Matcap(request.clone()))?;
        }
        Ok(requests)
    }

    /// Apply one completed load to the scene.
    pub fn handle_load(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Font(Ok(font)) => {
                tracing::info!(path = %font.path.display(), bytes = font.data.len(), "font loaded");
                self.builder.on_font_loaded(&mut self.scene, &font);
            }
            LoadEvent::Font(Err(e)) => {
                self.builder.on_font_failed(e.to_string());
            }
            LoadEvent::Matcap {
                slot,
                index,
                result: Ok(image),
            } => {
                self.scene.apply_matcap(slot, index, image);
            }
            LoadEvent::Matcap {
                slot,
                index,
                result: Err(e),
            } => {
                tracing::warn!(%slot, index, "matcap reload failed, keeping previous image: {e}");
            }
        }
    }

    /// Apply every load that has completed so far. Returns how many were applied.
    pub fn poll_loads(&mut self) -> usize {
        let events = self.loader.poll();
        let n = events.len();
        for event in events {
            self.handle_load(event);
        }
        n
    }

    /// Block until no loads are outstanding or `timeout` passes.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut applied = 0;
        while self.loader.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                let pending = self.loader.in_flight();
                tracing::warn!(pending, "timed out waiting for assets");
                break;
            }
            match self.loader.wait(remaining) {
                Some(event) => {
                    self.handle_load(event);
                    applied += 1;
                }
                None => break,
            }
        }
        applied
    }

    /// Run one frame: apply finished loads, update the camera, render.
    /// Returns `None` once the loop has been stopped; nothing is rendered then.
    pub fn frame<R: Renderer>(&mut self, renderer: &mut R) -> Option<(FrameInfo, R::Output)> {
        let info = match self.frames.tick() {
            FrameControl::Continue(info) => info,
            FrameControl::Stop => return None,
        };
        self.poll_loads();
        self.rig.advance(self.pointer.offset());
        let output = renderer.render(&self.scene, &self.rig.view());
        Some((info, output))
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    /// Clamped device pixel ratio.
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Physical size of the render target.
    pub fn render_size(&self) -> (u32, u32) {
        self.viewport.render_size(self.pixel_ratio)
    }

    pub fn pointer_offset(&self) -> PointerOffset {
        self.pointer.offset()
    }

    pub fn primary_pointer(&mut self) -> &mut PrimaryPointer {
        &mut self.primary
    }

    pub fn selector(&self) -> &TextureSelector {
        &self.selector
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_state(&self) -> &SceneState {
        self.builder.state()
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn pending_loads(&self) -> usize {
        self.loader.in_flight()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.frames.stop_handle()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames.frame()
    }

    pub fn elapsed(&self) -> Duration {
        self.frames.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donutfield_assets::{AssetError, AssetPaths, FontAsset, MatcapImage};
    use donutfield_common::MaterialSlot;
    use donutfield_input::PointerSample;
    use donutfield_render::DebugTextRenderer;
    use donutfield_scene::MeshKind;
    use glam::Vec2;
    use std::path::{Path, PathBuf};

    fn config() -> DemoConfig {
        let mut config = DemoConfig::default();
        config.scene.seed = Some(9);
        config.scene.instance_count = 50;
        config
    }

    fn context() -> AppContext {
        AppContext::new(config(), ViewportState::new(1000.0, 800.0)).unwrap()
    }

    fn pixel(v: u8) -> MatcapImage {
        MatcapImage {
            width: 1,
            height: 1,
            rgba: vec![v, v, v, 255],
        }
    }

    fn write_matcaps(dir: &Path, count: u32) {
        for i in 1..=count {
            let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([i as u8, 0, 0, 255]));
            img.save(dir.join(format!("{i}.png"))).unwrap();
        }
    }

    #[test]
    fn pointer_easing_scenario() {
        let mut ctx = context();
        ctx.apply(Action::PointerMoved(PointerSample {
            position: Vec2::new(600.0, 300.0),
            is_primary: true,
        }))
        .unwrap();
        let offset = ctx.pointer_offset();
        assert!((offset.x - 2.0).abs() < 1e-6);
        assert!((offset.y + 2.0).abs() < 1e-6);

        let mut renderer = DebugTextRenderer::new();
        ctx.frame(&mut renderer).unwrap();
        let p = ctx.rig().camera.position;
        assert!((p.x - 1.04).abs() < 1e-5);
        assert!((p.y - 1.04).abs() < 1e-5);
    }

    #[test]
    fn secondary_pointer_does_not_move_target() {
        let mut ctx = context();
        ctx.apply(Action::PointerMoved(PointerSample {
            position: Vec2::new(900.0, 100.0),
            is_primary: false,
        }))
        .unwrap();
        assert_eq!(ctx.pointer_offset(), PointerOffset::default());
    }

    #[test]
    fn resize_updates_viewport_camera_and_target() {
        let mut ctx = context();
        let resize = Action::Resize {
            width: 1920.0,
            height: 1080.0,
            pixel_ratio: 3.0,
        };
        ctx.apply(resize.clone()).unwrap();
        let projection = ctx.rig().camera.projection_matrix();
        ctx.apply(resize).unwrap();
        assert_eq!(ctx.rig().camera.projection_matrix(), projection);
        assert_eq!(ctx.viewport().half_width(), 960.0);
        assert_eq!(ctx.pixel_ratio(), 2.0);
        assert_eq!(ctx.render_size(), (3840, 2160));
        assert!((ctx.rig().camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn click_queues_exactly_two_reloads() {
        let mut ctx = context();
        assert_eq!(ctx.pending_loads(), 0);
        ctx.apply(Action::RandomizeAppearance).unwrap();
        assert_eq!(ctx.pending_loads(), 2);
        let sel = ctx.selector();
        assert!((1..=12).contains(&sel.text_index()));
        assert!((1..=12).contains(&sel.mesh_index()));
    }

    #[test]
    fn randomize_requests_follow_selection() {
        let mut ctx = context();
        let [text, donut] = ctx.randomize_appearance().unwrap();
        assert_eq!(text.slot, MaterialSlot::Text);
        assert_eq!(text.index, ctx.selector().text_index());
        assert_eq!(donut.index, ctx.selector().mesh_index());
    }

    #[test]
    fn font_failure_leaves_scene_empty() {
        let mut ctx = context();
        ctx.handle_load(LoadEvent::Font(Err(AssetError::InvalidFont {
            path: PathBuf::from("missing.ttf"),
            reason: "no such file".into(),
        })));
        assert!(matches!(ctx.scene_state(), SceneState::Degraded { .. }));
        assert!(ctx.scene().meshes().is_empty());

        let mut renderer = DebugTextRenderer::new();
        let (_, out) = ctx.frame(&mut renderer).unwrap();
        assert!(out.contains("meshes=0"));
    }

    #[test]
    fn unparseable_font_still_places_donuts() {
        let mut ctx = context();
        ctx.handle_load(LoadEvent::Font(Ok(FontAsset {
            path: PathBuf::from("odd.ttf"),
            data: vec![0; 16],
        })));
        assert!(matches!(
            ctx.scene_state(),
            SceneState::Populated { text: None, .. }
        ));
        assert_eq!(ctx.scene().meshes_of(MeshKind::Donut).count(), 50);
    }

    #[test]
    fn matcap_result_updates_texture_and_failure_keeps_it() {
        let mut ctx = context();
        ctx.handle_load(LoadEvent::Matcap {
            slot: MaterialSlot::Donut,
            index: 4,
            result: Ok(pixel(10)),
        });
        let texture = ctx.scene().texture(MaterialSlot::Donut);
        assert_eq!(texture.index(), Some(4));
        assert_eq!(texture.version(), 1);

        ctx.handle_load(LoadEvent::Matcap {
            slot: MaterialSlot::Donut,
            index: 8,
            result: Err(AssetError::WorkerGone),
        });
        let texture = ctx.scene().texture(MaterialSlot::Donut);
        assert_eq!(texture.index(), Some(4));
        assert_eq!(texture.version(), 1);
    }

    #[test]
    fn debug_actions_reach_scene() {
        let mut ctx = context();
        ctx.handle_load(LoadEvent::Font(Ok(FontAsset {
            path: PathBuf::from("odd.ttf"),
            data: Vec::new(),
        })));
        ctx.apply(Action::SetAxesVisible(true)).unwrap();
        ctx.apply(Action::SetOpacity {
            slot: MaterialSlot::Donut,
            opacity: 0.25,
        })
        .unwrap();
        assert!(ctx.scene().axes_visible());
        assert_eq!(ctx.scene().opacity(MaterialSlot::Donut), Some(0.25));
    }

    #[test]
    fn quit_stops_before_render() {
        let mut ctx = context();
        let mut renderer = DebugTextRenderer::new();
        assert!(ctx.frame(&mut renderer).is_some());
        ctx.apply(Action::Quit).unwrap();
        assert!(ctx.frame(&mut renderer).is_none());
        assert_eq!(renderer.frames(), 1);
        assert_eq!(ctx.frame_count(), 1);
    }

    #[test]
    fn external_stop_handle() {
        let mut ctx = context();
        let handle = ctx.stop_handle();
        handle.stop();
        let mut renderer = DebugTextRenderer::new();
        assert!(ctx.frame(&mut renderer).is_none());
        assert_eq!(renderer.frames(), 0);
    }

    #[test]
    fn start_loads_matcaps_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write_matcaps(dir.path(), 12);
        let mut config = config();
        config.assets = AssetPaths {
            font: dir.path().join("missing.ttf"),
            matcap_dir: dir.path().to_path_buf(),
            ..AssetPaths::default()
        };
        let mut ctx = AppContext::new(config, ViewportState::new(800.0, 600.0)).unwrap();
        ctx.start().unwrap();
        assert_eq!(ctx.pending_loads(), 3);
        let applied = ctx.wait_for_loads(Duration::from_secs(10));
        assert_eq!(applied, 3);

        // Missing font: degraded, but both default matcaps arrived.
        assert!(matches!(ctx.scene_state(), SceneState::Degraded { .. }));
        for slot in MaterialSlot::ALL {
            assert_eq!(ctx.scene().texture(slot).index(), Some(3));
        }

        ctx.apply(Action::RandomizeAppearance).unwrap();
        ctx.wait_for_loads(Duration::from_secs(10));
        let text = ctx.scene().texture(MaterialSlot::Text);
        assert_eq!(text.index(), Some(ctx.selector().text_index()));
        assert_eq!(text.version(), 2);
        let image = text.image().unwrap();
        assert_eq!(image.rgba[0], ctx.selector().text_index() as u8);
    }
}
