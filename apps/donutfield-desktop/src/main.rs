use anyhow::{Context as _, Result};
use clap::Parser;
use donutfield_common::{MaterialSlot, ViewportState};
use donutfield_input::{Action, PointerId};
use donutfield_kernel::{AppContext, ConfigOverrides, DemoConfig};
use donutfield_render_wgpu::WgpuRenderer;
use donutfield_scene::SceneState;
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "donutfield-desktop", about = "Matcap donut field demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Font used for the text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Directory holding numbered matcap PNGs
    #[arg(long)]
    matcaps: Option<PathBuf>,

    /// Seed for a reproducible donut field
    #[arg(long)]
    seed: Option<u64>,

    /// Number of donuts
    #[arg(long)]
    count: Option<usize>,
}

/// Window-side state around the application context.
struct AppState {
    ctx: AppContext,
    show_panel: bool,
    scale_factor: f64,
    /// Last cursor position in logical pixels.
    cursor: Option<Vec2>,
    left_down: bool,
    right_down: bool,
}

impl AppState {
    fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            show_panel: false,
            scale_factor: 1.0,
            cursor: None,
            left_down: false,
            right_down: false,
        }
    }

    fn apply(&mut self, action: Action) {
        if let Err(e) = self.ctx.apply(action) {
            tracing::error!("action failed: {e}");
        }
    }

    fn logical(&self, position: PhysicalPosition<f64>) -> Vec2 {
        let p = position.to_logical::<f32>(self.scale_factor);
        Vec2::new(p.x, p.y)
    }

    fn cursor_moved(&mut self, position: Vec2) {
        let pointers = self.ctx.primary_pointer();
        let sample = pointers.sample(PointerId::Mouse, position);
        self.apply(Action::PointerMoved(sample));
        if let Some(last) = self.cursor {
            let delta = position - last;
            if self.left_down {
                self.apply(Action::Orbit(delta));
            } else if self.right_down {
                self.apply(Action::Pan(delta));
            }
        }
        self.cursor = Some(position);
    }

    fn touch(&mut self, id: u64, phase: TouchPhase, position: Vec2) {
        match phase {
            TouchPhase::Started => {
                if self.ctx.primary_pointer().touch_started(id) {
                    self.cursor = Some(position);
                }
            }
            TouchPhase::Moved => {
                let pointers = self.ctx.primary_pointer();
                let sample = pointers.sample(PointerId::Touch(id), position);
                self.apply(Action::PointerMoved(sample));
                if sample.is_primary {
                    if let Some(last) = self.cursor {
                        self.apply(Action::Orbit(position - last));
                    }
                    self.cursor = Some(position);
                }
            }
            TouchPhase::Ended => {
                // A lifted primary finger counts as a click.
                if self.ctx.primary_pointer().is_primary(PointerId::Touch(id)) {
                    self.apply(Action::RandomizeAppearance);
                    self.cursor = None;
                }
                self.ctx.primary_pointer().touch_ended(id);
            }
            TouchPhase::Cancelled => {
                self.ctx.primary_pointer().touch_ended(id);
                self.cursor = None;
            }
        }
    }

    /// Track held buttons; releasing the left button is the click.
    fn mouse_input(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => {
                if self.left_down && !pressed {
                    self.apply(Action::RandomizeAppearance);
                }
                self.left_down = pressed;
            }
            MouseButton::Right => self.right_down = pressed,
            _ => {}
        }
    }

    /// A release the debug panel swallowed still ends the drag, without a click.
    fn release_captured(&mut self, button: MouseButton) {
        match button {
            MouseButton::Left => self.left_down = false,
            MouseButton::Right => self.right_down = false,
            _ => {}
        }
    }

    /// New window size or monitor scale; re-derives the clamped pixel ratio.
    fn rescale(&mut self, scale_factor: f64, size: PhysicalSize<u32>) {
        self.scale_factor = scale_factor;
        let logical = size.to_logical::<f32>(scale_factor);
        self.apply(Action::Resize {
            width: logical.width,
            height: logical.height,
            pixel_ratio: scale_factor,
        });
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Escape => self.apply(Action::Quit),
            KeyCode::F1 => self.show_panel = !self.show_panel,
            _ => {}
        }
    }

    fn draw_ui(&self, egui_ctx: &EguiContext, actions: &mut Vec<Action>) {
        if !self.show_panel {
            return;
        }
        let ctx = &self.ctx;
        let scene = ctx.scene();

        egui::Window::new("Debug")
            .default_width(260.0)
            .show(egui_ctx, |ui| {
                let mut axes = scene.axes_visible();
                if ui.checkbox(&mut axes, "Axes helper").changed() {
                    actions.push(Action::SetAxesVisible(axes));
                }
                for slot in MaterialSlot::ALL {
                    let Some(mut opacity) = scene.opacity(slot) else {
                        continue;
                    };
                    let slider = egui::Slider::new(&mut opacity, 0.1..=1.0)
                        .step_by(0.01)
                        .text(format!("{slot} opacity"));
                    if ui.add(slider).changed() {
                        actions.push(Action::SetOpacity { slot, opacity });
                    }
                }

                ui.separator();
                let p = ctx.rig().camera.position;
                ui.label(format!(
                    "Frame: {}  Elapsed: {:.1}s",
                    ctx.frame_count(),
                    ctx.elapsed().as_secs_f32()
                ));
                ui.label(format!("Camera: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!(
                    "Matcaps: text={} donut={}",
                    ctx.selector().text_index(),
                    ctx.selector().mesh_index()
                ));
                let state = match ctx.scene_state() {
                    SceneState::AwaitingAssets => "loading".to_string(),
                    SceneState::Populated { instances, .. } => {
                        format!("{} donuts", instances.len())
                    }
                    SceneState::Degraded { reason } => format!("degraded: {reason}"),
                };
                ui.label(format!("Scene: {state}"));
                ui.label(scene.summary().to_string());

                ui.separator();
                ui.small("Click: new matcaps | LMB drag: orbit | RMB drag: pan | F1 | Esc");
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(ctx: AppContext) -> Self {
        Self {
            state: AppState::new(ctx),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Click to change")
            .with_inner_size(LogicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("donutfield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let (scale, size) = (window.scale_factor(), window.inner_size());
        self.state.rescale(scale, size);

        let (width, height) = self.state.ctx.render_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, &queue, surface_format, width, height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            width,
            height,
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    /// Size the surface and depth buffer to the clamped render size.
    fn resize_surface(&mut self) {
        let (width, height) = self.state.ctx.render_size();
        if let (Some(surface), Some(device), Some(config)) =
            (&self.surface, &self.device, &mut self.config)
        {
            if config.width == width && config.height == height {
                return;
            }
            config.width = width;
            config.height = height;
            surface.configure(device, config);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(device, width, height);
            }
        }
    }

    /// One frame: scene pass through the context, then the debug panel on top.
    /// Returns `false` once the frame loop has stopped.
    fn redraw(&mut self) -> bool {
        let (Some(window), Some(surface), Some(device), Some(queue), Some(config)) = (
            &self.window,
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
        ) else {
            return true;
        };
        let (Some(renderer), Some(egui_winit), Some(egui_renderer)) = (
            &mut self.renderer,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        ) else {
            return true;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                return true;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return true;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut frame = renderer.frame(device, queue, &view);
        if self.state.ctx.frame(&mut frame).is_none() {
            return false;
        }

        let raw_input = egui_winit.take_egui_input(window);
        let mut actions = Vec::new();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx, &mut actions);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();

        for action in actions {
            self.state.apply(action);
        }
        true
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize graphics: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                if let WindowEvent::MouseInput {
                    button,
                    state: ElementState::Released,
                    ..
                } = event
                {
                    self.state.release_captured(button);
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.apply(Action::Quit);
                event_loop.exit();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.state.rescale(scale_factor, size);
                    self.resize_surface();
                }
            }
            WindowEvent::Resized(new_size) => {
                self.state.rescale(self.state.scale_factor, new_size);
                self.resize_surface();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = self.state.logical(position);
                self.state.cursor_moved(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.cursor = None;
            }
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = state == ElementState::Pressed;
                self.state.mouse_input(button, pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 50.0) as f32,
                };
                self.state.apply(Action::Zoom(steps));
            }
            WindowEvent::Touch(touch) => {
                let position = self.state.logical(touch.location);
                self.state.touch(touch.id, touch.phase, position);
            }
            WindowEvent::RedrawRequested => {
                if !self.redraw() {
                    tracing::info!(frames = self.state.ctx.frame_count(), "frame loop stopped");
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("donutfield-desktop starting");

    let overrides = ConfigOverrides {
        font: cli.font,
        matcaps: cli.matcaps,
        seed: cli.seed,
        count: cli.count,
    };
    let config = DemoConfig::resolve(cli.config.as_deref(), &overrides)?;
    let mut ctx = AppContext::new(config, ViewportState::default())?;
    ctx.start()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(ctx);
    event_loop.run_app(&mut app)?;

    Ok(())
}
