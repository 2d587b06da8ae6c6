use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand};
use donutfield_common::ViewportState;
use donutfield_input::{Action, PointerSample};
use donutfield_kernel::{AppContext, ConfigOverrides, DemoConfig};
use donutfield_render::DebugTextRenderer;
use donutfield_scene::{MeshKind, Scene, SceneBuilder};
use glam::{Vec2, Vec3};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "donutfield-cli", about = "Headless donut field tools")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
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

impl ConfigArgs {
    fn resolve(self) -> anyhow::Result<DemoConfig> {
        let overrides = ConfigOverrides {
            font: self.font,
            matcaps: self.matcaps,
            seed: self.seed,
            count: self.count,
        };
        Ok(DemoConfig::resolve(self.config.as_deref(), &overrides)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Build the scene once and print a summary
    Scene {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Drive the frame loop headlessly and print the camera each frame
    Simulate {
        #[command(flatten)]
        config: ConfigArgs,
        /// Frames to run before stopping
        #[arg(long, default_value = "10")]
        frames: u64,
        /// Pointer position in logical pixels, `X,Y`
        #[arg(long, value_parser = parse_pair::<f32>)]
        pointer: Option<(f32, f32)>,
        /// Viewport size in logical pixels, `WxH`
        #[arg(long, default_value = "1000x800", value_parser = parse_size)]
        viewport: (f32, f32),
        /// Clicks issued before the first frame
        #[arg(long, default_value = "0")]
        clicks: u32,
        /// Print the full text frame instead of one line per frame
        #[arg(long)]
        full: bool,
    },
}

fn parse_pair<T: std::str::FromStr>(s: &str) -> Result<(T, T), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<T>()
            .map_err(|_| format!("not a number: {v:?}"))
    };
    Ok((parse(a)?, parse(b)?))
}

fn parse_size(s: &str) -> Result<(f32, f32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|_| format!("not a number: {v:?}"))
    };
    Ok((parse(w)?, parse(h)?))
}

fn fmt_vec(v: Vec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

fn run_scene(config: DemoConfig) -> anyhow::Result<()> {
    let font = donutfield_assets::load_font(&config.assets.font)
        .with_context(|| format!("loading font {}", config.assets.font.display()))?;

    let mut scene = Scene::new();
    let mut builder = SceneBuilder::new(config.scene.clone());
    builder.on_font_loaded(&mut scene, &font);

    println!("{}", scene.summary());
    println!("State: {:?}", builder.state());
    for mesh in scene.meshes_of(MeshKind::Text) {
        if let Some(bounds) = scene.geometry(mesh.geometry).and_then(|g| g.bounding_box()) {
            println!(
                "Text bounds: min={} max={}",
                fmt_vec(bounds.min),
                fmt_vec(bounds.max)
            );
        }
    }

    let mut donuts = scene.meshes_of(MeshKind::Donut).peekable();
    if donuts.peek().is_some() {
        let (mut min, mut max) = (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY));
        let (mut smallest, mut largest) = (f32::INFINITY, 0.0f32);
        for d in donuts {
            min = min.min(d.transform.position);
            max = max.max(d.transform.position);
            smallest = smallest.min(d.transform.scale);
            largest = largest.max(d.transform.scale);
        }
        println!("Donut positions: min={} max={}", fmt_vec(min), fmt_vec(max));
        println!("Donut scales: {smallest:.3}..{largest:.3}");
    }
    Ok(())
}

fn run_simulate(
    config: DemoConfig,
    frames: u64,
    pointer: Option<(f32, f32)>,
    viewport: (f32, f32),
    clicks: u32,
    full: bool,
) -> anyhow::Result<()> {
    if viewport.0 <= 0.0 || viewport.1 <= 0.0 {
        let (w, h) = viewport;
        bail!("viewport must be positive, got {w}x{h}");
    }
    info!(frames, clicks, "simulating {}x{}", viewport.0, viewport.1);
    let mut ctx = AppContext::new(config, ViewportState::new(viewport.0, viewport.1))?;
    ctx.start()?;
    // Headless runs wait for assets so every frame sees the built scene.
    ctx.wait_for_loads(Duration::from_secs(10));

    if let Some((x, y)) = pointer {
        ctx.apply(Action::PointerMoved(PointerSample {
            position: Vec2::new(x, y),
            is_primary: true,
        }))?;
        let offset = ctx.pointer_offset();
        println!("Pointer target: ({:.4}, {:.4})", offset.x, offset.y);
    }
    for _ in 0..clicks {
        let [text, donut] = ctx.randomize_appearance()?;
        println!("Click: text={} donut={}", text.index, donut.index);
    }
    ctx.wait_for_loads(Duration::from_secs(10));

    let mut renderer = DebugTextRenderer::new();
    let stop = ctx.stop_handle();
    if frames == 0 {
        stop.stop();
    }
    while let Some((info, text)) = ctx.frame(&mut renderer) {
        if full {
            print!("{text}");
        } else {
            println!(
                "frame {:>4}  camera={}",
                info.frame,
                fmt_vec(ctx.rig().camera.position)
            );
        }
        if info.frame >= frames {
            stop.stop();
        }
    }

    println!(
        "Selection: text={} donut={}",
        ctx.selector().text_index(),
        ctx.selector().mesh_index()
    );
    println!("State: {:?}", ctx.scene_state());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("donutfield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", donutfield_common::crate_info());
            println!("input: {}", donutfield_input::crate_info());
            println!("assets: {}", donutfield_assets::crate_info());
            println!("scene: {}", donutfield_scene::crate_info());
            println!("render: {}", donutfield_render::crate_info());
            println!("kernel: {}", donutfield_kernel::crate_info());
        }
        Commands::Scene { config } => run_scene(config.resolve()?)?,
        Commands::Simulate {
            config,
            frames,
            pointer,
            viewport,
            clicks,
            full,
        } => run_simulate(config.resolve()?, frames, pointer, viewport, clicks, full)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pointer_pair() {
        assert_eq!(parse_pair::<f32>("600,300"), Ok((600.0, 300.0)));
        assert_eq!(parse_pair::<f32>(" 1.5 , -2 "), Ok((1.5, -2.0)));
        assert!(parse_pair::<f32>("600").is_err());
    }

    #[test]
    fn parses_viewport_size() {
        assert_eq!(parse_size("1000x800"), Ok((1000.0, 800.0)));
        assert_eq!(parse_size("640X480"), Ok((640.0, 480.0)));
        assert!(parse_size("big").is_err());
    }

    #[test]
    fn cli_accepts_simulate_flags() {
        let cli = Cli::try_parse_from([
            "donutfield-cli",
            "simulate",
            "--frames",
            "3",
            "--pointer",
            "600,300",
            "--viewport",
            "1000x800",
            "--seed",
            "4",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate {
                frames,
                pointer,
                viewport,
                config,
                ..
            } => {
                assert_eq!(frames, 3);
                assert_eq!(pointer, Some((600.0, 300.0)));
                assert_eq!(viewport, (1000.0, 800.0));
                assert_eq!(config.seed, Some(4));
            }
            _ => panic!("expected simulate"),
        }
    }
}
