use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for donutfield")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy and tests
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Write numbered placeholder matcaps (`1.png` .. `N.png`)
    Matcaps {
        #[arg(long, default_value = "assets/textures/matcaps")]
        out: PathBuf,
        #[arg(long, default_value = "12")]
        count: u32,
        #[arg(long, default_value = "256")]
        size: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cargo("fmt", &["fmt", "--all", "--", "--check"])?;
            cargo("clippy", CLIPPY)?;
            cargo("test", &["test", "--workspace"])?;
        }
        Commands::Fmt => cargo("fmt", &["fmt", "--all", "--", "--check"])?,
        Commands::Clippy => cargo("clippy", CLIPPY)?,
        Commands::Test => cargo("test", &["test", "--workspace"])?,
        Commands::Matcaps { out, count, size } => write_matcaps(&out, count, size)?,
    }

    Ok(())
}

const CLIPPY: &[&str] = &[
    "clippy",
    "--workspace",
    "--all-targets",
    "--",
    "-D",
    "warnings",
];

fn cargo(step: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {step}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {step} failed");
    }
    Ok(())
}

fn write_matcaps(out: &Path, count: u32, size: u32) -> Result<()> {
    std::fs::create_dir_all(out)
        .with_context(|| format!("creating {}", out.display()))?;
    for index in 1..=count {
        let hue = (index - 1) as f32 / count.max(1) as f32;
        let path = out.join(format!("{index}.png"));
        matcap(size, hue)
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

/// A lit sphere seen head-on: diffuse in the given hue plus a white highlight.
fn matcap(size: u32, hue: f32) -> RgbaImage {
    let base = hue_to_rgb(hue);
    let light = normalize([-0.4, 0.5, 0.75]);
    let radius = size as f32 / 2.0;

    RgbaImage::from_fn(size, size, |x, y| {
        let nx = (x as f32 + 0.5 - radius) / radius;
        let ny = (radius - y as f32 - 0.5) / radius;
        // Outside the disc repeat the silhouette normal.
        let r2 = nx * nx + ny * ny;
        let (nx, ny, nz) = if r2 >= 1.0 {
            let r = r2.sqrt();
            (nx / r, ny / r, 0.0)
        } else {
            (nx, ny, (1.0 - r2).sqrt())
        };
        let n = [nx, ny, nz];
        let diffuse = dot(n, light).max(0.0);
        // Reflection of the light about n, viewed along +z.
        let d = dot(n, light);
        let reflect_z = 2.0 * d * nz - light[2];
        let specular = reflect_z.max(0.0).powi(32);

        let shade = |c: f32| ((0.12 + 0.88 * diffuse) * c + specular).clamp(0.0, 1.0);
        Rgba([
            (shade(base[0]) * 255.0) as u8,
            (shade(base[1]) * 255.0) as u8,
            (shade(base[2]) * 255.0) as u8,
            255,
        ])
    })
}

fn hue_to_rgb(hue: f32) -> [f32; 3] {
    let h = hue.rem_euclid(1.0) * 6.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    // Pastel: mix toward white so every matcap reads as a lit surface.
    [0.35 + 0.65 * r, 0.35 + 0.65 * g, 0.35 + 0.65 * b]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = dot(v, v).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luma(p: &Rgba<u8>) -> u32 {
        p.0[..3].iter().map(|&c| c as u32).sum()
    }

    #[test]
    fn matcap_is_square_and_opaque() {
        let img = matcap(32, 0.0);
        assert_eq!(img.dimensions(), (32, 32));
        assert!(img.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn lit_side_brighter_than_shadow_side() {
        let img = matcap(64, 0.3);
        let lit = img.get_pixel(20, 20);
        let shadow = img.get_pixel(50, 50);
        assert!(luma(lit) > luma(shadow));
    }

    #[test]
    fn writes_numbered_files() {
        let dir = std::env::temp_dir().join(format!("donutfield-xtask-{}", std::process::id()));
        write_matcaps(&dir, 3, 8).unwrap();
        for i in 1..=3 {
            let img = image::open(dir.join(format!("{i}.png"))).unwrap();
            assert_eq!(img.width(), 8);
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
