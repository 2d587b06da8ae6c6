//! Assets: matcap selection, font and image loading off the main thread.
//!
//! Loads run on a single background worker. Results come back over a channel
//! and are applied by the caller between frames, so scene mutation stays on
//! the event-loop thread.

mod loader;
mod selector;

pub use loader::{
    AssetLoader, FontAsset, LoadEvent, LoadRequest, MatcapImage, load_font, load_matcap,
};
pub use selector::{ReloadRequest, TextureSelector};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Expected matcap edge length in pixels; other sizes load with a warning.
pub const MATCAP_SIZE: u32 = 256;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid font {path}: {reason}")]
    InvalidFont { path: PathBuf, reason: String },
    #[error("asset worker is not running")]
    WorkerGone,
}

/// Where assets live on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    /// TrueType/OpenType font used for the extruded text.
    pub font: PathBuf,
    /// Directory holding `<index>.png` matcaps.
    pub matcap_dir: PathBuf,
    /// Number of numbered matcaps available, starting at 1.
    pub matcap_count: u32,
    /// Index both materials start with.
    pub default_matcap: u32,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            font: PathBuf::from("assets/fonts/font.ttf"),
            matcap_dir: PathBuf::from("assets/textures/matcaps"),
            matcap_count: 12,
            default_matcap: 3,
        }
    }
}

pub fn crate_info() -> &'static str {
    "donutfield-assets v0.1.0"
}
