//! Kernel: owns all logical state of the demo and steps it once per frame.
//!
//! # Invariants
//! - All scene, camera and texture mutation happens on the caller's thread.
//! - Completed asset loads are applied before the camera update of a frame,
//!   never during rendering.
//! - A stopped frame loop never renders again.

pub mod config;
pub mod context;
pub mod frame;

pub use config::{ConfigOverrides, DemoConfig};
pub use context::AppContext;
pub use frame::{FrameClock, FrameControl, FrameInfo, FrameLoop, StopHandle};

use std::path::PathBuf;

/// Errors from the application context.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error(transparent)]
    Asset(#[from] donutfield_assets::AssetError),
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn crate_info() -> &'static str {
    "donutfield-kernel v0.1.0"
}
