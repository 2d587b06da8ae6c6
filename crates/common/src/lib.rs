//! Shared types: viewport dimensions, pointer offsets, per-instance transforms.
//!
//! # Invariants
//! - `ViewportState` halves are always exactly half of the full dimensions.
//! - `InstanceTransform` scale is uniform across all three axes.

mod types;

pub use types::{
    InstanceTransform, MAX_PIXEL_RATIO, MaterialSlot, PointerOffset, ViewportState,
    clamp_pixel_ratio,
};

pub fn crate_info() -> &'static str {
    "donutfield-common v0.1.0"
}
