//! Input: primary-pointer tracking and host events mapped to demo actions.
//!
//! # Invariants
//! - Only the primary pointer moves the camera target.
//! - The pointer offset is never clamped to scene bounds.

pub mod action;
pub mod pointer;

pub use action::Action;
pub use pointer::{DEFAULT_SENSITIVITY, PointerId, PointerSample, PointerTracker, PrimaryPointer};

pub fn crate_info() -> &'static str {
    "donutfield-input v0.1.0"
}
