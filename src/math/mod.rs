//! Math utilities module
//!
//! Provides convenient re-exports from glam plus the transform, vector and curve
//! helpers the solvers share.

mod curve;
mod transform;
pub mod vector;

pub use curve::ResponseCurve;
pub use transform::Transform;

// Re-export commonly used glam types
pub use glam::{Quat, Vec3};
