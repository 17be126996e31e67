//! Time-dependent blending: exponential interpolation, output smoothing and
//! the warm-up/reset state machine.

mod interp;
mod smoother;
mod warmup;

pub use interp::InterpTo;
pub use smoother::OutputSmoother;
pub use warmup::{WarmupBlender, WarmupInput, WarmupState, BOOTSTRAP_FRAMES, MIN_MASTER_ALPHA};
