//! Chain solving strategies. Each solver writes `solved_pose` on the links it
//! is handed and leaves smoothing to the caller.

mod ground;
mod path;
mod stability;
mod strict;
mod unstrict;

pub use ground::{GroundAdaptiveSolver, GroundContext, GroundSolve};
pub use path::RecordedPath;
pub use stability::StabilityAdjuster;
pub use strict::{StrictPathSolver, StrictSolve};
pub use unstrict::{UnstrictContext, UnstrictDirectionSolver};
