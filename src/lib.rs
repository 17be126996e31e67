//! # chain-follow-ik
//!
//! Procedural follow-the-leader animation for creature spines and tails.
//!
//! A chain of rigid links is refreshed from the animated base pose every tick and
//! steered toward an effector, either by replaying the effector's recorded path
//! (strict mode, for dragons and centipedes) or by letting every link look at its
//! neighbour (unstrict mode). A separate ground-adaptive solver rests tails on
//! the surface under them using throttled traces. Results are eased in by a
//! warm-up state machine and smoothed before they go back to the host.
//!
//! ## Features
//! - Strict and unstrict chain solvers with rigid segment lengths
//! - Ground-adaptive tail driven by any [`SurfaceQuery`]
//! - Warm-up/reset blending and NaN-safe output smoothing
//! - Pass-through on configuration errors, never a partial pose
//!
//! ## Example
//! ```rust
//! use chain_follow_ik::{ChainFollowConfig, ChainFollowSolver, Effector, FrameInput, LinkId, Transform};
//! use glam::Vec3;
//!
//! let base_pose: Vec<Transform> = (0..4)
//!     .map(|i| Transform::from_position(Vec3::X * 10.0 * i as f32))
//!     .collect();
//! let mut solver = ChainFollowSolver::new(
//!     ChainFollowConfig::unstrict(),
//!     (0..4).map(LinkId).collect(),
//! );
//!
//! let target = Effector::world(Transform::from_position(Vec3::new(40.0, 0.0, 5.0)));
//! let frame = FrameInput::new(1.0 / 60.0, Transform::IDENTITY, &base_pose, target);
//! let bones = solver.evaluate(&frame).expect("valid chain");
//! assert_eq!(bones.len(), 4);
//! ```

pub mod chain;
pub mod collision;
pub mod config;
pub mod dynamics;
pub mod error;
pub mod frame;
pub mod math;
pub mod node;
pub mod output;
pub mod solver;

pub use chain::{resolve_links, ChainModel, Link, LinkId, NamedSkeleton, Skeleton};
pub use collision::{
    AabbObstacle, Obstacle, ObstacleWorld, QueryError, Ray, RayHit, SphereObstacle, SurfaceQuery,
    TraceResult, TraceShape,
};
pub use config::{
    BlendSpeeds, ChainFollowConfig, EffectorCalibration, HeightMode, Normalization, PoseMode,
    RootMode, Smoothing, SolveMode, StabilityAnchor, TailConfig, TraceThrottle, Warmup,
};
pub use dynamics::{InterpTo, OutputSmoother, WarmupBlender, WarmupState};
pub use error::ChainError;
pub use frame::{Effector, EvalContext, FrameInput, TailFrame, TargetSpace};
pub use math::{ResponseCurve, Transform};
pub use node::{ChainFollowSolver, TailSolver};
pub use output::{pack, write_back, BoneTransform, PackedBoneTransform};
