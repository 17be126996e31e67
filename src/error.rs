use thiserror::Error;

use crate::chain::LinkId;

/// Reasons a solver instance cannot evaluate this frame.
///
/// Every variant is recoverable: the driver reports it and the host keeps
/// its base pose for the frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("chain needs at least 2 links, {configured} configured")]
    TooFewLinks { configured: usize },

    #[error("bone '{name}' does not exist in the skeleton")]
    UnresolvedBone { name: String },

    #[error("link {link:?} is outside the base pose ({pose_len} bones)")]
    BoneOutOfRange { link: LinkId, pose_len: usize },

    #[error("path precision must be > 0, got {0}")]
    NonPositivePrecision(f32),

    #[error("{setting} must be >= 0, got {value}")]
    NegativeSetting { setting: &'static str, value: f32 },
}
