use glam::Vec3;

use super::skeleton::LinkId;
use crate::collision::TraceResult;
use crate::math::Transform;

/// Ground-adaptive state carried by a link between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    pub last_hit_position: Vec3,
    /// Blend toward `last_hit_position`, 0 = base pose.
    pub hit_alpha: f32,
    pub last_trace: TraceResult,
}

impl GroundContact {
    pub fn at(position: Vec3) -> Self {
        Self {
            last_hit_position: position,
            hit_alpha: 0.0,
            last_trace: TraceResult::clear(),
        }
    }
}

/// One rigid segment of a chain. Poses are world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub identity: LinkId,
    /// This frame's base pose.
    pub original_pose: Transform,
    /// Raw solver output.
    pub solved_pose: Transform,
    /// Smoothed output.
    pub interpolated_pose: Transform,
    /// Distance to the tip-ward neighbour; zero on the tip.
    pub segment_length: f32,
    /// Last non-degenerate direction toward the tip-ward neighbour.
    pub heading: Vec3,
    pub ground: GroundContact,
}

impl Link {
    pub fn new(identity: LinkId, pose: Transform) -> Self {
        Self {
            identity,
            original_pose: pose,
            solved_pose: pose,
            interpolated_pose: pose,
            segment_length: 0.0,
            heading: Vec3::X,
            ground: GroundContact::at(pose.position),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.solved_pose.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.solved_pose.position = position;
    }

    /// Drops solver state back onto the base pose.
    pub fn snap_to_original(&mut self) {
        self.solved_pose = self.original_pose;
        self.interpolated_pose = self.original_pose;
    }
}
