//! Per-update inputs supplied by the host animation system.

use glam::Vec3;

use crate::math::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvalContext {
    #[default]
    Runtime,
    /// Offline/editor preview: warm-up is skipped.
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetSpace {
    #[default]
    World,
    /// Relative to the owning skeleton instance.
    Component,
}

/// Transform the chain is steered toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effector {
    pub transform: Transform,
    pub space: TargetSpace,
}

impl Effector {
    pub fn world(transform: Transform) -> Self {
        Self {
            transform,
            space: TargetSpace::World,
        }
    }

    pub fn component(transform: Transform) -> Self {
        Self {
            transform,
            space: TargetSpace::Component,
        }
    }

    pub fn to_world(&self, owner: &Transform) -> Transform {
        match self.space {
            TargetSpace::World => self.transform,
            TargetSpace::Component => self.transform.then(owner),
        }
    }
}

/// Inputs for one evaluation of a [`crate::ChainFollowSolver`].
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub dt: f32,
    /// World transform of the owning skeleton instance.
    pub owner: Transform,
    /// World-space velocity of the owner.
    pub owner_velocity: Vec3,
    /// Component-space base pose, indexed by skeleton bone index.
    pub base_pose: &'a [Transform],
    pub effector: Effector,
    pub master_alpha: f32,
    pub reset: bool,
    pub context: EvalContext,
}

impl<'a> FrameInput<'a> {
    pub fn new(dt: f32, owner: Transform, base_pose: &'a [Transform], effector: Effector) -> Self {
        Self {
            dt,
            owner,
            owner_velocity: Vec3::ZERO,
            base_pose,
            effector,
            master_alpha: 1.0,
            reset: false,
            context: EvalContext::Runtime,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.owner_velocity = velocity;
        self
    }

    pub fn with_master_alpha(mut self, alpha: f32) -> Self {
        self.master_alpha = alpha;
        self
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_context(mut self, context: EvalContext) -> Self {
        self.context = context;
        self
    }
}

/// Inputs for one evaluation of a [`crate::TailSolver`].
#[derive(Debug, Clone, Copy)]
pub struct TailFrame<'a> {
    pub dt: f32,
    pub owner: Transform,
    pub base_pose: &'a [Transform],
    /// Current mesh detail level, 0 = highest.
    pub detail_level: u8,
    pub camera_position: Option<Vec3>,
}

impl<'a> TailFrame<'a> {
    pub fn new(dt: f32, owner: Transform, base_pose: &'a [Transform]) -> Self {
        Self {
            dt,
            owner,
            base_pose,
            detail_level: 0,
            camera_position: None,
        }
    }

    pub fn with_detail_level(mut self, level: u8) -> Self {
        self.detail_level = level;
        self
    }

    pub fn with_camera(mut self, position: Vec3) -> Self {
        self.camera_position = Some(position);
        self
    }
}
