//! Configuration records for the chain drivers.
//!
//! Every mode toggle is an enum so call sites read as the behaviour they select.

use glam::{Quat, Vec3};

use crate::collision::TraceShape;
use crate::error::ChainError;
use crate::math::ResponseCurve;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveMode {
    /// Replays the recorded path of the target, like cars on a track.
    Strict,
    /// Each link follows the direction toward its tip-ward neighbour.
    #[default]
    Unstrict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootMode {
    #[default]
    Free,
    /// The root stays at its base-pose position (unstrict only).
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeightMode {
    Free,
    /// Vertical motion is removed; the chain lives at the target's height.
    #[default]
    GroundLimited,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalization {
    Off,
    /// Link directions drift back toward the owner's forward heading at `speed`,
    /// scaled by `velocity_curve` evaluated at the owner's speed.
    Continuous {
        speed: f32,
        velocity_curve: ResponseCurve,
    },
}

impl Default for Normalization {
    fn default() -> Self {
        Self::Off
    }
}

impl Normalization {
    pub fn continuous(speed: f32) -> Self {
        Self::Continuous {
            speed,
            velocity_curve: ResponseCurve::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Warmup {
    Disabled,
    /// Blend in over this much owner travel distance.
    Distance { threshold: f32 },
}

impl Default for Warmup {
    fn default() -> Self {
        Self::Distance { threshold: 700.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoseMode {
    /// Output the solved transforms directly.
    #[default]
    Absolute,
    /// Apply the solver's bend as a delta on top of the animated base pose.
    PreserveOriginal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Smoothing {
    Off,
    #[default]
    Exponential,
}

/// Smoothing rates, in 1/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendSpeeds {
    pub interpolation: f32,
    /// Rate used while resetting toward the base pose.
    pub reset_on: f32,
    /// Rate used when easing back in after a reset.
    pub reset_off: f32,
}

impl Default for BlendSpeeds {
    fn default() -> Self {
        Self {
            interpolation: 25.0,
            reset_on: 15.0,
            reset_off: 5.0,
        }
    }
}

/// Link held in place against systematic drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityAnchor {
    pub core_index: usize,
    /// Offset of the anchor along the forward axis.
    pub calibration: f32,
}

/// How the effector transform is interpreted before solving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectorCalibration {
    /// Divide the target scale by the scale seen on the first frame.
    pub scale_add: bool,
    /// Express the target rotation relative to the rotation seen on the first frame.
    pub rotation_add: bool,
    /// Remove the owner's rotation from the target rotation (unstrict only).
    pub rotation_relative_to_owner: bool,
    /// Pre-multiplied onto the target rotation.
    pub tip_rotation_offset: Quat,
}

impl Default for EffectorCalibration {
    fn default() -> Self {
        Self {
            scale_add: true,
            rotation_add: false,
            rotation_relative_to_owner: true,
            tip_rotation_offset: Quat::IDENTITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainFollowConfig {
    pub mode: SolveMode,
    pub root: RootMode,
    pub height: HeightMode,
    pub normalization: Normalization,
    pub warmup: Warmup,
    pub pose: PoseMode,
    pub smoothing: Smoothing,
    pub speeds: BlendSpeeds,
    /// Minimum target travel between two recorded path samples.
    pub precision: f32,
    /// Blend rotations and scales of neighbouring path samples.
    pub smooth_path: bool,
    /// Component-space forward axis of the creature.
    pub forward_axis: Vec3,
    /// Component-space up axis.
    pub up_axis: Vec3,
    pub stability: Option<StabilityAnchor>,
    pub effector: EffectorCalibration,
    pub overall_rotation_offset: Quat,
    pub per_link_rotation_offsets: Vec<Quat>,
}

impl Default for ChainFollowConfig {
    fn default() -> Self {
        Self {
            mode: SolveMode::default(),
            root: RootMode::default(),
            height: HeightMode::default(),
            normalization: Normalization::default(),
            warmup: Warmup::default(),
            pose: PoseMode::default(),
            smoothing: Smoothing::default(),
            speeds: BlendSpeeds::default(),
            precision: 1.0,
            smooth_path: true,
            forward_axis: Vec3::X,
            up_axis: Vec3::Y,
            stability: None,
            effector: EffectorCalibration::default(),
            overall_rotation_offset: Quat::IDENTITY,
            per_link_rotation_offsets: Vec::new(),
        }
    }
}

impl ChainFollowConfig {
    pub fn strict() -> Self {
        Self {
            mode: SolveMode::Strict,
            ..Default::default()
        }
    }

    pub fn unstrict() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: RootMode) -> Self {
        self.root = root;
        self
    }

    pub fn with_height(mut self, height: HeightMode) -> Self {
        self.height = height;
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_warmup(mut self, warmup: Warmup) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_pose(mut self, pose: PoseMode) -> Self {
        self.pose = pose;
        self
    }

    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_speeds(mut self, speeds: BlendSpeeds) -> Self {
        self.speeds = speeds;
        self
    }

    pub fn with_precision(mut self, precision: f32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_axes(mut self, forward: Vec3, up: Vec3) -> Self {
        self.forward_axis = forward.normalize_or_zero();
        self.up_axis = up.normalize_or_zero();
        self
    }

    pub fn with_stability(mut self, anchor: StabilityAnchor) -> Self {
        self.stability = Some(anchor);
        self
    }

    pub fn with_effector(mut self, effector: EffectorCalibration) -> Self {
        self.effector = effector;
        self
    }

    pub fn with_rotation_offsets(mut self, overall: Quat, per_link: Vec<Quat>) -> Self {
        self.overall_rotation_offset = overall;
        self.per_link_rotation_offsets = per_link;
        self
    }

    pub fn ground_limited(&self) -> bool {
        self.height == HeightMode::GroundLimited
    }

    pub fn validate(&self) -> Result<(), ChainError> {
        if !(self.precision > 0.0) {
            return Err(ChainError::NonPositivePrecision(self.precision));
        }
        Ok(())
    }
}

/// When ground traces fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceThrottle {
    /// Seconds between trace rounds.
    pub interval: f32,
    /// Intervals for detail levels 0, 1 and 2+, overriding `interval` when set.
    pub per_detail_level: Option<[f32; 3]>,
    /// Traces stop beyond this camera distance; cached results are reused.
    pub max_camera_distance: Option<f32>,
}

impl Default for TraceThrottle {
    fn default() -> Self {
        Self {
            interval: 0.1,
            per_detail_level: None,
            max_camera_distance: None,
        }
    }
}

impl TraceThrottle {
    pub fn with_detail_levels(mut self) -> Self {
        self.per_detail_level = Some([0.1, 0.2, 0.5]);
        self
    }

    pub fn with_max_camera_distance(mut self, distance: f32) -> Self {
        self.max_camera_distance = Some(distance);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TailConfig {
    /// Component-space up axis.
    pub up_axis: Vec3,
    /// Gap kept between a link and the surface under it.
    pub float_height: f32,
    /// Per-link gaps; links past the end use `float_height`.
    pub per_link_heights: Vec<f32>,
    pub trace_up: f32,
    pub trace_down: f32,
    pub shape: TraceShape,
    /// Rate at which a link blends onto a surface it hit.
    pub block_speed: f32,
    /// Rate at which a link returns to its base pose once clear.
    pub unblock_speed: f32,
    pub interpolation_speed: f32,
    pub throttle: TraceThrottle,
    /// Keep the root on its base pose and never trace it.
    pub pin_root: bool,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            up_axis: Vec3::Y,
            float_height: 100.0,
            per_link_heights: Vec::new(),
            trace_up: 1000.0,
            trace_down: 0.0,
            shape: TraceShape::Line,
            block_speed: 5.0,
            unblock_speed: 5.0,
            interpolation_speed: 25.0,
            throttle: TraceThrottle::default(),
            pin_root: false,
        }
    }
}

impl TailConfig {
    pub fn with_float_height(mut self, height: f32) -> Self {
        self.float_height = height;
        self
    }

    pub fn with_per_link_heights(mut self, heights: Vec<f32>) -> Self {
        self.per_link_heights = heights;
        self
    }

    pub fn with_trace_heights(mut self, up: f32, down: f32) -> Self {
        self.trace_up = up;
        self.trace_down = down;
        self
    }

    pub fn with_shape(mut self, shape: TraceShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_blend_speeds(mut self, block: f32, unblock: f32) -> Self {
        self.block_speed = block;
        self.unblock_speed = unblock;
        self
    }

    pub fn with_throttle(mut self, throttle: TraceThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_pinned_root(mut self, pin: bool) -> Self {
        self.pin_root = pin;
        self
    }

    pub fn link_height(&self, index: usize) -> f32 {
        self.per_link_heights
            .get(index)
            .copied()
            .unwrap_or(self.float_height)
    }

    /// Trace distances, blend speeds and the trace radius must be non-negative.
    pub fn validate(&self) -> Result<(), ChainError> {
        let radius = match self.shape {
            TraceShape::Line => 0.0,
            TraceShape::Sphere { radius } => radius,
        };
        let settings = [
            ("trace_up", self.trace_up),
            ("trace_down", self.trace_down),
            ("block_speed", self.block_speed),
            ("unblock_speed", self.unblock_speed),
            ("interpolation_speed", self.interpolation_speed),
            ("trace radius", radius),
        ];
        match settings.into_iter().find(|&(_, value)| !(value >= 0.0)) {
            Some((setting, value)) => Err(ChainError::NegativeSetting { setting, value }),
            None => Ok(()),
        }
    }
}
