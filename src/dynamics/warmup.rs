use glam::Vec3;

use super::interp::InterpTo;
use crate::config::{BlendSpeeds, Warmup};
use crate::frame::EvalContext;

/// Below this master blend input the solver is treated as switched off.
pub const MIN_MASTER_ALPHA: f32 = 0.01;
/// Frames after (re)initialization during which the solver stays at rest.
pub const BOOTSTRAP_FRAMES: u32 = 10;
const FRAME_COUNTER_CAP: u32 = 20;
const SNAP_ALPHA: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmupState {
    /// Nothing accumulated yet; output equals the base pose.
    Dormant,
    /// Easing in as the owner travels.
    WarmingUp,
    /// Fully blended into the solved pose.
    Active,
    /// Decaying back toward the base pose.
    Resetting,
}

/// Per-frame inputs to [`WarmupBlender::update`].
#[derive(Debug, Clone, Copy)]
pub struct WarmupInput {
    pub dt: f32,
    pub owner_position: Vec3,
    pub master_alpha: f32,
    pub reset_requested: bool,
    pub context: EvalContext,
}

/// Eases the chain in from the base pose once the owner has travelled far
/// enough, and back out on reset.
#[derive(Debug, Clone)]
pub struct WarmupBlender {
    mode: Warmup,
    reset_on_speed: f32,
    reset_off_speed: f32,
    alpha: f32,
    /// Blend between the base pose (0) and the solver (1), independent of the
    /// warm-up mode. Falls while gated and rises again once the gate opens.
    reset_alpha: f32,
    resetting: bool,
    gated: bool,
    frames_since_init: u32,
    travel: f32,
    previous_owner: Option<Vec3>,
}

impl WarmupBlender {
    pub fn new(mode: Warmup, speeds: &BlendSpeeds) -> Self {
        Self {
            mode,
            reset_on_speed: speeds.reset_on,
            reset_off_speed: speeds.reset_off,
            alpha: 0.0,
            reset_alpha: 0.0,
            resetting: false,
            gated: true,
            frames_since_init: 0,
            travel: 0.0,
            previous_owner: None,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn reset_alpha(&self) -> f32 {
        self.reset_alpha
    }

    pub fn accumulated_travel(&self) -> f32 {
        self.travel
    }

    pub fn frames_since_init(&self) -> u32 {
        self.frames_since_init
    }

    pub fn is_resetting(&self) -> bool {
        self.resetting
    }

    /// True while a reset, a near-zero master alpha or the bootstrap window holds
    /// the chain at its base pose.
    pub fn is_gated(&self) -> bool {
        self.gated
    }

    pub fn is_bootstrapping(&self) -> bool {
        self.frames_since_init < BOOTSTRAP_FRAMES
    }

    pub fn state(&self) -> WarmupState {
        if self.resetting {
            WarmupState::Resetting
        } else if self.alpha <= 0.0 {
            WarmupState::Dormant
        } else if self.alpha < 1.0 {
            WarmupState::WarmingUp
        } else {
            WarmupState::Active
        }
    }

    /// Restarts the bootstrap window, e.g. after the skeleton was rebound.
    pub fn reinitialize(&mut self) {
        self.frames_since_init = 0;
        self.previous_owner = None;
    }

    pub fn update(&mut self, input: &WarmupInput) -> WarmupState {
        let before = self.state();

        self.gated = input.reset_requested
            || input.master_alpha < MIN_MASTER_ALPHA
            || self.is_bootstrapping();
        if self.gated {
            self.resetting = true;
            self.reset_alpha = self.reset_alpha.interp_to(0.0, input.dt, self.reset_on_speed);
        } else {
            self.reset_alpha = self.reset_alpha.interp_to(1.0, input.dt, self.reset_off_speed);
        }

        let moved = self
            .previous_owner
            .map(|previous| previous.distance(input.owner_position))
            .unwrap_or(0.0);
        self.previous_owner = Some(input.owner_position);

        if self.resetting {
            self.travel = self.travel.interp_to(0.0, input.dt, self.reset_on_speed);
            self.alpha = self.alpha.interp_to(0.0, input.dt, self.reset_on_speed);
            if !self.gated && self.travel <= 0.0 && self.alpha <= 0.0 {
                self.resetting = false;
            }
        } else {
            self.travel += moved;
            self.alpha = match self.mode {
                Warmup::Distance { threshold } if threshold > 0.0 => {
                    self.alpha.max(self.travel / threshold).min(1.0)
                }
                _ => 1.0,
            };
        }

        if input.context == EvalContext::Preview && !input.reset_requested {
            self.alpha = 1.0;
        }

        self.frames_since_init = (self.frames_since_init + 1).min(FRAME_COUNTER_CAP);

        let after = self.state();
        if after != before {
            log::debug!("warm-up {:?} -> {:?} (alpha {:.3})", before, after, self.alpha);
        }
        after
    }

    /// Blend weight between base pose (0) and solved pose (1). The reset blend
    /// applies in every mode, so a reset always eases back to the base pose.
    pub fn weight(&self, master_alpha: f32) -> f32 {
        let master = master_alpha.clamp(0.0, 1.0);
        match self.mode {
            Warmup::Disabled => self.reset_alpha * master,
            Warmup::Distance { .. } => self.reset_alpha * self.alpha * master,
        }
    }

    /// Smoothing speed for this frame: the reset rate while resetting, otherwise a
    /// rate that ramps from the reset-off speed to the general speed over the
    /// upper half of the warm-up.
    pub fn smoothing_speed(&self, speeds: &BlendSpeeds) -> f32 {
        if self.resetting || self.is_bootstrapping() {
            return speeds.reset_on;
        }
        let t = ((self.alpha - 0.5) / 0.5).clamp(0.0, 1.0);
        speeds.reset_off + (speeds.interpolation - speeds.reset_off) * t
    }

    /// Whether the smoothed pose should jump straight to the solved pose.
    pub fn should_snap(&self) -> bool {
        self.is_bootstrapping() || self.alpha <= SNAP_ALPHA
    }
}
