use super::interp::InterpTo;
use crate::chain::Link;
use crate::math::Transform;

/// Exponential smoothing of raw solver output toward the pose shown to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSmoother {
    pub enabled: bool,
}

impl Default for OutputSmoother {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl OutputSmoother {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Moves `current` toward `target` at `speed`.
    ///
    /// Snaps to `target` when smoothing is off or either side holds a non-finite
    /// value, so a bad frame never lingers in the smoothed state.
    pub fn smooth(&self, current: &Transform, target: &Transform, dt: f32, speed: f32) -> Transform {
        if !self.enabled || !current.is_finite() || !target.is_finite() {
            return *target;
        }
        current.interp_to(*target, dt, speed)
    }

    /// Smooths the link's interpolated pose toward its solved pose.
    pub fn smooth_link(&self, link: &mut Link, dt: f32, speed: f32) -> Transform {
        link.interpolated_pose = self.smooth(&link.interpolated_pose, &link.solved_pose, dt, speed);
        link.interpolated_pose
    }
}
