use glam::Vec3;

use crate::chain::Link;
use crate::config::StabilityAnchor;
use crate::math::vector::height;
use crate::math::Transform;

/// Keeps a designated core link planted under the owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityAdjuster {
    pub anchor: StabilityAnchor,
    /// Component-space axes.
    pub up: Vec3,
    pub forward: Vec3,
}

impl StabilityAdjuster {
    pub fn new(anchor: StabilityAnchor, up: Vec3, forward: Vec3) -> Self {
        Self {
            anchor,
            up,
            forward,
        }
    }

    /// Where the core link should sit, in component space: its own height, on
    /// the owner's up axis, shifted along forward by the calibration.
    pub fn reference(&self, core_cs: Vec3) -> Vec3 {
        self.up * height(core_cs, self.up) + self.forward * self.anchor.calibration
    }

    /// Translates every solved link by the offset that moves the core link onto
    /// its reference. Returns the world-space offset applied.
    pub fn adjust(&self, links: &mut [Link], owner: &Transform) -> Vec3 {
        let Some(core_index) = links.len().checked_sub(1).map(|last| self.anchor.core_index.min(last)) else {
            return Vec3::ZERO;
        };

        let core_world = links[core_index].position();
        let core_cs = owner.inverse().transform_point(core_world);
        let reference_world = owner.transform_point(self.reference(core_cs));
        let offset = reference_world - core_world;
        if !offset.is_finite() {
            return Vec3::ZERO;
        }

        for link in links.iter_mut() {
            link.solved_pose.position += offset;
        }
        offset
    }
}
