use glam::{Quat, Vec3};

use crate::math::Transform;

const SNAP_DISTANCE_SQ: f32 = 1.0e-8;

/// Frame-rate independent exponential approach toward a target.
///
/// Each call closes `clamp(dt * speed, 0, 1)` of the remaining gap; once the gap
/// is negligible the target is returned exactly, so a held target is reached in
/// a bounded number of steps. A non-positive speed jumps straight to the target.
pub trait InterpTo: Clone + Copy {
    fn interp_to(self, target: Self, dt: f32, speed: f32) -> Self;
}

fn step_fraction(dt: f32, speed: f32) -> f32 {
    (dt * speed).clamp(0.0, 1.0)
}

impl InterpTo for f32 {
    fn interp_to(self, target: Self, dt: f32, speed: f32) -> Self {
        if speed <= 0.0 {
            return target;
        }
        let dist = target - self;
        if dist * dist < SNAP_DISTANCE_SQ {
            return target;
        }
        self + dist * step_fraction(dt, speed)
    }
}

impl InterpTo for Vec3 {
    fn interp_to(self, target: Self, dt: f32, speed: f32) -> Self {
        if speed <= 0.0 {
            return target;
        }
        let dist = target - self;
        if dist.length_squared() < SNAP_DISTANCE_SQ {
            return target;
        }
        self + dist * step_fraction(dt, speed)
    }
}

impl InterpTo for Quat {
    fn interp_to(self, target: Self, dt: f32, speed: f32) -> Self {
        if speed <= 0.0 {
            return target;
        }
        if self.abs_diff_eq(target, 1.0e-4) || self.abs_diff_eq(-target, 1.0e-4) {
            return target;
        }
        self.slerp(target, step_fraction(dt, speed)).normalize()
    }
}

impl InterpTo for Transform {
    fn interp_to(self, target: Self, dt: f32, speed: f32) -> Self {
        Transform {
            position: self.position.interp_to(target.position, dt, speed),
            rotation: self.rotation.interp_to(target.rotation, dt, speed),
            scale: self.scale.interp_to(target.scale, dt, speed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn scalar_closes_fraction_of_gap() {
        assert_relative_eq!(0.0f32.interp_to(10.0, 0.1, 5.0), 5.0);
        assert_relative_eq!(0.0f32.interp_to(10.0, 1.0, 5.0), 10.0);
        assert_relative_eq!(3.0f32.interp_to(10.0, 0.1, 0.0), 10.0);
    }

    #[test]
    fn held_target_is_reached_exactly() {
        let mut v = Vec3::ZERO;
        let target = Vec3::new(100.0, -20.0, 5.0);
        for _ in 0..400 {
            v = v.interp_to(target, 1.0 / 60.0, 15.0);
        }
        assert_eq!(v, target);
    }

    #[test]
    fn quaternion_moves_toward_target() {
        let target = Quat::from_rotation_z(1.0);
        let half = Quat::IDENTITY.interp_to(target, 0.5, 1.0);
        assert_relative_eq!(half.angle_between(Quat::IDENTITY), 0.5, epsilon = 1e-4);
    }
}
