use glam::{Quat, Vec3};

/// Rigid transform with per-axis scale.
///
/// Composition follows the "child first" convention used by skeletal poses:
/// `local.then(&parent)` maps a point through `local` and then through `parent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (point * self.scale) + self.position
    }

    pub fn transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }

    /// Applies `self` first, then `parent`.
    pub fn then(&self, parent: &Transform) -> Self {
        Self {
            position: parent.transform_point(self.position),
            rotation: (parent.rotation * self.rotation).normalize(),
            scale: self.scale * parent.scale,
        }
    }

    /// Expresses `self` in the space of `parent`. Exact inverse of [`Transform::then`].
    pub fn relative_to(&self, parent: &Transform) -> Self {
        let inv_rotation = parent.rotation.inverse();
        let inv_scale = safe_recip(parent.scale);
        Self {
            position: (inv_rotation * (self.position - parent.position)) * inv_scale,
            rotation: (inv_rotation * self.rotation).normalize(),
            scale: self.scale * inv_scale,
        }
    }

    /// Inverse for uniformly scaled transforms; non-uniform scale is inverted per axis
    /// without shear.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        let scale = safe_recip(self.scale);
        Self {
            position: (rotation * -self.position) * scale,
            rotation,
            scale,
        }
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }

    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
    }
}

fn safe_recip(v: Vec3) -> Vec3 {
    Vec3::new(
        if v.x.abs() > f32::EPSILON { 1.0 / v.x } else { 0.0 },
        if v.y.abs() > f32::EPSILON { 1.0 / v.y } else { 0.0 },
        if v.z.abs() > f32::EPSILON { 1.0 / v.z } else { 0.0 },
    )
}
