use glam::{Quat, Vec3};

const DEGENERATE_LENGTH_SQ: f32 = 1.0e-8;

/// Normalized `v`, or `None` when it is too short to carry a direction.
pub fn safe_normal(v: Vec3) -> Option<Vec3> {
    let len_sq = v.length_squared();
    if len_sq > DEGENERATE_LENGTH_SQ && len_sq.is_finite() {
        Some(v / len_sq.sqrt())
    } else {
        None
    }
}

pub fn height(point: Vec3, up: Vec3) -> f32 {
    point.dot(up)
}

/// Replaces the component of `point` along `up` with `height`.
pub fn with_height(point: Vec3, up: Vec3, height: f32) -> Vec3 {
    point - up * point.dot(up) + up * height
}

/// Removes the component of `v` along `up`.
pub fn flatten(v: Vec3, up: Vec3) -> Vec3 {
    v - up * v.dot(up)
}

/// Shortest rotation taking direction `from` onto direction `to`.
///
/// Both inputs are normalized here; a degenerate input yields the identity.
pub fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    match (safe_normal(from), safe_normal(to)) {
        (Some(from), Some(to)) => Quat::from_rotation_arc(from, to),
        _ => Quat::IDENTITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_normal_rejects_zero() {
        assert_eq!(safe_normal(Vec3::ZERO), None);
        assert_eq!(safe_normal(Vec3::new(0.0, 3.0, 0.0)), Some(Vec3::Y));
    }

    #[test]
    fn height_replacement_keeps_horizontal_part() {
        let p = Vec3::new(4.0, 7.0, -2.0);
        let q = with_height(p, Vec3::Y, 20.0);
        assert_eq!(q, Vec3::new(4.0, 20.0, -2.0));
        assert_eq!(flatten(p, Vec3::Y), Vec3::new(4.0, 0.0, -2.0));
    }

    #[test]
    fn rotation_between_maps_axes() {
        let q = rotation_between(Vec3::X, Vec3::new(0.0, 0.0, 5.0));
        assert!((q * Vec3::X).abs_diff_eq(Vec3::Z, 1e-5));
        assert_eq!(rotation_between(Vec3::ZERO, Vec3::Z), Quat::IDENTITY);
    }
}
