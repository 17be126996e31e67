use glam::Vec3;

/// Ray with a valid parameter range `[t_min, t_max]`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub t_min: f32,
    pub t_max: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            t_min: 0.0,
            t_max: f32::MAX,
        }
    }

    /// Segment from `from` to `to`; a zero-length segment never hits anything.
    pub fn between_points(from: Vec3, to: Vec3) -> Self {
        let direction = to - from;
        let length = direction.length();
        if length < 0.0001 {
            return Self {
                origin: from,
                direction: Vec3::Y,
                t_min: 1.0,
                t_max: 0.0,
            };
        }
        Self {
            origin: from,
            direction: direction / length,
            t_min: 0.0,
            t_max: length,
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn is_empty(&self) -> bool {
        self.t_max < self.t_min
    }

    pub fn accepts(&self, t: f32) -> bool {
        t >= self.t_min && t <= self.t_max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_range_matches_length() {
        let ray = Ray::between_points(Vec3::new(0.0, 150.0, 0.0), Vec3::ZERO);
        assert_eq!(ray.direction, Vec3::NEG_Y);
        assert_eq!(ray.t_max, 150.0);
        assert_eq!(ray.at(150.0), Vec3::ZERO);
        assert!(ray.accepts(150.0));
        assert!(!ray.accepts(150.5));
    }

    #[test]
    fn degenerate_segment_is_empty() {
        let ray = Ray::between_points(Vec3::ONE, Vec3::ONE);
        assert!(ray.is_empty());
        assert!(!ray.accepts(0.0));
    }
}
