use glam::Vec3;

use super::obstacle::{AabbObstacle, Obstacle, SphereObstacle};
use super::query::{QueryError, SurfaceQuery, TraceResult, TraceShape};
use super::raycast::{Ray, RayHit};

/// In-memory set of static obstacles; the crate's reference [`SurfaceQuery`].
#[derive(Default, Clone)]
pub struct ObstacleWorld {
    obstacles: Vec<Box<dyn Obstacle>>,
}

impl ObstacleWorld {
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
        }
    }

    pub fn add<T: Obstacle + 'static>(&mut self, obstacle: T) {
        self.obstacles.push(Box::new(obstacle));
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f32) {
        self.add(SphereObstacle::new(center, radius));
    }

    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) {
        self.add(AabbObstacle::from_center_half_extents(center, half_extents));
    }

    pub fn add_aabb(&mut self, min: Vec3, max: Vec3) {
        self.add(AabbObstacle::new(min, max));
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Closest hit along `ray`, with every obstacle grown by `inflate`.
    pub fn raycast(&self, ray: &Ray, inflate: f32) -> Option<(usize, RayHit)> {
        let mut closest: Option<(usize, RayHit)> = None;

        for (i, obstacle) in self.obstacles.iter().enumerate() {
            if let Some(hit) = obstacle.ray_intersect(ray, inflate) {
                match &closest {
                    None => closest = Some((i, hit)),
                    Some((_, prev_hit)) if hit.t < prev_hit.t => {
                        closest = Some((i, hit));
                    }
                    _ => {}
                }
            }
        }

        closest
    }
}

impl SurfaceQuery for ObstacleWorld {
    fn cast(&self, origin: Vec3, end: Vec3, shape: TraceShape) -> Result<TraceResult, QueryError> {
        let ray = Ray::between_points(origin, end);
        if ray.is_empty() || !origin.is_finite() || !end.is_finite() {
            return Err(QueryError::DegenerateSegment { from: origin, to: end });
        }

        let hit = match shape {
            TraceShape::Line => self.raycast(&ray, 0.0).map(|(_, hit)| hit),
            TraceShape::Sphere { radius } => {
                // Sweep as a ray against grown shapes, then report the contact on
                // the original surface.
                self.raycast(&ray, radius.max(0.0)).map(|(_, hit)| RayHit {
                    point: hit.point - hit.normal * radius.max(0.0),
                    ..hit
                })
            }
        };

        Ok(hit
            .map(|hit| TraceResult::hit(hit.point, hit.normal))
            .unwrap_or_else(TraceResult::clear))
    }
}

impl std::fmt::Debug for ObstacleWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObstacleWorld")
            .field("obstacle_count", &self.obstacles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> ObstacleWorld {
        let mut world = ObstacleWorld::new();
        world.add_aabb(Vec3::new(-1.0e4, -10.0, -1.0e4), Vec3::new(1.0e4, 0.0, 1.0e4));
        world
    }

    #[test]
    fn line_cast_reports_surface_point() {
        let result = ground()
            .cast(Vec3::new(3.0, 150.0, 0.0), Vec3::new(3.0, 0.0, 0.0), TraceShape::Line)
            .unwrap();
        assert!(result.blocked);
        assert_eq!(result.point, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn sphere_cast_contacts_surface() {
        let result = ground()
            .cast(
                Vec3::new(0.0, 150.0, 0.0),
                Vec3::new(0.0, -50.0, 0.0),
                TraceShape::Sphere { radius: 5.0 },
            )
            .unwrap();
        assert!(result.blocked);
        assert!(result.point.abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn closest_obstacle_wins() {
        let mut world = ground();
        world.add_box(Vec3::new(0.0, 20.0, 0.0), Vec3::splat(5.0));
        let result = world
            .cast(Vec3::new(0.0, 100.0, 0.0), Vec3::new(0.0, -5.0, 0.0), TraceShape::Line)
            .unwrap();
        assert_eq!(result.point, Vec3::new(0.0, 25.0, 0.0));
    }

    #[test]
    fn empty_segment_is_an_error() {
        let err = ground().cast(Vec3::ONE, Vec3::ONE, TraceShape::Line);
        assert!(matches!(err, Err(QueryError::DegenerateSegment { .. })));
    }

    #[test]
    fn miss_is_not_blocking() {
        let result = ground()
            .cast(Vec3::new(0.0, 100.0, 0.0), Vec3::new(0.0, 50.0, 0.0), TraceShape::Line)
            .unwrap();
        assert!(!result.blocked);
    }
}
