use glam::Vec3;
use std::fmt::Debug;

use super::raycast::{Ray, RayHit};

/// Static shape a surface query can hit.
pub trait Obstacle: Send + Sync + Debug {
    /// Outward normal of the surface point closest to `point`.
    fn surface_normal(&self, point: Vec3) -> Vec3;
    /// First hit of `ray` against this shape grown by `inflate` on every side.
    fn ray_intersect(&self, ray: &Ray, inflate: f32) -> Option<RayHit>;
    fn clone_box(&self) -> Box<dyn Obstacle>;
}

impl Clone for Box<dyn Obstacle> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SphereObstacle {
    pub center: Vec3,
    pub radius: f32,
}

impl SphereObstacle {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Obstacle for SphereObstacle {
    fn surface_normal(&self, point: Vec3) -> Vec3 {
        let n = (point - self.center).normalize_or_zero();
        if n == Vec3::ZERO {
            Vec3::Y
        } else {
            n
        }
    }

    fn ray_intersect(&self, ray: &Ray, inflate: f32) -> Option<RayHit> {
        let radius = self.radius + inflate;
        let oc = ray.origin - self.center;
        let b = oc.dot(ray.direction);
        let c = oc.dot(oc) - radius * radius;
        let discriminant = b * b - c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        [-b - sqrt_d, -b + sqrt_d]
            .into_iter()
            .find(|&t| ray.accepts(t))
            .map(|t| {
                let point = ray.at(t);
                RayHit {
                    t,
                    point,
                    normal: self.surface_normal(point),
                }
            })
    }

    fn clone_box(&self) -> Box<dyn Obstacle> {
        Box::new(*self)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AabbObstacle {
    pub min: Vec3,
    pub max: Vec3,
}

impl AabbObstacle {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

impl Obstacle for AabbObstacle {
    fn surface_normal(&self, point: Vec3) -> Vec3 {
        let p = (point - self.center()) / self.half_extents().max(Vec3::splat(0.0001));

        let abs_p = p.abs();
        if abs_p.x > abs_p.y && abs_p.x > abs_p.z {
            Vec3::X * p.x.signum()
        } else if abs_p.y > abs_p.z {
            Vec3::Y * p.y.signum()
        } else {
            Vec3::Z * p.z.signum()
        }
    }

    fn ray_intersect(&self, ray: &Ray, inflate: f32) -> Option<RayHit> {
        let grown = AabbObstacle::new(self.min - Vec3::splat(inflate), self.max + Vec3::splat(inflate));
        let inv = |d: f32| if d.abs() > 0.0001 { 1.0 / d } else { f32::MAX };
        let inv_dir = Vec3::new(inv(ray.direction.x), inv(ray.direction.y), inv(ray.direction.z));

        let t1 = (grown.min - ray.origin) * inv_dir;
        let t2 = (grown.max - ray.origin) * inv_dir;

        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();

        if t_near > t_far || t_far < ray.t_min {
            return None;
        }

        let t = if t_near >= ray.t_min { t_near } else { t_far };
        if !ray.accepts(t) {
            return None;
        }

        let point = ray.at(t);
        Some(RayHit {
            t,
            point,
            normal: grown.surface_normal(point),
        })
    }

    fn clone_box(&self) -> Box<dyn Obstacle> {
        Box::new(*self)
    }
}
