use glam::Vec3;
use thiserror::Error;

use crate::config::TraceThrottle;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TraceShape {
    #[default]
    Line,
    Sphere { radius: f32 },
}

impl TraceShape {
    /// Same shape with its size multiplied by `factor`.
    pub fn scaled(self, factor: f32) -> Self {
        match self {
            TraceShape::Line => TraceShape::Line,
            TraceShape::Sphere { radius } => TraceShape::Sphere {
                radius: radius * factor,
            },
        }
    }
}

/// Outcome of one surface query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceResult {
    pub blocked: bool,
    pub point: Vec3,
    pub normal: Vec3,
}

impl TraceResult {
    pub fn clear() -> Self {
        Self {
            blocked: false,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
        }
    }

    pub fn hit(point: Vec3, normal: Vec3) -> Self {
        Self {
            blocked: true,
            point,
            normal,
        }
    }
}

impl Default for TraceResult {
    fn default() -> Self {
        Self::clear()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("trace segment from {from} to {to} is degenerate")]
    DegenerateSegment { from: Vec3, to: Vec3 },

    #[error("surface query unavailable: {0}")]
    Unavailable(String),
}

/// Environment the ground-adaptive tail traces against.
pub trait SurfaceQuery {
    fn cast(&self, origin: Vec3, end: Vec3, shape: TraceShape) -> Result<TraceResult, QueryError>;
}

impl<T: SurfaceQuery + ?Sized> SurfaceQuery for &T {
    fn cast(&self, origin: Vec3, end: Vec3, shape: TraceShape) -> Result<TraceResult, QueryError> {
        (**self).cast(origin, end, shape)
    }
}

/// Decides on which frames traces fire. Between firings the previous results
/// stay cached on the links.
#[derive(Debug, Clone)]
pub struct TraceSchedule {
    throttle: TraceThrottle,
    elapsed: f32,
}

impl TraceSchedule {
    pub fn new(throttle: TraceThrottle) -> Self {
        Self {
            throttle,
            // Fire on the very first frame.
            elapsed: f32::INFINITY,
        }
    }

    pub fn interval(&self, detail_level: u8) -> f32 {
        match self.throttle.per_detail_level {
            Some(levels) => levels[usize::from(detail_level).min(levels.len() - 1)],
            None => self.throttle.interval,
        }
    }

    pub fn in_range(&self, camera_distance: Option<f32>) -> bool {
        match (self.throttle.max_camera_distance, camera_distance) {
            (Some(max), Some(distance)) => distance < max,
            _ => true,
        }
    }

    /// Advances the timer and reports whether traces fire this frame.
    pub fn advance(&mut self, dt: f32, detail_level: u8, camera_distance: Option<f32>) -> bool {
        self.elapsed += dt.max(0.0);
        let fire = self.elapsed >= self.interval(detail_level) && self.in_range(camera_distance);
        if fire {
            self.elapsed = 0.0;
        }
        fire
    }

    pub fn restart(&mut self) {
        self.elapsed = f32::INFINITY;
    }
}
