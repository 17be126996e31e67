use std::collections::VecDeque;

use glam::Vec3;

use crate::math::vector::{flatten, with_height};
use crate::math::Transform;

const SMOOTHING_ALPHA: f32 = 0.5;

/// Capacity-bounded history of target transforms, oldest first.
#[derive(Debug, Clone, Default)]
pub struct RecordedPath {
    samples: VecDeque<Transform>,
    smoothing: bool,
}

impl RecordedPath {
    pub fn new(smoothing: bool) -> Self {
        Self {
            samples: VecDeque::new(),
            smoothing,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = &Transform> {
        self.samples.iter()
    }

    pub fn newest(&self) -> Option<&Transform> {
        self.samples.back()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn reseed<I: IntoIterator<Item = Transform>>(&mut self, samples: I) {
        self.samples.clear();
        self.samples.extend(samples);
    }

    pub fn arc_length(&self) -> f32 {
        self.samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .map(|(a, b)| a.position.distance(b.position))
            .sum()
    }

    /// Appends `sample` if it moved more than `precision` from the newest one.
    ///
    /// With `up` set the distance ignores vertical motion. Oldest samples are
    /// dropped while the rest still spans `capacity`.
    pub fn record(&mut self, sample: Transform, precision: f32, capacity: f32, up: Option<Vec3>) -> bool {
        let moved = match self.samples.back() {
            None => true,
            Some(last) => {
                let delta = sample.position - last.position;
                let delta = up.map_or(delta, |up| flatten(delta, up));
                delta.length() > precision
            }
        };
        if !moved {
            return false;
        }

        self.samples.push_back(sample);
        self.evict(capacity);
        if self.smoothing {
            self.smooth();
        }
        true
    }

    /// Moves every sample to `height` along `up`.
    pub fn pin_height(&mut self, up: Vec3, height: f32) {
        for sample in &mut self.samples {
            sample.position = with_height(sample.position, up, height);
        }
    }

    /// The path point `distance` behind the newest sample, measured along the path.
    pub fn point_at_distance(&self, distance: f32) -> Option<Transform> {
        let mut accumulated = 0.0;
        for k in (0..self.samples.len().saturating_sub(1)).rev() {
            let newer = &self.samples[k + 1];
            let older = &self.samples[k];
            let segment = newer.position.distance(older.position);
            if accumulated + segment >= distance {
                let t = if segment > f32::EPSILON {
                    ((distance - accumulated) / segment).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                return Some(newer.lerp(older, t));
            }
            accumulated += segment;
        }
        None
    }

    fn evict(&mut self, capacity: f32) {
        let mut total = self.arc_length();
        while self.samples.len() > 2 {
            let first = self.samples[0].position.distance(self.samples[1].position);
            if total - first < capacity {
                break;
            }
            self.samples.pop_front();
            total -= first;
        }
    }

    /// Three-tap blend of rotations and scales; positions are left alone.
    fn smooth(&mut self) {
        if self.samples.len() < 3 {
            return;
        }
        let source: Vec<Transform> = self.samples.iter().copied().collect();
        let a = SMOOTHING_ALPHA;
        for i in 1..source.len() - 1 {
            let (prev, cur, next) = (&source[i - 1], &source[i], &source[i + 1]);
            let rotation = prev
                .rotation
                .slerp(cur.rotation, a)
                .slerp(cur.rotation.slerp(next.rotation, a), a);
            let scale = prev
                .scale
                .lerp(cur.scale, a)
                .lerp(cur.scale.lerp(next.scale, a), a);
            self.samples[i].rotation = rotation.normalize();
            self.samples[i].scale = scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Quat;

    fn at(x: f32) -> Transform {
        Transform::from_position(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn only_records_past_precision() {
        let mut path = RecordedPath::new(false);
        assert!(path.record(at(0.0), 1.0, 100.0, None));
        assert!(!path.record(at(0.5), 1.0, 100.0, None));
        assert!(path.record(at(1.5), 1.0, 100.0, None));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn vertical_motion_is_ignored_when_flattened() {
        let mut path = RecordedPath::new(false);
        path.record(at(0.0), 1.0, 100.0, Some(Vec3::Y));
        let hop = Transform::from_position(Vec3::new(0.0, 50.0, 0.0));
        assert!(!path.record(hop, 1.0, 100.0, Some(Vec3::Y)));
        assert!(path.record(hop, 1.0, 100.0, None));
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut path = RecordedPath::new(false);
        for i in 0..100 {
            path.record(at(i as f32 * 2.0), 1.0, 21.0, None);
        }
        assert!(path.arc_length() >= 21.0);
        assert!(path.arc_length() < 23.0 + 1e-3);
        assert_eq!(path.newest().map(|s| s.position.x), Some(198.0));
    }

    #[test]
    fn point_at_distance_walks_back_from_newest() {
        let mut path = RecordedPath::new(false);
        path.reseed([at(0.0), at(10.0), at(30.0)]);
        assert_relative_eq!(path.point_at_distance(0.0).unwrap().position.x, 30.0);
        assert_relative_eq!(path.point_at_distance(5.0).unwrap().position.x, 25.0);
        assert_relative_eq!(path.point_at_distance(25.0).unwrap().position.x, 5.0);
        assert_relative_eq!(path.point_at_distance(30.0).unwrap().position.x, 0.0);
        assert!(path.point_at_distance(30.5).is_none());
    }

    #[test]
    fn smoothing_blends_interior_rotations_only() {
        let mut path = RecordedPath::new(true);
        let turned = Quat::from_rotation_y(1.0);
        path.record(at(0.0), 1.0, 100.0, None);
        path.record(at(10.0).with_rotation(turned), 1.0, 100.0, None);
        path.record(at(20.0), 1.0, 100.0, None);

        let samples: Vec<_> = path.samples().copied().collect();
        assert_eq!(samples[1].position.x, 10.0);
        assert_relative_eq!(samples[1].rotation.angle_between(Quat::IDENTITY), 0.5, epsilon = 1e-4);
        assert_eq!(samples[2].rotation, Quat::IDENTITY);
    }
}
