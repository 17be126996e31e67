use glam::Vec3;

use super::path::RecordedPath;
use crate::chain::Link;
use crate::config::HeightMode;
use crate::math::vector::{flatten, height, safe_normal, with_height};
use crate::math::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictSolve {
    pub recorded: bool,
    pub bootstrapped: bool,
    /// Link closest to the root that found its place on the path.
    pub last_detected: Option<usize>,
}

/// Replays the recorded target path: every link sits on the path at its
/// accumulated distance from the tip, like cars on a track.
#[derive(Debug, Clone)]
pub struct StrictPathSolver {
    path: RecordedPath,
    precision: f32,
    height: HeightMode,
    last_detected: Option<usize>,
}

impl StrictPathSolver {
    pub fn new(precision: f32, height: HeightMode, smooth_path: bool) -> Self {
        Self {
            path: RecordedPath::new(smooth_path),
            precision,
            height,
            last_detected: None,
        }
    }

    pub fn path(&self) -> &RecordedPath {
        &self.path
    }

    pub fn last_detected(&self) -> Option<usize> {
        self.last_detected
    }

    fn ground_limited(&self) -> bool {
        self.height == HeightMode::GroundLimited
    }

    pub fn solve(&mut self, links: &mut [Link], target: &Transform, up: Vec3) -> StrictSolve {
        let n = links.len();
        if n < 2 {
            self.last_detected = None;
            return StrictSolve {
                recorded: false,
                bootstrapped: false,
                last_detected: None,
            };
        }

        let total: f32 = links[..n - 1].iter().map(|l| l.segment_length).sum();
        let capacity = total + self.precision;
        let flat_up = self.ground_limited().then_some(up);
        let recorded = self.path.record(*target, self.precision, capacity, flat_up);

        if self.path.len() == 1 {
            self.bootstrap(links, target, up);
            self.last_detected = Some(0);
            return StrictSolve {
                recorded,
                bootstrapped: true,
                last_detected: self.last_detected,
            };
        }

        if self.ground_limited() {
            self.path.pin_height(up, height(target.position, up));
        }
        log::trace!(
            "strict path: {} samples, arc {:.2}",
            self.path.len(),
            self.path.arc_length()
        );

        links[n - 1].solved_pose = *target;
        self.last_detected = None;

        let mut desired = 0.0;
        for i in (0..n - 1).rev() {
            desired += links[i].segment_length;
            let Some(point) = self.path.point_at_distance(desired) else {
                // Path too short to reach this link yet; keep last frame's pose.
                continue;
            };

            let next = links[i + 1].position();
            let direction = safe_normal(next - point.position).unwrap_or(links[i].heading);
            links[i].heading = direction;
            links[i].solved_pose = Transform::new(
                next - direction * links[i].segment_length,
                point.rotation,
                point.scale,
            );
            self.last_detected = Some(i);
        }

        StrictSolve {
            recorded,
            bootstrapped: false,
            last_detected: self.last_detected,
        }
    }

    /// Restarts the path from the base pose: one sample on the root and one on
    /// the tip, carrying the target's rotation and scale.
    pub fn reseed(&mut self, links: &mut [Link], target: &Transform) {
        let (Some(root), Some(tip)) = (links.first(), links.last()) else {
            return;
        };
        let sample = |link: &Link| Transform::new(link.original_pose.position, target.rotation, target.scale);
        let seeds = [sample(root), sample(tip)];
        self.path.reseed(seeds);
        self.last_detected = None;

        if let Some(root) = links.first_mut() {
            root.solved_pose.rotation = target.rotation;
            root.interpolated_pose.rotation = target.rotation;
        }
    }

    /// Lays the chain out straight behind the target, heading away from the
    /// root, and seeds the path with the new root position.
    fn bootstrap(&mut self, links: &mut [Link], target: &Transform, up: Vec3) {
        let root = links[0].original_pose.position;
        let mut heading = target.position - root;
        if self.ground_limited() {
            heading = flatten(heading, up);
        }
        let heading = safe_normal(heading)
            .or_else(|| safe_normal(flatten(links[0].heading, up)))
            .unwrap_or(links[0].heading);

        let target_height = height(target.position, up);
        let mut behind_tip: f32 = links.iter().map(|l| l.segment_length).sum();
        for link in links.iter_mut() {
            let mut position = target.position - heading * behind_tip;
            if self.ground_limited() {
                position = with_height(position, up, target_height);
            }
            link.solved_pose = Transform::new(position, target.rotation, target.scale);
            link.heading = heading;
            behind_tip -= link.segment_length;
        }

        self.path.reseed([links[0].solved_pose]);
        log::debug!(
            "strict path bootstrapped along {:?} over {} links",
            heading,
            links.len()
        );
    }
}
