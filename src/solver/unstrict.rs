use glam::{Quat, Vec3};

use crate::chain::Link;
use crate::config::{ChainFollowConfig, HeightMode, Normalization, RootMode};
use crate::dynamics::InterpTo;
use crate::math::vector::{flatten, height, rotation_between, safe_normal, with_height};
use crate::math::Transform;

/// Smallest multiplier the velocity curve may apply to the normalization rate.
const MIN_NORMALIZATION_SCALE: f32 = 0.01;

/// World-space frame data for one unstrict solve.
#[derive(Debug, Clone, Copy)]
pub struct UnstrictContext {
    pub dt: f32,
    /// Owner forward axis in world space.
    pub reference_heading: Vec3,
    /// Owner up axis in world space.
    pub up: Vec3,
    /// Owner rotation, composed onto every link rotation.
    pub owner_rotation: Quat,
    pub owner_speed: f32,
}

/// Follow-the-leader solve: each link looks at its tip-ward neighbour and is
/// placed exactly one segment length behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnstrictDirectionSolver {
    pub root: RootMode,
    pub height: HeightMode,
    pub normalization: Normalization,
}

impl UnstrictDirectionSolver {
    pub fn new(root: RootMode, height: HeightMode, normalization: Normalization) -> Self {
        Self {
            root,
            height,
            normalization,
        }
    }

    pub fn from_config(config: &ChainFollowConfig) -> Self {
        Self::new(config.root, config.height, config.normalization.clone())
    }

    /// Rate at which directions drift back to the reference heading, if any.
    pub fn normalization_rate(&self, owner_speed: f32) -> Option<f32> {
        match &self.normalization {
            Normalization::Off => None,
            Normalization::Continuous {
                speed,
                velocity_curve,
            } => Some(speed * velocity_curve.eval(owner_speed).max(MIN_NORMALIZATION_SCALE)),
        }
    }

    /// Writes `solved_pose` of every link. The tip takes `target` as is.
    pub fn solve(&self, links: &mut [Link], target: &Transform, ctx: &UnstrictContext) {
        let n = links.len();
        if n < 2 {
            return;
        }

        links[n - 1].solved_pose = *target;

        let ground_limited = self.height == HeightMode::GroundLimited;
        let target_height = height(target.position, ctx.up);
        let rate = self.normalization_rate(ctx.owner_speed);

        let first = match self.root {
            RootMode::Fixed => {
                let anchor = links[0].original_pose.position;
                links[0].set_position(anchor);
                1
            }
            RootMode::Free => 0,
        };

        for i in (first..n - 1).rev() {
            if ground_limited {
                let next = with_height(links[i + 1].position(), ctx.up, target_height);
                links[i + 1].set_position(next);
                let current = with_height(links[i].position(), ctx.up, target_height);
                links[i].set_position(current);
            }

            let next = links[i + 1].position();
            let fallback = links[i].heading;
            let mut direction = safe_normal(next - links[i].position()).unwrap_or(fallback);

            if let Some(rate) = rate {
                direction = safe_normal(direction.interp_to(ctx.reference_heading, ctx.dt, rate))
                    .unwrap_or(direction);
            }
            if ground_limited {
                direction = safe_normal(flatten(direction, ctx.up))
                    .or_else(|| safe_normal(flatten(fallback, ctx.up)))
                    .unwrap_or(direction);
            }

            links[i].heading = direction;
            links[i].solved_pose = Transform::new(
                next - direction * links[i].segment_length,
                rotation_between(ctx.reference_heading, direction) * ctx.owner_rotation,
                links[i].original_pose.scale,
            );
        }

        if self.root == RootMode::Fixed {
            Self::rechain_from_root(links);
            Self::orient_from_root(links, ctx);
        }
    }

    /// Re-propagates rigid lengths from the pinned root toward the tip.
    fn rechain_from_root(links: &mut [Link]) {
        for i in 1..links.len() {
            let previous = links[i - 1].position();
            let direction = safe_normal(previous - links[i].position())
                .unwrap_or(-links[i - 1].heading);
            let length = links[i - 1].segment_length;
            links[i].set_position(previous - direction * length);
        }
    }

    fn orient_from_root(links: &mut [Link], ctx: &UnstrictContext) {
        for i in 0..links.len() - 1 {
            let Some(direction) = safe_normal(links[i + 1].position() - links[i].position()) else {
                continue;
            };
            links[i].heading = direction;
            links[i].solved_pose.rotation =
                rotation_between(ctx.reference_heading, direction) * ctx.owner_rotation;
            links[i].solved_pose.scale = links[i].original_pose.scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainModel, LinkId};
    use approx::assert_relative_eq;

    fn chain(count: usize, spacing: f32) -> ChainModel {
        let pose: Vec<Transform> = (0..count)
            .map(|i| Transform::from_position(Vec3::X * spacing * i as f32))
            .collect();
        let mut chain = ChainModel::new((0..count).map(LinkId).collect());
        chain.refresh(&pose, &Transform::IDENTITY).unwrap();
        chain
    }

    fn ctx() -> UnstrictContext {
        UnstrictContext {
            dt: 1.0 / 60.0,
            reference_heading: Vec3::X,
            up: Vec3::Y,
            owner_rotation: Quat::IDENTITY,
            owner_speed: 0.0,
        }
    }

    fn assert_rigid(chain: &ChainModel) {
        let links = chain.links();
        for pair in links.windows(2) {
            assert_relative_eq!(
                pair[0].position().distance(pair[1].position()),
                pair[0].segment_length,
                epsilon = 1e-3
            );
        }
    }

    #[test]
    fn tip_lands_on_target_and_lengths_hold() {
        let mut chain = chain(5, 10.0);
        let solver = UnstrictDirectionSolver::new(RootMode::Free, HeightMode::Free, Normalization::Off);
        let target = Transform::from_position(Vec3::new(30.0, 25.0, -12.0));
        for _ in 0..5 {
            solver.solve(chain.links_mut(), &target, &ctx());
            assert_rigid(&chain);
        }
        assert_eq!(chain.tip().unwrap().position(), target.position);
    }

    #[test]
    fn ground_limited_chain_stays_at_target_height() {
        let mut chain = chain(4, 10.0);
        let solver =
            UnstrictDirectionSolver::new(RootMode::Free, HeightMode::GroundLimited, Normalization::Off);
        let target = Transform::from_position(Vec3::new(50.0, 7.0, 20.0));
        solver.solve(chain.links_mut(), &target, &ctx());
        for link in chain.links() {
            assert_relative_eq!(link.position().y, 7.0, epsilon = 1e-4);
        }
        assert_rigid(&chain);
    }

    #[test]
    fn fixed_root_stays_on_base_pose() {
        let mut chain = chain(4, 10.0);
        let solver = UnstrictDirectionSolver::new(RootMode::Fixed, HeightMode::Free, Normalization::Off);
        let target = Transform::from_position(Vec3::new(0.0, 0.0, 100.0));
        for _ in 0..10 {
            solver.solve(chain.links_mut(), &target, &ctx());
        }
        assert_eq!(chain.root().unwrap().position(), Vec3::ZERO);
        assert_rigid(&chain);
        // Out of reach: the chain points at the target instead.
        let tip = chain.tip().unwrap().position();
        assert!(tip.normalize().abs_diff_eq(Vec3::Z, 1e-2));
    }

    #[test]
    fn rotation_faces_the_neighbour() {
        let mut chain = chain(3, 10.0);
        let solver = UnstrictDirectionSolver::new(RootMode::Free, HeightMode::Free, Normalization::Off);
        let target = Transform::from_position(Vec3::new(20.0, 0.0, 0.0));
        solver.solve(chain.links_mut(), &target, &ctx());
        let root = &chain.links()[0];
        assert!((root.solved_pose.rotation * Vec3::X).abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn normalization_pulls_toward_reference() {
        let mut chain = chain(3, 10.0);
        let solver = UnstrictDirectionSolver::new(
            RootMode::Free,
            HeightMode::Free,
            Normalization::continuous(60.0),
        );
        // Target sideways: without normalization the chain would turn to Z.
        let target = Transform::from_position(Vec3::new(0.0, 0.0, 20.0));
        let mut context = ctx();
        context.dt = 1.0;
        solver.solve(chain.links_mut(), &target, &context);
        assert!(chain.links()[0].heading.abs_diff_eq(Vec3::X, 1e-5));
        assert_eq!(solver.normalization_rate(100.0), Some(30.0));
    }

    #[test]
    fn degenerate_direction_reuses_heading() {
        let mut chain = chain(2, 10.0);
        let solver = UnstrictDirectionSolver::new(RootMode::Free, HeightMode::Free, Normalization::Off);
        // Target exactly on the root: the direction collapses.
        let target = Transform::from_position(Vec3::ZERO);
        solver.solve(chain.links_mut(), &target, &ctx());
        let root = chain.root().unwrap();
        assert!(root.position().abs_diff_eq(Vec3::new(-10.0, 0.0, 0.0), 1e-5));
        assert!(root.solved_pose.is_finite());
    }
}
