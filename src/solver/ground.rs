use glam::Vec3;

use crate::chain::Link;
use crate::collision::{SurfaceQuery, TraceResult, TraceSchedule, TraceShape};
use crate::config::TailConfig;
use crate::dynamics::InterpTo;
use crate::math::vector::{height, rotation_between, safe_normal, with_height};
use crate::math::Transform;

/// Below this every link counts as fully released from the ground.
const RELEASED_ALPHA: f32 = 1.0e-4;

/// World-space frame data for one ground-adaptive solve.
#[derive(Debug, Clone, Copy)]
pub struct GroundContext {
    pub dt: f32,
    /// Owner up axis in world space.
    pub up: Vec3,
    /// Owner scale along its up axis; scales trace heights and sphere radius.
    pub owner_scale: f32,
    pub detail_level: u8,
    pub camera_distance: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSolve {
    pub traced: bool,
    pub hits: usize,
    /// Tip-most link whose cached trace is blocking.
    pub last_hit: Option<usize>,
}

/// Anchors a chain to the surface under it using throttled traces.
#[derive(Debug, Clone)]
pub struct GroundAdaptiveSolver {
    schedule: TraceSchedule,
}

impl GroundAdaptiveSolver {
    pub fn new(config: &TailConfig) -> Self {
        Self {
            schedule: TraceSchedule::new(config.throttle),
        }
    }

    pub fn restart(&mut self) {
        self.schedule.restart();
    }

    pub fn solve<Q>(&mut self, links: &mut [Link], query: &Q, config: &TailConfig, ctx: &GroundContext) -> GroundSolve
    where
        Q: SurfaceQuery + ?Sized,
    {
        let n = links.len();
        let traced = self
            .schedule
            .advance(ctx.dt, ctx.detail_level, ctx.camera_distance);
        if traced {
            Self::trace(links, query, config, ctx);
        }

        let mut hits = 0;
        let mut last_hit = None;
        let mut highest: Option<Vec3> = None;
        for (i, link) in links.iter().enumerate() {
            let trace = &link.ground.last_trace;
            if !trace.blocked {
                continue;
            }
            hits += 1;
            last_hit = Some(i);
            if highest.map_or(true, |h| height(trace.point, ctx.up) > height(h, ctx.up)) {
                highest = Some(trace.point);
            }
        }
        let outcome = GroundSolve {
            traced,
            hits,
            last_hit,
        };

        if n < 2 {
            return outcome;
        }

        if hits == 0 && links.iter().all(|l| l.ground.hit_alpha <= RELEASED_ALPHA) {
            for link in links.iter_mut() {
                link.ground.hit_alpha = 0.0;
                link.solved_pose = link.original_pose;
            }
            return outcome;
        }

        let first = usize::from(config.pin_root);
        let mut targets: Vec<Vec3> = links.iter().map(|l| l.original_pose.position).collect();
        for i in first..n {
            let link = &mut links[i];
            let original = link.original_pose.position;
            let grounded = match (highest, last_hit) {
                (Some(highest), Some(last)) if link.ground.last_trace.blocked || i > last => {
                    let mut anchor = with_height(original, ctx.up, height(highest, ctx.up))
                        + ctx.up * config.link_height(i);
                    if !link.ground.last_trace.blocked {
                        // Past the last hit the pull fades with how far down the
                        // chain that hit was.
                        let ratio = ((last as f32 - 1.0) / n as f32).clamp(0.0, 1.0);
                        anchor = original.lerp(anchor, ratio);
                    }
                    Some(anchor)
                }
                _ => None,
            };

            match grounded {
                Some(anchor) => {
                    link.ground.last_hit_position = anchor;
                    link.ground.hit_alpha = link.ground.hit_alpha.interp_to(1.0, ctx.dt, config.block_speed);
                }
                None => {
                    link.ground.hit_alpha = link.ground.hit_alpha.interp_to(0.0, ctx.dt, config.unblock_speed);
                }
            }
            targets[i] = original.lerp(link.ground.last_hit_position, link.ground.hit_alpha);
        }

        Self::rechain(links, &targets);
        outcome
    }

    fn trace<Q>(links: &mut [Link], query: &Q, config: &TailConfig, ctx: &GroundContext)
    where
        Q: SurfaceQuery + ?Sized,
    {
        let shape: TraceShape = config.shape.scaled(ctx.owner_scale);
        for (i, link) in links.iter_mut().enumerate() {
            if i == 0 && config.pin_root {
                link.ground.last_trace = TraceResult::clear();
                continue;
            }
            let base = link.original_pose.position;
            let origin = base + ctx.up * config.trace_up * ctx.owner_scale;
            let end = base - ctx.up * config.trace_down * ctx.owner_scale;
            link.ground.last_trace = match query.cast(origin, end, shape) {
                Ok(result) => result,
                Err(err) => {
                    log::debug!("ground trace for link {i} failed: {err}");
                    TraceResult::clear()
                }
            };
        }
        log::trace!("ground traces fired for {} links", links.len());
    }

    /// Lays links root to tip at their rigid lengths toward the blended targets,
    /// then turns each one by how much its segment turned from the base pose.
    fn rechain(links: &mut [Link], targets: &[Vec3]) {
        let n = links.len();
        let mut positions = Vec::with_capacity(n);
        positions.push(targets[0]);
        for i in 1..n {
            let previous = positions[i - 1];
            let fallback = links[i].original_pose.position - links[i - 1].original_pose.position;
            let direction = safe_normal(targets[i] - previous)
                .or_else(|| safe_normal(fallback))
                .unwrap_or(links[i - 1].heading);
            positions.push(previous + direction * links[i - 1].segment_length);
        }

        for i in 0..n {
            // Root measures against its tip-ward neighbour, the rest root-ward.
            let other = if i == 0 { 1 } else { i - 1 };
            let original = &links[i].original_pose;
            let turn = rotation_between(
                links[other].original_pose.position - original.position,
                positions[other] - positions[i],
            );
            links[i].solved_pose = Transform::new(
                positions[i],
                (turn * original.rotation).normalize(),
                original.scale,
            );
        }
    }
}
