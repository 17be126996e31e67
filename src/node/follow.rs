use glam::{Quat, Vec3};

use super::ErrorLatch;
use crate::chain::{resolve_links, ChainModel, LinkId, Skeleton};
use crate::config::{ChainFollowConfig, HeightMode, Normalization, PoseMode, RootMode, Smoothing, SolveMode};
use crate::dynamics::{OutputSmoother, WarmupBlender, WarmupInput, WarmupState};
use crate::error::ChainError;
use crate::frame::FrameInput;
use crate::math::vector::{height, safe_normal, with_height};
use crate::math::Transform;
use crate::output::BoneTransform;
use crate::solver::{RecordedPath, StabilityAdjuster, StrictPathSolver, UnstrictContext, UnstrictDirectionSolver};

const NODE: &str = "chain follow";
/// How far ahead of the root, in chain lengths, the straight reference pose aims.
const REFERENCE_REACH: f32 = 10.0;

/// Drives a body chain (spine, neck, centipede) toward an effector.
///
/// One instance per skeleton instance. Each [`evaluate`](Self::evaluate) refreshes
/// the chain from the base pose, solves in strict or unstrict mode, applies the
/// stability anchor, blends by the warm-up weight and returns component-space
/// transforms for the configured bones.
#[derive(Debug, Clone)]
pub struct ChainFollowSolver {
    config: ChainFollowConfig,
    setup_error: Option<ChainError>,
    chain: ChainModel,
    /// Straight pose solved alongside the chain in [`PoseMode::PreserveOriginal`].
    reference: ChainModel,
    unstrict: UnstrictDirectionSolver,
    reference_solver: UnstrictDirectionSolver,
    strict: StrictPathSolver,
    stability: Option<StabilityAdjuster>,
    warmup: WarmupBlender,
    smoother: OutputSmoother,
    initial_effector: Option<Transform>,
    errors: ErrorLatch,
    output: Vec<BoneTransform>,
}

impl ChainFollowSolver {
    /// `links` are skeleton bone indices, root first.
    pub fn new(config: ChainFollowConfig, links: Vec<LinkId>) -> Self {
        let unstrict = UnstrictDirectionSolver::from_config(&config);
        let reference_solver = UnstrictDirectionSolver::new(RootMode::Fixed, config.height, Normalization::Off);
        let strict = StrictPathSolver::new(config.precision, config.height, config.smooth_path);
        let stability = config
            .stability
            .map(|anchor| StabilityAdjuster::new(anchor, config.up_axis, config.forward_axis));
        let warmup = WarmupBlender::new(config.warmup, &config.speeds);
        let smoother = OutputSmoother::new(config.smoothing == Smoothing::Exponential);

        Self {
            setup_error: None,
            chain: ChainModel::new(links.clone()),
            reference: ChainModel::new(links),
            unstrict,
            reference_solver,
            strict,
            stability,
            warmup,
            smoother,
            initial_effector: None,
            errors: ErrorLatch::default(),
            output: Vec::new(),
            config,
        }
    }

    /// Resolves `bone_names` once. An unknown name leaves the solver permanently
    /// invalid: every evaluation reports it and the base pose passes through.
    pub fn from_bone_names<S, N>(config: ChainFollowConfig, skeleton: &S, bone_names: &[N]) -> Self
    where
        S: Skeleton + ?Sized,
        N: AsRef<str>,
    {
        match resolve_links(skeleton, bone_names) {
            Ok(links) => Self::new(config, links),
            Err(err) => {
                let mut solver = Self::new(config, Vec::new());
                solver.setup_error = Some(err);
                solver
            }
        }
    }

    pub fn config(&self) -> &ChainFollowConfig {
        &self.config
    }

    pub fn chain(&self) -> &ChainModel {
        &self.chain
    }

    pub fn warmup(&self) -> &WarmupBlender {
        &self.warmup
    }

    pub fn warmup_state(&self) -> WarmupState {
        self.warmup.state()
    }

    pub fn recorded_path(&self) -> &RecordedPath {
        self.strict.path()
    }

    pub fn last_detected_link(&self) -> Option<usize> {
        self.strict.last_detected()
    }

    /// The error that made the last evaluation pass through, if any.
    pub fn error(&self) -> Option<&ChainError> {
        self.errors.current()
    }

    /// Forgets all solver state; the next evaluation rebuilds from the base pose.
    pub fn reinitialize(&mut self) {
        self.chain.rebind();
        self.reference.rebind();
        self.strict = StrictPathSolver::new(self.config.precision, self.config.height, self.config.smooth_path);
        self.warmup.reinitialize();
        self.initial_effector = None;
    }

    pub fn evaluate(&mut self, frame: &FrameInput) -> Result<&[BoneTransform], ChainError> {
        if let Err(err) = self.prepare(frame) {
            self.errors.raise(NODE, &err);
            return Err(err);
        }
        self.errors.clear(NODE);

        let owner = frame.owner;
        let up = safe_normal(owner.transform_direction(self.config.up_axis)).unwrap_or(Vec3::Y);
        let forward = safe_normal(owner.transform_direction(self.config.forward_axis)).unwrap_or(Vec3::X);
        let target = self.calibrated_target(frame);

        self.warmup.update(&WarmupInput {
            dt: frame.dt,
            owner_position: owner.position,
            master_alpha: frame.master_alpha,
            reset_requested: frame.reset,
            context: frame.context,
        });

        if self.warmup.is_gated() {
            self.rest(&target, up);
        } else {
            self.solve(frame, &target, up, forward);
        }

        let snap = self.warmup.should_snap() || !self.smoother.enabled;
        let speed = self.warmup.smoothing_speed(&self.config.speeds);
        for link in self.chain.links_mut() {
            if snap {
                link.interpolated_pose = link.solved_pose;
            } else {
                self.smoother.smooth_link(link, frame.dt, speed);
            }
        }

        self.write_output(frame);
        Ok(self.output.as_slice())
    }

    fn prepare(&mut self, frame: &FrameInput) -> Result<(), ChainError> {
        if let Some(err) = &self.setup_error {
            return Err(err.clone());
        }
        self.config.validate()?;
        self.chain.refresh(frame.base_pose, &frame.owner)?;
        if self.config.pose == PoseMode::PreserveOriginal {
            self.reference.refresh(frame.base_pose, &frame.owner)?;
        }
        Ok(())
    }

    /// Effector in world space after the calibration options are applied.
    fn calibrated_target(&mut self, frame: &FrameInput) -> Transform {
        let mut target = frame.effector.to_world(&frame.owner);
        let initial = *self.initial_effector.get_or_insert(target);
        let calibration = self.config.effector;

        if calibration.scale_add {
            target.scale = divide_scale(target.scale, initial.scale);
        }
        if calibration.rotation_add {
            target.rotation = target.rotation * initial.rotation.inverse();
        }
        if calibration.rotation_relative_to_owner && self.config.mode == SolveMode::Unstrict {
            target.rotation = frame.owner.rotation.inverse() * target.rotation;
        }
        target.rotation = (calibration.tip_rotation_offset * target.rotation).normalize();

        if let Some(tip) = self.chain.tip() {
            target.scale *= tip.original_pose.scale;
        }
        target
    }

    /// Holds both chains on the base pose while the warm-up gate is closed.
    fn rest(&mut self, target: &Transform, up: Vec3) {
        let pinned = (self.config.height == HeightMode::GroundLimited).then(|| height(target.position, up));
        for chain in [&mut self.chain, &mut self.reference] {
            for link in chain.links_mut() {
                link.solved_pose = link.original_pose;
                if let Some(h) = pinned {
                    link.solved_pose.position = with_height(link.solved_pose.position, up, h);
                }
            }
        }
        if self.config.mode == SolveMode::Strict {
            self.strict.reseed(self.chain.links_mut(), target);
        }
    }

    fn solve(&mut self, frame: &FrameInput, target: &Transform, up: Vec3, forward: Vec3) {
        let ctx = UnstrictContext {
            dt: frame.dt,
            reference_heading: forward,
            up,
            owner_rotation: frame.owner.rotation,
            owner_speed: frame.owner_velocity.length(),
        };

        match self.config.mode {
            SolveMode::Unstrict => self.unstrict.solve(self.chain.links_mut(), target, &ctx),
            SolveMode::Strict => {
                self.strict.solve(self.chain.links_mut(), target, up);
            }
        }

        match self.config.pose {
            PoseMode::Absolute => {
                if let Some(stability) = &self.stability {
                    stability.adjust(self.chain.links_mut(), &frame.owner);
                }
            }
            PoseMode::PreserveOriginal => {
                self.solve_reference(target, &ctx);
                if let Some(stability) = &self.stability {
                    stability.adjust(self.reference.links_mut(), &frame.owner);
                }
            }
        }
    }

    /// Solves the reference chain toward a point far ahead of the root.
    fn solve_reference(&mut self, target: &Transform, ctx: &UnstrictContext) {
        let (Some(root), Some(tip)) = (self.reference.root(), self.reference.tip()) else {
            return;
        };
        let reach = self.reference.total_length().max(1.0) * REFERENCE_REACH;
        let mut ahead = root.original_pose.position + ctx.reference_heading * reach;
        if self.config.height == HeightMode::GroundLimited {
            ahead = with_height(ahead, ctx.up, height(target.position, ctx.up));
        }
        let far = Transform::new(ahead, ctx.owner_rotation, tip.original_pose.scale);
        self.reference_solver.solve(self.reference.links_mut(), &far, ctx);
    }

    fn write_output(&mut self, frame: &FrameInput) {
        let owner = frame.owner;
        let links = self.chain.links();
        let n = links.len();
        let base = |i: usize| frame.base_pose[links[i].identity.0];

        let mut posed: Vec<Transform> = links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                let solved = link.interpolated_pose.relative_to(&owner);
                match (self.config.pose, self.reference.links().get(i)) {
                    (PoseMode::PreserveOriginal, Some(reference)) => {
                        let reference = reference.solved_pose.relative_to(&owner);
                        base(i).then(&reference.inverse()).then(&solved)
                    }
                    _ => solved,
                }
            })
            .collect();

        if self.config.pose == PoseMode::PreserveOriginal && n >= 2 {
            // The tip keeps its bind offset from its parent link.
            let tip_local = base(n - 1).relative_to(&base(n - 2));
            posed[n - 1].position = tip_local.then(&posed[n - 2]).position;
        }

        let overall = self.config.overall_rotation_offset;
        for (i, pose) in posed.iter_mut().enumerate().take(n.saturating_sub(1)) {
            if i == 0 && self.config.root == RootMode::Fixed {
                continue;
            }
            let per_link = self
                .config
                .per_link_rotation_offsets
                .get(i)
                .copied()
                .unwrap_or(Quat::IDENTITY);
            pose.rotation = (overall * per_link * pose.rotation).normalize();
        }

        let strict_miss = self.config.mode == SolveMode::Strict && self.strict.last_detected().is_none();
        let weight = self.warmup.weight(frame.master_alpha);

        self.output.clear();
        for (i, pose) in posed.into_iter().enumerate() {
            let base = base(i);
            let blended = if strict_miss || weight <= 0.0 {
                base
            } else if weight >= 1.0 {
                pose
            } else {
                base.lerp(&pose, weight)
            };
            let transform = if blended.is_finite() { blended } else { base };
            self.output.push(BoneTransform::new(links[i].identity, transform));
        }
    }
}

fn divide_scale(scale: Vec3, by: Vec3) -> Vec3 {
    let div = |a: f32, b: f32| if b.abs() > f32::EPSILON { a / b } else { a };
    Vec3::new(div(scale.x, by.x), div(scale.y, by.y), div(scale.z, by.z))
}
