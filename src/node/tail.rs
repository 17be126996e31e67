use glam::Vec3;

use super::ErrorLatch;
use crate::chain::{resolve_links, ChainModel, LinkId, Skeleton};
use crate::collision::SurfaceQuery;
use crate::config::TailConfig;
use crate::dynamics::OutputSmoother;
use crate::error::ChainError;
use crate::frame::TailFrame;
use crate::math::vector::safe_normal;
use crate::output::BoneTransform;
use crate::solver::{GroundAdaptiveSolver, GroundContext, GroundSolve};

const NODE: &str = "tail";

/// Drives a tail chain that rests on whatever surface is under it.
#[derive(Debug, Clone)]
pub struct TailSolver {
    config: TailConfig,
    setup_error: Option<ChainError>,
    chain: ChainModel,
    ground: GroundAdaptiveSolver,
    smoother: OutputSmoother,
    errors: ErrorLatch,
    last_solve: Option<GroundSolve>,
    output: Vec<BoneTransform>,
}

impl TailSolver {
    pub fn new(config: TailConfig, links: Vec<LinkId>) -> Self {
        Self {
            setup_error: None,
            chain: ChainModel::new(links),
            ground: GroundAdaptiveSolver::new(&config),
            smoother: OutputSmoother::default(),
            errors: ErrorLatch::default(),
            last_solve: None,
            output: Vec::new(),
            config,
        }
    }

    pub fn from_bone_names<S, N>(config: TailConfig, skeleton: &S, bone_names: &[N]) -> Self
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

    pub fn config(&self) -> &TailConfig {
        &self.config
    }

    pub fn chain(&self) -> &ChainModel {
        &self.chain
    }

    pub fn last_solve(&self) -> Option<GroundSolve> {
        self.last_solve
    }

    pub fn error(&self) -> Option<&ChainError> {
        self.errors.current()
    }

    pub fn reinitialize(&mut self) {
        self.chain.rebind();
        self.ground.restart();
        self.last_solve = None;
    }

    pub fn evaluate<Q>(&mut self, frame: &TailFrame, query: &Q) -> Result<&[BoneTransform], ChainError>
    where
        Q: SurfaceQuery + ?Sized,
    {
        if let Err(err) = self.prepare(frame) {
            self.errors.raise(NODE, &err);
            return Err(err);
        }
        self.errors.clear(NODE);

        let owner = frame.owner;
        let up = safe_normal(owner.transform_direction(self.config.up_axis)).unwrap_or(Vec3::Y);
        let ctx = GroundContext {
            dt: frame.dt,
            up,
            owner_scale: owner.scale.dot(self.config.up_axis.abs()),
            detail_level: frame.detail_level,
            camera_distance: frame.camera_position.map(|camera| camera.distance(owner.position)),
        };
        let outcome = self
            .ground
            .solve(self.chain.links_mut(), query, &self.config, &ctx);
        self.last_solve = Some(outcome);

        let speed = self.config.interpolation_speed;
        for link in self.chain.links_mut() {
            self.smoother.smooth_link(link, frame.dt, speed);
        }

        self.output.clear();
        for link in self.chain.links() {
            let base = frame.base_pose[link.identity.0];
            let transform = link.interpolated_pose.relative_to(&owner);
            let transform = if transform.is_finite() { transform } else { base };
            self.output.push(BoneTransform::new(link.identity, transform));
        }
        Ok(self.output.as_slice())
    }

    fn prepare(&mut self, frame: &TailFrame) -> Result<(), ChainError> {
        if let Some(err) = &self.setup_error {
            return Err(err.clone());
        }
        self.config.validate()?;
        self.chain.refresh(frame.base_pose, &frame.owner)
    }
}
