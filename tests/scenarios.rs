//! End-to-end behaviour of the chain drivers over many frames.

use approx::assert_relative_eq;
use chain_follow_ik::{
    pack, write_back, BoneTransform, ChainError, ChainFollowConfig, ChainFollowSolver, Effector,
    FrameInput, HeightMode, LinkId, ObstacleWorld, RootMode, TailConfig, TailFrame, TailSolver,
    Transform, Warmup, WarmupState,
};
use glam::Vec3;

const DT: f32 = 1.0 / 60.0;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn straight_pose(count: usize, spacing: f32) -> Vec<Transform> {
    (0..count)
        .map(|i| Transform::from_position(Vec3::X * spacing * i as f32))
        .collect()
}

fn ids(count: usize) -> Vec<LinkId> {
    (0..count).map(LinkId).collect()
}

fn step(
    solver: &mut ChainFollowSolver,
    owner: Transform,
    pose: &[Transform],
    target: Vec3,
) -> Vec<BoneTransform> {
    let effector = Effector::world(Transform::from_position(target));
    let frame = FrameInput::new(DT, owner, pose, effector);
    solver.evaluate(&frame).expect("valid chain").to_vec()
}

fn assert_rigid(solver: &ChainFollowSolver) {
    for pair in solver.chain().links().windows(2) {
        assert_relative_eq!(
            pair[0].position().distance(pair[1].position()),
            pair[0].segment_length,
            epsilon = 1e-3
        );
    }
}

#[test]
fn scenario_a_unstrict_chain_reaches_moving_target() {
    init_logging();
    let pose = straight_pose(5, 10.0);
    let config = ChainFollowConfig::unstrict()
        .with_root(RootMode::Free)
        .with_warmup(Warmup::Disabled);
    let mut solver = ChainFollowSolver::new(config, ids(5));

    let mut out = Vec::new();
    for frame in 0..=50 {
        let target = Vec3::new(100.0 * frame as f32 / 50.0, 0.0, 0.0);
        out = step(&mut solver, Transform::IDENTITY, &pose, target);
        assert_rigid(&solver);
    }
    for _ in 0..400 {
        out = step(&mut solver, Transform::IDENTITY, &pose, Vec3::new(100.0, 0.0, 0.0));
        assert_rigid(&solver);
    }

    assert!(out[4].transform.position.abs_diff_eq(Vec3::new(100.0, 0.0, 0.0), 1e-3));
    for pair in out.windows(2) {
        assert_relative_eq!(
            pair[0].transform.position.distance(pair[1].transform.position),
            10.0,
            epsilon = 1e-3
        );
    }
}

#[test]
fn scenario_b_tail_floats_above_flat_ground() {
    init_logging();
    let pose = straight_pose(3, 50.0);
    let owner = Transform::from_position(Vec3::new(0.0, 100.0, 0.0));
    let mut world = ObstacleWorld::new();
    world.add_aabb(Vec3::new(-1.0e4, -10.0, -1.0e4), Vec3::new(1.0e4, 0.0, 1.0e4));

    let config = TailConfig::default()
        .with_trace_heights(50.0, 100.0)
        .with_float_height(20.0);
    let mut tail = TailSolver::new(config, ids(3));

    let mut out = Vec::new();
    for _ in 0..600 {
        let frame = TailFrame::new(DT, owner, &pose);
        out = tail.evaluate(&frame, &world).expect("valid tail").to_vec();
    }

    for link in tail.chain().links() {
        assert_relative_eq!(link.ground.hit_alpha, 1.0, epsilon = 1e-3);
    }
    let tip_world = out[2].transform.then(&owner).position;
    assert_relative_eq!(tip_world.y, 20.0, epsilon = 1e-2);
}

#[test]
fn rigid_lengths_hold_along_a_winding_path() {
    let pose = straight_pose(6, 8.0);
    let config = ChainFollowConfig::unstrict()
        .with_height(HeightMode::Free)
        .with_warmup(Warmup::Disabled);
    let mut solver = ChainFollowSolver::new(config, ids(6));
    for frame in 0..300 {
        let t = frame as f32 * 0.05;
        let target = Vec3::new(40.0 + t * 20.0, (t * 2.0).sin() * 15.0, (t * 0.7).cos() * 30.0);
        step(&mut solver, Transform::IDENTITY, &pose, target);
        assert_rigid(&solver);
    }
}

#[test]
fn held_target_converges() {
    let pose = straight_pose(4, 10.0);
    let config = ChainFollowConfig::unstrict().with_warmup(Warmup::Disabled);
    let mut solver = ChainFollowSolver::new(config, ids(4));
    let target = Vec3::new(10.0, 0.0, 25.0);
    for _ in 0..600 {
        step(&mut solver, Transform::IDENTITY, &pose, target);
    }
    let a = step(&mut solver, Transform::IDENTITY, &pose, target);
    let b = step(&mut solver, Transform::IDENTITY, &pose, target);
    for (x, y) in a.iter().zip(&b) {
        assert!(x.transform.abs_diff_eq(&y.transform, 1e-5));
    }
}

#[test]
fn warmup_rises_monotonically_while_moving() {
    let pose = straight_pose(4, 10.0);
    let config = ChainFollowConfig::unstrict().with_warmup(Warmup::Distance { threshold: 200.0 });
    let mut solver = ChainFollowSolver::new(config, ids(4));

    let mut last = 0.0;
    for frame in 0..300 {
        let owner = Transform::from_position(Vec3::X * frame as f32 * 2.0);
        step(&mut solver, owner, &pose, Vec3::new(40.0, 0.0, 0.0));
        let alpha = solver.warmup().alpha();
        if solver.warmup_state() != WarmupState::Resetting {
            assert!(alpha >= last, "alpha fell from {last} to {alpha}");
        }
        last = alpha;
    }
    assert_eq!(solver.warmup_state(), WarmupState::Active);
}

#[test]
fn reset_returns_every_link_to_bind_pose() {
    let pose = straight_pose(4, 10.0);
    let config = ChainFollowConfig::unstrict()
        .with_height(HeightMode::Free)
        .with_warmup(Warmup::Distance { threshold: 50.0 });
    let mut solver = ChainFollowSolver::new(config, ids(4));

    for frame in 0..200 {
        let owner = Transform::from_position(Vec3::X * frame as f32);
        step(&mut solver, owner, &pose, owner.position + Vec3::new(0.0, 20.0, 25.0));
    }
    assert_eq!(solver.warmup().alpha(), 1.0);

    let owner = Transform::from_position(Vec3::X * 200.0);
    let target = Effector::world(Transform::from_position(Vec3::new(200.0, 20.0, 25.0)));
    let mut out = Vec::new();
    for _ in 0..240 {
        let frame = FrameInput::new(DT, owner, &pose, target).with_reset(true);
        out = solver.evaluate(&frame).unwrap().to_vec();
    }
    for (bone, base) in out.iter().zip(&pose) {
        assert!(bone.transform.abs_diff_eq(base, 1e-4));
    }
    assert_eq!(solver.warmup_state(), WarmupState::Resetting);
}

#[test]
fn reset_without_warmup_returns_ground_limited_chain_to_bind_pose() {
    let pose = straight_pose(4, 10.0);
    let config = ChainFollowConfig::unstrict().with_warmup(Warmup::Disabled);
    let mut solver = ChainFollowSolver::new(config, ids(4));
    let target = Vec3::new(40.0, 50.0, 0.0);

    for _ in 0..100 {
        step(&mut solver, Transform::IDENTITY, &pose, target);
    }
    assert!(solver.warmup().weight(1.0) > 0.9);

    let effector = Effector::world(Transform::from_position(target));
    let mut out = Vec::new();
    for _ in 0..300 {
        let frame = FrameInput::new(DT, Transform::IDENTITY, &pose, effector).with_reset(true);
        out = solver.evaluate(&frame).unwrap().to_vec();
    }
    // The held chain sits at the target height; only the reset blend brings
    // the output back down.
    assert_relative_eq!(solver.chain().links()[0].position().y, 50.0, epsilon = 1e-4);
    for (bone, base) in out.iter().zip(&pose) {
        assert!(
            bone.transform.abs_diff_eq(base, 1e-4),
            "{:?} != {:?}",
            bone.transform.position,
            base.position
        );
    }
}

#[test]
fn strict_chain_replays_a_straight_line() {
    let pose = straight_pose(5, 10.0);
    let config = ChainFollowConfig::strict()
        .with_height(HeightMode::Free)
        .with_warmup(Warmup::Disabled);
    let mut solver = ChainFollowSolver::new(config, ids(5));

    let mut x = 40.0;
    let mut out = Vec::new();
    for _ in 0..300 {
        x += 2.0;
        out = step(&mut solver, Transform::IDENTITY, &pose, Vec3::new(x, 0.0, 0.0));
    }

    for (k, link) in solver.chain().links().iter().enumerate() {
        assert_relative_eq!(link.position().x, x - 10.0 * (4 - k) as f32, epsilon = 1e-3);
    }
    assert_eq!(solver.last_detected_link(), Some(0));
    for pair in out.windows(2) {
        assert_relative_eq!(
            pair[0].transform.position.distance(pair[1].transform.position),
            10.0,
            epsilon = 1e-2
        );
    }
}

#[test]
fn invalid_configuration_leaves_host_pose_alone() {
    init_logging();
    let pose = straight_pose(3, 10.0);
    let mut host_pose = pose.clone();

    let mut single = ChainFollowSolver::new(ChainFollowConfig::default(), ids(1));
    let frame = FrameInput::new(DT, Transform::IDENTITY, &pose, Effector::world(Transform::IDENTITY));
    match single.evaluate(&frame) {
        Ok(bones) => write_back(bones, &mut host_pose),
        Err(err) => assert_eq!(err, ChainError::TooFewLinks { configured: 1 }),
    }
    assert_eq!(host_pose, pose);

    let config = ChainFollowConfig::strict().with_precision(-1.0);
    let mut imprecise = ChainFollowSolver::new(config, ids(3));
    assert_eq!(
        imprecise.evaluate(&frame).err(),
        Some(ChainError::NonPositivePrecision(-1.0))
    );
}

#[test]
fn packed_output_matches_bone_transforms() {
    let pose = straight_pose(3, 10.0);
    let mut solver = ChainFollowSolver::new(ChainFollowConfig::unstrict(), ids(3));
    let bones = step(&mut solver, Transform::IDENTITY, &pose, Vec3::new(20.0, 0.0, 0.0));

    let packed = pack(&bones);
    let bytes: &[u8] = bytemuck::cast_slice(packed.as_slice());
    assert_eq!(bytes.len(), bones.len() * 48);
    for (bone, record) in bones.iter().zip(&packed) {
        assert_eq!(record.bone_index as usize, bone.link.index());
        assert_eq!(record.position, bone.transform.position.to_array());
        assert_eq!(record.scale, bone.transform.scale.to_array());
    }
}
