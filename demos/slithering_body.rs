//! Headless run of a serpent body: a strict spine chases a weaving effector and
//! a tail drags over a bumpy floor. Run with `RUST_LOG=debug` to see warm-up
//! transitions and path bootstraps.

use chain_follow_ik::{
    pack, write_back, ChainFollowConfig, ChainFollowSolver, Effector, FrameInput, HeightMode, NamedSkeleton,
    ObstacleWorld, StabilityAnchor, TailConfig, TailFrame, TailSolver, TraceShape, TraceThrottle,
    Transform, Warmup,
};
use glam::{Quat, Vec3};

const SPINE: usize = 8;
const TAIL: usize = 5;
const SEGMENT: f32 = 25.0;
const DT: f32 = 1.0 / 60.0;
const FRAMES: usize = 600;

fn bone_names() -> Vec<String> {
    (0..SPINE)
        .map(|i| format!("spine_{i:02}"))
        .chain((0..TAIL).map(|i| format!("tail_{i:02}")))
        .collect()
}

/// Bind pose in component space: the tail trails behind the pelvis (spine_00),
/// the spine runs forward from it.
fn bind_pose() -> Vec<Transform> {
    let spine = (0..SPINE).map(|i| Transform::from_position(Vec3::X * SEGMENT * i as f32));
    let tail = (1..=TAIL).map(|i| Transform::from_position(Vec3::new(-SEGMENT * i as f32, 0.0, 0.0)));
    spine.chain(tail).collect()
}

fn floor() -> ObstacleWorld {
    let mut world = ObstacleWorld::new();
    world.add_aabb(Vec3::new(-1.0e5, -50.0, -1.0e5), Vec3::new(1.0e5, 0.0, 1.0e5));
    for i in 0..12 {
        let x = -400.0 + 150.0 * i as f32;
        world.add_box(Vec3::new(x, 5.0, (i as f32 * 0.7).sin() * 60.0), Vec3::new(30.0, 15.0, 30.0));
    }
    world.add_sphere(Vec3::new(600.0, -20.0, 0.0), 60.0);
    world
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let names = bone_names();
    let skeleton = NamedSkeleton::new(names.iter().map(String::as_str));
    let spine_names = &names[..SPINE];
    // Tail chain starts at the pelvis so it stays attached to the body.
    let tail_names: Vec<&str> = std::iter::once(names[0].as_str())
        .chain(names[SPINE..].iter().map(String::as_str))
        .collect();

    let spine_config = ChainFollowConfig::strict()
        .with_height(HeightMode::GroundLimited)
        .with_warmup(Warmup::Distance { threshold: 300.0 })
        .with_precision(2.0)
        .with_stability(StabilityAnchor {
            core_index: 0,
            calibration: 0.0,
        });
    let mut spine = ChainFollowSolver::from_bone_names(spine_config, &skeleton, spine_names);

    let tail_config = TailConfig::default()
        .with_float_height(12.0)
        .with_trace_heights(120.0, 80.0)
        .with_shape(TraceShape::Sphere { radius: 4.0 })
        .with_pinned_root(true)
        .with_throttle(TraceThrottle::default().with_max_camera_distance(5000.0));
    let mut tail = TailSolver::from_bone_names(tail_config, &skeleton, &tail_names);

    let world = floor();
    let bind = bind_pose();
    let mut pose = bind.clone();
    let camera = Vec3::new(0.0, 400.0, -600.0);

    for frame in 0..FRAMES {
        let t = frame as f32 * DT;
        let heading = Quat::from_rotation_y((t * 0.8).sin() * 0.6);
        let owner = Transform::from_position_rotation(Vec3::new(t * 120.0, 40.0, (t * 1.3).sin() * 80.0), heading);
        let velocity = Vec3::new(120.0, 0.0, (t * 1.3).cos() * 104.0);

        pose.copy_from_slice(&bind);

        let lead = Vec3::X * SEGMENT * (SPINE - 1) as f32 + Vec3::Z * (t * 3.0).sin() * 30.0;
        let effector = Effector::component(Transform::from_position(lead));
        let spine_frame = FrameInput::new(DT, owner, &bind, effector).with_velocity(velocity);
        match spine.evaluate(&spine_frame) {
            Ok(bones) => write_back(bones, &mut pose),
            Err(err) => log::error!("spine skipped: {err}"),
        }

        let tail_frame = TailFrame::new(DT, owner, &pose).with_camera(camera);
        let packed = match tail.evaluate(&tail_frame, &world) {
            Ok(bones) => {
                let bones = bones.to_vec();
                write_back(&bones, &mut pose);
                pack(&bones)
            }
            Err(err) => {
                log::error!("tail skipped: {err}");
                Vec::new()
            }
        };

        if frame % 60 == 0 {
            let head = pose[SPINE - 1].then(&owner).position;
            let tail_tip = pose[SPINE + TAIL - 1].then(&owner).position;
            log::info!(
                "t={t:5.2}s warm-up {:?} alpha {:.2} | head {head:.1} | tail tip {tail_tip:.1} | {} tail bytes",
                spine.warmup_state(),
                spine.warmup().alpha(),
                bytemuck::cast_slice::<_, u8>(packed.as_slice()).len(),
            );
        }
    }

    log::info!(
        "done: path holds {} samples over {:.1} units",
        spine.recorded_path().len(),
        spine.recorded_path().arc_length()
    );
}
