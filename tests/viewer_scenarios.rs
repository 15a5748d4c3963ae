use std::collections::HashSet;

use cgmath::Vector3;
use voxel_viewer::{
    application_state::{
        input_controller::InputController, input_state::InputEvent, pointer_lock::PointerLock,
        subscription::EventKind,
    },
    config::{CameraConfig, ControlsConfig, TerrainConfig, ViewerConfig},
    engine_state::{
        camera_state::{CameraMode, CameraRig},
        voxels::{noise_field::NoiseField, terrain::TerrainGenerator},
        world::{FrameMotion, World},
    },
};
use web_time::Duration;

fn key_down(key: &str) -> InputEvent {
    InputEvent::KeyDown {
        key: key.to_string(),
        repeat: false,
    }
}

fn key_up(key: &str) -> InputEvent {
    InputEvent::KeyUp {
        key: key.to_string(),
        repeat: false,
    }
}

fn captured_controller() -> InputController {
    let mut controller = InputController::new(&ControlsConfig::default());
    assert!(controller.request_capture());
    controller.handle_event(&InputEvent::CaptureChanged { captured: true });
    controller
}

#[test]
fn four_small_chunks_tile_a_four_by_four_square() {
    let mut generator = TerrainGenerator::new(TerrainConfig {
        chunk_size: 2,
        num_chunks: 4,
        ..TerrainConfig::default()
    });
    let blocks = generator.generate();

    assert_eq!(blocks.len(), 16);
    let indices: Vec<u32> = blocks.iter().map(|b| b.instance_index).collect();
    assert_eq!(indices, (0..16).collect::<Vec<u32>>());

    let mut columns = HashSet::new();
    for span in blocks.chunk_spans() {
        let footprint: HashSet<(i32, i32)> = blocks
            .blocks_in(span)
            .iter()
            .map(|b| (b.world_position.x as i32, b.world_position.z as i32))
            .collect();
        assert_eq!(footprint.len(), 4);
        assert!(columns.is_disjoint(&footprint));
        columns.extend(footprint);
    }
    assert_eq!(columns.len(), 16);
}

#[test]
fn movement_keys_drive_independent_axes() {
    let speed = ControlsConfig::default().speed;
    let mut controller = captured_controller();

    controller.handle_event(&key_down("w"));
    assert_eq!(controller.velocity().z, speed);

    controller.handle_event(&key_down("a"));
    assert_eq!(controller.velocity(), Vector3::new(-speed, 0.0, speed));

    controller.handle_event(&InputEvent::KeyDown {
        key: "w".to_string(),
        repeat: true,
    });
    assert_eq!(controller.velocity().z, speed);

    controller.handle_event(&key_up("w"));
    assert_eq!(controller.velocity().z, 0.0);
    assert_eq!(controller.velocity().x, -speed);

    controller.handle_event(&key_up("a"));
    assert_eq!(controller.velocity(), Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn topdown_pan_is_scaled_by_the_multiplier() {
    let mut rig = CameraRig::new(
        &CameraConfig::default(),
        &ControlsConfig::default(),
        800,
        600,
    );
    let start = rig.topdown().position;
    let walker = rig.first_person().position;

    rig.update(
        CameraMode::Topdown,
        Vector3::new(1.0, 0.0, 0.0),
        Duration::from_secs(1),
    );

    assert!((rig.topdown().position.x - (start.x + 5.0)).abs() < 1e-5);
    assert_eq!(rig.first_person().position, walker);
}

#[test]
fn toggling_twice_restores_the_capture_change_binding() {
    let mut controller = captured_controller();
    assert!(controller.is_bound(EventKind::CaptureChange));

    controller.handle_event(&key_down("t"));
    assert_eq!(controller.mode(), CameraMode::Topdown);
    assert!(!controller.is_bound(EventKind::CaptureChange));
    assert!(!controller.request_capture());

    controller.handle_event(&key_up("t"));
    controller.handle_event(&key_down("T"));
    assert_eq!(controller.mode(), CameraMode::FirstPerson);
    assert!(controller.is_bound(EventKind::CaptureChange));
}

#[test]
fn noise_field_is_deterministic() {
    let field = NoiseField::default();
    for &(x, y, z) in &[(0.3, 1.7, 0.05), (-4.2, 9.9, 0.0), (12.5, -0.25, 0.08)] {
        let first = field.sample(x, y, z);
        assert_eq!(first, field.sample(x, y, z));
        assert!((-1.0..=1.0).contains(&first));
    }
}

#[test]
fn a_frame_moves_the_walker_and_picks_ahead() {
    let config = ViewerConfig {
        terrain: TerrainConfig {
            chunk_size: 8,
            num_chunks: 4,
            amplitude: 0.0,
            seed: Some(1),
            ..TerrainConfig::default()
        },
        ..ViewerConfig::default()
    };
    let mut world = World::new(&config, 800, 600);
    assert_eq!(world.blocks().len(), 256);

    let start = world.rig().first_person().position;
    let result = world.advance(
        FrameMotion {
            mode: CameraMode::FirstPerson,
            velocity: Vector3::new(0.0, 0.0, 2.0),
            look_delta: cgmath::Vector2::new(0.0, 0.0),
        },
        Duration::from_millis(500),
    );

    let moved = world.rig().first_person().position;
    assert!((moved.z - (start.z - 1.0)).abs() < 1e-4);

    // The walker stands inside the column at z = 4, so the next block ahead is hit.
    let hit = result.hit.expect("block ahead of the camera");
    assert_eq!(hit.block.world_position, cgmath::Point3::new(0.0, 0.0, 3.0));
    assert!((hit.distance - 0.5).abs() < 1e-4);
    assert!(result.highlight.is_some());
}

#[test]
fn lock_dropped_by_the_platform_stops_movement() {
    let speed = ControlsConfig::default().speed;
    let lock = PointerLock::new();
    let mut controller = InputController::new(&ControlsConfig::default());

    // Nothing is bound until the platform confirms the lock.
    assert_eq!(lock.poll(), None);
    assert!(!controller.handle_event(&key_down("w")));

    lock.report(true);
    controller.sync_capture(lock.poll().unwrap());
    controller.handle_event(&key_down("w"));
    assert_eq!(controller.velocity().z, speed);

    lock.report(false);
    controller.sync_capture(lock.poll().unwrap());
    assert_eq!(controller.velocity(), Vector3::new(0.0, 0.0, 0.0));
    assert!(!controller.is_bound(EventKind::KeyDown));
    assert!(controller.request_capture());
}
