//! Integration tests for the first-person controller.
//!
//! These tests run the controller against a real Rapier3D simulation. Each
//! test checks observable results: markers, velocities, positions and the
//! collider actually installed on the body.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::*;
use msg_fps_controller::prelude::*;

/// Create a minimal test app with physics and the first-person controller.
fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
    app.add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));
    // Every update advances time by one step, independent of the machine
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )));

    app.finish();
    app.cleanup();
    app
}

/// Spawn a static ground slab whose top face is at `top`.
fn spawn_ground(app: &mut App, top: f32) -> Entity {
    let transform = Transform::from_xyz(0.0, top - 0.5, 0.0);
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            RigidBody::Fixed,
            Collider::cuboid(50.0, 0.5, 50.0),
        ))
        .id()
}

/// Spawn a character body with a standing capsule and attach a controller.
fn spawn_character(app: &mut App, position: Vec3) -> (Entity, Entity) {
    let camera = app.world_mut().spawn(Transform::default()).id();

    let transform = Transform::from_translation(position);
    let player = app
        .world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            Rapier3dCharacterBundle::default(),
            Collider::capsule_y(0.5, 0.5),
        ))
        .id();

    let config = ControllerConfig::default();
    attach::<Rapier3dBackend>(app.world_mut(), player, config, Some(camera))
        .expect("character should attach");
    (player, camera)
}

/// Run one physics step.
fn tick(app: &mut App) {
    app.update();
    app.world_mut().run_schedule(FixedUpdate);
    app.update();
}

/// Run the app for N physics frames.
fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        tick(app);
    }
}

fn send(app: &mut App, input: ControllerInput) {
    app.world_mut().write_message(input);
}

fn press(app: &mut App, entity: Entity, action: InputAction) {
    send(app, ControllerInput::pressed(entity, action));
}

fn release(app: &mut App, entity: Entity, action: InputAction) {
    send(app, ControllerInput::canceled(entity, action));
}

fn move_input(app: &mut App, entity: Entity, value: Vec2) {
    send(app, ControllerInput::performed(entity, InputAction::Move, value));
}

fn look_input(app: &mut App, entity: Entity, value: Vec2) {
    send(app, ControllerInput::performed(entity, InputAction::Look, value));
}

fn position(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).unwrap().translation
}

fn velocity(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Velocity>(entity).unwrap().linvel
}

fn is_grounded(app: &App, entity: Entity) -> bool {
    app.world()
        .get::<FirstPersonController>(entity)
        .unwrap()
        .is_grounded()
}

// ==================== Attach ====================

#[test]
fn attach_requires_a_collider() {
    let mut app = create_test_app();
    let camera = app.world_mut().spawn(Transform::default()).id();
    let player = app
        .world_mut()
        .spawn((Transform::default(), Rapier3dCharacterBundle::default()))
        .id();

    let result = attach::<Rapier3dBackend>(
        app.world_mut(),
        player,
        ControllerConfig::default(),
        Some(camera),
    );

    assert_eq!(result, Err(ControllerError::MissingPhysicsBody(player)));
}

#[test]
fn attach_installs_standing_capsule() {
    let mut app = create_test_app();
    let (player, camera) = spawn_character(&mut app, Vec3::new(0.0, 5.0, 0.0));

    let collider = app.world().get::<Collider>(player).unwrap();
    assert!(collider.as_capsule().is_some());
    assert_eq!(
        app.world().get::<Transform>(camera).unwrap().translation,
        Vec3::new(0.0, 1.0, 0.0)
    );
}

// ==================== Ground Detection ====================

#[test]
fn character_resting_on_ground_is_grounded() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0);
    let (player, _) = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));

    run_frames(&mut app, 10);

    assert!(is_grounded(&app, player), "probe should hit the ground slab");
    assert!(app.world().get::<Grounded>(player).is_some());
    assert!(app.world().get::<Airborne>(player).is_none());
}

#[test]
fn character_in_the_air_is_not_grounded() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0);
    let (player, _) = spawn_character(&mut app, Vec3::new(0.0, 20.0, 0.0));

    run_frames(&mut app, 3);

    assert!(!is_grounded(&app, player));
    assert!(app.world().get::<Airborne>(player).is_some());
}

// ==================== Gravity ====================

#[test]
fn airborne_character_falls() {
    let mut app = create_test_app();
    let (player, _) = spawn_character(&mut app, Vec3::new(0.0, 20.0, 0.0));

    run_frames(&mut app, 30);

    assert!(velocity(&app, player).y < -1.0, "vy = {}", velocity(&app, player).y);
    assert!(position(&app, player).y < 20.0);
}

#[test]
fn falling_character_lands() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0);
    let (player, _) = spawn_character(&mut app, Vec3::new(0.0, 3.0, 0.0));

    run_frames(&mut app, 120);

    assert!(is_grounded(&app, player));
    let y = position(&app, player).y;
    assert!(y > 0.5 && y < 1.5, "resting height {y}");
}

// ==================== Jump ====================

#[test]
fn grounded_jump_lifts_the_character() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0);
    let (player, _) = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));
    run_frames(&mut app, 10);
    assert!(is_grounded(&app, player));
    let start_y = position(&app, player).y;

    press(&mut app, player, InputAction::Jump);
    let mut max_y = start_y;
    for _ in 0..20 {
        tick(&mut app);
        max_y = max_y.max(position(&app, player).y);
    }

    assert!(max_y > start_y + 0.2, "start {start_y}, peak {max_y}");
    assert!(!app
        .world()
        .get::<FirstPersonController>(player)
        .unwrap()
        .jump_requested());
}

#[test]
fn crouched_jump_does_nothing() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0);
    let (player, _) = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));
    press(&mut app, player, InputAction::Crouch);
    run_frames(&mut app, 30);
    let start_y = position(&app, player).y;

    press(&mut app, player, InputAction::Jump);
    let mut max_y = start_y;
    for _ in 0..20 {
        tick(&mut app);
        max_y = max_y.max(position(&app, player).y);
    }

    assert!(max_y < start_y + 0.1, "start {start_y}, peak {max_y}");
}

// ==================== Locomotion ====================

#[test]
fn walking_forward_moves_along_negative_z() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0);
    let (player, _) = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));
    run_frames(&mut app, 5);
    let start = position(&app, player);

    move_input(&mut app, player, Vec2::Y);
    run_frames(&mut app, 30);

    let end = position(&app, player);
    assert!(end.z < start.z - 0.5, "start {start}, end {end}");
    assert!((end.x - start.x).abs() < 0.1);
}

#[test]
fn releasing_move_stops_horizontal_motion() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0);
    let (player, _) = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));

    move_input(&mut app, player, Vec2::X);
    run_frames(&mut app, 10);
    release(&mut app, player, InputAction::Move);
    run_frames(&mut app, 5);

    let v = velocity(&app, player);
    assert!(Vec2::new(v.x, v.z).length() < 0.1, "v = {v}");
}

// ==================== Crouch ====================

#[test]
fn crouch_swaps_collider_and_lowers_camera() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0);
    let (player, camera) = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));
    run_frames(&mut app, 3);

    press(&mut app, player, InputAction::Crouch);
    tick(&mut app);

    let collider = app.world().get::<Collider>(player).unwrap();
    assert!(collider.as_compound().is_some());
    let camera_y = app.world().get::<Transform>(camera).unwrap().translation.y;
    assert!((camera_y - 0.8).abs() < 1e-5);
    assert!(app.world().get::<Crouching>(player).is_some());

    release(&mut app, player, InputAction::Crouch);
    tick(&mut app);

    let collider = app.world().get::<Collider>(player).unwrap();
    assert!(collider.as_capsule().is_some());
    assert_eq!(
        app.world().get::<Transform>(camera).unwrap().translation,
        Vec3::new(0.0, 1.0, 0.0)
    );
    assert!(app.world().get::<Crouching>(player).is_none());
}

#[test]
fn crouching_keeps_feet_on_the_ground() {
    let mut app = create_test_app();
    spawn_ground(&mut app, 0.0);
    let (player, _) = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));
    run_frames(&mut app, 30);
    let rest_y = position(&app, player).y;

    for _ in 0..3 {
        press(&mut app, player, InputAction::Crouch);
        for _ in 0..20 {
            tick(&mut app);
            assert!(is_grounded(&app, player), "lost the ground while crouched");
        }
        let crouched_y = position(&app, player).y;
        assert!((crouched_y - rest_y).abs() < 0.05, "crouched at {crouched_y}");

        release(&mut app, player, InputAction::Crouch);
        run_frames(&mut app, 20);
        let standing_y = position(&app, player).y;
        assert!((standing_y - rest_y).abs() < 0.05, "standing at {standing_y}");
    }
}

// ==================== Orientation ====================

#[test]
fn look_turns_body_and_pitches_camera() {
    let mut app = create_test_app();
    let (player, camera) = spawn_character(&mut app, Vec3::new(0.0, 20.0, 0.0));

    look_input(&mut app, player, Vec2::new(4.0, -4.0));
    tick(&mut app);
    release(&mut app, player, InputAction::Look);
    tick(&mut app);

    let body_forward = app
        .world()
        .get::<Transform>(player)
        .unwrap()
        .forward()
        .as_vec3();
    assert!(body_forward.x > 0.0, "body should have turned right: {body_forward}");

    let camera_forward = app
        .world()
        .get::<Transform>(camera)
        .unwrap()
        .forward()
        .as_vec3();
    assert!(camera_forward.y < 0.0, "camera should look down: {camera_forward}");
}
