//! First-Person Example
//!
//! A playable example with a capsule character on a floor with a few boxes to
//! climb on and crouch under.
//!
//! ## Controls
//! - **W/A/S/D**: Move
//! - **Mouse**: Look
//! - **Shift** (hold): Run
//! - **Ctrl** (hold): Crouch
//! - **Space**: Jump
//! - **Escape**: Release the cursor, click to grab it again

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};
use bevy_rapier3d::prelude::*;
use msg_fps_controller::prelude::*;

// ==================== Constants ====================

/// Look units per pixel of mouse motion.
const MOUSE_SCALE: f32 = 0.04;

const FLOOR_HALF_SIZE: f32 = 30.0;

// ==================== Main ====================

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "First Person - Controller Example".into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        // Character controller
        .add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default())
        .add_systems(Startup, (setup_level, spawn_player, grab_cursor))
        .add_systems(
            Update,
            (keyboard_input, mouse_input, cursor_toggle).before(FirstPersonSet::Input),
        )
        .run();
}

/// Marker component for the player entity.
#[derive(Component)]
struct Player;

// ==================== Setup ====================

fn setup_level(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let floor_material = materials.add(Color::srgb(0.35, 0.4, 0.35));
    let box_material = materials.add(Color::srgb(0.6, 0.45, 0.3));

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(FLOOR_HALF_SIZE * 2.0, 1.0, FLOOR_HALF_SIZE * 2.0))),
        MeshMaterial3d(floor_material),
        Transform::from_xyz(0.0, -0.5, 0.0),
        RigidBody::Fixed,
        Collider::cuboid(FLOOR_HALF_SIZE, 0.5, FLOOR_HALF_SIZE),
    ));

    // A step to jump on and a low ceiling to crouch under
    let boxes = [
        (Vec3::new(4.0, 0.4, -6.0), Vec3::new(2.0, 0.4, 2.0)),
        (Vec3::new(-4.0, 2.0, -6.0), Vec3::new(2.0, 0.25, 3.0)),
        (Vec3::new(-5.75, 0.875, -6.0), Vec3::new(0.25, 0.875, 3.0)),
        (Vec3::new(-2.25, 0.875, -6.0), Vec3::new(0.25, 0.875, 3.0)),
    ];
    for (center, half) in boxes {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(half.x * 2.0, half.y * 2.0, half.z * 2.0))),
            MeshMaterial3d(box_material.clone()),
            Transform::from_translation(center),
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y, half.z),
        ));
    }

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(8.0, 16.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spawn_player(world: &mut World) {
    let camera = world.spawn((Camera3d::default(), Transform::default())).id();
    let player = world
        .spawn((
            Player,
            Transform::from_xyz(0.0, 1.5, 4.0),
            Rapier3dCharacterBundle::default(),
            Collider::capsule_y(0.5, 0.5),
        ))
        .add_child(camera)
        .id();

    let config = ControllerConfig::default();
    if let Err(err) = attach::<Rapier3dBackend>(world, player, config, Some(camera)) {
        error!("could not attach the first-person controller: {err}");
    }
}

// ==================== Input ====================

/// Translates keyboard state into controller input messages.
///
/// Move is re-sent whenever the direction changes and canceled when no key is
/// held. Run, crouch and jump follow the key edges.
fn keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    q_player: Query<Entity, With<Player>>,
    mut inputs: MessageWriter<ControllerInput>,
    mut last_move: Local<Vec2>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };

    let mut direction = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        direction.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        direction.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }

    if direction != *last_move {
        if direction == Vec2::ZERO {
            inputs.write(ControllerInput::canceled(player, InputAction::Move));
        } else {
            inputs.write(ControllerInput::performed(player, InputAction::Move, direction));
        }
        *last_move = direction;
    }

    let edges = [
        (KeyCode::ShiftLeft, InputAction::Run),
        (KeyCode::ControlLeft, InputAction::Crouch),
        (KeyCode::Space, InputAction::Jump),
    ];
    for (key, action) in edges {
        if keyboard.just_pressed(key) {
            inputs.write(ControllerInput::pressed(player, action));
        }
        if keyboard.just_released(key) {
            inputs.write(ControllerInput::canceled(player, action));
        }
    }
}

/// Forwards this frame's mouse motion as the look vector.
fn mouse_input(
    mut mouse_motion: MessageReader<MouseMotion>,
    q_player: Query<Entity, With<Player>>,
    q_cursor: Query<&CursorOptions, With<PrimaryWindow>>,
    mut inputs: MessageWriter<ControllerInput>,
    mut looking: Local<bool>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };

    let mut delta = Vec2::ZERO;
    for motion in mouse_motion.read() {
        delta += motion.delta;
    }

    let grabbed = q_cursor
        .single()
        .is_ok_and(|cursor| cursor.grab_mode != CursorGrabMode::None);

    if grabbed && delta != Vec2::ZERO {
        // Screen Y grows downward; positive look Y looks up
        let look = Vec2::new(delta.x, -delta.y) * MOUSE_SCALE;
        inputs.write(ControllerInput::performed(player, InputAction::Look, look));
        *looking = true;
    } else if *looking {
        inputs.write(ControllerInput::canceled(player, InputAction::Look));
        *looking = false;
    }
}

// ==================== Cursor ====================

fn grab_cursor(mut q_cursor: Query<&mut CursorOptions, With<PrimaryWindow>>) {
    if let Ok(mut cursor) = q_cursor.single_mut() {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
    }
}

fn cursor_toggle(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut q_cursor: Query<&mut CursorOptions, With<PrimaryWindow>>,
) {
    let Ok(mut cursor) = q_cursor.single_mut() else {
        return;
    };

    if keyboard.just_pressed(KeyCode::Escape) {
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
    } else if mouse_button.just_pressed(MouseButton::Left) {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
    }
}
