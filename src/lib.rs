//! # `msg_fps_controller`
//!
//! A first-person rigidbody character controller with physics backend abstraction.
//!
//! This crate turns directional and look input into physically simulated
//! locomotion for a capsule-shaped rigid body:
//! - Body-relative walk, run and crouch speeds
//! - Mouse-style look with yaw on the body and clamped pitch on the camera
//! - Jump impulses, granted only when grounded and standing
//! - Controller-owned gravity while airborne
//! - A crouch stance that swaps the collision capsule and lowers the camera
//! - Abstracts the physics backend for easy swapping (Rapier3D included)
//!
//! ## Architecture
//!
//! All behavior reads and writes one [`FirstPersonController`](state::FirstPersonController)
//! component per controlled entity:
//! 1. Input messages are aggregated into a per-frame snapshot (`Update`)
//! 2. Crouch transitions push their collider and camera changes (`Update`)
//! 3. Look input rotates the body and pitches the camera (`Update`)
//! 4. Each fixed step probes the ground, plans horizontal velocity, then
//!    applies gravity and jumps (`FixedUpdate`)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_rapier3d::prelude::*;
//! use msg_fps_controller::prelude::*;
//!
//! fn spawn_player(world: &mut World) {
//!     let camera = world.spawn((Camera3d::default(), Transform::default())).id();
//!     let player = world
//!         .spawn((
//!             Transform::from_xyz(0.0, 2.0, 0.0),
//!             Rapier3dCharacterBundle::default(),
//!             Collider::capsule_y(0.5, 0.5),
//!         ))
//!         .add_child(camera)
//!         .id();
//!
//!     attach::<Rapier3dBackend>(world, player, ControllerConfig::default(), Some(camera))
//!         .expect("player has a body and a camera");
//! }
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod crouch;
pub mod error;
pub mod intent;
pub mod locomotion;
pub mod orientation;
pub mod state;
pub mod vertical;

#[cfg(feature = "rapier3d")]
pub mod rapier;

use crate::backend::FirstPersonPhysicsBackend;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::state::FirstPersonController;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::attach;
    pub use crate::backend::FirstPersonPhysicsBackend;
    pub use crate::collision::CollisionData;
    pub use crate::config::{ControllerConfig, MoveInputMode};
    pub use crate::crouch::{CollisionShape, CrouchState};
    pub use crate::error::{ConfigError, ControllerError};
    pub use crate::intent::{ActionPhase, ControllerInput, InputAction};
    pub use crate::locomotion::SpeedMode;
    pub use crate::orientation::MAX_PITCH;
    pub use crate::state::{Airborne, Crouching, FirstPersonController, Grounded};
    pub use crate::vertical::JumpOutcome;
    pub use crate::{FirstPersonControllerPlugin, FirstPersonSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dCharacterBundle};
}

/// System sets for the controller pipeline.
///
/// `Input`, `Crouch` and `Orientation` run chained in `Update`.
/// `Sensors`, `Locomotion`, `VerticalMotion` and `StateSync` run chained in
/// `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FirstPersonSet {
    /// Drain input messages into controller state.
    Input,
    /// Push crouch shape and camera offset changes.
    Crouch,
    /// Apply look input to body yaw and camera pitch.
    Orientation,
    /// Backend grounded probe.
    Sensors,
    /// Horizontal velocity from move input.
    Locomotion,
    /// Gravity, then jump.
    VerticalMotion,
    /// Marker component sync.
    StateSync,
}

/// Main plugin for the first-person controller.
///
/// Generic over a physics backend `B` which provides the actual physics
/// operations (ground probe, velocity writes, impulses, collider swaps).
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_fps_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(FirstPersonControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct FirstPersonControllerPlugin<B: FirstPersonPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: FirstPersonPhysicsBackend> Default for FirstPersonControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: FirstPersonPhysicsBackend> Plugin for FirstPersonControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        app.register_type::<config::ControllerConfig>();
        app.register_type::<state::FirstPersonController>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::Crouching>();

        app.add_message::<intent::ControllerInput>();

        app.add_plugins(B::plugin());

        app.configure_sets(
            Update,
            (
                FirstPersonSet::Input,
                FirstPersonSet::Crouch,
                FirstPersonSet::Orientation,
            )
                .chain(),
        );
        app.configure_sets(
            FixedUpdate,
            (
                FirstPersonSet::Sensors,
                FirstPersonSet::Locomotion,
                FirstPersonSet::VerticalMotion,
                FirstPersonSet::StateSync,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                intent::aggregate_input.in_set(FirstPersonSet::Input),
                crouch::sync_crouch_geometry::<B>.in_set(FirstPersonSet::Crouch),
                orientation::update_orientation.in_set(FirstPersonSet::Orientation),
            ),
        );

        app.add_systems(
            FixedUpdate,
            (
                locomotion::apply_locomotion::<B>.in_set(FirstPersonSet::Locomotion),
                (vertical::apply_gravity::<B>, vertical::apply_jump::<B>)
                    .chain()
                    .in_set(FirstPersonSet::VerticalMotion),
                state::sync_state_markers.in_set(FirstPersonSet::StateSync),
            ),
        );
    }
}

/// Attach a first-person controller to an existing physics entity.
///
/// Checks every precondition up front and refuses to attach when one fails:
/// the camera must be given and exist with a `Transform`, the entity must
/// exist and carry the backend's rigid body and collider, and the
/// configuration must validate. On success the standing collider and camera
/// offset are applied immediately and the controller starts active.
pub fn attach<B: FirstPersonPhysicsBackend>(
    world: &mut World,
    entity: Entity,
    config: ControllerConfig,
    camera: Option<Entity>,
) -> Result<(), ControllerError> {
    let camera = camera.ok_or(ControllerError::MissingCamera)?;
    if world.get::<Transform>(camera).is_none() {
        return Err(ControllerError::CameraNotFound(camera));
    }
    if world.get_entity(entity).is_err() {
        return Err(ControllerError::EntityNotFound(entity));
    }
    if !B::has_physics_body(world, entity) {
        return Err(ControllerError::MissingPhysicsBody(entity));
    }
    config.validate()?;

    let degenerate = config.degenerate_fields();
    if !degenerate.is_empty() {
        warn!(
            "{entity}: non-positive controller values {degenerate:?}, movement will be degenerate"
        );
    }

    world
        .entity_mut(entity)
        .insert((FirstPersonController::new(&config, camera), config));
    crouch::sync_crouch_geometry::<B>(world);

    info!("{entity}: first-person controller attached, camera {camera}");
    Ok(())
}

/// Activate a previously deactivated controller.
///
/// Returns `false` when the entity has no controller.
pub fn activate(world: &mut World, entity: Entity) -> bool {
    let Some(mut controller) = world.get_mut::<FirstPersonController>(entity) else {
        return false;
    };
    controller.activate();
    info!("{entity}: first-person controller activated");
    true
}

/// Deactivate a controller, canceling every held action.
///
/// Returns `false` when the entity has no controller.
pub fn deactivate(world: &mut World, entity: Entity) -> bool {
    let Some(mut controller) = world.get_mut::<FirstPersonController>(entity) else {
        return false;
    };
    controller.deactivate();
    info!("{entity}: first-person controller deactivated");
    true
}
