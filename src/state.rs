//! Controller state.
//!
//! [`FirstPersonController`] is the one mutable state instance per controlled
//! entity. Input handlers write it, the scheduled systems read and update it,
//! and the physics backend and camera only ever see values derived from it.
//!
//! The marker components at the bottom of this module mirror parts of that
//! state so host systems can filter on them.

use bevy::prelude::*;

use crate::collision::CollisionData;
use crate::config::ControllerConfig;
use crate::crouch::{CollisionShape, CrouchState};

/// The controller state component.
///
/// Created only through [`crate::attach`], which checks the physics and camera
/// preconditions. Fields are private to the crate; each responsibility
/// mutates them through its own methods:
///
/// - input aggregation: [`apply_input`](Self::apply_input)
/// - orientation: [`apply_look`](Self::apply_look)
/// - crouch: [`start_crouch`](Self::start_crouch) / [`stop_crouch`](Self::stop_crouch)
/// - vertical motion: [`resolve_jump`](Self::resolve_jump)
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct FirstPersonController {
    // === Input snapshot ===
    /// Body-relative move vector, components in [-1, 1].
    pub(crate) move_input: Vec2,
    /// Look delta for the current frame.
    pub(crate) look_input: Vec2,
    /// Level-triggered run flag.
    pub(crate) run_held: bool,
    /// Edge-triggered jump flag, cleared when resolved.
    pub(crate) jump_requested: bool,

    // === Orientation ===
    /// Camera pitch in degrees, positive looks down. Always in
    /// [`-MAX_PITCH`, `MAX_PITCH`](crate::orientation::MAX_PITCH).
    pub(crate) pitch: f32,

    // === Crouch ===
    pub(crate) crouch: CrouchState,
    /// Collision shape the physics engine should be using.
    pub(crate) current_shape: CollisionShape,
    /// Shape captured at attach time and restored on Crouch-Stop.
    pub(crate) standing_shape: CollisionShape,
    /// Camera local translation.
    pub(crate) camera_offset: Vec3,
    /// Camera local translation captured at attach time.
    pub(crate) standing_camera_offset: Vec3,
    /// Set when the shape or camera offset changed and still has to be
    /// pushed to the physics engine and camera.
    pub(crate) geometry_dirty: bool,

    // === Wiring ===
    pub(crate) camera: Entity,
    pub(crate) active: bool,

    // === Sensors ===
    /// Result of the latest grounded probe.
    #[reflect(ignore)]
    pub(crate) floor: Option<CollisionData>,
}

impl FirstPersonController {
    /// Build the initial state: standing, zero input, level camera.
    pub(crate) fn new(config: &ControllerConfig, camera: Entity) -> Self {
        let standing_shape = CollisionShape::standing(config);
        let standing_camera_offset = Vec3::new(0.0, config.standing_camera_offset, 0.0);
        Self {
            move_input: Vec2::ZERO,
            look_input: Vec2::ZERO,
            run_held: false,
            jump_requested: false,
            pitch: 0.0,
            crouch: CrouchState::Standing,
            current_shape: standing_shape,
            standing_shape,
            camera_offset: standing_camera_offset,
            standing_camera_offset,
            geometry_dirty: true,
            camera,
            active: true,
            floor: None,
        }
    }

    /// Current move vector.
    #[inline]
    pub fn move_input(&self) -> Vec2 {
        self.move_input
    }

    /// Current look vector.
    #[inline]
    pub fn look_input(&self) -> Vec2 {
        self.look_input
    }

    /// Whether run is held.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.run_held
    }

    /// Whether crouch is held.
    #[inline]
    pub fn is_crouching(&self) -> bool {
        self.crouch == CrouchState::Crouching
    }

    /// Current crouch state.
    #[inline]
    pub fn crouch_state(&self) -> CrouchState {
        self.crouch
    }

    /// Whether a jump is waiting to be resolved.
    #[inline]
    pub fn jump_requested(&self) -> bool {
        self.jump_requested
    }

    /// Camera pitch in degrees (positive looks down).
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Collision shape the body should currently have.
    #[inline]
    pub fn current_shape(&self) -> CollisionShape {
        self.current_shape
    }

    /// Camera local translation.
    #[inline]
    pub fn camera_offset(&self) -> Vec3 {
        self.camera_offset
    }

    /// The camera entity driven by this controller.
    #[inline]
    pub fn camera(&self) -> Entity {
        self.camera
    }

    /// Whether the controller is receiving input.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Latest grounded probe hit, if any.
    #[inline]
    pub fn floor(&self) -> Option<CollisionData> {
        self.floor
    }

    /// Whether the latest grounded probe hit a surface.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.floor.is_some()
    }

    /// Store the grounded probe result. Called by the backend's sensor system.
    pub fn set_floor(&mut self, floor: Option<CollisionData>) {
        self.floor = floor;
    }

    /// Length of the downward grounded probe for the current shape.
    #[inline]
    pub fn ground_probe_length(&self, config: &ControllerConfig) -> f32 {
        self.current_shape.vertical_extent() + config.ground_probe_margin
    }

    /// Register with the input source. Subsequent input is applied.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Unregister from the input source.
    ///
    /// Every in-progress action is canceled: move and look go to zero, run is
    /// released, a pending jump is dropped and an active crouch is stopped.
    pub fn deactivate(&mut self) {
        self.move_input = Vec2::ZERO;
        self.look_input = Vec2::ZERO;
        self.run_held = false;
        self.jump_requested = false;
        self.stop_crouch();
        self.active = false;
    }
}

/// Marker component indicating the grounded probe hit a surface this tick.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the grounded probe missed this tick.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the controller is in the crouching stance.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Crouching;

/// Sync state marker components with the controller state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(
        Entity,
        &FirstPersonController,
        Has<Grounded>,
        Has<Airborne>,
        Has<Crouching>,
    )>,
) {
    for (entity, controller, has_grounded, has_airborne, has_crouching) in &q_controllers {
        let grounded = controller.is_grounded();
        if grounded && !has_grounded {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !grounded && !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }

        let crouching = controller.is_crouching();
        if crouching && !has_crouching {
            commands.entity(entity).insert(Crouching);
        } else if !crouching && has_crouching {
            commands.entity(entity).remove::<Crouching>();
        }
    }
}
