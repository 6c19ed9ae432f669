//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::backend::FirstPersonPhysicsBackend;
use crate::collision::CollisionData;
use crate::config::ControllerConfig;
use crate::crouch::CollisionShape;
use crate::state::FirstPersonController;
use crate::FirstPersonSet;

/// Rapier3D physics backend for the first-person controller.
///
/// Velocity and impulses go through Rapier's `Velocity` and `ExternalImpulse`
/// components. The grounded probe is cast by a dedicated system that receives
/// `ReadRapierContext` as a system parameter.
pub struct Rapier3dBackend;

impl FirstPersonPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn has_physics_body(world: &World, entity: Entity) -> bool {
        world.get::<RigidBody>(entity).is_some() && world.get::<Collider>(entity).is_some()
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3) {
        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(entity) {
            ext_impulse.impulse += impulse;
        } else if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            // No ExternalImpulse: treat the body as unit mass
            vel.linvel += impulse;
        }
    }

    fn set_collision_shape(world: &mut World, entity: Entity, shape: CollisionShape) {
        let radius = world
            .get::<ControllerConfig>(entity)
            .map(|config| config.capsule_radius)
            .unwrap_or(0.5);
        let new_collider = collider_for_shape(shape, radius);

        if let Some(mut collider) = world.get_mut::<Collider>(entity) {
            *collider = new_collider;
        } else if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            entity_mut.insert(new_collider);
        }
    }
}

/// Plugin that sets up Rapier3D-specific systems for the controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            rapier_ground_detection.in_set(FirstPersonSet::Sensors),
        );
    }
}

/// Build a Y-aligned capsule collider for a collision shape.
///
/// The radius is capped at half the height. A capsule with no straight
/// section left becomes a ball. Off-center shapes are wrapped in a compound
/// collider so the body origin stays where it is.
pub fn collider_for_shape(shape: CollisionShape, radius: f32) -> Collider {
    let half_height = shape.height / 2.0;
    let radius = radius.min(half_height);
    let half_segment = half_height - radius;

    let capsule = if half_segment > 0.0 {
        Collider::capsule_y(half_segment, radius)
    } else {
        Collider::ball(radius)
    };

    if shape.center == Vec3::ZERO {
        capsule
    } else {
        Collider::compound(vec![(shape.center, Quat::IDENTITY, capsule)])
    }
}

/// Cast the grounded ray for every controller.
///
/// The ray starts at the body origin and points straight down, reaching the
/// bottom of the current shape plus the configured margin.
fn rapier_ground_detection(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<(
        Entity,
        &GlobalTransform,
        &ControllerConfig,
        &mut FirstPersonController,
    )>,
    mut warned: Local<bool>,
) {
    let Ok(context) = rapier_context.single() else {
        if !*warned && !q_controllers.is_empty() {
            warn!("no Rapier context found; first-person ground detection is disabled");
            *warned = true;
        }
        return;
    };

    for (entity, transform, config, mut controller) in &mut q_controllers {
        let origin = transform.translation();
        let max_distance = controller.ground_probe_length(config);

        let filter = QueryFilter::default()
            .exclude_rigid_body(entity)
            .exclude_sensors();

        let floor = context
            .cast_ray(origin, Vec3::NEG_Y, max_distance, true, filter)
            .map(|(hit_entity, toi)| {
                CollisionData::new(toi, origin + Vec3::NEG_Y * toi, Some(hit_entity))
            });

        controller.set_floor(floor);
    }
}

/// Bundle for creating a first-person character with Rapier3D physics.
///
/// Provides the rigid body, velocity tracking and external impulses used by
/// the controller. Rotation is locked (the controller turns the body through
/// its `Transform`) and Rapier's gravity is disabled because the controller
/// applies its own while airborne. Add a `Collider` alongside it.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_fps_controller::prelude::*;
///
/// fn spawn_player(world: &mut World, camera: Entity) {
///     let player = world
///         .spawn((
///             Transform::from_xyz(0.0, 1.0, 0.0),
///             Rapier3dCharacterBundle::default(),
///             Collider::capsule_y(0.5, 0.5),
///         ))
///         .id();
///     let config = ControllerConfig::default();
///     attach::<Rapier3dBackend>(world, player, config, Some(camera)).unwrap();
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier3dCharacterBundle {
    /// The rigid body type. Should be [`RigidBody::Dynamic`].
    pub rigid_body: RigidBody,
    /// Current linear and angular velocity. The planner writes the linear part.
    pub velocity: Velocity,
    /// Jump impulses are accumulated here.
    pub external_impulse: ExternalImpulse,
    /// Locked rotation keeps the capsule upright.
    pub locked_axes: LockedAxes,
    /// Zero: the controller owns gravity.
    pub gravity_scale: GravityScale,
    /// Computed mass properties.
    pub mass_properties: ReadMassProperties,
}

impl Default for Rapier3dCharacterBundle {
    fn default() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_impulse: ExternalImpulse::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            gravity_scale: GravityScale(0.0),
            // Rapier will update this based on collider after first physics step
            mass_properties: ReadMassProperties::default(),
        }
    }
}

impl Rapier3dCharacterBundle {
    /// Set the rigid body type for the character.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Re-enable Rapier gravity on top of the controller's own.
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = GravityScale(scale);
        self
    }
}
