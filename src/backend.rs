//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the first-person controller. The controller never integrates
//! velocities or resolves collisions itself; it only writes velocity,
//! impulses, accelerations and collision shapes through this trait.

use bevy::prelude::*;

use crate::crouch::CollisionShape;

/// Trait for physics backend implementations.
///
/// Besides the methods below, a backend's [`plugin`](Self::plugin) must add a
/// system to [`FirstPersonSet::Sensors`](crate::FirstPersonSet::Sensors) that
/// casts the grounded ray for every [`FirstPersonController`] and stores the
/// result with [`FirstPersonController::set_floor`]. Ray queries usually need
/// a backend-specific system parameter, which is why they are not a trait
/// method.
///
/// See the `rapier` module's `Rapier3dBackend` for a full implementation.
///
/// [`FirstPersonController`]: crate::state::FirstPersonController
/// [`FirstPersonController::set_floor`]: crate::state::FirstPersonController::set_floor
pub trait FirstPersonPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Whether the entity carries both a rigid body and a collider.
    fn has_physics_body(world: &World, entity: Entity) -> bool;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Apply an instantaneous impulse to an entity.
    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3);

    /// Apply a continuous acceleration to an entity for one fixed step.
    ///
    /// The default implementation integrates it straight into velocity,
    /// which is independent of the body's mass.
    fn apply_acceleration(world: &mut World, entity: Entity, acceleration: Vec3) {
        let dt = Self::get_fixed_timestep(world);
        let velocity = Self::get_velocity(world, entity);
        Self::set_velocity(world, entity, velocity + acceleration * dt);
    }

    /// Replace the entity's collision shape.
    fn set_collision_shape(world: &mut World, entity: Entity, shape: CollisionShape);

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}
