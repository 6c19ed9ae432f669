//! Crouch state machine.
//!
//! Two states, `Standing` and `Crouching`, toggled by the crouch action for
//! the whole lifetime of the controller. Each transition swaps the collision
//! shape and moves the camera; the swap is recorded on the controller and
//! pushed to the physics engine and camera by [`sync_crouch_geometry`].

use bevy::prelude::*;

use crate::backend::FirstPersonPhysicsBackend;
use crate::config::ControllerConfig;
use crate::state::FirstPersonController;

/// Stance of the controller.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrouchState {
    #[default]
    Standing,
    Crouching,
}

/// Collision capsule description handed to the physics engine.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionShape {
    /// Total capsule height.
    pub height: f32,
    /// Capsule center relative to the body origin.
    pub center: Vec3,
}

impl CollisionShape {
    /// Create a shape.
    pub fn new(height: f32, center: Vec3) -> Self {
        Self { height, center }
    }

    /// Standing capsule, centered on the body origin.
    pub fn standing(config: &ControllerConfig) -> Self {
        Self::new(config.standing_height, Vec3::ZERO)
    }

    /// Crouched capsule, lowered so its bottom stays on the standing capsule's
    /// bottom.
    pub fn crouched(config: &ControllerConfig) -> Self {
        let standing = Self::standing(config);
        let drop = (standing.height - config.crouch_height) / 2.0;
        Self::new(config.crouch_height, standing.center - Vec3::Y * drop)
    }

    /// Distance from the body origin down to the bottom of the shape.
    #[inline]
    pub fn vertical_extent(&self) -> f32 {
        self.height / 2.0 - self.center.y
    }
}

impl FirstPersonController {
    /// Crouch-Start transition.
    ///
    /// Swaps in the crouched shape and lowers the camera to
    /// `crouch_height - crouch_camera_offset`. No-op while already crouching.
    pub fn start_crouch(&mut self, config: &ControllerConfig) {
        if self.crouch == CrouchState::Crouching {
            return;
        }
        self.crouch = CrouchState::Crouching;
        self.current_shape = CollisionShape::crouched(config);
        let camera_y = config.crouch_height - config.crouch_camera_offset;
        self.camera_offset = Vec3::new(0.0, camera_y, 0.0);
        self.geometry_dirty = true;
    }

    /// Crouch-Stop transition.
    ///
    /// Restores the shape and camera offset captured at attach time.
    /// No-op while standing.
    pub fn stop_crouch(&mut self) {
        if self.crouch == CrouchState::Standing {
            return;
        }
        self.crouch = CrouchState::Standing;
        self.current_shape = self.standing_shape;
        self.camera_offset = self.standing_camera_offset;
        self.geometry_dirty = true;
    }
}

/// Push pending shape and camera changes to the physics engine and camera.
pub fn sync_crouch_geometry<B: FirstPersonPhysicsBackend>(world: &mut World) {
    let pending: Vec<(Entity, Entity, CollisionShape, Vec3, CrouchState)> = world
        .query::<(Entity, &FirstPersonController)>()
        .iter(world)
        .filter(|(_, controller)| controller.geometry_dirty)
        .map(|(e, controller)| {
            (
                e,
                controller.camera,
                controller.current_shape,
                controller.camera_offset,
                controller.crouch,
            )
        })
        .collect();

    for (entity, camera, shape, camera_offset, stance) in pending {
        B::set_collision_shape(world, entity, shape);
        if let Some(mut transform) = world.get_mut::<Transform>(camera) {
            transform.translation = camera_offset;
        }

        if let Some(mut controller) = world.get_mut::<FirstPersonController>(entity) {
            controller.geometry_dirty = false;
        }

        debug!(
            "{entity}: {stance:?}, collider height {} center {}, camera {}",
            shape.height, shape.center, camera_offset
        );
    }
}
