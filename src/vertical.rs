//! Vertical motion resolver.
//!
//! Runs once per fixed step after the locomotion planner. Gravity is applied
//! while the grounded probe misses; a pending jump becomes an upward impulse
//! only when grounded and standing. Either way the request is consumed: a jump
//! that cannot be granted is dropped, never queued.

use bevy::prelude::*;

use crate::backend::FirstPersonPhysicsBackend;
use crate::config::ControllerConfig;
use crate::state::FirstPersonController;

/// Result of resolving a jump request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    /// No jump was requested.
    Idle,
    /// Grounded and standing: the impulse should be applied.
    Granted,
    /// Requested while airborne or crouching: dropped.
    Dropped,
}

impl FirstPersonController {
    /// Whether gravity should act on the body this step.
    #[inline]
    pub fn needs_gravity(&self) -> bool {
        !self.is_grounded()
    }

    /// Resolve and clear the jump request.
    ///
    /// A second call in the same step always returns [`JumpOutcome::Idle`].
    pub fn resolve_jump(&mut self) -> JumpOutcome {
        if !std::mem::take(&mut self.jump_requested) {
            return JumpOutcome::Idle;
        }
        if self.is_grounded() && !self.is_crouching() {
            JumpOutcome::Granted
        } else {
            JumpOutcome::Dropped
        }
    }
}

/// Accelerate airborne bodies downward.
pub fn apply_gravity<B: FirstPersonPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, f32)> = world
        .query::<(Entity, &ControllerConfig, &FirstPersonController)>()
        .iter(world)
        .filter(|(_, _, controller)| controller.needs_gravity())
        .map(|(e, config, _)| (e, config.gravity_acceleration))
        .collect();

    for (entity, gravity) in entities {
        B::apply_acceleration(world, entity, Vec3::NEG_Y * gravity);
    }
}

/// Turn pending jump requests into impulses.
pub fn apply_jump<B: FirstPersonPhysicsBackend>(world: &mut World) {
    let mut granted: Vec<(Entity, f32)> = Vec::new();

    let mut q = world.query::<(Entity, &ControllerConfig, &mut FirstPersonController)>();
    for (entity, config, mut controller) in q.iter_mut(world) {
        if !controller.jump_requested {
            continue;
        }
        match controller.resolve_jump() {
            JumpOutcome::Granted => granted.push((entity, config.jump_impulse)),
            JumpOutcome::Dropped => trace!(
                "{entity}: jump dropped (grounded: {}, crouching: {})",
                controller.is_grounded(),
                controller.is_crouching()
            ),
            JumpOutcome::Idle => {}
        }
    }

    for (entity, impulse) in granted {
        debug!("{entity}: jump impulse {impulse}");
        B::apply_impulse(world, entity, Vec3::Y * impulse);
    }
}
