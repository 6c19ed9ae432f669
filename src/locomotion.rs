//! Locomotion planner.
//!
//! Once per fixed step, turn the move vector into a body-relative horizontal
//! velocity. The vertical component of the body's velocity is read back and
//! written unchanged so gravity and jumps are never overridden here.

use bevy::prelude::*;

use crate::backend::FirstPersonPhysicsBackend;
use crate::config::ControllerConfig;
use crate::state::FirstPersonController;

/// Which speed the planner selected.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedMode {
    Walk,
    Run,
    Crouch,
}

impl SpeedMode {
    /// Select a mode. Crouch wins over run, run wins over walk.
    pub fn select(running: bool, crouching: bool) -> Self {
        if crouching {
            SpeedMode::Crouch
        } else if running {
            SpeedMode::Run
        } else {
            SpeedMode::Walk
        }
    }

    /// Configured speed for this mode.
    pub fn speed(self, config: &ControllerConfig) -> f32 {
        match self {
            SpeedMode::Walk => config.walk_speed,
            SpeedMode::Run => config.run_speed,
            SpeedMode::Crouch => config.crouch_speed,
        }
    }
}

impl FirstPersonController {
    /// Speed mode for the current held flags.
    #[inline]
    pub fn speed_mode(&self) -> SpeedMode {
        SpeedMode::select(self.run_held, self.is_crouching())
    }

    /// Target velocity for this step.
    ///
    /// `right` and `forward` are the body's axes. The result carries
    /// `current_velocity.y` through untouched.
    pub fn plan_velocity(
        &self,
        config: &ControllerConfig,
        right: Vec3,
        forward: Vec3,
        current_velocity: Vec3,
    ) -> Vec3 {
        let input = config.move_input_mode.apply(self.move_input);
        let direction = right * input.x + forward * input.y;
        let target = direction * self.speed_mode().speed(config);
        Vec3::new(target.x, current_velocity.y, target.z)
    }
}

/// Set each controlled body's horizontal velocity from its move input.
pub fn apply_locomotion<B: FirstPersonPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, ControllerConfig, FirstPersonController, Vec3, Vec3)> = world
        .query::<(Entity, &ControllerConfig, &FirstPersonController, &Transform)>()
        .iter(world)
        .map(|(e, config, controller, transform)| {
            (
                e,
                *config,
                controller.clone(),
                transform.right().as_vec3(),
                transform.forward().as_vec3(),
            )
        })
        .collect();

    for (entity, config, controller, right, forward) in entities {
        let current_velocity = B::get_velocity(world, entity);
        let new_velocity = controller.plan_velocity(&config, right, forward, current_velocity);
        B::set_velocity(world, entity, new_velocity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MoveInputMode;

    fn controller(config: &ControllerConfig) -> FirstPersonController {
        let mut world = World::new();
        let camera = world.spawn_empty().id();
        FirstPersonController::new(config, camera)
    }

    #[test]
    fn speed_priority_crouch_run_walk() {
        assert_eq!(SpeedMode::select(false, false), SpeedMode::Walk);
        assert_eq!(SpeedMode::select(true, false), SpeedMode::Run);
        assert_eq!(SpeedMode::select(false, true), SpeedMode::Crouch);
        // Crouch always beats run
        assert_eq!(SpeedMode::select(true, true), SpeedMode::Crouch);
    }

    #[test]
    fn speed_mode_maps_to_config() {
        let config = ControllerConfig::default().with_speeds(3.0, 8.0, 1.5);
        assert_eq!(SpeedMode::Walk.speed(&config), 3.0);
        assert_eq!(SpeedMode::Run.speed(&config), 8.0);
        assert_eq!(SpeedMode::Crouch.speed(&config), 1.5);
    }

    #[test]
    fn forward_input_walks_forward() {
        let config = ControllerConfig::default();
        let mut controller = controller(&config);
        controller.move_input = Vec2::new(0.0, 1.0);

        let velocity = controller.plan_velocity(&config, Vec3::X, Vec3::NEG_Z, Vec3::ZERO);

        assert_eq!(velocity, Vec3::new(0.0, 0.0, -config.walk_speed));
    }

    #[test]
    fn direction_is_body_relative() {
        let config = ControllerConfig::default();
        let mut controller = controller(&config);
        controller.move_input = Vec2::new(0.0, 1.0);

        // Body turned 90 degrees right: forward is +X
        let turn = Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2);
        let body = Transform::from_rotation(turn);
        let velocity = controller.plan_velocity(
            &config,
            body.right().as_vec3(),
            body.forward().as_vec3(),
            Vec3::ZERO,
        );

        assert!((velocity - Vec3::new(config.walk_speed, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn diagonal_run_is_not_normalized() {
        let config = ControllerConfig::default();
        let mut controller = controller(&config);
        controller.move_input = Vec2::new(1.0, 1.0);
        controller.run_held = true;

        let velocity = controller.plan_velocity(&config, Vec3::X, Vec3::NEG_Z, Vec3::ZERO);

        assert_eq!(velocity, Vec3::new(config.run_speed, 0.0, -config.run_speed));
        let horizontal = Vec2::new(velocity.x, velocity.z).length();
        assert!(horizontal > config.run_speed);
    }

    #[test]
    fn clamped_mode_caps_diagonal_speed() {
        let config =
            ControllerConfig::default().with_move_input_mode(MoveInputMode::ClampMagnitude);
        let mut controller = controller(&config);
        controller.move_input = Vec2::new(1.0, 1.0);

        let velocity = controller.plan_velocity(&config, Vec3::X, Vec3::NEG_Z, Vec3::ZERO);

        let horizontal = Vec2::new(velocity.x, velocity.z).length();
        assert!((horizontal - config.walk_speed).abs() < 1e-4);
    }

    #[test]
    fn vertical_velocity_is_untouched() {
        let config = ControllerConfig::default();
        let mut controller = controller(&config);
        controller.move_input = Vec2::new(-0.3, 0.8);

        for vy in [-12.5, 0.0, 4.2] {
            let current = Vec3::new(9.0, vy, 9.0);
            let velocity = controller.plan_velocity(&config, Vec3::X, Vec3::NEG_Z, current);
            assert_eq!(velocity.y, vy);
        }
    }

    #[test]
    fn no_input_stops_horizontal_motion() {
        let config = ControllerConfig::default();
        let controller = controller(&config);

        let velocity =
            controller.plan_velocity(&config, Vec3::X, Vec3::NEG_Z, Vec3::new(3.0, -1.0, 2.0));

        assert_eq!(velocity, Vec3::new(0.0, -1.0, 0.0));
    }
}
