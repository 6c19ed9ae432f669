//! Controller configuration component.
//!
//! Author-time tuning for speeds, jump, gravity, look sensitivity and the
//! crouch geometry. The configuration is never mutated by the controller.

use bevy::prelude::*;

use crate::error::ConfigError;

/// How the raw move vector is conditioned before it is scaled by speed.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveInputMode {
    /// Use the move vector as delivered. A diagonal `(1, 1)` input moves
    /// `sqrt(2)` times faster than an axis-aligned one.
    #[default]
    Raw,
    /// Clamp the move vector to unit length so diagonals are no faster.
    ClampMagnitude,
}

impl MoveInputMode {
    /// Condition a raw move vector according to this mode.
    #[inline]
    pub fn apply(self, input: Vec2) -> Vec2 {
        match self {
            MoveInputMode::Raw => input,
            MoveInputMode::ClampMagnitude => input.clamp_length_max(1.0),
        }
    }
}

/// Configuration parameters for the first-person controller.
///
/// Distances are in world units, speeds in units/second and angles in degrees.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct ControllerConfig {
    // === Speeds ===
    /// Horizontal speed when neither run nor crouch is held.
    pub walk_speed: f32,

    /// Horizontal speed while run is held.
    pub run_speed: f32,

    /// Horizontal speed while crouching. Wins over `run_speed`.
    pub crouch_speed: f32,

    // === Vertical ===
    /// Magnitude of the one-shot upward impulse applied on a granted jump.
    pub jump_impulse: f32,

    /// Magnitude of the downward acceleration applied while airborne.
    pub gravity_acceleration: f32,

    // === Look ===
    /// Degrees of rotation per unit of look input.
    pub look_sensitivity: f32,

    // === Crouch geometry ===
    /// Capsule height while crouching.
    pub crouch_height: f32,

    /// How far below the top of the crouched capsule the camera sits.
    pub crouch_camera_offset: f32,

    /// Capsule height while standing.
    pub standing_height: f32,

    /// Camera local height above the body origin while standing.
    pub standing_camera_offset: f32,

    /// Capsule radius, shared by both stances.
    pub capsule_radius: f32,

    // === Grounding ===
    /// Extra probe length past the bottom of the collision shape.
    pub ground_probe_margin: f32,

    // === Input ===
    /// Move vector conditioning.
    pub move_input_mode: MoveInputMode,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            run_speed: 7.0,
            crouch_speed: 2.0,

            jump_impulse: 5.0,
            gravity_acceleration: 9.81,

            look_sensitivity: 2.5,

            crouch_height: 1.0,
            crouch_camera_offset: 0.2,
            standing_height: 2.0,
            standing_camera_offset: 1.0,
            capsule_radius: 0.5,

            ground_probe_margin: 0.1,

            move_input_mode: MoveInputMode::Raw,
        }
    }
}

impl ControllerConfig {
    /// Faster run and a higher jump, for arena-style movement.
    pub fn sprinter() -> Self {
        Self {
            run_speed: 10.0,
            jump_impulse: 7.0,
            ..default()
        }
    }

    /// Check the invariants the controller relies on.
    ///
    /// Zero or negative speeds and impulses are accepted; they produce
    /// degenerate movement but nothing breaks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("walk_speed", self.walk_speed),
            ("run_speed", self.run_speed),
            ("crouch_speed", self.crouch_speed),
            ("jump_impulse", self.jump_impulse),
            ("gravity_acceleration", self.gravity_acceleration),
            ("look_sensitivity", self.look_sensitivity),
            ("crouch_height", self.crouch_height),
            ("crouch_camera_offset", self.crouch_camera_offset),
            ("standing_height", self.standing_height),
            ("standing_camera_offset", self.standing_camera_offset),
            ("capsule_radius", self.capsule_radius),
            ("ground_probe_margin", self.ground_probe_margin),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::NonFinite(name));
        }

        if self.crouch_height <= 0.0 {
            return Err(ConfigError::NonPositiveDimension("crouch_height"));
        }
        if self.capsule_radius <= 0.0 {
            return Err(ConfigError::NonPositiveDimension("capsule_radius"));
        }
        if self.crouch_height >= self.standing_height {
            return Err(ConfigError::CrouchNotBelowStanding {
                crouch_height: self.crouch_height,
                standing_height: self.standing_height,
            });
        }

        Ok(())
    }

    /// Names of speed/impulse fields that are negative or zero.
    ///
    /// These are legal but usually a tuning mistake, so `attach` logs them.
    pub fn degenerate_fields(&self) -> Vec<&'static str> {
        [
            ("walk_speed", self.walk_speed),
            ("run_speed", self.run_speed),
            ("crouch_speed", self.crouch_speed),
            ("jump_impulse", self.jump_impulse),
        ]
        .into_iter()
        .filter(|(_, value)| *value <= 0.0)
        .map(|(name, _)| name)
        .collect()
    }

    /// Builder: set walk, run and crouch speeds.
    pub fn with_speeds(mut self, walk: f32, run: f32, crouch: f32) -> Self {
        self.walk_speed = walk;
        self.run_speed = run;
        self.crouch_speed = crouch;
        self
    }

    /// Builder: set jump impulse.
    pub fn with_jump_impulse(mut self, impulse: f32) -> Self {
        self.jump_impulse = impulse;
        self
    }

    /// Builder: set gravity magnitude.
    pub fn with_gravity(mut self, acceleration: f32) -> Self {
        self.gravity_acceleration = acceleration;
        self
    }

    /// Builder: set look sensitivity.
    pub fn with_look_sensitivity(mut self, sensitivity: f32) -> Self {
        self.look_sensitivity = sensitivity;
        self
    }

    /// Builder: set standing capsule height and camera height.
    pub fn with_standing(mut self, height: f32, camera_offset: f32) -> Self {
        self.standing_height = height;
        self.standing_camera_offset = camera_offset;
        self
    }

    /// Builder: set crouched capsule height and camera drop.
    pub fn with_crouch(mut self, height: f32, camera_offset: f32) -> Self {
        self.crouch_height = height;
        self.crouch_camera_offset = camera_offset;
        self
    }

    /// Builder: set capsule radius.
    pub fn with_capsule_radius(mut self, radius: f32) -> Self {
        self.capsule_radius = radius;
        self
    }

    /// Builder: set ground probe margin.
    pub fn with_ground_probe_margin(mut self, margin: f32) -> Self {
        self.ground_probe_margin = margin;
        self
    }

    /// Builder: set move input conditioning.
    pub fn with_move_input_mode(mut self, mode: MoveInputMode) -> Self {
        self.move_input_mode = mode;
        self
    }
}
