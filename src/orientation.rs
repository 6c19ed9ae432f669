//! Orientation updater.
//!
//! Runs once per rendered frame so looking stays smooth even when physics
//! ticks slower. Pitch is stored on the controller and applied to the camera;
//! yaw is never stored, it accumulates directly into the body's rotation.

use bevy::prelude::*;

use crate::config::ControllerConfig;
use crate::state::FirstPersonController;

/// Pitch limit in degrees, both up and down.
pub const MAX_PITCH: f32 = 80.0;

impl FirstPersonController {
    /// Consume the current look vector.
    ///
    /// Updates and clamps pitch (positive looks down) and returns the yaw
    /// delta in degrees (positive turns right).
    pub fn apply_look(&mut self, sensitivity: f32) -> f32 {
        let delta_yaw = self.look_input.x * sensitivity;
        let delta_pitch = self.look_input.y * sensitivity;
        self.pitch = (self.pitch - delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
        delta_yaw
    }
}

/// Camera local rotation for a pitch in degrees.
#[inline]
pub fn pitch_rotation(pitch: f32) -> Quat {
    // -Z forward: a positive rotation about X looks up.
    Quat::from_rotation_x(-pitch.to_radians())
}

/// Apply look input to body yaw and camera pitch.
pub fn update_orientation(
    mut q_bodies: Query<(
        &mut FirstPersonController,
        &ControllerConfig,
        &mut Transform,
    )>,
    mut q_cameras: Query<&mut Transform, Without<FirstPersonController>>,
) {
    for (mut controller, config, mut body) in &mut q_bodies {
        let delta_yaw = controller.apply_look(config.look_sensitivity);

        if delta_yaw != 0.0 {
            body.rotate_y(-delta_yaw.to_radians());
        }

        if let Ok(mut camera) = q_cameras.get_mut(controller.camera()) {
            camera.rotation = pitch_rotation(controller.pitch());
        }
    }
}
