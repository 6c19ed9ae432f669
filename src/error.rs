//! Error types.
//!
//! Only attaching a controller can fail. Once attached, every runtime
//! "failure" (unknown input, a jump that cannot be granted) is a silent policy
//! decision rather than an error.

use bevy::prelude::Entity;
use thiserror::Error;

/// Errors returned by [`crate::attach`].
#[derive(Debug, Error, PartialEq)]
pub enum ControllerError {
    /// No camera entity was supplied.
    #[error("first-person controller requires a camera entity")]
    MissingCamera,

    /// The camera entity does not exist or has no `Transform`.
    #[error("camera entity {0} does not exist or has no Transform")]
    CameraNotFound(Entity),

    /// The controlled entity does not exist.
    #[error("controlled entity {0} does not exist")]
    EntityNotFound(Entity),

    /// The physics backend could not find a rigid body and collider on the entity.
    #[error("entity {0} is missing its rigid body or collider")]
    MissingPhysicsBody(Entity),

    /// The configuration failed validation.
    #[error("invalid controller configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Errors returned by [`crate::config::ControllerConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A field holds NaN or an infinity.
    #[error("`{0}` must be finite")]
    NonFinite(&'static str),

    /// The crouched capsule is not shorter than the standing one.
    #[error("crouch height {crouch_height} must be below standing height {standing_height}")]
    CrouchNotBelowStanding {
        crouch_height: f32,
        standing_height: f32,
    },

    /// A capsule dimension is zero or negative.
    #[error("`{0}` must be positive")]
    NonPositiveDimension(&'static str),
}
