//! Input aggregation.
//!
//! The input source delivers one [`ControllerInput`] message per action
//! phase change. The aggregator turns that stream into the stable snapshot
//! stored on [`FirstPersonController`]: a move vector, a look vector, level
//! triggered run/crouch flags and an edge triggered jump flag.
//!
//! Binding physical devices to actions is the host's job. Hosts that bind by
//! name can use [`ControllerInput::from_named`], which drops unknown names.

use bevy::prelude::*;

use crate::config::ControllerConfig;
use crate::state::FirstPersonController;

/// Logical input actions consumed by the controller.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// 2D move vector, x = right, y = forward.
    Move,
    /// 2D look delta, x = yaw, y = pitch.
    Look,
    /// Held to run.
    Run,
    /// Held to crouch.
    Crouch,
    /// Pressed to jump.
    Jump,
}

impl InputAction {
    /// Resolve a logical action name, ignoring ASCII case.
    ///
    /// ```rust
    /// use msg_fps_controller::prelude::*;
    ///
    /// assert_eq!(InputAction::from_name("jump"), Some(InputAction::Jump));
    /// assert_eq!(InputAction::from_name("Fire"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        [
            InputAction::Move,
            InputAction::Look,
            InputAction::Run,
            InputAction::Crouch,
            InputAction::Jump,
        ]
        .into_iter()
        .find(|action| action.name().eq_ignore_ascii_case(name))
    }

    /// Canonical name of the action.
    pub fn name(self) -> &'static str {
        match self {
            InputAction::Move => "Move",
            InputAction::Look => "Look",
            InputAction::Run => "Run",
            InputAction::Crouch => "Crouch",
            InputAction::Jump => "Jump",
        }
    }
}

/// Phase of an action event.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    /// The control was actuated, or its value changed while actuated.
    Performed,
    /// The control was released.
    Canceled,
}

/// One input event addressed to a controller.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ControllerInput {
    /// Entity carrying the [`FirstPersonController`].
    pub controller: Entity,
    pub action: InputAction,
    pub phase: ActionPhase,
    /// Vector payload. Only read for `Move` and `Look`.
    pub value: Vec2,
}

impl ControllerInput {
    /// A `Performed` event with a vector payload.
    pub fn performed(controller: Entity, action: InputAction, value: Vec2) -> Self {
        Self {
            controller,
            action,
            phase: ActionPhase::Performed,
            value,
        }
    }

    /// A `Performed` event for a button action.
    pub fn pressed(controller: Entity, action: InputAction) -> Self {
        Self::performed(controller, action, Vec2::ZERO)
    }

    /// A `Canceled` event.
    pub fn canceled(controller: Entity, action: InputAction) -> Self {
        Self {
            controller,
            action,
            phase: ActionPhase::Canceled,
            value: Vec2::ZERO,
        }
    }

    /// Build an event from a logical action name.
    ///
    /// Returns `None` for names the controller does not know, so they can be
    /// dropped without further handling.
    pub fn from_named(
        controller: Entity,
        name: &str,
        phase: ActionPhase,
        value: Vec2,
    ) -> Option<Self> {
        let Some(action) = InputAction::from_name(name) else {
            trace!("ignoring unknown input action {name:?}");
            return None;
        };
        Some(Self {
            controller,
            action,
            phase,
            value,
        })
    }
}

impl FirstPersonController {
    /// Apply one input event to the state.
    ///
    /// Returns `false` when the event was ignored because the controller is
    /// inactive. Never blocks and never fails.
    pub fn apply_input(
        &mut self,
        config: &ControllerConfig,
        action: InputAction,
        phase: ActionPhase,
        value: Vec2,
    ) -> bool {
        if !self.active {
            return false;
        }

        match (action, phase) {
            (InputAction::Move, ActionPhase::Performed) => self.move_input = value,
            (InputAction::Move, ActionPhase::Canceled) => self.move_input = Vec2::ZERO,
            (InputAction::Look, ActionPhase::Performed) => self.look_input = value,
            (InputAction::Look, ActionPhase::Canceled) => self.look_input = Vec2::ZERO,
            (InputAction::Run, ActionPhase::Performed) => self.run_held = true,
            (InputAction::Run, ActionPhase::Canceled) => self.run_held = false,
            (InputAction::Crouch, ActionPhase::Performed) => self.start_crouch(config),
            (InputAction::Crouch, ActionPhase::Canceled) => self.stop_crouch(),
            (InputAction::Jump, ActionPhase::Performed) => self.jump_requested = true,
            (InputAction::Jump, ActionPhase::Canceled) => {}
        }
        true
    }
}

/// Drain pending input messages into their controllers.
pub fn aggregate_input(
    mut messages: MessageReader<ControllerInput>,
    mut q_controllers: Query<(&mut FirstPersonController, &ControllerConfig)>,
) {
    for input in messages.read() {
        let Ok((mut controller, config)) = q_controllers.get_mut(input.controller) else {
            trace!("dropping {:?} for {}: no controller", input.action, input.controller);
            continue;
        };
        if !controller.apply_input(config, input.action, input.phase, input.value) {
            trace!("dropping {:?} for {}: inactive", input.action, input.controller);
        }
    }
}
