//! # Directors
//!
//! Directors hold gameplay rules (spawn timers, difficulty, win
//! conditions). They own no components; they react to input and messages
//! and steer entities through [`Command`](super::Command)s.

use super::system::{AsAny, SceneContext};
use crate::message::Message;

/// Raw input forwarded by the application into a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// A key or button went down.
    KeyPressed {
        /// Application-defined key code.
        code: u32,
    },
    /// A key or button went up.
    KeyReleased {
        /// Application-defined key code.
        code: u32,
    },
    /// An analogue axis moved.
    Axis {
        /// Application-defined axis index.
        axis: u32,
        /// Position in `-1.0..=1.0`.
        value: f32,
    },
}

/// A non-owning controller ticked by the scene.
pub trait Director: AsAny {
    /// Raw input, delivered immediately when the application forwards it.
    fn handle_event(&mut self, _event: &InputEvent, _ctx: &mut SceneContext<'_>) {}

    /// Called once for every message delivered this tick, after all systems saw it.
    fn handle_message(&mut self, _message: &Message, _ctx: &mut SceneContext<'_>) {}

    /// Time-based logic, run every tick before systems process.
    fn process(&mut self, _ctx: &mut SceneContext<'_>) {}
}
