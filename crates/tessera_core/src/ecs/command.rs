//! # Command Dispatch
//!
//! Broadcasts a one-shot action to every entity whose [`CommandTarget`]
//! tag intersects the command's flags. Directors use this to steer groups
//! of entities without holding handles to them.

use super::component::CommandTarget;
use super::entity::EntityId;
use super::world::World;

type Action<'a> = Box<dyn FnMut(EntityId, &World, f32) + 'a>;

/// A `(target_flags, action)` pair, consumed within the tick it is sent.
///
/// The action receives the matched entity, the world and the tick's
/// delta time as explicit arguments. Component access goes through the
/// world's runtime-checked accessors:
///
/// ```rust,ignore
/// let mut cmd = Command::new(tags::NPC, |entity, world, dt| {
///     if let Some(mut tx) = world.get_mut::<Transform>(entity) {
///         tx.position.x -= 10.0 * dt;
///     }
/// });
/// ctx.send_command(&mut cmd);
/// ```
pub struct Command<'a> {
    /// Entities answer when `tag.flags & target_flags != 0`.
    pub target_flags: u32,
    action: Action<'a>,
}

impl<'a> Command<'a> {
    /// Builds a command.
    pub fn new(target_flags: u32, action: impl FnMut(EntityId, &World, f32) + 'a) -> Self {
        Self {
            target_flags,
            action: Box::new(action),
        }
    }
}

/// Command dispatch statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Commands dispatched.
    pub commands: u64,
    /// Action invocations across all commands.
    pub invocations: u64,
}

/// Matches commands against the tag storage and runs their actions.
#[derive(Default)]
pub struct CommandDispatcher {
    /// Matched entities of the command in flight.
    scratch: Vec<EntityId>,
    stats: DispatchStats,
}

impl CommandDispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `command` against `world`, returning the number of matches.
    ///
    /// Matches are collected in registry index order before the first
    /// action runs, so actions are free to borrow the tag storage.
    pub fn dispatch(&mut self, world: &World, command: &mut Command<'_>, dt: f32) -> usize {
        self.scratch.clear();
        if let Ok(tags) = world.try_components::<CommandTarget>() {
            self.scratch.extend(
                tags.iter()
                    .filter(|(_, tag)| tag.flags & command.target_flags != 0)
                    .filter_map(|(index, _)| world.entity_at(index)),
            );
        }

        for &entity in &self.scratch {
            (command.action)(entity, world, dt);
        }

        self.stats.commands += 1;
        self.stats.invocations += self.scratch.len() as u64;
        self.scratch.len()
    }

    /// Lifetime statistics.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> DispatchStats {
        self.stats
    }
}
