//! # Player Director
//!
//! Turns raw input into ship velocity and trigger messages, and brings the
//! ship back after it dies.

use glam::Vec3;
use tessera_core::{
    Command, Director, EntityId, InputEvent, Message, SceneContext, Velocity, World,
};

use crate::components::{groups, tags, unpark, Player};
use crate::messages::{ids, payload, PlayerEvent};

/// Key codes the director listens to.
pub mod keys {
    /// Fire.
    pub const FIRE: u32 = 32;
    /// Move left.
    pub const LEFT: u32 = 37;
    /// Move up.
    pub const UP: u32 = 38;
    /// Move right.
    pub const RIGHT: u32 = 39;
    /// Move down.
    pub const DOWN: u32 = 40;
}

/// Axis indices for analogue input.
pub mod axes {
    /// Horizontal stick.
    pub const HORIZONTAL: u32 = 0;
    /// Vertical stick.
    pub const VERTICAL: u32 = 1;
}

/// Seconds between death and respawn.
pub const RESPAWN_DELAY: f32 = 2.0;

/// Ship controller.
#[derive(Debug)]
pub struct PlayerDirector {
    speed: f32,
    spawn_point: Vec3,
    /// Held direction keys: left, up, right, down.
    held: [bool; 4],
    stick: Vec3,
    fire: bool,
    respawn_timer: Option<f32>,
    ship: Option<EntityId>,
}

impl PlayerDirector {
    /// The first spawn happens on the first tick.
    #[must_use]
    pub fn new(speed: f32, spawn_point: Vec3) -> Self {
        Self {
            speed,
            spawn_point,
            held: [false; 4],
            stick: Vec3::ZERO,
            fire: false,
            respawn_timer: Some(0.0),
            ship: None,
        }
    }

    /// The ship, once spawned.
    #[must_use]
    pub const fn ship(&self) -> Option<EntityId> {
        self.ship
    }

    /// True while waiting to respawn.
    #[must_use]
    pub const fn is_respawning(&self) -> bool {
        self.respawn_timer.is_some()
    }

    fn direction(&self) -> Vec3 {
        let [left, up, right, down] = self.held.map(f32::from);
        let keys = Vec3::new(right - left, up - down, 0.0);
        (keys + self.stick).clamp_length_max(1.0)
    }

    fn set_key(&mut self, code: u32, down: bool, ctx: &mut SceneContext<'_>) {
        let slot = match code {
            keys::LEFT => 0,
            keys::UP => 1,
            keys::RIGHT => 2,
            keys::DOWN => 3,
            keys::FIRE => {
                if self.fire != down {
                    self.fire = down;
                    ctx.post_value(ids::PLAYER, PlayerEvent::TriggerChanged { held: down });
                }
                return;
            }
            _ => return,
        };
        self.held[slot] = down;
    }

    fn respawn(&mut self, ctx: &mut SceneContext<'_>) {
        let spawn_point = self.spawn_point;
        let mut spawned = None;
        let mut command = Command::new(tags::PLAYER, |entity, world: &World, _dt| {
            if let Some(mut player) = world.get_mut::<Player>(entity) {
                *player = Player::default();
            }
            unpark(world, entity, spawn_point, groups::PLAYER, groups::NPC | groups::ITEM);
            spawned = Some(entity);
        });
        ctx.send_command(&mut command);
        drop(command);

        let Some(entity) = spawned else {
            tracing::warn!("no ship tagged for respawn");
            return;
        };
        self.ship = Some(entity);
        ctx.post_value(ids::PLAYER, PlayerEvent::Spawned { entity });
        if self.fire {
            ctx.post_value(ids::PLAYER, PlayerEvent::TriggerChanged { held: true });
        }
        tracing::debug!(?entity, "ship spawned");
    }
}

impl Director for PlayerDirector {
    fn handle_event(&mut self, event: &InputEvent, ctx: &mut SceneContext<'_>) {
        match *event {
            InputEvent::KeyPressed { code } => self.set_key(code, true, ctx),
            InputEvent::KeyReleased { code } => self.set_key(code, false, ctx),
            InputEvent::Axis { axis, value } => match axis {
                axes::HORIZONTAL => self.stick.x = value.clamp(-1.0, 1.0),
                axes::VERTICAL => self.stick.y = value.clamp(-1.0, 1.0),
                _ => {}
            },
        }
    }

    fn handle_message(&mut self, message: &Message, _ctx: &mut SceneContext<'_>) {
        if let Some(PlayerEvent::Died { .. }) = payload::<PlayerEvent>(message, ids::PLAYER) {
            self.respawn_timer = Some(RESPAWN_DELAY);
        }
    }

    fn process(&mut self, ctx: &mut SceneContext<'_>) {
        if let Some(remaining) = self.respawn_timer {
            let remaining = remaining - ctx.dt();
            if remaining <= 0.0 {
                self.respawn_timer = None;
                self.respawn(ctx);
            } else {
                self.respawn_timer = Some(remaining);
            }
            return;
        }

        let linear = self.direction() * self.speed;
        let mut command = Command::new(tags::PLAYER, |entity, world: &World, _dt| {
            if let Some(mut velocity) = world.get_mut::<Velocity>(entity) {
                velocity.linear = linear;
            }
        });
        ctx.send_command(&mut command);
    }
}
