//! # Player System
//!
//! Moves the ship inside the arena and reacts to NPC contact.

use glam::Vec3;
use tessera_core::{EntityId, Message, Requirements, SceneContext, System, Transform, Velocity};
use tessera_physics::PhysicsObject;

use crate::components::{park, ItemKind, Npc, Player};
use crate::messages::{ids, payload, PlayerEvent};

/// Seconds of invulnerability after a hit.
pub const SHIELD_TIME: f32 = 1.5;

/// Ship movement and damage.
#[derive(Debug)]
pub struct PlayerSystem {
    bounds: Vec3,
    events: Vec<PlayerEvent>,
    dying: Vec<EntityId>,
}

impl PlayerSystem {
    /// Keeps the ship inside `±half_width` by `±half_height`.
    #[must_use]
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            bounds: Vec3::new(half_width, half_height, 0.0),
            events: Vec::new(),
            dying: Vec::new(),
        }
    }
}

impl System for PlayerSystem {
    fn requirements(&self) -> Requirements {
        Requirements::new()
            .with::<Player>()
            .with::<Transform>()
            .with::<Velocity>()
            .with::<PhysicsObject>()
    }

    fn process(&mut self, entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        let dt = ctx.dt();
        let world = ctx.world();

        for &entity in entities {
            let mut player = world.component_mut::<Player>(entity);
            if !player.alive {
                continue;
            }
            player.shield = (player.shield - dt).max(0.0);

            let rammed = player.shield <= 0.0
                && world
                    .component::<PhysicsObject>(entity)
                    .collision_ids()
                    .iter()
                    .any(|&other| world.has_component::<Npc>(other));

            let mut tx = world.component_mut::<Transform>(entity);
            let velocity = world.component::<Velocity>(entity).linear;
            tx.position = (tx.position + velocity * dt).clamp(-self.bounds, self.bounds);

            if rammed {
                player.health = player.health.saturating_sub(1);
                player.shield = SHIELD_TIME;
                if player.health == 0 {
                    player.alive = false;
                    self.events.push(PlayerEvent::Died {
                        entity,
                        position: tx.position,
                    });
                    self.dying.push(entity);
                } else {
                    self.events.push(PlayerEvent::Damaged {
                        health: player.health,
                    });
                }
            }
        }

        for entity in self.dying.drain(..) {
            park(world, entity);
            if let Some(mut velocity) = world.get_mut::<Velocity>(entity) {
                velocity.linear = Vec3::ZERO;
            }
        }
        for event in self.events.drain(..) {
            ctx.post_value(ids::PLAYER, event);
        }
    }

    fn handle_message(&mut self, message: &Message, entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        if let Some(PlayerEvent::CollectedItem {
            item: ItemKind::Repair,
        }) = payload::<PlayerEvent>(message, ids::PLAYER)
        {
            for &entity in entities {
                let mut player = ctx.world().component_mut::<Player>(entity);
                if player.alive {
                    player.health = (player.health + 1).min(Player::MAX_HEALTH);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Scene;

    #[test]
    fn test_ship_is_clamped_to_bounds() {
        let mut scene = Scene::with_capacity(4);
        scene.add_system(PlayerSystem::new(2.0, 1.0));
        let world = scene.world_mut();
        let ship = world.create();
        world.add_component(ship, Player::default());
        world.add_component(ship, Transform::default());
        world.add_component(ship, Velocity::new(Vec3::new(10.0, -10.0, 0.0)));
        world.add_component(ship, PhysicsObject::default());

        scene.simulate(1.0);

        assert_eq!(
            scene.world().component::<Transform>(ship).position,
            Vec3::new(2.0, -1.0, 0.0)
        );
    }
}
