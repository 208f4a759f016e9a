//! # Explosion System
//!
//! Pooled blast effects at the spots where NPCs and the ship die.

use glam::Vec3;
use tessera_core::{EntityId, Message, Pool, Requirements, SceneContext, System, Transform, World};

use crate::components::{park, Explosion};
use crate::messages::{ids, payload, NpcEvent, PlayerEvent};

/// Seconds an explosion stays on screen.
pub const EXPLOSION_TIME: f32 = 0.6;
/// Scale growth per second.
const GROWTH: f32 = 2.5;

/// Spawns and ages explosions.
pub struct ExplosionSystem {
    blasts: Pool<EntityId>,
}

impl ExplosionSystem {
    /// Creates the system around a pool of parked explosion entities.
    #[must_use]
    pub fn new(blasts: Pool<EntityId>) -> Self {
        Self { blasts }
    }

    /// Explosions on screen.
    #[must_use]
    pub const fn active(&self) -> usize {
        self.blasts.alive_count()
    }

    fn spawn(&mut self, world: &World, position: Vec3) {
        let Some(handle) = self.blasts.acquire() else {
            return;
        };
        let Some(&entity) = self.blasts.get(handle) else {
            return;
        };
        if let Some(mut tx) = world.get_mut::<Transform>(entity) {
            tx.position = position;
            tx.scale = Vec3::ONE;
        }
        if let Some(mut blast) = world.get_mut::<Explosion>(entity) {
            blast.remaining = EXPLOSION_TIME;
            blast.size = 1.0;
        }
    }
}

impl System for ExplosionSystem {
    fn requirements(&self) -> Requirements {
        Requirements::new().with::<Explosion>().with::<Transform>()
    }

    fn process(&mut self, _entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        let dt = ctx.dt();
        let world = ctx.world();
        self.blasts.retain(|_, &mut entity| {
            let Some(mut blast) = world.get_mut::<Explosion>(entity) else {
                return false;
            };
            blast.remaining -= dt;
            blast.size += GROWTH * dt;
            if blast.remaining > 0.0 {
                if let Some(mut tx) = world.get_mut::<Transform>(entity) {
                    tx.scale = Vec3::splat(blast.size);
                }
                return true;
            }
            park(world, entity);
            false
        });
    }

    fn handle_message(&mut self, message: &Message, _entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        let position = match (
            payload::<NpcEvent>(message, ids::NPC),
            payload::<PlayerEvent>(message, ids::PLAYER),
        ) {
            (Some(NpcEvent::Died { position, .. }), _) | (_, Some(PlayerEvent::Died { position, .. })) => {
                *position
            }
            _ => return,
        };
        self.spawn(ctx.world(), position);
    }

    fn on_entity_added(&mut self, entity: EntityId, ctx: &mut SceneContext<'_>) {
        park(ctx.world(), entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{NpcKind, PARKED};
    use tessera_core::Scene;

    fn scene_with_blasts(capacity: usize) -> (Scene, Vec<EntityId>) {
        let mut scene = Scene::with_capacity(capacity);
        let world = scene.world_mut();
        let mut created = Vec::new();
        let pool = Pool::new(capacity, |_| {
            let entity = world.create();
            world.add_component(entity, Explosion::default());
            world.add_component(entity, Transform::default());
            created.push(entity);
            entity
        });
        scene.add_system(ExplosionSystem::new(pool));
        (scene, created)
    }

    #[test]
    fn test_death_spawns_explosion_that_expires() {
        let (mut scene, created) = scene_with_blasts(2);
        let at = Vec3::new(3.0, 1.0, 0.0);
        scene.forward_message(Message::new(
            ids::NPC,
            NpcEvent::Died {
                entity: EntityId::NULL,
                kind: NpcKind::Drone,
                position: at,
            },
        ));
        scene.simulate(0.1);

        assert_eq!(scene.system::<ExplosionSystem>().unwrap().active(), 1);
        assert!(created
            .iter()
            .any(|&e| scene.world().component::<Transform>(e).position == at));

        for _ in 0..10 {
            scene.simulate(0.1);
        }
        assert_eq!(scene.system::<ExplosionSystem>().unwrap().active(), 0);
        for &e in &created {
            assert_eq!(scene.world().component::<Transform>(e).position, PARKED);
        }
    }

    #[test]
    fn test_full_pool_drops_explosions() {
        let (mut scene, _) = scene_with_blasts(1);
        for _ in 0..3 {
            scene.forward_message(Message::new(
                ids::PLAYER,
                PlayerEvent::Died {
                    entity: EntityId::NULL,
                    position: Vec3::ZERO,
                },
            ));
        }
        scene.simulate(0.1);
        assert_eq!(scene.system::<ExplosionSystem>().unwrap().active(), 1);
    }
}
