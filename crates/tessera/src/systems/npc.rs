//! # NPC System
//!
//! Flies released NPCs across the arena, applies pulse damage from their
//! collision buffers and retires them on death or escape.
//!
//! Releasing is the [`NpcDirector`](crate::directors::NpcDirector)'s job;
//! this system only touches NPCs whose `active` flag is set.

use glam::Vec3;
use tessera_core::{EntityId, Message, Requirements, SceneContext, System, Transform, World};
use tessera_physics::PhysicsObject;

use crate::components::{park, Npc, NpcKind, Player, Projectile};
use crate::messages::{ids, payload, NpcEvent, RoundEvent};

/// Moves and damages NPCs.
#[derive(Debug)]
pub struct NpcSystem {
    escape_x: f32,
    events: Vec<NpcEvent>,
    retired: Vec<EntityId>,
}

impl NpcSystem {
    /// NPCs that fly past `-half_width` escape.
    #[must_use]
    pub fn new(half_width: f32) -> Self {
        Self {
            escape_x: -half_width - 1.0,
            events: Vec::new(),
            retired: Vec::new(),
        }
    }

    fn update(&mut self, world: &World, entity: EntityId, dt: f32) {
        let mut npc = world.component_mut::<Npc>(entity);
        if !npc.active {
            return;
        }

        let mut damage = 0.0;
        let mut rammed = false;
        for &other in world.component::<PhysicsObject>(entity).collision_ids() {
            if let Some(projectile) = world.get::<Projectile>(other) {
                damage += projectile.damage;
            } else if world.has_component::<Player>(other) {
                rammed = true;
            }
        }

        npc.age += dt;
        let mut tx = world.component_mut::<Transform>(entity);
        tx.position.x -= npc.kind.speed() * dt;
        tx.position.y = npc.lane + weave(npc.kind, npc.age);

        // Elites shrug off a collision with the ship
        if rammed && npc.kind != NpcKind::Elite {
            damage = npc.health;
        }

        if damage > 0.0 {
            npc.health -= damage;
            if npc.health <= 0.0 {
                npc.active = false;
                self.events.push(NpcEvent::Died {
                    entity,
                    kind: npc.kind,
                    position: tx.position,
                });
                self.retired.push(entity);
                return;
            }
            self.events.push(NpcEvent::HealthChanged {
                entity,
                kind: npc.kind,
                health: npc.health,
            });
        }

        if tx.position.x < self.escape_x {
            npc.active = false;
            self.events.push(NpcEvent::Escaped {
                entity,
                kind: npc.kind,
            });
            self.retired.push(entity);
        }
    }
}

/// Vertical offset from the lane after `age` seconds.
fn weave(kind: NpcKind, age: f32) -> f32 {
    match kind {
        NpcKind::Drone => 0.0,
        NpcKind::Gunship => (age * 2.0).sin() * 1.5,
        NpcKind::Elite => (age * 0.5).sin() * 0.5,
    }
}

impl System for NpcSystem {
    fn requirements(&self) -> Requirements {
        Requirements::new()
            .with::<Npc>()
            .with::<Transform>()
            .with::<PhysicsObject>()
    }

    fn process(&mut self, entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        let dt = ctx.dt();
        let world = ctx.world();

        for &entity in entities {
            self.update(world, entity, dt);
        }
        for entity in self.retired.drain(..) {
            park(world, entity);
        }

        for event in self.events.drain(..) {
            ctx.post_value(ids::NPC, event);
        }
    }

    fn handle_message(&mut self, message: &Message, entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        // A new round starts from an empty field
        if let Some(RoundEvent::Started { round }) = payload::<RoundEvent>(message, ids::ROUND) {
            let world = ctx.world();
            for &entity in entities {
                world.component_mut::<Npc>(entity).active = false;
                park(world, entity);
            }
            tracing::debug!(round, npcs = entities.len(), "npcs parked for new round");
        }
    }

    fn on_entity_added(&mut self, entity: EntityId, ctx: &mut SceneContext<'_>) {
        park(ctx.world(), entity);
    }
}

/// Where an NPC released on `lane` enters the arena.
#[must_use]
pub fn entry_point(half_width: f32, lane: f32) -> Vec3 {
    Vec3::new(half_width + 1.0, lane, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{groups, unpark};
    use tessera_core::Scene;

    fn spawn_npc(scene: &mut Scene, kind: NpcKind) -> EntityId {
        let world = scene.world_mut();
        let entity = world.create();
        world.add_component(entity, Npc::parked(kind));
        world.add_component(entity, Transform::default());
        world.add_component(entity, PhysicsObject::default());
        entity
    }

    fn release(scene: &Scene, entity: EntityId, x: f32) {
        let world = scene.world();
        {
            let mut npc = world.component_mut::<Npc>(entity);
            npc.active = true;
            npc.health = npc.kind.max_health();
        }
        unpark(world, entity, Vec3::new(x, 0.0, 0.0), groups::NPC, groups::PROJECTILE);
    }

    #[test]
    fn test_inactive_npcs_stay_parked() {
        let mut scene = Scene::with_capacity(4);
        scene.add_system(NpcSystem::new(9.0));
        let npc = spawn_npc(&mut scene, NpcKind::Drone);
        scene.simulate(0.1);
        assert_eq!(
            scene.world().component::<Transform>(npc).position,
            crate::components::PARKED
        );
    }

    #[test]
    fn test_escape_is_reported() {
        let mut scene = Scene::with_capacity(4);
        scene.add_system(NpcSystem::new(2.0));
        let npc = spawn_npc(&mut scene, NpcKind::Drone);
        scene.simulate(0.0);
        release(&scene, npc, 0.0);

        // Drones cover 6 units per second; the escape line is at -3
        scene.simulate(0.6);
        assert!(!scene.world().component::<Npc>(npc).active);
        assert_eq!(
            scene.world().component::<Transform>(npc).position,
            crate::components::PARKED
        );
        assert_eq!(scene.bus().pending_count(), 1);
    }
}
