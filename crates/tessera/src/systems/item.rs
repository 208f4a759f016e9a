//! # Item System
//!
//! Pickups dropped by dying NPCs. Elites always drop a weapon upgrade;
//! every fifth kill drops something too, alternating between a repair
//! kit and an upgrade. Items drift left and vanish after a while.

use glam::Vec3;
use tessera_core::{EntityId, Message, Pool, Requirements, SceneContext, System, Transform, World};
use tessera_physics::PhysicsObject;

use crate::components::{groups, park, unpark, Item, ItemKind, NpcKind, Player};
use crate::messages::{ids, payload, NpcEvent, PlayerEvent, RoundEvent};

/// Seconds a pickup stays in the arena.
pub const ITEM_LIFETIME: f32 = 6.0;
/// Drift speed along -X.
const DRIFT: f32 = 1.0;
/// Kills between regular drops.
const DROP_EVERY: u32 = 5;

/// Drops, moves and hands out pickups.
pub struct ItemSystem {
    items: Pool<EntityId>,
    kills: u32,
    next_regular: ItemKind,
    collected: Vec<ItemKind>,
}

impl ItemSystem {
    /// Creates the system around a pool of parked pickup entities.
    #[must_use]
    pub fn new(items: Pool<EntityId>) -> Self {
        Self {
            items,
            kills: 0,
            next_regular: ItemKind::Repair,
            collected: Vec::new(),
        }
    }

    /// Pickups in the arena.
    #[must_use]
    pub const fn active(&self) -> usize {
        self.items.alive_count()
    }

    fn drop_for(&mut self, kind: NpcKind) -> Option<ItemKind> {
        self.kills += 1;
        if kind == NpcKind::Elite {
            return Some(ItemKind::WeaponUpgrade);
        }
        if self.kills % DROP_EVERY != 0 {
            return None;
        }
        let item = self.next_regular;
        self.next_regular = match item {
            ItemKind::Repair => ItemKind::WeaponUpgrade,
            ItemKind::WeaponUpgrade => ItemKind::Repair,
        };
        Some(item)
    }

    fn spawn(&mut self, world: &World, kind: ItemKind, position: Vec3) {
        let Some(handle) = self.items.acquire() else {
            tracing::debug!(?kind, "no free pickup slot, drop lost");
            return;
        };
        let Some(&entity) = self.items.get(handle) else {
            return;
        };
        if let Some(mut item) = world.get_mut::<Item>(entity) {
            item.kind = kind;
            item.remaining = ITEM_LIFETIME;
        }
        unpark(world, entity, position, groups::ITEM, groups::PLAYER);
    }
}

impl System for ItemSystem {
    fn requirements(&self) -> Requirements {
        Requirements::new()
            .with::<Item>()
            .with::<Transform>()
            .with::<PhysicsObject>()
    }

    fn process(&mut self, _entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        let dt = ctx.dt();
        let world = ctx.world();
        let collected = &mut self.collected;

        self.items.retain(|_, &mut entity| {
            let Some(mut item) = world.get_mut::<Item>(entity) else {
                return false;
            };
            let touched = world.get::<PhysicsObject>(entity).is_some_and(|body| {
                body.collision_ids()
                    .iter()
                    .any(|&other| world.has_component::<Player>(other))
            });

            if touched {
                collected.push(item.kind);
            } else {
                item.remaining -= dt;
                if item.remaining > 0.0 {
                    if let Some(mut tx) = world.get_mut::<Transform>(entity) {
                        tx.translate(Vec3::NEG_X * DRIFT * dt);
                    }
                    return true;
                }
            }
            park(world, entity);
            false
        });

        for item in self.collected.drain(..) {
            ctx.post_value(ids::PLAYER, PlayerEvent::CollectedItem { item });
        }
    }

    fn handle_message(&mut self, message: &Message, entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        if let Some(NpcEvent::Died { kind, position, .. }) = payload::<NpcEvent>(message, ids::NPC) {
            if let Some(item) = self.drop_for(*kind) {
                self.spawn(ctx.world(), item, *position);
            }
        } else if let Some(RoundEvent::Started { .. }) = payload::<RoundEvent>(message, ids::ROUND) {
            self.items.clear();
            for &entity in entities {
                park(ctx.world(), entity);
            }
        }
    }

    fn on_entity_added(&mut self, entity: EntityId, ctx: &mut SceneContext<'_>) {
        park(ctx.world(), entity);
    }
}
