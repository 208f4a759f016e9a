//! # Weapon System
//!
//! Fires pooled pulses from the ship and retires them on impact or when
//! their lifetime runs out.
//!
//! The firing side for `Double` and `Triple` modes is a field of the
//! system, so two scenes never share it.

use glam::Vec3;
use tessera_core::{
    EntityId, Message, Pool, Requirements, SceneContext, System, Transform, World,
};
use tessera_physics::PhysicsObject;

use crate::components::{groups, park, unpark, FireMode, ItemKind, Projectile};
use crate::messages::{ids, payload, PlayerEvent, ProjectileEvent, RoundEvent, WeaponEvent};

/// Pulse speed along +X, units per second.
pub const PULSE_SPEED: f32 = 18.0;
/// Seconds a pulse flies before fizzling.
pub const PULSE_LIFETIME: f32 = 1.5;
/// Vertical spread between firing positions.
pub const PULSE_SPREAD: f32 = 0.6;
/// Seconds an upgraded mode lasts before stepping down.
pub const DOWNGRADE_TIME: f32 = 5.0;

/// Where pulses leave the ship, in ship space.
const NOSE: Vec3 = Vec3::new(0.6, 0.0, 0.0);

/// The player's weapon.
pub struct WeaponSystem {
    pulses: Pool<EntityId>,
    mode: FireMode,
    side: u8,
    fire_timer: f32,
    downgrade_timer: f32,
    trigger: bool,
    enabled: bool,
    ship: Option<EntityId>,
    hits: Vec<ProjectileEvent>,
}

impl WeaponSystem {
    /// Creates the weapon around a pool of parked pulse entities.
    #[must_use]
    pub fn new(pulses: Pool<EntityId>) -> Self {
        Self {
            pulses,
            mode: FireMode::Single,
            side: 0,
            fire_timer: FireMode::Single.interval(),
            downgrade_timer: 0.0,
            trigger: false,
            enabled: false,
            ship: None,
            hits: Vec::new(),
        }
    }

    /// Current fire mode.
    #[must_use]
    pub const fn mode(&self) -> FireMode {
        self.mode
    }

    /// Pulses in flight.
    #[must_use]
    pub const fn pulses_in_flight(&self) -> usize {
        self.pulses.alive_count()
    }

    /// Pulses ready to fire.
    #[must_use]
    pub const fn pulses_available(&self) -> usize {
        self.pulses.available()
    }

    fn set_mode(&mut self, mode: FireMode, ctx: &mut SceneContext<'_>) {
        if mode != self.mode {
            self.mode = mode;
            self.side = 0;
            ctx.post_value(ids::WEAPON, WeaponEvent::ModeChanged { mode });
        }
    }

    /// Spawn point of the next pulse, advancing the side.
    fn muzzle(&mut self, ship: &Transform) -> Vec3 {
        let sides = self.mode.sides();
        let side = f32::from(self.side % sides);
        let offset = match self.mode {
            FireMode::Single => 0.0,
            FireMode::Double => PULSE_SPREAD * (2.0 * side - 1.0),
            FireMode::Triple => PULSE_SPREAD * (side - 1.0),
        };
        self.side = (self.side + 1) % sides;
        ship.transform_point(NOSE + Vec3::Y * offset)
    }

    fn try_fire(&mut self, world: &World) -> Option<Vec3> {
        let ship = *world.get::<Transform>(self.ship?)?;
        let handle = self.pulses.acquire()?;
        let pulse = self.pulses.get(handle).copied()?;

        let position = self.muzzle(&ship);
        unpark(world, pulse, position, groups::PROJECTILE, groups::NPC);
        if let Some(mut projectile) = world.get_mut::<Projectile>(pulse) {
            projectile.damage = self.mode.damage();
            projectile.lifetime = PULSE_LIFETIME;
        }
        Some(position)
    }

    /// Moves live pulses and retires the spent ones.
    fn update_pulses(&mut self, world: &World, dt: f32) {
        let hits = &mut self.hits;
        self.pulses.retain(|_, &mut pulse| {
            let Some(mut tx) = world.get_mut::<Transform>(pulse) else {
                return false;
            };
            let struck = world
                .get::<PhysicsObject>(pulse)
                .and_then(|body| body.collision_ids().first().copied());

            let mut projectile = world.component_mut::<Projectile>(pulse);
            if let Some(target) = struck {
                hits.push(ProjectileEvent::Hit {
                    target,
                    damage: projectile.damage,
                    position: tx.position,
                });
            } else {
                tx.translate(Vec3::X * PULSE_SPEED * dt);
                projectile.lifetime -= dt;
                if projectile.lifetime > 0.0 {
                    return true;
                }
            }

            drop((tx, projectile));
            park(world, pulse);
            false
        });
    }
}

impl System for WeaponSystem {
    fn requirements(&self) -> Requirements {
        Requirements::new()
            .with::<Projectile>()
            .with::<Transform>()
            .with::<PhysicsObject>()
    }

    fn process(&mut self, _entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        let dt = ctx.dt();
        self.fire_timer += dt;

        if self.trigger && self.enabled && self.fire_timer > self.mode.interval() {
            if let Some(position) = self.try_fire(ctx.world()) {
                self.fire_timer = 0.0;
                ctx.post_value(ids::PLAYER, PlayerEvent::Fired { position });
            }
        }

        if self.mode > FireMode::Single {
            self.downgrade_timer -= dt;
            if self.downgrade_timer < 0.0 {
                self.downgrade_timer = DOWNGRADE_TIME;
                self.set_mode(self.mode.downgraded(), ctx);
            }
        }

        self.update_pulses(ctx.world(), dt);
        for hit in self.hits.drain(..) {
            ctx.post_value(ids::PROJECTILE, hit);
        }
    }

    fn handle_message(&mut self, message: &Message, entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        if let Some(event) = payload::<PlayerEvent>(message, ids::PLAYER) {
            match *event {
                PlayerEvent::Spawned { entity } => {
                    self.ship = Some(entity);
                    self.enabled = true;
                    tracing::debug!(?entity, "weapon enabled");
                }
                PlayerEvent::TriggerChanged { held } => {
                    self.trigger = held;
                    if !held {
                        // Next press fires straight away
                        self.fire_timer = self.mode.interval();
                    }
                }
                PlayerEvent::CollectedItem {
                    item: ItemKind::WeaponUpgrade,
                } => {
                    self.downgrade_timer = DOWNGRADE_TIME;
                    self.set_mode(self.mode.upgraded(), ctx);
                }
                PlayerEvent::Died { .. } => {
                    self.enabled = false;
                    self.trigger = false;
                    self.set_mode(FireMode::Single, ctx);
                }
                _ => {}
            }
        } else if let Some(RoundEvent::Started { .. }) = payload::<RoundEvent>(message, ids::ROUND) {
            self.pulses.clear();
            for &pulse in entities {
                park(ctx.world(), pulse);
            }
        }
    }
}
