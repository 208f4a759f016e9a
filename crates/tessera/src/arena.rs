//! # Arena Assembly
//!
//! Builds the game and HUD scenes from an [`ArenaConfig`]. Every entity
//! the arena will ever use is created here, parked at
//! [`PARKED`](crate::components::PARKED) with collision disabled; play
//! only moves them in and out of the field.

use glam::{Quat, Vec3};
use tessera_core::{
    CommandTarget, EngineConfig, EntityId, MessageRelay, Pool, Scene, Transform, Velocity, World,
};
use tessera_physics::{Axis, CollisionSystem, PhysicsObject, PhysicsShape};

use crate::components::{tags, Explosion, Item, Npc, NpcKind, Player, Projectile, PARKED};
use crate::config::ArenaConfig;
use crate::directors::{NpcDirector, PlayerDirector, ScoreDirector};
use crate::error::{ArenaError, ArenaResult};
use crate::game_loop::FrameLoop;
use crate::messages::HUD_RELAYED;
use crate::systems::{ExplosionSystem, ItemSystem, NpcSystem, PlayerSystem, WeaponSystem};

/// Builds both scenes and wires the relay between them.
///
/// # Errors
///
/// - [`ArenaError::Config`] if the configuration does not validate
/// - [`ArenaError::Shape`] if a collision shape is rejected
/// - [`ArenaError::WorldFull`] if the world runs out of slots
pub fn build(config: &ArenaConfig) -> ArenaResult<FrameLoop> {
    config.validate()?;
    let settings = &config.arena;
    let block = config.engine.pool_block_size;

    let mut game = Scene::new(&config.engine);
    let world = game.world_mut();

    spawn_ship(world)?;
    for (kind, count) in [
        (NpcKind::Drone, settings.drones),
        (NpcKind::Gunship, settings.gunships),
        (NpcKind::Elite, settings.elites),
    ] {
        for _ in 0..count {
            spawn_npc(world, kind)?;
        }
    }

    let pulses = pooled(world, settings.pulse_capacity, block, |world, pulse| {
        world.add_component(pulse, Transform::from_position(PARKED));
        world.add_component(pulse, Projectile::default());
        world.add_component(pulse, PhysicsObject::new(0.1, 1.0).with_shape(PhysicsShape::sphere(0.15))?);
        Ok(())
    })?;
    let items = pooled(world, settings.item_capacity, block, |world, item| {
        world.add_component(item, Transform::from_position(PARKED));
        world.add_component(item, Item::default());
        world.add_component(item, PhysicsObject::new(0.5, 1.0).with_shape(PhysicsShape::sphere(0.35))?);
        Ok(())
    })?;
    let blasts = pooled(world, settings.explosion_capacity, block, |world, blast| {
        world.add_component(blast, Transform::from_position(PARKED));
        world.add_component(blast, Explosion::default());
        Ok(())
    })?;
    let entities = world.alive_count();

    game.add_system(CollisionSystem::new(config.physics.clone()));
    game.add_system(PlayerSystem::new(settings.half_width, settings.half_height));
    game.add_system(NpcSystem::new(settings.half_width));
    game.add_system(WeaponSystem::new(pulses));
    game.add_system(ItemSystem::new(items));
    game.add_system(ExplosionSystem::new(blasts));

    let spawn_point = Vec3::new(-settings.half_width * 0.6, 0.0, 0.0);
    game.add_director(PlayerDirector::new(settings.ship_speed, spawn_point));
    game.add_director(NpcDirector::new(settings));

    let relay = MessageRelay::new(config.engine.relay_capacity);
    game.attach_relay(relay.sender(), &HUD_RELAYED);

    let mut hud = Scene::new(&EngineConfig {
        entity_capacity: 1,
        ..config.engine.clone()
    });
    hud.add_director(ScoreDirector::new());

    tracing::info!(
        entities,
        capacity = config.engine.entity_capacity,
        seed = settings.seed,
        "arena built"
    );
    Ok(FrameLoop::new(
        game,
        hud,
        relay,
        config.step(),
        settings.max_frame_time,
    ))
}

fn create(world: &mut World) -> ArenaResult<EntityId> {
    let entity = world.create();
    if entity.is_null() {
        return Err(ArenaError::WorldFull {
            capacity: world.capacity(),
        });
    }
    Ok(entity)
}

/// The ship waits parked and dead until the player director spawns it.
fn spawn_ship(world: &mut World) -> ArenaResult<EntityId> {
    let ship = create(world)?;
    let body = PhysicsObject::new(1.0, 1.0).with_shape(PhysicsShape::capsule(0.3, 0.8, Axis::X))?;
    world.add_component(
        ship,
        Player {
            alive: false,
            ..Player::default()
        },
    );
    world.add_component(ship, Transform::from_position(PARKED));
    world.add_component(ship, Velocity::default());
    world.add_component(ship, body);
    world.add_component(ship, CommandTarget::new(tags::PLAYER));
    Ok(ship)
}

fn spawn_npc(world: &mut World, kind: NpcKind) -> ArenaResult<EntityId> {
    let npc = create(world)?;
    world.add_component(npc, Npc::parked(kind));
    world.add_component(npc, Transform::from_position(PARKED));
    world.add_component(npc, npc_body(kind)?);
    world.add_component(npc, CommandTarget::new(kind.tag()));
    Ok(npc)
}

fn npc_body(kind: NpcKind) -> ArenaResult<PhysicsObject> {
    let body = match kind {
        NpcKind::Drone => PhysicsObject::new(1.0, 1.0).with_shape(PhysicsShape::sphere(0.4))?,
        NpcKind::Gunship => PhysicsObject::new(4.0, 1.0)
            .with_shape(PhysicsShape::cuboid(Vec3::new(0.8, 0.4, 0.4)))?
            .with_shape(
                PhysicsShape::cone(0.4, 0.6, Axis::X)
                    .with_offset(Vec3::new(-1.0, 0.0, 0.0))
                    .with_rotation(Quat::from_rotation_z(std::f32::consts::PI)),
            )?,
        NpcKind::Elite => PhysicsObject::new(20.0, 1.0).with_shape(PhysicsShape::compound(vec![
            PhysicsShape::cylinder(0.9, 0.4, Axis::X),
            PhysicsShape::sphere(0.5).with_offset(Vec3::new(0.0, 1.1, 0.0)),
            PhysicsShape::sphere(0.5).with_offset(Vec3::new(0.0, -1.1, 0.0)),
        ]))?,
    };
    Ok(body)
}

/// Creates a block-rounded pool of entities, each dressed by `dress`.
fn pooled(
    world: &mut World,
    requested: usize,
    block: usize,
    mut dress: impl FnMut(&mut World, EntityId) -> ArenaResult<()>,
) -> ArenaResult<Pool<EntityId>> {
    let mut failure = None;
    let pool = Pool::with_block(requested, block, |_| {
        match create(world).and_then(|entity| dress(world, entity).map(|()| entity)) {
            Ok(entity) => entity,
            Err(err) => {
                failure.get_or_insert(err);
                EntityId::NULL
            }
        }
    });
    failure.map_or(Ok(pool), Err)
}
