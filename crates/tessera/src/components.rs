//! # Arena Components
//!
//! Gameplay data attached to entities, plus the collision groups and
//! command tags the arena uses.

use glam::Vec3;
use tessera_core::{Component, EntityId, World};
use tessera_physics::PhysicsObject;

/// Collision groups. An object collides with another when each one's
/// flags name a group of the other.
pub mod groups {
    /// The player ship.
    pub const PLAYER: u32 = 1 << 0;
    /// Hostile NPCs.
    pub const NPC: u32 = 1 << 1;
    /// Player pulses.
    pub const PROJECTILE: u32 = 1 << 2;
    /// Pickups.
    pub const ITEM: u32 = 1 << 3;
}

/// Command tags.
pub mod tags {
    /// The player ship.
    pub const PLAYER: u32 = 1 << 0;
    /// Drone NPCs.
    pub const DRONE: u32 = 1 << 1;
    /// Gunship NPCs.
    pub const GUNSHIP: u32 = 1 << 2;
    /// Elite NPCs.
    pub const ELITE: u32 = 1 << 3;
    /// Every NPC.
    pub const NPC: u32 = DRONE | GUNSHIP | ELITE;
}

/// Where pooled entities wait while dead.
///
/// Parked objects also lose their collision masks, so piling them on one
/// spot never produces collisions.
pub const PARKED: Vec3 = Vec3::new(-1000.0, -1000.0, 0.0);

// ============================================================================
// PLAYER
// ============================================================================

/// The player ship.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    /// Hit points left.
    pub health: u32,
    /// False between death and respawn.
    pub alive: bool,
    /// Seconds of invulnerability left after a hit.
    pub shield: f32,
}

impl Component for Player {}

impl Player {
    /// Hit points at spawn.
    pub const MAX_HEALTH: u32 = 3;
}

impl Default for Player {
    fn default() -> Self {
        Self {
            health: Self::MAX_HEALTH,
            alive: true,
            shield: 0.0,
        }
    }
}

// ============================================================================
// WEAPONS
// ============================================================================

/// How the ship fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum FireMode {
    /// One pulse from the nose.
    #[default]
    Single,
    /// Alternating left and right pulses, twice as often.
    Double,
    /// Cycling left, centre, right, three times as often.
    Triple,
}

impl FireMode {
    /// Seconds between pulses.
    #[must_use]
    pub fn interval(self) -> f32 {
        0.2 / f32::from(self.sides())
    }

    /// Damage of each pulse.
    #[must_use]
    pub const fn damage(self) -> f32 {
        match self {
            Self::Single => 5.0,
            Self::Double => 2.5,
            Self::Triple => 1.2,
        }
    }

    /// Number of firing positions cycled through.
    #[must_use]
    pub const fn sides(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }

    /// One step up, saturating.
    #[must_use]
    pub const fn upgraded(self) -> Self {
        match self {
            Self::Single => Self::Double,
            Self::Double | Self::Triple => Self::Triple,
        }
    }

    /// One step down, saturating.
    #[must_use]
    pub const fn downgraded(self) -> Self {
        match self {
            Self::Single | Self::Double => Self::Single,
            Self::Triple => Self::Double,
        }
    }
}

/// A pooled pulse fired by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Projectile {
    /// Damage dealt on impact.
    pub damage: f32,
    /// Seconds until it fizzles.
    pub lifetime: f32,
}

impl Component for Projectile {}

// ============================================================================
// NPCS
// ============================================================================

/// NPC archetypes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NpcKind {
    /// Fast and fragile.
    #[default]
    Drone,
    /// Slow, weaves up and down.
    Gunship,
    /// Rare, tough, drops a weapon upgrade.
    Elite,
}

impl NpcKind {
    /// All kinds, in release order.
    pub const ALL: [Self; 3] = [Self::Drone, Self::Gunship, Self::Elite];

    /// Health at release.
    #[must_use]
    pub const fn max_health(self) -> f32 {
        match self {
            Self::Drone => 2.0,
            Self::Gunship => 8.0,
            Self::Elite => 100.0,
        }
    }

    /// Horizontal speed in units per second.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Drone => 6.0,
            Self::Gunship => 3.0,
            Self::Elite => 1.5,
        }
    }

    /// Command tag.
    #[must_use]
    pub const fn tag(self) -> u32 {
        match self {
            Self::Drone => tags::DRONE,
            Self::Gunship => tags::GUNSHIP,
            Self::Elite => tags::ELITE,
        }
    }

    /// Points for destroying one.
    #[must_use]
    pub const fn score(self) -> u64 {
        match self {
            Self::Drone => 10,
            Self::Gunship => 50,
            Self::Elite => 500,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Drone => "Drone",
            Self::Gunship => "Gunship",
            Self::Elite => "Elite",
        }
    }
}

/// A pre-created NPC. Inactive NPCs are parked until released.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Npc {
    /// Archetype.
    pub kind: NpcKind,
    /// Health left.
    pub health: f32,
    /// True while in play.
    pub active: bool,
    /// Seconds since release; drives the weave.
    pub age: f32,
    /// Height it was released at.
    pub lane: f32,
}

impl Component for Npc {}

impl Npc {
    /// A parked NPC of `kind`.
    #[must_use]
    pub fn parked(kind: NpcKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}

// ============================================================================
// EFFECTS AND PICKUPS
// ============================================================================

/// A pooled explosion effect.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Explosion {
    /// Seconds left on screen.
    pub remaining: f32,
    /// Scale, growing with age.
    pub size: f32,
}

impl Component for Explosion {}

/// What a pickup grants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ItemKind {
    /// Raises the fire mode by one step.
    #[default]
    WeaponUpgrade,
    /// Restores one hit point.
    Repair,
}

/// A pooled pickup.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Item {
    /// What it grants.
    pub kind: ItemKind,
    /// Seconds before it disappears.
    pub remaining: f32,
}

impl Component for Item {}

// ============================================================================
// HELPERS
// ============================================================================

/// Moves a pooled entity off the field and disables its collision.
pub fn park(world: &World, entity: EntityId) {
    if let Some(mut tx) = world.get_mut::<tessera_core::Transform>(entity) {
        tx.position = PARKED;
    }
    if let Some(mut body) = world.get_mut::<PhysicsObject>(entity) {
        body.set_collision_groups(0);
        body.set_collision_flags(0);
    }
}

/// Places a pooled entity at `position` and restores its collision masks.
pub fn unpark(world: &World, entity: EntityId, position: Vec3, groups: u32, flags: u32) {
    if let Some(mut tx) = world.get_mut::<tessera_core::Transform>(entity) {
        tx.position = position;
    }
    if let Some(mut body) = world.get_mut::<PhysicsObject>(entity) {
        body.set_collision_groups(groups);
        body.set_collision_flags(flags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_mode_steps() {
        assert_eq!(FireMode::Single.upgraded(), FireMode::Double);
        assert_eq!(FireMode::Triple.upgraded(), FireMode::Triple);
        assert_eq!(FireMode::Triple.downgraded(), FireMode::Double);
        assert_eq!(FireMode::Single.downgraded(), FireMode::Single);
        assert!(FireMode::Triple.interval() < FireMode::Double.interval());
    }

    #[test]
    fn test_npc_tags_are_distinct() {
        let mut seen = 0;
        for kind in NpcKind::ALL {
            assert_eq!(seen & kind.tag(), 0);
            seen |= kind.tag();
        }
        assert_eq!(seen, tags::NPC);
    }

    #[test]
    fn test_park_disables_collision() {
        let mut world = World::new(4);
        let e = world.create();
        world.add_component(e, tessera_core::Transform::default());
        let mut body = PhysicsObject::default();
        body.set_collision_groups(groups::NPC);
        body.set_collision_flags(groups::PROJECTILE);
        world.add_component(e, body);

        park(&world, e);
        assert_eq!(world.component::<tessera_core::Transform>(e).position, PARKED);
        assert_eq!(world.component::<PhysicsObject>(e).collision_flags(), 0);

        unpark(&world, e, Vec3::X, groups::NPC, groups::PROJECTILE);
        assert_eq!(world.component::<tessera_core::Transform>(e).position, Vec3::X);
        assert_eq!(world.component::<PhysicsObject>(e).collision_groups(), groups::NPC);
    }
}
