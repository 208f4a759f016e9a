//! # Arena Messages
//!
//! The vocabulary systems and directors use to talk to each other.
//!
//! ```text
//! PlayerDirector ──TriggerChanged──> WeaponSystem ──Fired──> HUD
//!                                        │
//! CollisionSystem ─> NpcSystem ──Died──> ExplosionSystem, ItemSystem,
//!                                        NpcDirector, HUD
//! ```
//!
//! Each id carries exactly one payload type. Payloads are plain enums
//! posted by value.

use glam::Vec3;
use tessera_core::{EntityId, MessageId};

use crate::components::{FireMode, ItemKind, NpcKind};

/// Message ids used by the arena.
pub mod ids {
    use tessera_core::MessageId;

    /// Carries [`PlayerEvent`](super::PlayerEvent).
    pub const PLAYER: MessageId = 1;
    /// Carries [`NpcEvent`](super::NpcEvent).
    pub const NPC: MessageId = 2;
    /// Carries [`ProjectileEvent`](super::ProjectileEvent).
    pub const PROJECTILE: MessageId = 3;
    /// Carries [`RoundEvent`](super::RoundEvent).
    pub const ROUND: MessageId = 4;
    /// Carries [`WeaponEvent`](super::WeaponEvent).
    pub const WEAPON: MessageId = 5;
}

/// Ids copied into the HUD scene.
pub const HUD_RELAYED: [MessageId; 5] = [
    ids::PLAYER,
    ids::NPC,
    ids::PROJECTILE,
    ids::ROUND,
    ids::WEAPON,
];

/// Things that happen to the player ship.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerEvent {
    /// The ship is (back) in play and may fire.
    Spawned {
        /// The ship entity.
        entity: EntityId,
    },
    /// The fire button went down or up.
    TriggerChanged {
        /// True while held.
        held: bool,
    },
    /// A pulse left the ship.
    Fired {
        /// Where the pulse spawned.
        position: Vec3,
    },
    /// The ship flew into a pickup.
    CollectedItem {
        /// What was picked up.
        item: ItemKind,
    },
    /// The ship lost a hit point.
    Damaged {
        /// Hit points left.
        health: u32,
    },
    /// The ship was destroyed.
    Died {
        /// The ship entity.
        entity: EntityId,
        /// Where it blew up.
        position: Vec3,
    },
}

/// Things that happen to NPCs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NpcEvent {
    /// An NPC was released into the arena.
    Spawned {
        /// The NPC entity.
        entity: EntityId,
        /// Its kind.
        kind: NpcKind,
    },
    /// An NPC took damage and survived.
    HealthChanged {
        /// The NPC entity.
        entity: EntityId,
        /// Its kind.
        kind: NpcKind,
        /// Health left.
        health: f32,
    },
    /// An NPC was destroyed.
    Died {
        /// The NPC entity.
        entity: EntityId,
        /// Its kind.
        kind: NpcKind,
        /// Where it died.
        position: Vec3,
    },
    /// An NPC left the arena unharmed.
    Escaped {
        /// The NPC entity.
        entity: EntityId,
        /// Its kind.
        kind: NpcKind,
    },
}

/// Projectile outcomes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectileEvent {
    /// A pulse struck something and was recycled.
    Hit {
        /// What it struck.
        target: EntityId,
        /// Damage it carried.
        damage: f32,
        /// Where.
        position: Vec3,
    },
}

/// Round flow, posted by the NPC director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundEvent {
    /// A round began.
    Started {
        /// Round number, from 1.
        round: u32,
    },
    /// Every NPC of the round is gone.
    Ended {
        /// The round that finished.
        round: u32,
    },
}

/// Weapon state changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeaponEvent {
    /// The fire mode changed, by upgrade, timeout or death.
    ModeChanged {
        /// The new mode.
        mode: FireMode,
    },
}

/// Returns the payload if `message` is `id` and carries `T`.
pub fn payload<T: 'static>(message: &tessera_core::Message, id: MessageId) -> Option<&T> {
    if message.id() == id {
        message.data::<T>()
    } else {
        None
    }
}
