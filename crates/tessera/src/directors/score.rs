//! # Score Director
//!
//! Lives in the HUD scene and builds the scoreboard from messages relayed
//! out of the game scene. It never touches game entities.

use tessera_core::{Director, Message, SceneContext};

use crate::components::{FireMode, ItemKind, Player};
use crate::messages::{ids, NpcEvent, PlayerEvent, ProjectileEvent, RoundEvent, WeaponEvent};

/// What the HUD shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Score {
    /// Points from kills.
    pub points: u64,
    /// NPCs destroyed.
    pub kills: u32,
    /// NPCs that got away.
    pub escaped: u32,
    /// Pulses fired.
    pub fired: u32,
    /// Pulses that struck something.
    pub hits: u32,
    /// Pickups collected.
    pub items: u32,
    /// Ship losses.
    pub deaths: u32,
    /// Current round.
    pub round: u32,
    /// Ship hit points.
    pub health: u32,
    /// Current fire mode.
    pub mode: FireMode,
}

impl Default for Score {
    fn default() -> Self {
        Self {
            points: 0,
            kills: 0,
            escaped: 0,
            fired: 0,
            hits: 0,
            items: 0,
            deaths: 0,
            round: 0,
            health: Player::MAX_HEALTH,
            mode: FireMode::Single,
        }
    }
}

impl Score {
    /// Share of fired pulses that hit, in `0.0..=1.0`.
    #[must_use]
    pub fn accuracy(&self) -> f32 {
        if self.fired == 0 {
            0.0
        } else {
            self.hits as f32 / self.fired as f32
        }
    }
}

/// Keeps the [`Score`] up to date.
#[derive(Debug, Default)]
pub struct ScoreDirector {
    score: Score,
}

impl ScoreDirector {
    /// Starts from an empty scoreboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The scoreboard so far.
    #[must_use]
    pub const fn score(&self) -> &Score {
        &self.score
    }

    fn on_player(&mut self, event: &PlayerEvent) {
        let score = &mut self.score;
        match *event {
            PlayerEvent::Spawned { .. } => score.health = Player::MAX_HEALTH,
            PlayerEvent::Fired { .. } => score.fired += 1,
            PlayerEvent::CollectedItem { item } => {
                score.items += 1;
                if item == ItemKind::Repair && score.health > 0 {
                    score.health = (score.health + 1).min(Player::MAX_HEALTH);
                }
            }
            PlayerEvent::Damaged { health } => score.health = health,
            PlayerEvent::Died { .. } => {
                score.health = 0;
                score.deaths += 1;
            }
            PlayerEvent::TriggerChanged { .. } => {}
        }
    }

    fn on_npc(&mut self, event: &NpcEvent) {
        match *event {
            NpcEvent::Died { kind, .. } => {
                self.score.kills += 1;
                self.score.points += kind.score();
            }
            NpcEvent::Escaped { .. } => self.score.escaped += 1,
            NpcEvent::Spawned { .. } | NpcEvent::HealthChanged { .. } => {}
        }
    }
}

impl Director for ScoreDirector {
    fn handle_message(&mut self, message: &Message, _ctx: &mut SceneContext<'_>) {
        match message.id() {
            ids::PLAYER => {
                if let Some(event) = message.data::<PlayerEvent>() {
                    self.on_player(event);
                }
            }
            ids::NPC => {
                if let Some(event) = message.data::<NpcEvent>() {
                    self.on_npc(event);
                }
            }
            ids::PROJECTILE => {
                if let Some(ProjectileEvent::Hit { .. }) = message.data::<ProjectileEvent>() {
                    self.score.hits += 1;
                }
            }
            ids::ROUND => {
                if let Some(RoundEvent::Started { round }) = message.data::<RoundEvent>() {
                    self.score.round = *round;
                }
            }
            ids::WEAPON => {
                if let Some(WeaponEvent::ModeChanged { mode }) = message.data::<WeaponEvent>() {
                    self.score.mode = *mode;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::NpcKind;
    use glam::Vec3;
    use tessera_core::{EntityId, Scene};

    fn deliver(scene: &mut Scene, id: u32, payload: impl std::any::Any + Send + Sync) {
        scene.forward_message(Message::new(id, payload));
    }

    #[test]
    fn test_scoreboard_tallies() {
        let mut hud = Scene::with_capacity(1);
        hud.add_director(ScoreDirector::new());

        deliver(&mut hud, ids::ROUND, RoundEvent::Started { round: 2 });
        deliver(&mut hud, ids::PLAYER, PlayerEvent::Fired { position: Vec3::ZERO });
        deliver(&mut hud, ids::PLAYER, PlayerEvent::Fired { position: Vec3::ZERO });
        deliver(
            &mut hud,
            ids::PROJECTILE,
            ProjectileEvent::Hit {
                target: EntityId::NULL,
                damage: 5.0,
                position: Vec3::ZERO,
            },
        );
        deliver(
            &mut hud,
            ids::NPC,
            NpcEvent::Died {
                entity: EntityId::NULL,
                kind: NpcKind::Gunship,
                position: Vec3::ZERO,
            },
        );
        deliver(&mut hud, ids::PLAYER, PlayerEvent::Damaged { health: 2 });
        deliver(&mut hud, ids::WEAPON, WeaponEvent::ModeChanged { mode: FireMode::Double });
        hud.simulate(0.016);

        let score = *hud.director::<ScoreDirector>().unwrap().score();
        assert_eq!(score.round, 2);
        assert_eq!(score.fired, 2);
        assert_eq!(score.hits, 1);
        assert_eq!(score.kills, 1);
        assert_eq!(score.points, NpcKind::Gunship.score());
        assert_eq!(score.health, 2);
        assert_eq!(score.mode, FireMode::Double);
        assert!((score.accuracy() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_repair_is_capped() {
        let mut director = ScoreDirector::new();
        director.on_player(&PlayerEvent::CollectedItem {
            item: ItemKind::Repair,
        });
        assert_eq!(director.score().health, Player::MAX_HEALTH);
        assert_eq!(director.score().items, 1);
    }
}
