//! # NPC Director
//!
//! Runs the round cycle:
//!
//! ```text
//! Starting ──► Running ──(all released, none alive)──► Pausing ──► Starting
//! ```
//!
//! While a round runs, each NPC kind has its own release countdown. A
//! release picks a random lane and wakes the first parked NPC of that kind
//! through a tagged command. When every NPC of that kind is busy the
//! release is skipped and the countdown starts over.
//!
//! All randomness comes from a seeded `ChaCha8Rng`, so a seed replays the
//! same waves.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_core::{Command, Director, EntityId, Message, SceneContext, World};

use crate::components::{groups, unpark, Npc, NpcKind};
use crate::config::ArenaSettings;
use crate::messages::{ids, payload, NpcEvent, RoundEvent};
use crate::systems::npc::entry_point;

/// Seconds between releases of each kind, before jitter.
const BASE_INTERVAL: [f32; 3] = [1.2, 4.0, 24.0];

/// Lanes keep this share of the arena height free at the edges.
const LANE_MARGIN: f32 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Starting,
    Running,
    Pausing(f32),
}

/// Releases NPC waves and tracks rounds.
#[derive(Debug)]
pub struct NpcDirector {
    rng: ChaCha8Rng,
    timers: [f32; 3],
    phase: Phase,
    round: u32,
    released: u32,
    alive: u32,
    per_round: u32,
    round_pause: f32,
    half_width: f32,
    half_height: f32,
}

impl NpcDirector {
    /// Round 1 starts on the first tick.
    #[must_use]
    pub fn new(settings: &ArenaSettings) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            timers: BASE_INTERVAL,
            phase: Phase::Starting,
            round: 0,
            released: 0,
            alive: 0,
            per_round: settings.releases_per_round,
            round_pause: settings.round_pause,
            half_width: settings.half_width,
            half_height: settings.half_height,
        }
    }

    /// Current round, 0 before the first one starts.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// NPCs released this round.
    #[must_use]
    pub const fn released(&self) -> u32 {
        self.released
    }

    /// NPCs released and not yet dead or escaped.
    #[must_use]
    pub const fn alive(&self) -> u32 {
        self.alive
    }

    /// True between the end of a round and the start of the next.
    #[must_use]
    pub fn is_between_rounds(&self) -> bool {
        matches!(self.phase, Phase::Pausing(_))
    }

    fn jitter(&mut self) -> f32 {
        self.rng.gen_range(0.1..1.0)
    }

    fn start_round(&mut self, ctx: &mut SceneContext<'_>) {
        self.round += 1;
        self.released = 0;
        for (timer, base) in self.timers.iter_mut().zip(BASE_INTERVAL) {
            *timer = base * self.rng.gen_range(0.1..1.0);
        }
        self.phase = Phase::Running;
        ctx.post_value(ids::ROUND, RoundEvent::Started { round: self.round });
        tracing::info!(round = self.round, releases = self.per_round, "round started");
    }

    /// Wakes one parked NPC of `kind`. Returns it if one was free.
    fn release(&mut self, kind: NpcKind, ctx: &mut SceneContext<'_>) -> Option<EntityId> {
        let reach = self.half_height * (1.0 - LANE_MARGIN);
        let lane = self.rng.gen_range(-reach..=reach);
        let entry = entry_point(self.half_width, lane);

        let mut woken = None;
        let mut command = Command::new(kind.tag(), |entity, world: &World, _dt| {
            if woken.is_some() {
                return;
            }
            let Some(mut npc) = world.get_mut::<Npc>(entity) else {
                return;
            };
            if npc.active {
                return;
            }
            *npc = Npc {
                kind,
                health: kind.max_health(),
                active: true,
                age: 0.0,
                lane,
            };
            drop(npc);
            unpark(world, entity, entry, groups::NPC, groups::PROJECTILE | groups::PLAYER);
            woken = Some(entity);
        });
        ctx.send_command(&mut command);
        drop(command);

        let entity = woken?;
        self.released += 1;
        self.alive += 1;
        ctx.post_value(ids::NPC, NpcEvent::Spawned { entity, kind });
        Some(entity)
    }

    fn run(&mut self, ctx: &mut SceneContext<'_>) {
        if self.released < self.per_round {
            let dt = ctx.dt();
            for (slot, kind) in NpcKind::ALL.into_iter().enumerate() {
                self.timers[slot] -= dt;
                if self.timers[slot] > 0.0 || self.released >= self.per_round {
                    continue;
                }
                self.timers[slot] = BASE_INTERVAL[slot] + self.jitter();
                if self.release(kind, ctx).is_none() {
                    tracing::trace!(kind = kind.name(), "no parked npc to release");
                }
            }
        } else if self.alive == 0 {
            ctx.post_value(ids::ROUND, RoundEvent::Ended { round: self.round });
            self.phase = Phase::Pausing(self.round_pause);
            tracing::info!(round = self.round, "round ended");
        }
    }
}

impl Director for NpcDirector {
    fn handle_message(&mut self, message: &Message, _ctx: &mut SceneContext<'_>) {
        if let Some(NpcEvent::Died { .. } | NpcEvent::Escaped { .. }) =
            payload::<NpcEvent>(message, ids::NPC)
        {
            self.alive = self.alive.saturating_sub(1);
        }
    }

    fn process(&mut self, ctx: &mut SceneContext<'_>) {
        match self.phase {
            Phase::Starting => self.start_round(ctx),
            Phase::Running => self.run(ctx),
            Phase::Pausing(remaining) => {
                let remaining = remaining - ctx.dt();
                self.phase = if remaining <= 0.0 {
                    Phase::Starting
                } else {
                    Phase::Pausing(remaining)
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{CommandTarget, Scene, Transform};

    fn settings(releases: u32) -> ArenaSettings {
        ArenaSettings {
            releases_per_round: releases,
            round_pause: 1.0,
            ..ArenaSettings::default()
        }
    }

    fn scene_with_drones(count: usize, settings: &ArenaSettings) -> Scene {
        let mut scene = Scene::with_capacity(count);
        scene.add_director(NpcDirector::new(settings));
        let world = scene.world_mut();
        for _ in 0..count {
            let npc = world.create();
            world.add_component(npc, Npc::parked(NpcKind::Drone));
            world.add_component(npc, Transform::default());
            world.add_component(npc, CommandTarget::new(NpcKind::Drone.tag()));
        }
        scene
    }

    #[test]
    fn test_releases_stop_at_round_quota() {
        let mut scene = scene_with_drones(8, &settings(3));
        for _ in 0..200 {
            scene.simulate(0.1);
        }
        let director = scene.director::<NpcDirector>().unwrap();
        assert_eq!(director.round(), 1);
        assert_eq!(director.released(), 3);
        assert_eq!(director.alive(), 3);

        let active = scene
            .world()
            .iter_alive()
            .filter(|&e| scene.world().component::<Npc>(e).active)
            .count();
        assert_eq!(active, 3);
    }

    #[test]
    fn test_busy_kind_is_skipped() {
        let mut scene = scene_with_drones(1, &settings(5));
        for _ in 0..100 {
            scene.simulate(0.1);
        }
        assert_eq!(scene.director::<NpcDirector>().unwrap().released(), 1);
    }

    #[test]
    fn test_round_cycle() {
        let mut scene = scene_with_drones(4, &settings(2));
        for _ in 0..100 {
            scene.simulate(0.1);
        }
        assert_eq!(scene.director::<NpcDirector>().unwrap().alive(), 2);

        let npcs: Vec<_> = scene.world().iter_alive().collect();
        for entity in npcs {
            scene.forward_message(Message::new(
                ids::NPC,
                NpcEvent::Escaped {
                    entity,
                    kind: NpcKind::Drone,
                },
            ));
        }
        scene.simulate(0.1);
        let director = scene.director::<NpcDirector>().unwrap();
        assert_eq!(director.alive(), 0);
        assert!(director.is_between_rounds());

        // One second of pause, then two free drones to release
        for _ in 0..60 {
            scene.simulate(0.1);
        }
        let director = scene.director::<NpcDirector>().unwrap();
        assert_eq!(director.round(), 2);
        assert_eq!(director.released(), 2);
    }

    #[test]
    fn test_same_seed_same_lanes() {
        let lanes = |seed| {
            let mut settings = settings(4);
            settings.seed = seed;
            let mut scene = scene_with_drones(4, &settings);
            for _ in 0..100 {
                scene.simulate(0.1);
            }
            scene
                .world()
                .iter_alive()
                .map(|e| scene.world().component::<Npc>(e).lane)
                .collect::<Vec<_>>()
        };
        assert_eq!(lanes(7), lanes(7));
    }
}
