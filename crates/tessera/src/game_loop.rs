//! # Frame Loop
//!
//! Drives the two arena scenes at a fixed step:
//! ```text
//! Frame:
//! ┌──────────────────────────────────────────────────────────────┐
//! │ 1. INPUT      forward raw events to the game scene            │
//! │ 2. ACCUMULATE clamp the frame time, add it to the accumulator │
//! │ 3. STEP       while a whole step is banked:                   │
//! │               ├─ game.simulate(step)                          │
//! │               ├─ drain the relay into the HUD scene           │
//! │               └─ hud.simulate(step)                           │
//! │ 4. RENDER     render pass of both scenes                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop never sleeps or reads the clock itself; callers pass the
//! elapsed time, so tests and the demo can run it faster than real time.

use tessera_core::{InputEvent, MessageRelay, RelayReceiver, Scene};

use crate::directors::{NpcDirector, Score, ScoreDirector};

/// Frame counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames run.
    pub frames: u64,
    /// Fixed steps simulated.
    pub ticks: u64,
    /// Frames whose elapsed time was clamped.
    pub clamped_frames: u64,
    /// Messages moved from the game scene into the HUD.
    pub relayed: u64,
    /// Messages the relay had to drop.
    pub dropped: u64,
}

/// Fixed-step driver for a game scene and its HUD.
pub struct FrameLoop {
    game: Scene,
    hud: Scene,
    relay: MessageRelay,
    receiver: RelayReceiver,
    step: f32,
    max_frame_time: f32,
    accumulator: f32,
    stats: FrameStats,
}

impl FrameLoop {
    /// Wraps two scenes. `relay` must already be attached to `game`.
    #[must_use]
    pub fn new(game: Scene, hud: Scene, relay: MessageRelay, step: f32, max_frame_time: f32) -> Self {
        let receiver = relay.receiver();
        Self {
            game,
            hud,
            relay,
            receiver,
            step,
            max_frame_time,
            accumulator: 0.0,
            stats: FrameStats::default(),
        }
    }

    /// Hands raw input to the game scene's directors.
    pub fn input(&mut self, event: &InputEvent) {
        self.game.forward_event(event);
    }

    /// Advances by `elapsed` seconds of wall time. Returns the steps run.
    pub fn frame(&mut self, elapsed: f32) -> u32 {
        let mut elapsed = elapsed.max(0.0);
        if elapsed > self.max_frame_time {
            tracing::debug!(elapsed, max = self.max_frame_time, "frame time clamped");
            elapsed = self.max_frame_time;
            self.stats.clamped_frames += 1;
        }
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            self.tick();
            steps += 1;
        }

        self.game.render();
        self.hud.render();
        self.stats.frames += 1;
        self.stats.dropped = self.relay.dropped();
        steps
    }

    /// Runs exactly one fixed step.
    pub fn tick(&mut self) {
        self.game.simulate(self.step);
        for message in self.receiver.drain() {
            self.hud.forward_message(message);
            self.stats.relayed += 1;
        }
        self.hud.simulate(self.step);
        self.stats.ticks += 1;
    }

    /// Fixed step in seconds.
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }

    /// Frame counters.
    #[must_use]
    pub const fn stats(&self) -> FrameStats {
        self.stats
    }

    /// The scoreboard, as the HUD sees it.
    #[must_use]
    pub fn score(&self) -> Score {
        self.hud
            .director::<ScoreDirector>()
            .map(|director| *director.score())
            .unwrap_or_default()
    }

    /// Current round, 0 before the first tick.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.game.director::<NpcDirector>().map_or(0, NpcDirector::round)
    }

    /// The game scene.
    #[must_use]
    pub const fn game(&self) -> &Scene {
        &self.game
    }

    /// The game scene, mutably.
    pub fn game_mut(&mut self) -> &mut Scene {
        &mut self.game
    }

    /// The HUD scene.
    #[must_use]
    pub const fn hud(&self) -> &Scene {
        &self.hud
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self) {
        let stats = self.stats;
        let score = self.score();
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                         ARENA SUMMARY                            ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ LOOP ─────────────────────────────────────────────────────────┐");
        println!("│ Frames:             {}", stats.frames);
        println!("│ Ticks:              {} ({:.3} ms step)", stats.ticks, self.step * 1000.0);
        println!("│ Clamped Frames:     {}", stats.clamped_frames);
        println!("│ Relayed Messages:   {} ({} dropped)", stats.relayed, stats.dropped);
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ SCORE ────────────────────────────────────────────────────────┐");
        println!("│ Round:              {}", score.round);
        println!("│ Points:             {}", score.points);
        println!("│ Kills / Escaped:    {} / {}", score.kills, score.escaped);
        println!(
            "│ Fired / Hits:       {} / {} ({:.1}%)",
            score.fired,
            score.hits,
            score.accuracy() * 100.0
        );
        println!("│ Items:              {}", score.items);
        println!("│ Deaths:             {}", score.deaths);
        println!("│ Health / Mode:      {} / {:?}", score.health, score.mode);
        println!("└──────────────────────────────────────────────────────────────────┘");
    }
}
