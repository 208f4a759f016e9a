//! # TESSERA Arena Demo
//!
//! Runs the arena headless with a scripted pilot and prints the result.
//!
//! ```text
//! arena_demo [config.toml] [seconds]
//! ```
//!
//! The pilot holds fire and sweeps the ship up and down. Frames are fed
//! a slightly irregular elapsed time so the accumulator has work to do.

use std::process::ExitCode;
use std::time::Instant;

use tessera::directors::keys;
use tessera::{arena, ArenaConfig, ArenaResult, FrameLoop};
use tessera_core::InputEvent;

const DEFAULT_SECONDS: f32 = 60.0;
/// Seconds per sweep direction.
const SWEEP: f32 = 1.5;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let seconds = args
        .next()
        .and_then(|arg| arg.parse::<f32>().ok())
        .unwrap_or(DEFAULT_SECONDS);

    match run(config_path.as_deref(), seconds) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("arena_demo: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<&str>, seconds: f32) -> ArenaResult<()> {
    let config = match config_path {
        Some(path) => ArenaConfig::load(path)?,
        None => ArenaConfig::default(),
    };
    let mut frames = arena::build(&config)?;

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                     TESSERA ARENA DEMO                           ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!("Seed {} | {} Hz | {:.0} s simulated", config.arena.seed, config.arena.tick_rate, seconds);
    println!();

    let started = Instant::now();
    pilot(&mut frames, seconds);
    let wall = started.elapsed();

    frames.print_summary();
    println!();
    println!(
        "Wall time: {:.2} ms ({:.1}x real time)",
        wall.as_secs_f64() * 1000.0,
        f64::from(seconds) / wall.as_secs_f64().max(1e-9)
    );
    Ok(())
}

fn pilot(frames: &mut FrameLoop, seconds: f32) {
    let base = frames.step();
    let mut clock = 0.0;
    let mut frame = 0_u32;
    let mut going_up = true;
    let mut last_round = 0;

    frames.input(&InputEvent::KeyPressed { code: keys::FIRE });
    frames.input(&InputEvent::KeyPressed { code: keys::UP });

    while clock < seconds {
        // Alternate short and long frames around the fixed step
        let elapsed = if frame % 2 == 0 { base * 0.75 } else { base * 1.25 };
        frames.frame(elapsed);
        clock += elapsed;
        frame += 1;

        let sweep_up = (clock / SWEEP) as u32 % 2 == 0;
        if sweep_up != going_up {
            let (release, press) = if sweep_up {
                (keys::DOWN, keys::UP)
            } else {
                (keys::UP, keys::DOWN)
            };
            frames.input(&InputEvent::KeyReleased { code: release });
            frames.input(&InputEvent::KeyPressed { code: press });
            going_up = sweep_up;
        }

        let round = frames.round();
        if round != last_round {
            let score = frames.score();
            println!(
                "[{clock:7.2}s] round {round:>2} | points {:>6} | kills {:>4} | escaped {:>4}",
                score.points, score.kills, score.escaped
            );
            last_round = round;
        }
    }

    frames.input(&InputEvent::KeyReleased { code: keys::FIRE });
}
