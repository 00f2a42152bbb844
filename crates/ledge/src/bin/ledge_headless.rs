//! # Headless Runner
//!
//! Plays the built-in demo level without a window, feeding a scripted
//! input pattern (run right, jump and shoot on a beat), then prints what
//! happened.
//!
//! ```text
//! ledge_headless [TICKS] [CONFIG.toml]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `ledge=info`).

use ledge::components::{PickupKind, Transform};
use ledge::{Action, GameConfig, GameEvent, InputState, Level, LevelLayout, Session, Vec2};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ticks to run when none are given (ten seconds at 60 Hz).
const DEFAULT_TICKS: u64 = 600;

const TILE_SIZE: i32 = 16;

const DEMO_LEVEL: &str = "
########################################
#......................................#
#......................................#
#......................................#
#......................................#
#......................................#
#......................................#
#..............##......................#
#......................................#
#..............................#.......#
#......................................#
###########^^^##########################
";

fn demo_layout() -> LevelLayout {
    LevelLayout {
        player_spawn: Vec2::new(32.0, 152.0),
        pickups: vec![
            (Vec2::new(64.0, 160.0), PickupKind::Jump),
            (Vec2::new(112.0, 160.0), PickupKind::Weapon),
            (Vec2::new(256.0, 112.0), PickupKind::Boots),
        ],
        checkpoints: vec![Vec2::new(144.0, 163.0), Vec2::new(400.0, 163.0)],
        goals: vec![Vec2::new(576.0, 163.0)],
        enemies: vec![Vec2::new(300.0, 160.0)],
        reinforcements: vec![Vec2::new(440.0, 160.0)],
    }
}

/// Holds right the whole time; jumps every 45 ticks and shoots every 30.
fn script_input(input: &mut InputState, tick: u64) {
    input.press(Action::Right);
    if tick % 45 == 0 {
        input.press(Action::Jump);
    } else {
        input.release(Action::Jump);
    }
    if tick % 30 == 0 {
        input.press(Action::Shoot);
    } else {
        input.release(Action::Shoot);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ledge=info".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let ticks = match args.next() {
        Some(arg) => arg.parse()?,
        None => DEFAULT_TICKS,
    };
    let config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let level = Level::from_ascii(DEMO_LEVEL, TILE_SIZE)?;
    let mut session = Session::new(config, level, demo_layout())?;
    let events = session.events();
    let mut input = InputState::new();

    let mut sounds = 0_u64;
    let mut messages = Vec::new();
    let mut ran = 0_u64;
    for tick in 0..ticks {
        script_input(&mut input, tick);
        let report = session.tick(&input)?;
        input.end_tick();
        ran += 1;

        for event in events.drain() {
            match event {
                GameEvent::PlaySound { .. } => sounds += 1,
                GameEvent::PickupCollected {
                    message: Some(text),
                    ..
                } => messages.push(text),
                _ => {}
            }
        }

        if tick % 60 == 0 {
            let position = session
                .world()
                .get_component::<Transform>(session.player())?
                .position;
            info!(
                tick,
                x = position.x,
                y = position.y,
                timer = session.countdown().seconds_left(),
                "progress"
            );
        }
        if report.goal_reached {
            break;
        }
    }

    let stats = session.stats();
    let camera = session.camera().position();
    println!();
    println!("┌─ HEADLESS RUN ─────────────────────────────────────────────────┐");
    println!("│ Ticks run:          {ran}");
    println!("│ Goal reached:       {}", session.is_complete());
    println!("│ Pickups collected:  {}", stats.pickups_collected);
    println!("│ Shots fired:        {}", stats.shots);
    println!("│ Entities destroyed: {}", stats.destroyed);
    println!("│ Respawns:           {}", stats.respawns);
    println!("│ Peak entities:      {}", stats.peak_entities);
    println!("│ Sound cues:         {sounds}");
    println!("│ Camera:             ({:.1}, {:.1})", camera.x, camera.y);
    println!("└────────────────────────────────────────────────────────────────┘");
    for message in messages {
        println!("  \"{message}\"");
    }
    Ok(())
}
