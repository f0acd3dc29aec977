#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that auto-plays a Dimlight expedition.
//!
//! The binary seeds a session, walks the player semi-randomly for a fixed
//! number of turns, narrates notable events, and finally prints the charted
//! viewport. It consumes the engine the way any renderer would: one intent
//! per turn in, per-tile snapshots out.

mod report;

use anyhow::Result;
use clap::Parser;
use dimlight_core::{Cell, Direction, Event, Intent, Position, WELCOME_BANNER};
use dimlight_system_session::GameSession;
use dimlight_world::{query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use report::RunReport;

/// Salt mixed into the session seed for the demo walker's own RNG.
const WALKER_SEED_SALT: u64 = 0x57A1_4B0C;
/// One interact attempt is rolled per this many turn decisions.
const INTERACT_CADENCE: u64 = 8;

/// Auto-plays a seeded expedition and prints the explored viewport.
#[derive(Debug, Parser)]
#[command(name = "dimlight")]
struct Args {
    /// World seed; omitted runs use the fixed default seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of turns to auto-play.
    #[arg(long, default_value_t = 60)]
    turns: u32,

    /// Half-width of the printed viewport, in tiles.
    #[arg(long, default_value_t = 12)]
    span: i32,

    /// Manhattan distance from the spawn at which the walker turns back.
    #[arg(long, default_value_t = 18)]
    leash: u32,

    /// Emit a JSON run report after the final turn.
    #[arg(long)]
    report: bool,
}

/// Entry point for the Dimlight command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut session = GameSession::new(args.seed);
    println!("{WELCOME_BANNER}");
    println!("seed {:#018x}", session.seed());

    let home = query::player_position(session.world());
    let mut rng = ChaCha8Rng::seed_from_u64(session.seed() ^ WALKER_SEED_SALT);
    let mut turns_played = 0;

    for _ in 0..args.turns {
        if session.player_dead() {
            break;
        }
        let intent = choose_intent(&mut rng, session.world(), home, args.leash);
        let events: Vec<Event> = session.play_turn(intent).to_vec();
        turns_played += 1;
        for event in &events {
            if let Some(line) = describe(event) {
                println!("  turn {turns_played}: {line}");
            }
        }
    }

    println!("{}", render(session.world(), args.span));
    println!(
        "{} turns, health {}/{}",
        query::turn_index(session.world()),
        query::player_health(session.world()).get(),
        query::player_max_health(session.world()).get()
    );

    if args.report {
        let report = RunReport::capture(&session);
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Picks the next intent for the demo walker.
///
/// The walker drifts randomly, occasionally fiddling with adjacent blocks,
/// and steers back toward the spawn once it strays past the leash.
fn choose_intent(rng: &mut ChaCha8Rng, world: &World, home: Position, leash: u32) -> Intent {
    let stray = query::player_position(world).delta_to(home);
    if stray.manhattan() > leash {
        if let Some(back) = stray.primary_direction() {
            return Intent::Move(back);
        }
    }

    if rng.gen_range(0..INTERACT_CADENCE) == 0 {
        return Intent::Interact;
    }
    Intent::Move(Direction::ALL[rng.gen_range(0..Direction::ALL.len())])
}

/// Renders the viewport centered on the player as ASCII art.
fn render(world: &World, span: i32) -> String {
    let center = query::player_position(world);
    let mut out = String::new();

    for y in (center.y() - span)..=(center.y() + span) {
        for x in (center.x() - span)..=(center.x() + span) {
            let position = Position::new(x, y);
            out.push(glyph(world, position, center));
        }
        out.push('\n');
    }

    out
}

fn glyph(world: &World, position: Position, player: Position) -> char {
    if position == player {
        return '@';
    }
    let Some(tile) = query::tile(world, position) else {
        return ' ';
    };
    if !tile.mapped {
        return ' ';
    }
    if tile.lit {
        if let Some(snapshot) = query::enemy_at(world, position) {
            return snapshot
                .kind
                .name()
                .chars()
                .next()
                .unwrap_or('?');
        }
        if tile.item.is_some() {
            return '!';
        }
    }
    match tile.cell {
        Cell::Wall => '#',
        Cell::Empty if tile.lit => '.',
        Cell::Empty => ',',
    }
}

/// Narrates the events worth surfacing on the console.
fn describe(event: &Event) -> Option<String> {
    match event {
        Event::EnemyStruck { enemy, remaining } => Some(format!(
            "struck enemy {} ({} hp left)",
            enemy.get(),
            remaining.get()
        )),
        Event::EnemyFell { enemy, spoils, .. } => Some(match spoils {
            Some(kind) => format!("enemy {} fell and dropped {}", enemy.get(), kind.name()),
            None => format!("enemy {} fell", enemy.get()),
        }),
        Event::PlayerStruck { by, remaining } => Some(format!(
            "enemy {} struck back ({} hp left)",
            by.get(),
            remaining.get()
        )),
        Event::PlayerFell { at } => Some(format!(
            "the expedition ends at ({}, {})",
            at.x(),
            at.y()
        )),
        Event::BlockLifted { at } => Some(format!("lifted a block at ({}, {})", at.x(), at.y())),
        Event::BlockPlaced { at } => Some(format!("placed a block at ({}, {})", at.x(), at.y())),
        Event::ItemCollected { kind, .. } => Some(format!("picked up {}", kind.name())),
        Event::AreaSurveyed { .. } => Some("the spyglass charts the surroundings".to_owned()),
        Event::PlayerMoved { .. } | Event::EnemyMoved { .. } | Event::VisibilityRefreshed { .. } => {
            None
        }
    }
}
