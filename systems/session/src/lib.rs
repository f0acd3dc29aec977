#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session facade that adapters drive one turn at a time.
//!
//! A [`GameSession`] owns one world and one turn engine for the duration of
//! a run. Adapters submit a single [`Intent`] per turn and read the
//! resulting state back through the world's query surface; once the player
//! falls the session goes quiet and a fresh session starts the next run.

use dimlight_core::{Command, Event, Intent};
use dimlight_system_turn::TurnEngine;
use dimlight_world::{self as world, query, World};

/// Seed used when a session is created without an explicit one.
///
/// Sessions constructed without a seed stay fully reproducible; callers
/// wanting variety supply their own entropy instead.
pub const DEFAULT_WORLD_SEED: u64 = 0x4D1A_11C5_0F0E_77E1;

/// One run of the game, from construction until the player falls.
#[derive(Debug)]
pub struct GameSession {
    world: World,
    engine: TurnEngine,
    events: Vec<Event>,
}

impl GameSession {
    /// Creates a session, generating the starting terrain deterministically.
    ///
    /// The spawn area is lit immediately so the first rendered frame already
    /// shows the player's surroundings.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let mut session = Self {
            world: World::new(seed.unwrap_or(DEFAULT_WORLD_SEED)),
            engine: TurnEngine::new(),
            events: Vec::new(),
        };
        world::apply(
            &mut session.world,
            Command::RefreshVisibility,
            &mut session.events,
        );
        session
    }

    /// Plays one atomic turn and returns the events it produced.
    ///
    /// Returns an empty slice without touching the world once the player
    /// has fallen.
    pub fn play_turn(&mut self, intent: Intent) -> &[Event] {
        self.events.clear();
        self.engine
            .play(&mut self.world, intent, &mut self.events);
        &self.events
    }

    /// Events produced by the most recent turn.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Seed driving this session's terrain.
    #[must_use]
    pub fn seed(&self) -> u64 {
        query::world_seed(&self.world)
    }

    /// Reports whether the run has ended with the player's fall.
    #[must_use]
    pub fn player_dead(&self) -> bool {
        query::player_dead(&self.world)
    }

    /// Read-only world access for rendering queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }
}
