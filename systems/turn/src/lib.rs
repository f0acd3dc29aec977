#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn driver that resolves one atomic turn of the simulation.

use dimlight_core::{Command, Event, Intent};
use dimlight_world::{self as world, query, World};

/// Sequences the fixed command script that makes up one turn.
///
/// A turn resolves the player's action, then every active enemy's action,
/// then loot collection, then the visibility sweep. The script runs to
/// completion within one call, so callers observe either the world before
/// the turn or the world after it, never a partially applied turn.
#[derive(Debug, Default)]
pub struct TurnEngine;

impl TurnEngine {
    /// Creates a new turn engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Plays one full turn driven by the provided intent.
    ///
    /// Once the player has fallen the engine does nothing and appends no
    /// events; the run is over and only a fresh world restarts it.
    pub fn play(&mut self, world: &mut World, intent: Intent, out_events: &mut Vec<Event>) {
        if query::player_dead(world) {
            return;
        }

        world::apply(world, Command::ActPlayer { intent }, out_events);
        world::apply(world, Command::ActEnemies, out_events);
        world::apply(world, Command::CollectLoot, out_events);
        world::apply(world, Command::RefreshVisibility, out_events);
    }
}
