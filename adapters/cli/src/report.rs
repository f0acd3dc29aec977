//! Machine-readable summary emitted at the end of an auto-played run.

use dimlight_core::ItemKind;
use dimlight_system_session::GameSession;
use dimlight_world::query;
use serde::Serialize;

/// Snapshot of a finished expedition, serialized as JSON on request.
#[derive(Debug, Serialize)]
pub(crate) struct RunReport {
    seed: u64,
    turns_played: u64,
    player_died: bool,
    health_remaining: u32,
    light_radius: f64,
    carrying_block: bool,
    chunks_charted: usize,
    items_collected: Vec<ItemKind>,
}

impl RunReport {
    /// Captures the report for the provided session.
    pub(crate) fn capture(session: &GameSession) -> Self {
        let world = session.world();
        Self {
            seed: session.seed(),
            turns_played: query::turn_index(world),
            player_died: session.player_dead(),
            health_remaining: query::player_health(world).get(),
            light_radius: query::player_light_radius(world),
            carrying_block: query::player_carrying_block(world),
            chunks_charted: query::loaded_chunks(world).len(),
            items_collected: query::collected_items(world).to_vec(),
        }
    }
}
