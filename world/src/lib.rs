#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Dimlight.
//!
//! The world owns every chunk of the infinite terrain, the player, and all
//! enemies. Adapters and systems mutate it exclusively through [`apply`],
//! which executes one [`Command`] and appends the resulting [`Event`]
//! values; read access goes through the [`query`] module.

pub mod grid;
pub mod mazegen;

mod brain;
mod chunk;

use std::collections::{btree_map::Entry, BTreeMap};

use dimlight_core::{
    Cell, ChunkId, Command, Delta, Direction, EnemyId, Event, Health, Intent, ItemKind, Position,
};
use log::debug;

use brain::Candidate;
use chunk::{Chunk, Item};

pub use mazegen::GenerationError;

/// Hit points the player starts with.
const PLAYER_MAX_HEALTH: Health = Health::new(10);
/// Light radius the player starts with, in tiles.
const DEFAULT_LIGHT_RADIUS: f64 = 2.5;
/// Damage dealt by one player strike.
const PLAYER_STRIKE_DAMAGE: u32 = 1;
/// Hit points restored by a salve.
const SALVE_HEAL: u32 = 2;
/// Light radius gained from a flask of lantern oil.
const LANTERN_OIL_BONUS: f64 = 0.5;
/// Radius charted by a spyglass, in tiles.
const SPYGLASS_RADIUS: f64 = 4.0;
/// Whole-chunk distance around the player within which enemies act.
const ACTIVE_CHUNK_REACH: i32 = 1;

#[derive(Debug)]
struct Player {
    position: Position,
    facing: Direction,
    health: Health,
    light_radius: f64,
    carrying_block: bool,
    collected: Vec<ItemKind>,
}

/// Represents the authoritative Dimlight world state.
#[derive(Debug)]
pub struct World {
    seed: u64,
    chunks: BTreeMap<ChunkId, Chunk>,
    player: Player,
    next_enemy_id: u32,
    turn_index: u64,
}

impl World {
    /// Creates a world from the provided seed.
    ///
    /// The origin chunk is generated immediately and the player is placed on
    /// its spawn anchor, which terrain generation guarantees is passable.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut world = Self {
            seed,
            chunks: BTreeMap::new(),
            player: Player {
                position: Position::new(0, 0),
                facing: Direction::South,
                health: PLAYER_MAX_HEALTH,
                light_radius: DEFAULT_LIGHT_RADIUS,
                carrying_block: false,
                collected: Vec::new(),
            },
            next_enemy_id: 0,
            turn_index: 0,
        };
        world.player.position = world.ensure_chunk(ChunkId::new(0, 0)).anchor();
        world
    }

    fn ensure_chunk(&mut self, id: ChunkId) -> &mut Chunk {
        match self.chunks.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(Chunk::generate(self.seed, id, &mut self.next_enemy_id))
            }
            Entry::Occupied(slot) => slot.into_mut(),
        }
    }

    fn chunk_at(&self, position: Position) -> Option<&Chunk> {
        self.chunks.get(&ChunkId::from_position(position))
    }

    fn passable_now(&mut self, position: Position) -> bool {
        self.ensure_chunk(ChunkId::from_position(position))
            .is_passable(position)
    }

    fn set_cell_now(&mut self, position: Position, cell: Cell) {
        self.ensure_chunk(ChunkId::from_position(position))
            .set_cell(position, cell);
    }

    fn enemy_id_at(&self, position: Position) -> Option<EnemyId> {
        self.chunk_at(position)
            .and_then(|chunk| chunk.enemy_at(position))
            .map(|enemy| enemy.id)
    }

    fn find_enemy(&self, id: EnemyId) -> Option<&chunk::Enemy> {
        self.chunks
            .values()
            .find_map(|chunk| chunk.enemies().iter().find(|enemy| enemy.id == id))
    }

    fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut chunk::Enemy> {
        self.chunks
            .values_mut()
            .find_map(|chunk| chunk.enemy_mut(id))
    }

    /// Removes an enemy from its owning chunk, placing optional spoils.
    ///
    /// Spoils land on the enemy's last location unless an item already rests
    /// there. Returns the item that was actually placed.
    fn remove_enemy(&mut self, id: EnemyId, spoils: Option<ItemKind>) -> Option<ItemKind> {
        for chunk in self.chunks.values_mut() {
            let Some(enemy) = chunk.take_enemy(id) else {
                continue;
            };
            let mut placed = None;
            if let Some(kind) = spoils {
                if chunk.place_item(Item {
                    kind,
                    position: enemy.position,
                }) {
                    placed = Some(kind);
                }
            }
            return placed;
        }
        None
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ActPlayer { intent } => act_player(world, intent, out_events),
        Command::ActEnemies => act_enemies(world, out_events),
        Command::CollectLoot => collect_loot(world, out_events),
        Command::RefreshVisibility => refresh_visibility(world, out_events),
    }
}

fn act_player(world: &mut World, intent: Intent, out_events: &mut Vec<Event>) {
    if world.player.health.is_depleted() {
        return;
    }
    world.turn_index = world.turn_index.saturating_add(1);

    match intent {
        Intent::Move(direction) => {
            world.player.facing = direction;
            let target = world.player.position.step(direction);
            if let Some(enemy_id) = world.enemy_id_at(target) {
                strike_enemy(world, enemy_id, target, out_events);
            } else if world.passable_now(target) {
                let from = world.player.position;
                world.player.position = target;
                out_events.push(Event::PlayerMoved { from, to: target });
            }
        }
        Intent::Interact => interact(world, out_events),
    }
}

fn strike_enemy(world: &mut World, enemy_id: EnemyId, at: Position, out_events: &mut Vec<Event>) {
    let Some(enemy) = world.enemy_mut(enemy_id) else {
        return;
    };
    enemy.health = enemy.health.damaged(PLAYER_STRIKE_DAMAGE);
    let remaining = enemy.health;
    let kind = enemy.kind;
    let roll = if remaining.is_depleted() {
        Some(enemy.brain.loot_roll())
    } else {
        None
    };

    out_events.push(Event::EnemyStruck {
        enemy: enemy_id,
        remaining,
    });

    if let Some(roll) = roll {
        let spoils = world.remove_enemy(enemy_id, kind.loot(roll));
        debug!(
            "{} {} fell at ({}, {})",
            kind.name(),
            enemy_id.get(),
            at.x(),
            at.y()
        );
        out_events.push(Event::EnemyFell {
            enemy: enemy_id,
            at,
            spoils,
        });
    }
}

/// Shared precondition for lifting and placing blocks.
///
/// The same predicate gates both action availability and execution: lifting
/// requires a wall and free hands, placing requires a passable tile holding
/// neither an enemy nor an item.
fn can_interact_with(world: &mut World, target: Position) -> bool {
    let cell = world
        .ensure_chunk(ChunkId::from_position(target))
        .cell(target);
    match cell {
        Some(Cell::Wall) => !world.player.carrying_block,
        Some(Cell::Empty) => {
            world.player.carrying_block
                && world.enemy_id_at(target).is_none()
                && world
                    .chunk_at(target)
                    .and_then(|chunk| chunk.item_at(target))
                    .is_none()
        }
        None => false,
    }
}

fn interact(world: &mut World, out_events: &mut Vec<Event>) {
    let target = world.player.position.step(world.player.facing);
    if !can_interact_with(world, target) {
        return;
    }

    if world.player.carrying_block {
        world.set_cell_now(target, Cell::Wall);
        world.player.carrying_block = false;
        out_events.push(Event::BlockPlaced { at: target });
    } else {
        world.set_cell_now(target, Cell::Empty);
        world.player.carrying_block = true;
        out_events.push(Event::BlockLifted { at: target });
    }
}

fn act_enemies(world: &mut World, out_events: &mut Vec<Event>) {
    if world.player.health.is_depleted() {
        return;
    }

    // ascending chunk-id order, then insertion order within each chunk
    let center = ChunkId::from_position(world.player.position);
    let mut order = Vec::new();
    for dx in -ACTIVE_CHUNK_REACH..=ACTIVE_CHUNK_REACH {
        for dy in -ACTIVE_CHUNK_REACH..=ACTIVE_CHUNK_REACH {
            if let Some(chunk) = world.chunks.get(&center.offset(dx, dy)) {
                order.extend(chunk.enemies().iter().map(|enemy| enemy.id));
            }
        }
    }

    for enemy_id in order {
        if world.player.health.is_depleted() {
            break;
        }
        act_enemy(world, enemy_id, out_events);
    }
}

fn act_enemy(world: &mut World, enemy_id: EnemyId, out_events: &mut Vec<Event>) {
    let Some(own_position) = world.find_enemy(enemy_id).map(|enemy| enemy.position) else {
        return;
    };
    let candidates = enemy_candidates(world, own_position);
    let player_position = world.player.position;

    let choice = {
        let Some(enemy) = world.enemy_mut(enemy_id) else {
            return;
        };
        let choice = enemy.brain.decide(own_position, player_position, candidates);
        if let Some(Candidate::Strike { direction } | Candidate::Step { direction, .. }) = choice {
            enemy.facing = direction;
        }
        choice
    };

    match choice {
        Some(Candidate::Strike { .. }) => strike_player(world, enemy_id, out_events),
        Some(Candidate::Step { to, .. }) => {
            move_enemy(world, enemy_id, own_position, to, out_events);
        }
        None => {}
    }
}

fn enemy_candidates(world: &mut World, origin: Position) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for direction in Direction::ALL {
        let target = origin.step(direction);
        if target == world.player.position {
            candidates.push(Candidate::Strike { direction });
            continue;
        }
        if !world.passable_now(target) {
            continue;
        }
        if world.enemy_id_at(target).is_some() {
            continue;
        }
        candidates.push(Candidate::Step {
            to: target,
            direction,
        });
    }
    candidates
}

fn strike_player(world: &mut World, enemy_id: EnemyId, out_events: &mut Vec<Event>) {
    let Some(damage) = world
        .find_enemy(enemy_id)
        .map(|enemy| enemy.kind.strike_damage())
    else {
        return;
    };

    world.player.health = world.player.health.damaged(damage);
    out_events.push(Event::PlayerStruck {
        by: enemy_id,
        remaining: world.player.health,
    });

    if world.player.health.is_depleted() {
        debug!(
            "player fell at ({}, {})",
            world.player.position.x(),
            world.player.position.y()
        );
        out_events.push(Event::PlayerFell {
            at: world.player.position,
        });
    }
}

fn move_enemy(
    world: &mut World,
    enemy_id: EnemyId,
    from: Position,
    to: Position,
    out_events: &mut Vec<Event>,
) {
    let from_chunk = ChunkId::from_position(from);
    let to_chunk = ChunkId::from_position(to);

    if from_chunk == to_chunk {
        let Some(enemy) = world.enemy_mut(enemy_id) else {
            return;
        };
        enemy.position = to;
    } else {
        let Some(mut enemy) = world
            .chunks
            .get_mut(&from_chunk)
            .and_then(|chunk| chunk.take_enemy(enemy_id))
        else {
            return;
        };
        enemy.position = to;
        world.ensure_chunk(to_chunk).admit_enemy(enemy);
    }

    out_events.push(Event::EnemyMoved {
        enemy: enemy_id,
        from,
        to,
    });
}

fn collect_loot(world: &mut World, out_events: &mut Vec<Event>) {
    if world.player.health.is_depleted() {
        return;
    }

    let at = world.player.position;
    let Some(item) = world
        .chunks
        .get_mut(&ChunkId::from_position(at))
        .and_then(|chunk| chunk.take_item_at(at))
    else {
        return;
    };

    world.player.collected.push(item.kind);
    out_events.push(Event::ItemCollected {
        kind: item.kind,
        at,
    });

    match item.kind {
        ItemKind::Salve => {
            world.player.health = world.player.health.healed(SALVE_HEAL, PLAYER_MAX_HEALTH);
        }
        ItemKind::LanternOil => {
            world.player.light_radius += LANTERN_OIL_BONUS;
        }
        ItemKind::Spyglass => {
            let _ = sweep_light(world, at, SPYGLASS_RADIUS, false);
            out_events.push(Event::AreaSurveyed { around: at });
        }
    }
}

fn refresh_visibility(world: &mut World, out_events: &mut Vec<Event>) {
    for chunk in world.chunks.values_mut() {
        chunk.clear_lit();
    }

    let origin = world.player.position;
    let radius = world.player.light_radius;
    let lit_tiles = sweep_light(world, origin, radius, true);
    debug!(
        "visibility sweep lit {} tiles around ({}, {})",
        lit_tiles,
        origin.x(),
        origin.y()
    );
    out_events.push(Event::VisibilityRefreshed { lit_tiles });
}

/// Marks every tile strictly within `radius` of `origin`, generating the
/// chunks the sweep spills into. Returns the number of tiles marked.
fn sweep_light(world: &mut World, origin: Position, radius: f64, illuminate: bool) -> usize {
    let reach = radius.ceil() as i32;
    let mut marked = 0;

    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let delta = Delta::new(dx, dy);
            if delta.magnitude() >= radius {
                continue;
            }
            let position = origin.offset(delta);
            let id = ChunkId::from_position(position);
            let Some(local) = id.to_local(position) else {
                continue;
            };
            let target = world.ensure_chunk(id);
            if illuminate {
                target.mark_seen(local);
            } else {
                target.mark_mapped(local);
            }
            marked += 1;
        }
    }

    marked
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use dimlight_core::{Cell, ChunkId, Direction, EnemyId, EnemyKind, Health, ItemKind, Position};

    use super::{World, ACTIVE_CHUNK_REACH, PLAYER_MAX_HEALTH};

    /// Seed the world was constructed from.
    #[must_use]
    pub fn world_seed(world: &World) -> u64 {
        world.seed
    }

    /// Number of turns the player has taken so far.
    #[must_use]
    pub fn turn_index(world: &World) -> u64 {
        world.turn_index
    }

    /// Tile the player currently occupies.
    #[must_use]
    pub fn player_position(world: &World) -> Position {
        world.player.position
    }

    /// Direction the player currently faces.
    #[must_use]
    pub fn player_facing(world: &World) -> Direction {
        world.player.facing
    }

    /// Hit points the player currently retains.
    #[must_use]
    pub fn player_health(world: &World) -> Health {
        world.player.health
    }

    /// Hit points the player starts with.
    #[must_use]
    pub fn player_max_health(_world: &World) -> Health {
        PLAYER_MAX_HEALTH
    }

    /// Radius of the player's light, in tiles.
    #[must_use]
    pub fn player_light_radius(world: &World) -> f64 {
        world.player.light_radius
    }

    /// Reports whether the player currently carries a lifted block.
    #[must_use]
    pub fn player_carrying_block(world: &World) -> bool {
        world.player.carrying_block
    }

    /// Reports whether the player has been exhausted. Terminal when true.
    #[must_use]
    pub fn player_dead(world: &World) -> bool {
        world.player.health.is_depleted()
    }

    /// Items the player has collected, in pickup order.
    #[must_use]
    pub fn collected_items(world: &World) -> &[ItemKind] {
        &world.player.collected
    }

    /// Identifiers of every chunk generated so far, in ascending order.
    #[must_use]
    pub fn loaded_chunks(world: &World) -> Vec<ChunkId> {
        world.chunks.keys().copied().collect()
    }

    /// Terrain cell at the provided position, or `None` where no chunk has
    /// been generated yet.
    #[must_use]
    pub fn cell(world: &World, position: Position) -> Option<Cell> {
        world
            .chunk_at(position)
            .and_then(|chunk| chunk.cell(position))
    }

    /// Reports whether a mob may occupy the provided position.
    ///
    /// Tiles in chunks that were never generated read as impassable.
    #[must_use]
    pub fn is_passable(world: &World, position: Position) -> bool {
        world
            .chunk_at(position)
            .map_or(false, |chunk| chunk.is_passable(position))
    }

    /// Reports whether the tile is within the player's light this turn.
    #[must_use]
    pub fn is_lit(world: &World, position: Position) -> bool {
        world
            .chunk_at(position)
            .map_or(false, |chunk| chunk.is_lit(position))
    }

    /// Reports whether the tile has ever been illuminated or surveyed.
    #[must_use]
    pub fn is_mapped(world: &World, position: Position) -> bool {
        world
            .chunk_at(position)
            .map_or(false, |chunk| chunk.is_mapped(position))
    }

    /// Kind of the item resting on the provided position, if any.
    #[must_use]
    pub fn item_at(world: &World, position: Position) -> Option<ItemKind> {
        world
            .chunk_at(position)
            .and_then(|chunk| chunk.item_at(position))
            .map(|item| item.kind)
    }

    /// Snapshot of the enemy standing on the provided position, if any.
    #[must_use]
    pub fn enemy_at(world: &World, position: Position) -> Option<EnemySnapshot> {
        world
            .chunk_at(position)
            .and_then(|chunk| chunk.enemy_at(position))
            .map(EnemySnapshot::from_enemy)
    }

    /// Combined per-tile view used by renderers.
    ///
    /// Returns `None` for tiles in chunks that were never generated, which
    /// renderers should draw as unknown terrain.
    #[must_use]
    pub fn tile(world: &World, position: Position) -> Option<TileSnapshot> {
        let chunk = world.chunk_at(position)?;
        Some(TileSnapshot {
            cell: chunk.cell(position)?,
            lit: chunk.is_lit(position),
            mapped: chunk.is_mapped(position),
            enemy: chunk.enemy_at(position).map(|enemy| enemy.id),
            item: chunk.item_at(position).map(|item| item.kind),
        })
    }

    /// Captures a view of the enemies in the chunks surrounding the player.
    #[must_use]
    pub fn enemies_near(world: &World) -> EnemyView {
        let center = ChunkId::from_position(world.player.position);
        let mut snapshots = Vec::new();
        for dy in -ACTIVE_CHUNK_REACH..=ACTIVE_CHUNK_REACH {
            for dx in -ACTIVE_CHUNK_REACH..=ACTIVE_CHUNK_REACH {
                if let Some(chunk) = world.chunks.get(&center.offset(dx, dy)) {
                    snapshots.extend(chunk.enemies().iter().map(EnemySnapshot::from_enemy));
                }
            }
        }
        EnemyView::from_snapshots(snapshots)
    }

    /// Immutable representation of a single enemy's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EnemySnapshot {
        /// Unique identifier assigned to the enemy.
        pub id: EnemyId,
        /// Descriptor selecting the enemy's stats and behavior.
        pub kind: EnemyKind,
        /// Tile the enemy currently occupies.
        pub position: Position,
        /// Direction the enemy currently faces.
        pub facing: Direction,
        /// Hit points the enemy currently retains.
        pub health: Health,
        /// Hit points the enemy spawned with.
        pub max_health: Health,
    }

    impl EnemySnapshot {
        fn from_enemy(enemy: &super::chunk::Enemy) -> Self {
            Self {
                id: enemy.id,
                kind: enemy.kind,
                position: enemy.position,
                facing: enemy.facing,
                health: enemy.health,
                max_health: enemy.kind.max_health(),
            }
        }
    }

    /// Read-only view of nearby enemies in deterministic order.
    #[derive(Clone, Debug, Default)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Creates a new view from the provided snapshots.
        #[must_use]
        pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
            snapshots.sort_by_key(|snapshot| snapshot.id);
            Self { snapshots }
        }

        /// Iterator over the captured snapshots in ascending id order.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Per-tile rendering snapshot.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TileSnapshot {
        /// Terrain cell stored at the tile.
        pub cell: Cell,
        /// Whether the tile is within the player's light this turn.
        pub lit: bool,
        /// Whether the tile has ever been illuminated or surveyed.
        pub mapped: bool,
        /// Enemy standing on the tile, if any.
        pub enemy: Option<EnemyId>,
        /// Item resting on the tile, if any.
        pub item: Option<ItemKind>,
    }
}
