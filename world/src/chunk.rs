//! One fixed-size tile of the infinite world.
//!
//! A chunk owns its terrain cells, the fog-of-war bookkeeping for those
//! cells, and the enemies and items currently located inside its bounds.
//! Chunks are created once, on first access, from a seed derived from the
//! world seed and the chunk coordinates; after creation their state changes
//! only through the mutators defined here.

use dimlight_core::{
    Cell, ChunkId, Direction, EnemyId, EnemyKind, GridPosition, Health, ItemKind, Position,
    CHUNK_EDGE,
};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::brain::Brain;
use crate::grid::Grid;
use crate::mazegen;

/// Number of walls requested from the carver for each chunk.
const WALL_QUOTA: u32 = 24;
/// Enemies spawned into each freshly generated chunk.
const ENEMIES_PER_CHUNK: usize = 2;
/// Share of spawned enemies that pursue rather than wander, in percent.
const STALKER_SHARE: u32 = 40;

/// Per-kind item spawn chances, in percent.
const ITEM_CHANCES: [(ItemKind, u32); 3] = [
    (ItemKind::Salve, 20),
    (ItemKind::LanternOil, 10),
    (ItemKind::Spyglass, 10),
];

/// Stateful agent roaming the chunk that owns it.
#[derive(Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Position,
    pub(crate) facing: Direction,
    pub(crate) health: Health,
    pub(crate) brain: Brain,
}

/// Pickup resting on a tile until the player collects it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Item {
    pub(crate) kind: ItemKind,
    pub(crate) position: Position,
}

/// One generated tile of the infinite world.
#[derive(Debug)]
pub(crate) struct Chunk {
    id: ChunkId,
    cells: Grid<Cell>,
    mapped: Grid<bool>,
    lit: Grid<bool>,
    enemies: Vec<Enemy>,
    items: Vec<Item>,
}

impl Chunk {
    /// Generates the chunk identified by `id` from the world seed.
    ///
    /// Terrain is a pure function of `(world_seed, id)`. The `enemy_ids`
    /// counter never feeds the RNG, so the order in which a world generates
    /// its chunks cannot influence any chunk's cell layout.
    pub(crate) fn generate(world_seed: u64, id: ChunkId, enemy_ids: &mut u32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(chunk_seed(world_seed, id));
        let cells = mazegen::carve(
            CHUNK_EDGE,
            CHUNK_EDGE,
            carve_entry(),
            carve_exit(),
            WALL_QUOTA,
            &mut rng,
        )
        .expect("chunk carve anchors lie within the chunk area");

        let mut chunk = Self {
            id,
            cells,
            mapped: Grid::filled(CHUNK_EDGE, CHUNK_EDGE, false),
            lit: Grid::filled(CHUNK_EDGE, CHUNK_EDGE, false),
            enemies: Vec::new(),
            items: Vec::new(),
        };

        let mut pool = chunk.spawn_pool();
        for _ in 0..ENEMIES_PER_CHUNK {
            if pool.is_empty() {
                break;
            }
            let local = pool.swap_remove(rng.gen_range(0..pool.len()));
            let kind = if rng.gen_range(0..100) < STALKER_SHARE {
                EnemyKind::Stalker
            } else {
                EnemyKind::Prowler
            };
            let brain_seed = rng.gen();
            let enemy_id = EnemyId::new(*enemy_ids);
            *enemy_ids += 1;
            chunk.enemies.push(Enemy {
                id: enemy_id,
                kind,
                position: id.to_global(local),
                facing: Direction::South,
                health: kind.max_health(),
                brain: Brain::for_kind(kind, brain_seed),
            });
        }

        for (kind, chance) in ITEM_CHANCES {
            if pool.is_empty() {
                break;
            }
            if rng.gen_range(0..100) < chance {
                let local = pool.swap_remove(rng.gen_range(0..pool.len()));
                chunk.items.push(Item {
                    kind,
                    position: id.to_global(local),
                });
            }
        }

        debug!(
            "generated chunk ({}, {}) with {} enemies and {} items",
            id.x(),
            id.y(),
            chunk.enemies.len(),
            chunk.items.len()
        );
        chunk
    }

    /// Passable cells eligible for spawning, excluding the carve anchors.
    fn spawn_pool(&self) -> Vec<GridPosition> {
        let mut pool = Vec::new();
        for y in 0..CHUNK_EDGE {
            for x in 0..CHUNK_EDGE {
                let local = GridPosition::new(x, y);
                if local == carve_entry() || local == carve_exit() {
                    continue;
                }
                if self.cells.get(local) == Some(&Cell::Empty) {
                    pool.push(local);
                }
            }
        }
        pool
    }

    /// World position of the carve entry, guaranteed passable by generation.
    pub(crate) fn anchor(&self) -> Position {
        self.id.to_global(carve_entry())
    }

    /// Terrain cell at the provided world position, if it lies in this chunk.
    pub(crate) fn cell(&self, position: Position) -> Option<Cell> {
        let local = self.id.to_local(position)?;
        self.cells.get(local).copied()
    }

    /// Overwrites the terrain cell at the provided world position.
    ///
    /// # Panics
    ///
    /// Panics when `position` lies outside this chunk, which indicates the
    /// caller resolved the wrong owning chunk.
    pub(crate) fn set_cell(&mut self, position: Position, cell: Cell) {
        match self.id.to_local(position) {
            Some(local) => self.cells.set(local, cell),
            None => panic!(
                "cell write at ({}, {}) does not belong to chunk ({}, {})",
                position.x(),
                position.y(),
                self.id.x(),
                self.id.y()
            ),
        }
    }

    /// Reports whether a mob may occupy the provided world position.
    pub(crate) fn is_passable(&self, position: Position) -> bool {
        self.cell(position).map_or(false, |cell| cell.is_passable())
    }

    /// Enemy currently standing on the provided world position, if any.
    pub(crate) fn enemy_at(&self, position: Position) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.position == position)
    }

    /// Enemies currently owned by this chunk, in insertion order.
    pub(crate) fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Mutable access to the enemy with the provided identifier.
    pub(crate) fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    /// Removes and returns the enemy with the provided identifier.
    pub(crate) fn take_enemy(&mut self, id: EnemyId) -> Option<Enemy> {
        let index = self.enemies.iter().position(|enemy| enemy.id == id)?;
        Some(self.enemies.remove(index))
    }

    /// Adds an enemy that migrated into this chunk's bounds.
    pub(crate) fn admit_enemy(&mut self, enemy: Enemy) {
        self.enemies.push(enemy);
    }

    /// Item resting on the provided world position, if any.
    pub(crate) fn item_at(&self, position: Position) -> Option<&Item> {
        self.items.iter().find(|item| item.position == position)
    }

    /// Removes and returns the item resting on the provided world position.
    pub(crate) fn take_item_at(&mut self, position: Position) -> Option<Item> {
        let index = self.items.iter().position(|item| item.position == position)?;
        Some(self.items.remove(index))
    }

    /// Places an item unless its tile already holds one.
    ///
    /// Returns whether the item was placed.
    pub(crate) fn place_item(&mut self, item: Item) -> bool {
        if self.item_at(item.position).is_some() {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Marks a tile as both currently lit and permanently mapped.
    pub(crate) fn mark_seen(&mut self, local: GridPosition) {
        self.lit.set(local, true);
        self.mapped.set(local, true);
    }

    /// Marks a tile as permanently mapped without lighting it.
    pub(crate) fn mark_mapped(&mut self, local: GridPosition) {
        self.mapped.set(local, true);
    }

    /// Clears the transient lit state of every tile. Mapped state persists.
    pub(crate) fn clear_lit(&mut self) {
        self.lit.fill(false);
    }

    /// Reports whether the tile at the provided world position is lit.
    pub(crate) fn is_lit(&self, position: Position) -> bool {
        self.id
            .to_local(position)
            .and_then(|local| self.lit.get(local).copied())
            .unwrap_or(false)
    }

    /// Reports whether the tile at the provided world position was ever lit.
    pub(crate) fn is_mapped(&self, position: Position) -> bool {
        self.id
            .to_local(position)
            .and_then(|local| self.mapped.get(local).copied())
            .unwrap_or(false)
    }

    /// Empties the enemy list so tests can stage exact populations.
    #[cfg(test)]
    pub(crate) fn clear_enemies(&mut self) {
        self.enemies.clear();
    }

    /// Empties the item list so tests can stage exact populations.
    #[cfg(test)]
    pub(crate) fn clear_items(&mut self) {
        self.items.clear();
    }
}

/// Local coordinate of the carve entry shared by every chunk.
fn carve_entry() -> GridPosition {
    GridPosition::new(0, CHUNK_EDGE / 2)
}

/// Local coordinate of the carve exit shared by every chunk.
fn carve_exit() -> GridPosition {
    GridPosition::new(CHUNK_EDGE - 1, CHUNK_EDGE / 2)
}

/// Derives the RNG seed for one chunk from the world seed.
///
/// A SplitMix64-style finalizer over both coordinates keeps mirrored chunk
/// ids (such as (1, -1) and (-1, 1)) uncorrelated, which a plain XOR of a
/// coordinate hash would not.
fn chunk_seed(world_seed: u64, id: ChunkId) -> u64 {
    let x = u64::from(id.x() as u32);
    let y = u64::from(id.y() as u32);
    let mut state = world_seed
        .wrapping_add(x.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(y.wrapping_mul(0xC2B2_AE3D_27D4_EB4F));
    state ^= state >> 30;
    state = state.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    state ^= state >> 27;
    state = state.wrapping_mul(0x94D0_49BB_1331_11EB);
    state ^ (state >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimlight_core::CHUNK_EDGE;

    #[test]
    fn generation_is_a_pure_function_of_seed_and_id() {
        let id = ChunkId::new(3, -2);
        let mut first_ids = 0;
        let mut second_ids = 100;
        let first = Chunk::generate(0xDEAD_BEEF, id, &mut first_ids);
        let second = Chunk::generate(0xDEAD_BEEF, id, &mut second_ids);

        for y in 0..CHUNK_EDGE as i32 {
            for x in 0..CHUNK_EDGE as i32 {
                let origin = id.origin();
                let position = Position::new(origin.x() + x, origin.y() + y);
                assert_eq!(first.cell(position), second.cell(position));
            }
        }
        assert_eq!(first.enemies().len(), second.enemies().len());
    }

    #[test]
    fn distinct_seeds_give_distinct_chunk_seeds() {
        let id = ChunkId::new(1, 1);
        assert_ne!(chunk_seed(1, id), chunk_seed(2, id));
    }

    #[test]
    fn mirrored_ids_do_not_share_a_seed() {
        assert_ne!(
            chunk_seed(99, ChunkId::new(1, -1)),
            chunk_seed(99, ChunkId::new(-1, 1))
        );
        assert_ne!(
            chunk_seed(99, ChunkId::new(2, 5)),
            chunk_seed(99, ChunkId::new(5, 2))
        );
    }

    #[test]
    fn spawns_land_on_passable_unreserved_cells() {
        let mut ids = 0;
        let chunk = Chunk::generate(42, ChunkId::new(0, 0), &mut ids);

        for enemy in chunk.enemies() {
            assert!(chunk.is_passable(enemy.position));
            assert_ne!(enemy.position, chunk.anchor());
        }
        for item in &chunk.items {
            assert!(chunk.is_passable(item.position));
        }
    }

    #[test]
    fn anchor_is_always_passable() {
        for seed in 0..8 {
            let mut ids = 0;
            let chunk = Chunk::generate(seed, ChunkId::new(-1, 2), &mut ids);
            assert!(chunk.is_passable(chunk.anchor()));
        }
    }

    #[test]
    fn foreign_positions_read_as_absent() {
        let mut ids = 0;
        let chunk = Chunk::generate(7, ChunkId::new(0, 0), &mut ids);
        assert_eq!(chunk.cell(Position::new(50, 0)), None);
        assert!(!chunk.is_passable(Position::new(-1, 0)));
        assert!(!chunk.is_lit(Position::new(50, 0)));
    }

    #[test]
    #[should_panic(expected = "does not belong to chunk")]
    fn foreign_cell_writes_panic() {
        let mut ids = 0;
        let mut chunk = Chunk::generate(7, ChunkId::new(0, 0), &mut ids);
        chunk.set_cell(Position::new(50, 0), Cell::Empty);
    }

    #[test]
    fn lit_clears_while_mapped_persists() {
        let mut ids = 0;
        let mut chunk = Chunk::generate(11, ChunkId::new(0, 0), &mut ids);
        let local = GridPosition::new(4, 4);
        let global = ChunkId::new(0, 0).to_global(local);

        chunk.mark_seen(local);
        assert!(chunk.is_lit(global));
        assert!(chunk.is_mapped(global));

        chunk.clear_lit();
        assert!(!chunk.is_lit(global));
        assert!(chunk.is_mapped(global));
    }

    #[test]
    fn placing_onto_an_occupied_tile_is_refused() {
        let mut ids = 0;
        let mut chunk = Chunk::generate(13, ChunkId::new(0, 0), &mut ids);
        chunk.items.clear();
        let position = chunk.anchor();

        assert!(chunk.place_item(Item {
            kind: ItemKind::Salve,
            position,
        }));
        assert!(!chunk.place_item(Item {
            kind: ItemKind::Spyglass,
            position,
        }));
        assert_eq!(chunk.item_at(position).map(|item| item.kind), Some(ItemKind::Salve));
    }
}
