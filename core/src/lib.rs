#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dimlight engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the turn driver. Adapters submit one [`Intent`]
//! per turn, the turn driver expands it into a fixed [`Command`] script, the
//! world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values describing what happened. Everything here is
//! a plain value type: geometry, identifiers, descriptors, and messages.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Dimlight.";

/// Edge length of a single world chunk measured in tiles.
///
/// Every chunk is a square of `CHUNK_EDGE` by `CHUNK_EDGE` tiles; the
/// infinite world is tiled by [`ChunkId`] coordinates at this granularity.
pub const CHUNK_EDGE: u32 = 10;

/// Absolute world-tile coordinate.
///
/// Positions are unbounded in both axes; negative coordinates address tiles
/// below/left of the origin chunk. Use [`GridPosition`] for chunk-local
/// coordinates instead of mixing the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal world coordinate of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical world coordinate of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position one tile away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        self.offset(direction.delta())
    }

    /// Returns the position displaced by the provided delta.
    #[must_use]
    pub const fn offset(self, delta: Delta) -> Self {
        Self {
            x: self.x + delta.dx,
            y: self.y + delta.dy,
        }
    }

    /// Computes the displacement from this position to `other`.
    #[must_use]
    pub const fn delta_to(self, other: Position) -> Delta {
        Delta {
            dx: other.x - self.x,
            dy: other.y - self.y,
        }
    }
}

/// Displacement between two world positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delta {
    dx: i32,
    dy: i32,
}

impl Delta {
    /// The zero displacement.
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    /// Creates a new displacement.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal component of the displacement.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Vertical component of the displacement.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Euclidean length of the displacement.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        let dx = f64::from(self.dx);
        let dy = f64::from(self.dy);
        (dx * dx + dy * dy).sqrt()
    }

    /// Manhattan length of the displacement.
    #[must_use]
    pub const fn manhattan(&self) -> u32 {
        self.dx.unsigned_abs() + self.dy.unsigned_abs()
    }

    /// Dominant-axis direction of the displacement.
    ///
    /// Returns `None` for the zero displacement. When both axes contribute
    /// equally the horizontal axis wins.
    #[must_use]
    pub const fn primary_direction(&self) -> Option<Direction> {
        if self.dx == 0 && self.dy == 0 {
            return None;
        }

        if self.dx.unsigned_abs() >= self.dy.unsigned_abs() {
            if self.dx > 0 {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if self.dy > 0 {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

/// Cardinal movement directions available to mobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing vertical coordinates.
    North,
    /// Movement toward increasing horizontal coordinates.
    East,
    /// Movement toward increasing vertical coordinates.
    South,
    /// Movement toward decreasing horizontal coordinates.
    West,
}

impl Direction {
    /// All directions in the fixed order used for deterministic tie-breaking.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit displacement covered by one step in this direction.
    #[must_use]
    pub const fn delta(self) -> Delta {
        match self {
            Self::North => Delta::new(0, -1),
            Self::East => Delta::new(1, 0),
            Self::South => Delta::new(0, 1),
            Self::West => Delta::new(-1, 0),
        }
    }

    /// Display rotation of a mob facing this direction, in degrees.
    #[must_use]
    pub const fn rotation_degrees(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::East => 90.0,
            Self::South => 180.0,
            Self::West => 270.0,
        }
    }

    /// The direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

/// Chunk-local tile coordinate.
///
/// A distinct type from [`Position`] so that local and global coordinates
/// cannot be mixed accidentally. Valid values lie within `0..CHUNK_EDGE` on
/// both axes for grids sized to a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    x: u32,
    y: u32,
}

impl GridPosition {
    /// Creates a new chunk-local coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Horizontal offset within the owning grid.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Vertical offset within the owning grid.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Integer coordinate identifying one fixed-size tile of the infinite world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId {
    x: i32,
    y: i32,
}

impl ChunkId {
    /// Creates a chunk identifier from explicit chunk coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal chunk coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical chunk coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Identifies the chunk containing the provided world position.
    ///
    /// Both axes floor toward negative infinity, so positions with negative
    /// coordinates resolve to the chunk below/left of the origin rather than
    /// truncating toward zero.
    #[must_use]
    pub const fn from_position(position: Position) -> Self {
        let edge = CHUNK_EDGE as i32;
        Self {
            x: position.x().div_euclid(edge),
            y: position.y().div_euclid(edge),
        }
    }

    /// World position of the chunk's upper-left tile.
    #[must_use]
    pub const fn origin(&self) -> Position {
        let edge = CHUNK_EDGE as i32;
        Position::new(self.x * edge, self.y * edge)
    }

    /// Reports whether the provided world position lies within this chunk.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        let id = Self::from_position(position);
        id.x == self.x && id.y == self.y
    }

    /// Translates a world position into this chunk's local coordinates.
    ///
    /// Returns `None` when the position lies outside the chunk's extent.
    #[must_use]
    pub const fn to_local(&self, position: Position) -> Option<GridPosition> {
        if !self.contains(position) {
            return None;
        }

        let edge = CHUNK_EDGE as i32;
        Some(GridPosition::new(
            position.x().rem_euclid(edge) as u32,
            position.y().rem_euclid(edge) as u32,
        ))
    }

    /// Translates a local coordinate within this chunk back to a world position.
    #[must_use]
    pub const fn to_global(&self, local: GridPosition) -> Position {
        let origin = self.origin();
        Position::new(origin.x() + local.x() as i32, origin.y() + local.y() as i32)
    }

    /// Returns the chunk displaced by whole-chunk offsets.
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Contents of a single terrain tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Open floor that mobs may occupy.
    Empty,
    /// Solid block that no mob may enter.
    Wall,
}

impl Cell {
    /// Reports whether a mob may occupy a tile holding this cell.
    #[must_use]
    pub const fn is_passable(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Hit points carried by a mob, saturating at zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a health value with the provided number of hit points.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the remaining hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the owner has been exhausted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }

    /// Returns the health remaining after taking `amount` damage.
    #[must_use]
    pub const fn damaged(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// Returns the health after restoring `amount` points, clamped to `cap`.
    #[must_use]
    pub fn healed(self, amount: u32, cap: Health) -> Self {
        Self(self.0.saturating_add(amount).min(cap.0))
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Descriptor selecting an enemy's stats and behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Aimless wanderer that only strikes when the player blunders into it.
    Prowler,
    /// Pursuer that closes on the player once inside its aggro radius.
    Stalker,
}

impl EnemyKind {
    /// Display name of the enemy kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Prowler => "prowler",
            Self::Stalker => "stalker",
        }
    }

    /// Hit points an enemy of this kind spawns with.
    #[must_use]
    pub const fn max_health(self) -> Health {
        match self {
            Self::Prowler => Health::new(2),
            Self::Stalker => Health::new(3),
        }
    }

    /// Damage dealt by one strike from this kind.
    #[must_use]
    pub const fn strike_damage(self) -> u32 {
        match self {
            Self::Prowler => 1,
            Self::Stalker => 2,
        }
    }

    /// Manhattan radius within which this kind pursues the player.
    ///
    /// `None` means the kind never pursues and wanders regardless of the
    /// player's location.
    #[must_use]
    pub const fn aggro_radius(self) -> Option<u32> {
        match self {
            Self::Prowler => None,
            Self::Stalker => Some(4),
        }
    }

    /// Resolves the spoils dropped on exhaustion for a percentile roll.
    ///
    /// `roll` is expected in `0..100`; larger values never drop anything.
    #[must_use]
    pub const fn loot(self, roll: u32) -> Option<ItemKind> {
        match self {
            Self::Prowler => {
                if roll < 35 {
                    Some(ItemKind::Salve)
                } else {
                    None
                }
            }
            Self::Stalker => {
                if roll < 25 {
                    Some(ItemKind::LanternOil)
                } else if roll < 45 {
                    Some(ItemKind::Spyglass)
                } else {
                    None
                }
            }
        }
    }
}

/// Kinds of pickups that can appear on the terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Restores a portion of the player's health on pickup.
    Salve,
    /// Widens the player's light radius on pickup.
    LanternOil,
    /// Permanently charts the terrain surrounding the pickup location.
    Spyglass,
}

impl ItemKind {
    /// Display name of the item kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Salve => "salve",
            Self::LanternOil => "lantern oil",
            Self::Spyglass => "spyglass",
        }
    }
}

/// One logical player input submitted per turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Move or attack one tile in the provided direction.
    Move(Direction),
    /// Lift or place a block on the tile the player faces.
    Interact,
}

/// Commands that express all permissible world mutations.
///
/// One full turn is the sequence `ActPlayer`, `ActEnemies`, `CollectLoot`,
/// `RefreshVisibility`, applied in that order by the turn driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Translates the player's intent into a concrete action and executes it.
    ActPlayer {
        /// Logical input submitted for this turn.
        intent: Intent,
    },
    /// Lets every active enemy decide and execute one action, sequentially.
    ActEnemies,
    /// Collects any item resting at the player's location.
    CollectLoot,
    /// Recomputes the lit set and extends the mapped set around the player.
    RefreshVisibility,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the player moved between two tiles.
    PlayerMoved {
        /// Tile the player occupied before moving.
        from: Position,
        /// Tile the player occupies after the move.
        to: Position,
    },
    /// Confirms that the player struck an enemy.
    EnemyStruck {
        /// Identifier of the enemy that was hit.
        enemy: EnemyId,
        /// Health the enemy retains after the strike.
        remaining: Health,
    },
    /// Announces that an enemy was exhausted and removed from the world.
    EnemyFell {
        /// Identifier of the fallen enemy.
        enemy: EnemyId,
        /// Tile the enemy occupied when it fell.
        at: Position,
        /// Item rolled from the enemy's loot table, if any was placed.
        spoils: Option<ItemKind>,
    },
    /// Confirms that an enemy moved between two tiles.
    EnemyMoved {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Tile the enemy occupied before moving.
        from: Position,
        /// Tile the enemy occupies after the move.
        to: Position,
    },
    /// Confirms that an enemy struck the player.
    PlayerStruck {
        /// Identifier of the striking enemy.
        by: EnemyId,
        /// Health the player retains after the strike.
        remaining: Health,
    },
    /// Announces that the player's health reached zero.
    PlayerFell {
        /// Tile the player occupied when falling.
        at: Position,
    },
    /// Confirms that the player lifted a wall block.
    BlockLifted {
        /// Tile that changed from wall to floor.
        at: Position,
    },
    /// Confirms that the player placed a carried block.
    BlockPlaced {
        /// Tile that changed from floor to wall.
        at: Position,
    },
    /// Confirms that the player collected an item.
    ItemCollected {
        /// Kind of item that was collected.
        kind: ItemKind,
        /// Tile the item rested on.
        at: Position,
    },
    /// Announces that a spyglass charted the terrain around a tile.
    AreaSurveyed {
        /// Center of the surveyed area.
        around: Position,
    },
    /// Reports that the lit set was recomputed around the player.
    VisibilityRefreshed {
        /// Number of tiles currently lit.
        lit_tiles: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        Cell, ChunkId, Delta, Direction, EnemyId, EnemyKind, GridPosition, Health, ItemKind,
        Position, CHUNK_EDGE,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn delta_lengths_match_expectation() {
        let delta = Position::new(1, 1).delta_to(Position::new(4, 3));
        assert_eq!(delta.manhattan(), 5);
        assert!((Delta::new(3, 4).magnitude() - 5.0).abs() < f64::EPSILON);
        assert_eq!(Delta::ZERO.manhattan(), 0);
    }

    #[test]
    fn primary_direction_prefers_dominant_axis() {
        assert_eq!(Delta::new(3, 1).primary_direction(), Some(Direction::East));
        assert_eq!(Delta::new(-2, 1).primary_direction(), Some(Direction::West));
        assert_eq!(Delta::new(1, -4).primary_direction(), Some(Direction::North));
        assert_eq!(Delta::new(0, 2).primary_direction(), Some(Direction::South));
        assert_eq!(Delta::new(2, 2).primary_direction(), Some(Direction::East));
        assert_eq!(Delta::ZERO.primary_direction(), None);
    }

    #[test]
    fn direction_steps_cancel_with_opposites() {
        let origin = Position::new(7, -3);
        for direction in Direction::ALL {
            let stepped = origin.step(direction).step(direction.opposite());
            assert_eq!(stepped, origin);
        }
    }

    #[test]
    fn chunk_id_floors_negative_coordinates() {
        assert_eq!(
            ChunkId::from_position(Position::new(0, 0)),
            ChunkId::new(0, 0)
        );
        assert_eq!(
            ChunkId::from_position(Position::new(9, 9)),
            ChunkId::new(0, 0)
        );
        assert_eq!(
            ChunkId::from_position(Position::new(10, 0)),
            ChunkId::new(1, 0)
        );
        assert_eq!(
            ChunkId::from_position(Position::new(-1, -10)),
            ChunkId::new(-1, -1)
        );
        assert_eq!(
            ChunkId::from_position(Position::new(-11, 3)),
            ChunkId::new(-2, 0)
        );
    }

    #[test]
    fn local_translation_round_trips() {
        let positions = [
            Position::new(0, 0),
            Position::new(13, 27),
            Position::new(-1, -1),
            Position::new(-25, 14),
        ];

        for position in positions {
            let id = ChunkId::from_position(position);
            let local = id.to_local(position).expect("position lies in its chunk");
            assert!(local.x() < CHUNK_EDGE);
            assert!(local.y() < CHUNK_EDGE);
            assert_eq!(id.to_global(local), position);
        }
    }

    #[test]
    fn to_local_rejects_foreign_positions() {
        let id = ChunkId::new(0, 0);
        assert_eq!(id.to_local(Position::new(10, 0)), None);
        assert_eq!(id.to_local(Position::new(-1, 5)), None);
        assert_eq!(id.to_local(Position::new(4, 4)), Some(GridPosition::new(4, 4)));
    }

    #[test]
    fn walls_are_never_passable() {
        assert!(Cell::Empty.is_passable());
        assert!(!Cell::Wall.is_passable());
    }

    #[test]
    fn health_clamps_at_both_ends() {
        let cap = Health::new(10);
        let hurt = Health::new(3).damaged(5);
        assert!(hurt.is_depleted());
        assert_eq!(Health::new(9).healed(4, cap), cap);
        assert_eq!(Health::new(2).damaged(1), Health::new(1));
    }

    #[test]
    fn loot_tables_respect_roll_bounds() {
        assert_eq!(EnemyKind::Prowler.loot(0), Some(ItemKind::Salve));
        assert_eq!(EnemyKind::Prowler.loot(99), None);
        assert_eq!(EnemyKind::Stalker.loot(10), Some(ItemKind::LanternOil));
        assert_eq!(EnemyKind::Stalker.loot(30), Some(ItemKind::Spyglass));
        assert_eq!(EnemyKind::Stalker.loot(80), None);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn chunk_id_round_trips_through_bincode() {
        assert_round_trip(&ChunkId::new(-4, 17));
    }

    #[test]
    fn enemy_id_round_trips_through_bincode() {
        assert_round_trip(&EnemyId::new(42));
    }

    #[test]
    fn item_kind_round_trips_through_bincode() {
        assert_round_trip(&ItemKind::Spyglass);
    }
}
