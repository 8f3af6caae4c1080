use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct EntityId;
    pub struct ItemId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self { y: self.y + dy, x: self.x + dx }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { y: self.y + dy, x: self.x + dx }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn distance_squared(self, other: Pos) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Clockwise from north, the order every neighbor scan uses.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn between(from: Pos, to: Pos) -> Option<Self> {
        Direction::ALL.into_iter().find(|direction| from.step(*direction) == to)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Wall,
    Room,
    Floor,
    Water,
    Grass,
    Rock,
    Stairs,
}

impl Terrain {
    pub fn is_walkable(self) -> bool {
        !matches!(self, Terrain::Wall | Terrain::Rock)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrapKind {
    Slow,
    Snare,
    Reverse,
    Fog,
    Noise,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    PowerUp,
    Invincibility,
    Smoke,
    Potion,
    Ration,
    Blade,
    Buckler,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Sprinter,
    Strategist,
    Wanderer,
    Patroller,
    Ambusher,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    Unaligned,
    Brutes,
    Thieves,
    Wraiths,
    Hunters,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnInput {
    Move(Direction),
    Wait,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Victory,
    Defeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Awareness {
    Dormant,
    Aware,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    ItemPickedUp { kind: ItemKind, pos: Pos },
    ItemStolen { kind: ItemKind, by: EntityId },
    TrapTriggered { kind: TrapKind, pos: Pos },
    EnemyAlerted { enemy: EntityId },
    EnemyDisengaged { enemy: EntityId },
    EnemyKilled { enemy: EntityId, kind: EnemyKind },
    PlayerDamaged { amount: i32, by: Option<EntityId> },
    Starving,
    FloorChanged { depth: u32 },
    GameOver { outcome: RunOutcome },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub turn: u64,
    pub player_acted: bool,
    pub floor_changed: bool,
    pub outcome: Option<RunOutcome>,
}
