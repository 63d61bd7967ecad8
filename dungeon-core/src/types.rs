use std::fmt::{Display, Formatter};

use derive_more::{Display as DeriveDisplay, From};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn offset(&self, direction: Direction, distance: i32) -> Position {
        let (dx, dy) = direction.delta();

        Position {
            x: self.x + dx * distance,
            y: self.y + dy * distance,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<Position> for (i32, i32) {
    fn from(position: Position) -> Self {
        (position.x, position.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    // North points towards row 0.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::West | Direction::East)
    }

    pub fn reverse(&self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }
}

/// An axis aligned rectangle of cells. `left`/`top` is the first cell
/// inside the rectangle, `width`/`height` count cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Bounds {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, position: &Position) -> bool {
        (self.left..self.right()).contains(&position.x)
            && (self.top..self.bottom()).contains(&position.y)
    }

    pub fn overlaps(&self, other: &Bounds) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    pub fn expanded_by(&self, margin: u32) -> Bounds {
        Bounds {
            left: self.left - margin as i32,
            top: self.top - margin as i32,
            width: self.width + margin * 2,
            height: self.height + margin * 2,
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let (left, right) = (self.left, self.right());
        (self.top..self.bottom())
            .flat_map(move |y| (left..right).map(move |x| Position::new(x, y)))
    }
}

impl Display for Bounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) [{}x{}]",
            self.left, self.top, self.width, self.height
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum TileKind {
    // Returned for positions outside of the grid
    Invalid,
    #[default]
    Wall,
    Room,
    Hallway,
    Door,
    Connector,
}

impl TileKind {
    pub fn is_blocking(&self) -> bool {
        matches!(self, TileKind::Wall | TileKind::Invalid)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    From,
    DeriveDisplay,
)]
pub struct RegionId(u32);

impl RegionId {
    /// The background region every wall belongs to.
    pub const WALL: RegionId = RegionId(0);
    /// Region reported for positions outside of the grid.
    pub const NONE: RegionId = RegionId(u32::MAX);

    pub const fn new(id: u32) -> Self {
        RegionId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub region: RegionId,
}

impl Tile {
    pub const WALL: Tile = Tile::new(TileKind::Wall, RegionId::WALL);
    pub const INVALID: Tile = Tile::new(TileKind::Invalid, RegionId::NONE);

    pub const fn new(kind: TileKind, region: RegionId) -> Self {
        Tile { kind, region }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::WALL
    }
}

/// A wall cell sitting between two different regions. Connectors keep the
/// regions they were found between in `origin`, while `regions` follows
/// the merges performed during region connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Connector {
    pub position: Position,
    pub regions: (RegionId, RegionId),
    pub origin: (RegionId, RegionId),
}

impl Connector {
    pub fn new(position: Position, first: RegionId, second: RegionId) -> Self {
        Connector {
            position,
            regions: (first, second),
            origin: (first, second),
        }
    }

    pub fn touches(&self, region: RegionId) -> bool {
        self.regions.0 == region || self.regions.1 == region
    }

    pub fn other_than(&self, region: RegionId) -> Option<RegionId> {
        if self.regions.0 != region {
            Some(self.regions.0)
        } else if self.regions.1 != region {
            Some(self.regions.1)
        } else {
            None
        }
    }

    pub fn recolor(&mut self, from: RegionId, to: RegionId) {
        if self.regions.0 == from {
            self.regions.0 = to;
        }
        if self.regions.1 == from {
            self.regions.1 = to;
        }
    }
}

impl Display for Connector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{} <-> {}]",
            self.position, self.regions.0, self.regions.1
        )
    }
}
