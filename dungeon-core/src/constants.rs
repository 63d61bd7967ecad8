use crate::types::{Direction, RegionId};

pub(crate) const WALL_REGION: RegionId = RegionId::WALL;
pub(crate) const WALL_REGION_NAME: &str = "wall";

// Rooms and hallways are laid out on the even sublattice, so every step
// of the maze covers two cells and leaves odd cells as permanent wall.
pub(crate) const MAZE_STRIDE: i32 = 2;

// Radius (in orthogonal steps) that must be free of doors before a
// connector may become a new door.
pub(crate) const DOOR_CLEARANCE: i32 = 2;

pub(crate) const PER_MILLE: u32 = 1000;

pub(crate) const DEFAULT_MAP_WIDTH: u32 = 120;
pub(crate) const DEFAULT_MAP_HEIGHT: u32 = 120;
pub(crate) const DEFAULT_SEED: u64 = 1;
pub(crate) const DEFAULT_ROOM_MIN: u32 = 3;
pub(crate) const DEFAULT_ROOM_MAX: u32 = 9;
pub(crate) const DEFAULT_ROOM_RATIO_MIN: f32 = 0.3;
pub(crate) const DEFAULT_ROOM_RATIO_MAX: f32 = 1.7;
pub(crate) const DEFAULT_ROOM_ATTEMPTS: u32 = 1000;
pub(crate) const DEFAULT_EXTRA_CONNECTOR_CHANCE: u32 = 100;
pub(crate) const DEFAULT_DEAD_ENDS: u32 = 0;

pub(crate) const PROGRESS_COMPLETE: f32 = 1.0;
pub(crate) const PROGRESS_ROOMS_DONE: f32 = 0.2;
pub(crate) const PROGRESS_HALLWAYS_DONE: f32 = 0.4;
pub(crate) const PROGRESS_CONNECTORS_DONE: f32 = 0.6;
pub(crate) const PROGRESS_REGIONS_DONE: f32 = 0.8;

pub(crate) const DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::West,
    Direction::East,
];
