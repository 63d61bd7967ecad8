use crate::types::{Bounds, Direction, Position, RegionId, Tile, TileKind};

use std::collections::HashMap;

use tracing::event;

/// Owns the `width * height` cells of a map, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: u32, height: u32) -> Self {
        event!(
            tracing::Level::DEBUG,
            "TileGrid initialized with size {}x{}",
            width,
            height
        );

        TileGrid {
            width,
            height,
            tiles: vec![Tile::WALL; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(0, 0, self.width, self.height)
    }

    pub(crate) fn index_of(&self, position: &Position) -> Option<usize> {
        if position.x < 0
            || position.y < 0
            || position.x as u32 >= self.width
            || position.y as u32 >= self.height
        {
            return None;
        }

        Some(position.x as usize + position.y as usize * self.width as usize)
    }

    pub(crate) fn position_of(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    pub fn get(&self, position: Position) -> Tile {
        match self.index_of(&position) {
            Some(idx) => self.tiles[idx],
            None => Tile::INVALID,
        }
    }

    pub fn kind_at(&self, position: Position) -> TileKind {
        self.get(position).kind
    }

    pub fn get_at_direction(&self, position: Position, direction: Direction, distance: i32) -> Tile {
        self.get(position.offset(direction, distance))
    }

    // Out of range writes are dropped.
    pub fn set(&mut self, position: Position, kind: TileKind, region: RegionId) {
        match self.index_of(&position) {
            Some(idx) => self.tiles[idx] = Tile::new(kind, region),
            None => event!(
                tracing::Level::WARN,
                "Ignoring write of {:?} outside of the grid at {}",
                kind,
                position
            ),
        }
    }

    pub fn rewrite_region(&mut self, old_region: RegionId, new_region: RegionId) -> usize {
        let mut rewritten = 0;

        for tile in self.tiles.iter_mut().filter(|tile| tile.region == old_region) {
            tile.region = new_region;
            rewritten += 1;
        }

        rewritten
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(idx, tile)| (self.position_of(idx), *tile))
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| tile.kind == kind).count()
    }

    pub fn contains_any(&self, bounds: Bounds, predicate: impl Fn(&Tile) -> bool) -> bool {
        bounds
            .positions()
            .filter_map(|position| self.index_of(&position))
            .any(|idx| predicate(&self.tiles[idx]))
    }

    /// Walls and off-grid cells among the four orthogonal neighbours.
    pub fn blocked_neighbours(&self, position: Position) -> usize {
        crate::constants::DIRECTIONS
            .iter()
            .filter(|direction| {
                self.get_at_direction(position, **direction, 1)
                    .kind
                    .is_blocking()
            })
            .count()
    }

    /// Flattens the grid row-major through `mapping`. Kinds missing from the
    /// mapping fall back to the mapping of [`TileKind::Invalid`], or a space.
    pub fn render(&self, mapping: &HashMap<TileKind, char>) -> Vec<char> {
        let fallback = mapping.get(&TileKind::Invalid).copied().unwrap_or(' ');

        self.tiles
            .iter()
            .map(|tile| mapping.get(&tile.kind).copied().unwrap_or(fallback))
            .collect()
    }
}
