use crate::{
    constants::{WALL_REGION, WALL_REGION_NAME},
    tile_grid::TileGrid,
    types::{Position, RegionId},
};

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::event;

// Cell indices (x + y * width) owned by a region.
pub(crate) type PositionSet = tinyset::SetUsize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("region {0} does not exist")]
    UnknownRegion(RegionId),
    #[error("region {0} cannot be merged into itself")]
    SelfMerge(RegionId),
    #[error("the background region cannot be removed")]
    BackgroundRegion,
}

/// Tracks which positions every region owns, alongside a friendly name
/// per region.
///
/// The background region (id 0) always exists. Walls belong to it, but
/// their positions are tracked through the [`TileGrid`] rather than
/// enumerated here, so its position set stays empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTable {
    width: u32,
    height: u32,
    next_region_id: u32,
    names: BTreeMap<RegionId, String>,
    positions: BTreeMap<RegionId, PositionSet>,
}

impl Default for RegionTable {
    fn default() -> Self {
        RegionTable::new(0, 0)
    }
}

impl RegionTable {
    pub fn new(width: u32, height: u32) -> Self {
        let mut names = BTreeMap::new();
        names.insert(WALL_REGION, WALL_REGION_NAME.to_string());

        let mut positions = BTreeMap::new();
        positions.insert(WALL_REGION, PositionSet::new());

        RegionTable {
            width,
            height,
            next_region_id: WALL_REGION.value() + 1,
            names,
            positions,
        }
    }

    // Ids are never reused by the same table.
    pub fn add(&mut self, name: impl Into<String>) -> RegionId {
        let region = RegionId::new(self.next_region_id);
        self.next_region_id += 1;

        self.names.insert(region, name.into());
        self.positions.insert(region, PositionSet::new());

        region
    }

    /// Moves every position of `old_region` into `new_region`, rewrites the
    /// grid accordingly and forgets `old_region`.
    pub fn remove(
        &mut self,
        old_region: RegionId,
        new_region: RegionId,
        grid: &mut TileGrid,
    ) -> Result<usize, RegionError> {
        if old_region == new_region {
            event!(
                tracing::Level::WARN,
                "Attempt to remove region {} [{}] and replace it with itself",
                old_region,
                self.names.get(&old_region).map_or("unknown", String::as_str)
            );
            return Err(RegionError::SelfMerge(old_region));
        }

        if old_region == WALL_REGION {
            return Err(RegionError::BackgroundRegion);
        }

        self.ensure_exists(new_region)?;
        let old_positions = self
            .positions
            .remove(&old_region)
            .ok_or(RegionError::UnknownRegion(old_region))?;
        self.names.remove(&old_region);

        if new_region != WALL_REGION {
            let new_positions = self
                .positions
                .get_mut(&new_region)
                .ok_or(RegionError::UnknownRegion(new_region))?;

            for idx in old_positions.iter() {
                new_positions.insert(idx);
            }
        }

        Ok(grid.rewrite_region(old_region, new_region))
    }

    /// Hands `position` over to `region`, taking it away from the region
    /// that owns it on `grid`. The grid itself is left untouched.
    pub fn set(
        &mut self,
        grid: &TileGrid,
        position: Position,
        region: RegionId,
    ) -> Result<(), RegionError> {
        self.ensure_exists(region)?;

        let Some(idx) = self.index_of(&position) else {
            event!(
                tracing::Level::WARN,
                "Ignoring region assignment outside of the grid at {}",
                position
            );
            return Ok(());
        };

        let previous_region = grid.get(position).region;
        self.ensure_exists(previous_region)?;

        if previous_region != WALL_REGION {
            if let Some(previous_positions) = self.positions.get_mut(&previous_region) {
                previous_positions.remove(idx);
            }
        }

        if region != WALL_REGION {
            if let Some(positions) = self.positions.get_mut(&region) {
                positions.insert(idx);
            }
        }

        Ok(())
    }

    pub fn positions(&self, region: RegionId) -> Result<Vec<Position>, RegionError> {
        let positions = self
            .positions
            .get(&region)
            .ok_or(RegionError::UnknownRegion(region))?;

        let mut snapshot = positions
            .iter()
            .map(|idx| self.position_of(idx))
            .collect::<Vec<_>>();
        snapshot.sort_by_key(|position| (position.y, position.x));

        Ok(snapshot)
    }

    pub fn position_count(&self, region: RegionId) -> Result<usize, RegionError> {
        self.positions
            .get(&region)
            .map(|positions| positions.len())
            .ok_or(RegionError::UnknownRegion(region))
    }

    pub fn name(&self, region: RegionId) -> Result<&str, RegionError> {
        self.names
            .get(&region)
            .map(String::as_str)
            .ok_or(RegionError::UnknownRegion(region))
    }

    pub fn contains(&self, region: RegionId) -> bool {
        self.names.contains_key(&region)
    }

    pub fn regions(&self) -> Vec<RegionId> {
        self.names.keys().copied().collect()
    }

    // The background region is not counted.
    pub fn region_count(&self) -> usize {
        self.names.len() - 1
    }

    fn ensure_exists(&self, region: RegionId) -> Result<(), RegionError> {
        if self.contains(region) {
            Ok(())
        } else {
            event!(
                tracing::Level::ERROR,
                "Attempt to use region {} but it was not found",
                region
            );
            Err(RegionError::UnknownRegion(region))
        }
    }

    fn index_of(&self, position: &Position) -> Option<usize> {
        if position.x < 0
            || position.y < 0
            || position.x as u32 >= self.width
            || position.y as u32 >= self.height
        {
            return None;
        }

        Some(position.x as usize + position.y as usize * self.width as usize)
    }

    fn position_of(&self, idx: usize) -> Position {
        let width = self.width as usize;
        Position::new((idx % width) as i32, (idx / width) as i32)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::TileKind;

    fn assign(
        table: &mut RegionTable,
        grid: &mut TileGrid,
        position: Position,
        kind: TileKind,
        region: RegionId,
    ) {
        table.set(grid, position, region).unwrap();
        grid.set(position, kind, region);
    }

    #[test]
    fn test_new_table_only_has_background() {
        let table = RegionTable::new(4, 4);

        assert_eq!(table.regions(), vec![RegionId::WALL]);
        assert_eq!(table.region_count(), 0);
        assert_eq!(table.name(RegionId::WALL).unwrap(), "wall");
        assert!(table.positions(RegionId::WALL).unwrap().is_empty());
    }

    #[test]
    fn test_add_hands_out_sequential_ids() {
        let mut table = RegionTable::new(4, 4);

        let first = table.add("room#0");
        let second = table.add("hallway#0");

        assert_eq!(first, RegionId::new(1));
        assert_eq!(second, RegionId::new(2));
        assert_eq!(table.name(second).unwrap(), "hallway#0");
        assert_eq!(table.region_count(), 2);
    }

    #[test]
    fn test_ids_are_not_reused_after_remove() {
        let mut grid = TileGrid::new(4, 4);
        let mut table = RegionTable::new(4, 4);

        let first = table.add("a");
        let second = table.add("b");
        table.remove(second, first, &mut grid).unwrap();

        assert_eq!(table.add("c"), RegionId::new(3));
    }

    #[test]
    fn test_set_moves_position_between_regions() {
        let mut grid = TileGrid::new(4, 4);
        let mut table = RegionTable::new(4, 4);
        let room = table.add("room#0");
        let hallway = table.add("hallway#0");
        let position = Position::new(1, 2);

        assign(&mut table, &mut grid, position, TileKind::Room, room);
        assert_eq!(table.positions(room).unwrap(), vec![position]);

        assign(&mut table, &mut grid, position, TileKind::Hallway, hallway);
        assert!(table.positions(room).unwrap().is_empty());
        assert_eq!(table.positions(hallway).unwrap(), vec![position]);

        assign(&mut table, &mut grid, position, TileKind::Wall, RegionId::WALL);
        assert!(table.positions(hallway).unwrap().is_empty());
        assert!(table.positions(RegionId::WALL).unwrap().is_empty());
    }

    #[test]
    fn test_set_fails_for_unknown_region() {
        let grid = TileGrid::new(4, 4);
        let mut table = RegionTable::new(4, 4);

        let result = table.set(&grid, Position::new(0, 0), RegionId::new(9));

        assert_eq!(result, Err(RegionError::UnknownRegion(RegionId::new(9))));
    }

    #[test]
    fn test_set_ignores_out_of_bounds() {
        let grid = TileGrid::new(4, 4);
        let mut table = RegionTable::new(4, 4);
        let room = table.add("room#0");

        assert!(table.set(&grid, Position::new(4, 0), room).is_ok());
        assert!(table.positions(room).unwrap().is_empty());
    }

    #[test]
    fn test_remove_merges_positions_and_grid() {
        let mut grid = TileGrid::new(4, 4);
        let mut table = RegionTable::new(4, 4);
        let root = table.add("room#0");
        let other = table.add("room#1");

        assign(&mut table, &mut grid, Position::new(0, 0), TileKind::Room, root);
        assign(&mut table, &mut grid, Position::new(3, 3), TileKind::Room, other);
        assign(&mut table, &mut grid, Position::new(2, 3), TileKind::Room, other);

        let rewritten = table.remove(other, root, &mut grid).unwrap();

        assert_eq!(rewritten, 2);
        assert!(!table.contains(other));
        assert_eq!(
            table.positions(root).unwrap(),
            vec![Position::new(0, 0), Position::new(2, 3), Position::new(3, 3)]
        );
        assert_eq!(grid.get(Position::new(3, 3)).region, root);
        assert_eq!(table.name(other), Err(RegionError::UnknownRegion(other)));
    }

    #[test]
    fn test_remove_rejects_invalid_merges() {
        let mut grid = TileGrid::new(4, 4);
        let mut table = RegionTable::new(4, 4);
        let room = table.add("room#0");
        assign(&mut table, &mut grid, Position::new(1, 1), TileKind::Room, room);

        assert_eq!(
            table.remove(room, room, &mut grid),
            Err(RegionError::SelfMerge(room))
        );
        assert_eq!(
            table.remove(RegionId::WALL, room, &mut grid),
            Err(RegionError::BackgroundRegion)
        );
        assert_eq!(
            table.remove(RegionId::new(5), room, &mut grid),
            Err(RegionError::UnknownRegion(RegionId::new(5)))
        );
        assert_eq!(
            table.remove(room, RegionId::new(5), &mut grid),
            Err(RegionError::UnknownRegion(RegionId::new(5)))
        );

        // Nothing changed after the rejected calls
        assert!(table.contains(room));
        assert_eq!(table.positions(room).unwrap(), vec![Position::new(1, 1)]);
        assert_eq!(grid.get(Position::new(1, 1)).region, room);
    }
}
