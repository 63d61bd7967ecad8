use super::MapGenerator;
use crate::{
    constants::WALL_REGION,
    region_table::RegionError,
    types::{Position, TileKind},
};

use rand::seq::SliceRandom;
use tracing::event;

impl MapGenerator {
    /// Fills hallway dead ends back in until no more than the configured
    /// amount is left, then walls up doors that no longer lead anywhere.
    pub(super) fn remove_dead_ends(&mut self) -> Result<(), RegionError> {
        let target = self.config.dead_ends as usize;

        let mut dead_ends = self.find_dead_ends(TileKind::Hallway);
        while dead_ends.len() > target {
            let excess = dead_ends.len() - target;

            for position in dead_ends.drain(..excess) {
                self.set_tile(position, TileKind::Wall, WALL_REGION)?;
                self.report.dead_ends_removed += 1;
                self.render_step();
            }

            dead_ends = self.find_dead_ends(TileKind::Hallway);
        }

        for position in self.find_dead_ends(TileKind::Door) {
            self.set_tile(position, TileKind::Wall, WALL_REGION)?;
            self.report.dangling_doors_removed += 1;
        }

        event!(
            tracing::Level::INFO,
            "Removed {} dead ends and {} dangling doors, {} dead ends left",
            self.report.dead_ends_removed,
            self.report.dangling_doors_removed,
            dead_ends.len()
        );

        Ok(())
    }

    /// A cell with at most one open side.
    pub(super) fn is_dead_end(&self, position: Position) -> bool {
        self.grid.blocked_neighbours(position) > 2
    }

    // Shuffled, so the dead ends kept in place are picked at random.
    fn find_dead_ends(&mut self, kind: TileKind) -> Vec<Position> {
        let mut dead_ends = self
            .grid
            .iter()
            .filter(|(position, tile)| tile.kind == kind && self.is_dead_end(*position))
            .map(|(position, _)| position)
            .collect::<Vec<_>>();

        dead_ends.shuffle(&mut self.rng);
        dead_ends
    }
}

#[cfg(test)]
mod test {
    use super::super::GenerationConfig;
    use super::*;
    use crate::types::RegionId;

    fn prepared(width: u32, height: u32, dead_ends: u32) -> MapGenerator {
        let mut generator = MapGenerator::new();
        generator.reset(GenerationConfig {
            width,
            height,
            dead_ends,
            ..Default::default()
        });
        generator
    }

    fn carve(generator: &mut MapGenerator, cells: &[(i32, i32)], kind: TileKind, region: RegionId) {
        for (x, y) in cells {
            generator.set_tile(Position::new(*x, *y), kind, region).unwrap();
        }
    }

    // A room with a door opening onto a corridor with a side branch:
    //
    //   RRR+hhhh
    //   ######h#
    //   ######h#
    fn branching_corridor(dead_ends: u32) -> MapGenerator {
        let mut generator = prepared(8, 3, dead_ends);
        let room = generator.regions.add("room#0");
        carve(&mut generator, &[(0, 0), (1, 0), (2, 0)], TileKind::Room, room);
        carve(&mut generator, &[(3, 0)], TileKind::Door, room);
        carve(
            &mut generator,
            &[(4, 0), (5, 0), (6, 0), (7, 0), (6, 1), (6, 2)],
            TileKind::Hallway,
            room,
        );
        generator
    }

    #[test]
    fn test_all_dead_ends_are_removed() {
        let mut generator = branching_corridor(0);
        generator.remove_dead_ends().unwrap();

        assert_eq!(generator.grid().count(TileKind::Hallway), 0);
        assert_eq!(generator.report.dead_ends_removed, 6);

        // The door led into the removed corridor
        assert_eq!(generator.grid().count(TileKind::Door), 0);
        assert_eq!(generator.report.dangling_doors_removed, 1);
        assert_eq!(generator.grid().count(TileKind::Room), 3);
    }

    #[test]
    fn test_requested_dead_ends_are_kept() {
        let mut generator = branching_corridor(2);
        generator.remove_dead_ends().unwrap();

        assert_eq!(generator.report.dead_ends_removed, 0);
        assert_eq!(generator.grid().count(TileKind::Hallway), 6);
        assert_eq!(generator.grid().count(TileKind::Door), 1);

        let mut generator = branching_corridor(1);
        generator.remove_dead_ends().unwrap();

        let dead_ends = generator
            .grid()
            .iter()
            .filter(|(position, tile)| {
                tile.kind == TileKind::Hallway && generator.is_dead_end(*position)
            })
            .count();
        assert_eq!(dead_ends, 1);
        assert_eq!(generator.grid().count(TileKind::Door), 1);
    }

    #[test]
    fn test_is_dead_end() {
        let generator = branching_corridor(0);

        assert!(generator.is_dead_end(Position::new(7, 0)));
        assert!(generator.is_dead_end(Position::new(6, 2)));
        assert!(!generator.is_dead_end(Position::new(6, 0)));
        assert!(!generator.is_dead_end(Position::new(4, 0)));
        assert!(!generator.is_dead_end(Position::new(3, 0)));
    }
}
