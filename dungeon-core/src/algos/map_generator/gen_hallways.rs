use super::MapGenerator;
use crate::{
    constants::MAZE_STRIDE,
    region_table::RegionError,
    types::{Direction, Position, TileKind},
};

use rand::seq::{IndexedRandom, SliceRandom};
use tracing::event;

// Order in which a hunt looks for uncarved cells next to a hallway.
const HUNT_DIRECTIONS: [Direction; 4] = [
    Direction::West,
    Direction::East,
    Direction::North,
    Direction::South,
];

impl MapGenerator {
    /// Fills the space around the rooms with hallways, carving a
    /// hunt-and-kill maze on every even cell that is still a wall.
    pub(super) fn generate_hallways(&mut self) -> Result<(), RegionError> {
        let seeds = self
            .maze_cells()
            .filter(|position| self.grid.kind_at(*position) == TileKind::Wall)
            .collect::<Vec<_>>();

        match seeds.choose(&mut self.rng).copied() {
            Some(seed) => self.start_walking(seed)?,
            None => {
                event!(tracing::Level::DEBUG, "No room left for hallways");
                return Ok(());
            }
        }

        while self.scan_for_walls()? {}

        event!(
            tracing::Level::INFO,
            "Carved {} hallway regions",
            self.report.hallway_regions
        );

        Ok(())
    }

    fn maze_cells(&self) -> impl Iterator<Item = Position> + use<> {
        let width = self.grid.width() as i32;

        self.maze_rows().into_iter().flat_map(move |y| {
            (0..width)
                .step_by(MAZE_STRIDE as usize)
                .map(move |x| Position::new(x, y))
        })
    }

    fn maze_rows(&self) -> Vec<i32> {
        (0..self.grid.height() as i32)
            .step_by(MAZE_STRIDE as usize)
            .collect()
    }

    // Walks and hunts from `location` until nothing reachable is left to carve.
    fn start_walking(&mut self, mut location: Position) -> Result<(), RegionError> {
        self.current_region = self
            .regions
            .add(format!("hallway#{}", self.report.hallway_regions));
        self.report.hallway_regions += 1;

        self.set_tile(location, TileKind::Hallway, self.current_region)?;
        self.render_step();

        loop {
            if self.maze_walk(&mut location)? {
                continue;
            }

            if !self.maze_hunt(&mut location)? {
                break;
            }
        }

        Ok(())
    }

    /// Carves one stride towards a random uncarved neighbour. Returns false
    /// when `location` is a dead end.
    pub(super) fn maze_walk(&mut self, location: &mut Position) -> Result<bool, RegionError> {
        for direction in self.shuffled_directions() {
            if self
                .grid
                .get_at_direction(*location, direction, MAZE_STRIDE)
                .kind
                == TileKind::Wall
            {
                self.carve_to_direction(location, direction, MAZE_STRIDE, TileKind::Hallway)?;
                self.render_step();
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Looks, row by shuffled row, for a hallway cell next to an uncarved one
    /// and carves into it. The walk then resumes from the newly carved cell.
    pub(super) fn maze_hunt(&mut self, location: &mut Position) -> Result<bool, RegionError> {
        let mut rows = self.maze_rows();
        rows.shuffle(&mut self.rng);

        let width = self.grid.width() as i32;

        for y in rows {
            for x in (0..width).step_by(MAZE_STRIDE as usize) {
                let position = Position::new(x, y);
                let tile = self.grid.get(position);

                if tile.kind != TileKind::Hallway {
                    continue;
                }

                for direction in HUNT_DIRECTIONS {
                    if self
                        .grid
                        .get_at_direction(position, direction, MAZE_STRIDE)
                        .kind
                        == TileKind::Wall
                    {
                        *location = position;
                        self.current_region = tile.region;
                        self.carve_to_direction(
                            location,
                            direction,
                            MAZE_STRIDE,
                            TileKind::Hallway,
                        )?;
                        self.render_step();
                        return Ok(true);
                    }
                }
            }
        }

        Ok(false)
    }

    /// Starts a new maze on every even wall cell found in shuffled row
    /// order. Returns whether any maze was started.
    pub(super) fn scan_for_walls(&mut self) -> Result<bool, RegionError> {
        let mut rows = self.maze_rows();
        rows.shuffle(&mut self.rng);

        let width = self.grid.width() as i32;
        let mut found = false;

        for y in rows {
            for x in (0..width).step_by(MAZE_STRIDE as usize) {
                let position = Position::new(x, y);

                if self.grid.kind_at(position) == TileKind::Wall {
                    found = true;
                    self.start_walking(position)?;
                }
            }
        }

        Ok(found)
    }
}

#[cfg(test)]
mod test {
    use super::super::GenerationConfig;
    use super::*;
    use crate::types::{RegionId, Tile};

    fn prepared(width: u32, height: u32) -> MapGenerator {
        let mut generator = MapGenerator::new();
        generator.reset(GenerationConfig {
            width,
            height,
            room_attempts: 0,
            ..Default::default()
        });
        generator
    }

    #[test]
    fn test_maze_without_rooms_is_a_single_region() {
        let mut generator = prepared(21, 15);
        generator.generate_hallways().unwrap();

        assert_eq!(generator.report.hallway_regions, 1);
        assert_eq!(generator.regions().region_count(), 1);

        let region = generator.regions().regions()[1];
        assert_eq!(generator.regions().name(region).unwrap(), "hallway#0");

        // A perfect maze over an 11x8 lattice is a tree of 88 cells joined
        // by 87 carved links
        assert_eq!(generator.grid().count(TileKind::Hallway), 88 + 87);
    }

    #[test]
    fn test_maze_walk_stops_at_dead_ends() {
        let mut generator = prepared(3, 3);
        generator.current_region = generator.regions.add("hallway#0");

        let mut location = Position::new(0, 0);
        generator
            .set_tile(location, TileKind::Hallway, generator.current_region)
            .unwrap();

        assert!(generator.maze_walk(&mut location).unwrap());
        assert_ne!(location, Position::new(0, 0));
        assert_eq!(location.x % 2, 0);
        assert_eq!(location.y % 2, 0);

        // Every other corner can still be reached through the hunt
        while generator.maze_walk(&mut location).unwrap() {}
        while generator.maze_hunt(&mut location).unwrap() {
            while generator.maze_walk(&mut location).unwrap() {}
        }

        for corner in [(0, 0), (2, 0), (0, 2), (2, 2)] {
            assert_eq!(
                generator.grid().kind_at(Position::new(corner.0, corner.1)),
                TileKind::Hallway
            );
        }
        assert_eq!(generator.grid().kind_at(Position::new(1, 1)), TileKind::Wall);
    }

    #[test]
    fn test_hunt_continues_the_region_it_starts_from() {
        let mut generator = prepared(5, 1);
        let first = generator.regions.add("hallway#0");
        let second = generator.regions.add("hallway#1");

        generator
            .set_tile(Position::new(0, 0), TileKind::Hallway, first)
            .unwrap();
        generator.current_region = second;

        let mut location = Position::new(4, 0);
        assert!(generator.maze_hunt(&mut location).unwrap());

        assert_eq!(location, Position::new(2, 0));
        assert_eq!(
            generator.grid().get(Position::new(1, 0)),
            Tile::new(TileKind::Hallway, first)
        );
        assert_eq!(generator.current_region, first);
        assert_ne!(generator.current_region, RegionId::WALL);
    }

    #[test]
    fn test_scan_for_walls_starts_new_regions() {
        let mut generator = prepared(5, 5);
        let room = generator.regions.add("room#0");

        // A wall of room cells splits the lattice in two halves
        for y in 0..5 {
            generator
                .set_tile(Position::new(2, y), TileKind::Room, room)
                .unwrap();
        }

        assert!(generator.scan_for_walls().unwrap());
        assert_eq!(generator.report.hallway_regions, 2);
        assert!(!generator.scan_for_walls().unwrap());

        let left = generator.grid().get(Position::new(0, 0)).region;
        let right = generator.grid().get(Position::new(4, 4)).region;
        assert_ne!(left, right);
        assert_eq!(generator.grid().get(Position::new(0, 4)).region, left);
        assert_eq!(generator.grid().get(Position::new(4, 0)).region, right);
    }
}
