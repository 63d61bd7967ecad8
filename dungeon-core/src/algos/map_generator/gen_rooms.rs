use super::MapGenerator;
use crate::{
    region_table::RegionError,
    types::{Bounds, TileKind},
};

use rand::Rng;
use tracing::event;

impl MapGenerator {
    /// Scatters non-overlapping rooms over the grid. Rooms have odd sizes and
    /// even top-left corners, so their walls line up with the hallway lattice.
    pub(super) fn generate_rooms(&mut self) -> Result<(), RegionError> {
        let map_width = self.grid.width();
        let map_height = self.grid.height();

        let half_min = self.config.room_min / 2;
        let half_max = self.config.room_max / 2;

        let mut rejected_ratio = 0;
        let mut rejected_overlap = 0;

        for _ in 0..self.config.room_attempts {
            let room_width = self.rng.random_range(half_min..=half_max) * 2 + 1;
            let room_height = self.rng.random_range(half_min..=half_max) * 2 + 1;

            let ratio = room_width as f32 / room_height as f32;
            if ratio < self.config.room_ratio_min || ratio > self.config.room_ratio_max {
                rejected_ratio += 1;
                continue;
            }

            if room_width > map_width || room_height > map_height {
                rejected_overlap += 1;
                continue;
            }

            let room_x = self.rng.random_range(0..=(map_width - room_width) / 2) * 2;
            let room_y = self.rng.random_range(0..=(map_height - room_height) / 2) * 2;
            let room = Bounds::new(room_x as i32, room_y as i32, room_width, room_height);

            if self.room_exists(room) {
                rejected_overlap += 1;
                continue;
            }

            let region = self.regions.add(format!("room#{}", self.report.rooms));
            for position in room.positions() {
                self.set_tile(position, TileKind::Room, region)?;
            }
            self.report.rooms += 1;

            event!(tracing::Level::TRACE, "Placed room {} at {}", region, room);

            self.render_step();
        }

        event!(
            tracing::Level::INFO,
            "Placed {} rooms out of {} attempts ({} bad ratio, {} not fitting)",
            self.report.rooms,
            self.config.room_attempts,
            rejected_ratio,
            rejected_overlap
        );

        Ok(())
    }

    // Anything that is not wall within one tile of the room means it would
    // touch, or overlap, something already carved.
    pub(super) fn room_exists(&self, room: Bounds) -> bool {
        self.grid
            .contains_any(room.expanded_by(1), |tile| !tile.kind.is_blocking())
    }
}

#[cfg(test)]
mod test {
    use super::super::GenerationConfig;
    use super::*;
    use crate::types::Position;

    fn prepared(config: GenerationConfig) -> MapGenerator {
        let mut generator = MapGenerator::new();
        generator.reset(config);
        generator
    }

    #[test]
    fn test_rooms_are_odd_sized_on_even_corners() {
        let mut generator = prepared(GenerationConfig {
            width: 51,
            height: 51,
            seed: 9,
            ..Default::default()
        });
        generator.generate_rooms().unwrap();

        assert!(generator.report.rooms > 0);

        for region in generator.regions().regions().into_iter().skip(1) {
            let positions = generator.regions().positions(region).unwrap();
            let left = positions.iter().map(|p| p.x).min().unwrap();
            let right = positions.iter().map(|p| p.x).max().unwrap();
            let top = positions.iter().map(|p| p.y).min().unwrap();
            let bottom = positions.iter().map(|p| p.y).max().unwrap();

            let width = (right - left + 1) as u32;
            let height = (bottom - top + 1) as u32;

            assert_eq!(left % 2, 0);
            assert_eq!(top % 2, 0);
            assert_eq!(width % 2, 1);
            assert_eq!(height % 2, 1);
            assert!((3..=9).contains(&width));
            assert!((3..=9).contains(&height));
            assert_eq!(positions.len() as u32, width * height);
            assert!(generator.regions().name(region).unwrap().starts_with("room#"));
        }
    }

    #[test]
    fn test_room_exists_checks_the_border() {
        let mut generator = prepared(GenerationConfig {
            width: 11,
            height: 11,
            ..Default::default()
        });
        let region = generator.regions.add("room#0");
        generator
            .set_tile(Position::new(4, 4), TileKind::Room, region)
            .unwrap();

        assert!(generator.room_exists(Bounds::new(4, 4, 3, 3)));
        // Touching the border of the carved tile
        assert!(generator.room_exists(Bounds::new(5, 5, 3, 3)));
        assert!(generator.room_exists(Bounds::new(1, 1, 3, 3)));
        assert!(!generator.room_exists(Bounds::new(6, 6, 3, 3)));
        assert!(!generator.room_exists(Bounds::new(0, 0, 3, 1)));
    }

    #[test]
    fn test_rooms_larger_than_the_map_are_skipped() {
        let mut generator = prepared(GenerationConfig {
            width: 5,
            height: 5,
            room_min: 7,
            room_max: 9,
            room_attempts: 20,
            ..Default::default()
        });
        generator.generate_rooms().unwrap();

        assert_eq!(generator.report.rooms, 0);
        assert_eq!(generator.grid().count(TileKind::Room), 0);
    }

    #[test]
    fn test_room_ratio_window_is_honoured() {
        let mut generator = prepared(GenerationConfig {
            width: 61,
            height: 61,
            room_min: 3,
            room_max: 9,
            room_ratio_min: 1.0,
            room_ratio_max: 1.0,
            ..Default::default()
        });
        generator.generate_rooms().unwrap();

        for region in generator.regions().regions().into_iter().skip(1) {
            let count = generator.regions().position_count(region).unwrap();
            let side = (count as f64).sqrt() as usize;
            assert_eq!(side * side, count);
        }
    }
}
