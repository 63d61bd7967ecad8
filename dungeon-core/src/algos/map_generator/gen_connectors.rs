use super::MapGenerator;
use crate::{
    region_table::RegionError,
    types::{Connector, Direction, Position, RegionId, TileKind},
};

use rand::seq::IndexedRandom;
use tracing::event;

// Opposite neighbour pairs checked for every wall, horizontal pair first.
const CONNECTOR_AXES: [(Direction, Direction); 2] = [
    (Direction::East, Direction::West),
    (Direction::North, Direction::South),
];

impl MapGenerator {
    /// Marks every wall that separates two different regions, at least one
    /// of them a room, as a connector and picks the root room.
    pub(super) fn generate_connectors(&mut self) -> Result<(), RegionError> {
        self.root_region = self.select_root_region();

        let positions = self.grid.bounds().positions().collect::<Vec<_>>();
        for position in positions {
            let Some(connector) = self.new_connector_at(position) else {
                continue;
            };

            let (first, second) = connector.regions;
            self.set_tile(position, TileKind::Connector, first)?;
            self.add_connector_for_region(first, connector);
            self.add_connector_for_region(second, connector);
            self.report.connectors += 1;
        }

        event!(
            tracing::Level::INFO,
            "Found {} connectors between {} regions",
            self.report.connectors,
            self.connectors.len()
        );

        Ok(())
    }

    // Every room cell has the same chance of being picked, so bigger rooms
    // are more likely to become the root.
    fn select_root_region(&mut self) -> Option<RegionId> {
        let room_cells = self
            .grid
            .tiles()
            .iter()
            .filter(|tile| tile.kind == TileKind::Room)
            .map(|tile| tile.region)
            .collect::<Vec<_>>();

        match room_cells.choose(&mut self.rng).copied() {
            Some(root) => {
                event!(
                    tracing::Level::INFO,
                    "Region {} [{}] selected as root",
                    root,
                    self.regions.name(root).unwrap_or("unknown")
                );
                Some(root)
            }
            None => {
                event!(
                    tracing::Level::WARN,
                    "No rooms were placed, regions will be left unconnected"
                );
                None
            }
        }
    }

    pub(super) fn new_connector_at(&self, position: Position) -> Option<Connector> {
        if self.grid.kind_at(position) != TileKind::Wall {
            return None;
        }

        CONNECTOR_AXES.iter().find_map(|(towards, away)| {
            let first = self.grid.get_at_direction(position, *towards, 1);
            let second = self.grid.get_at_direction(position, *away, 1);

            let connectable = matches!(
                (first.kind, second.kind),
                (TileKind::Hallway, TileKind::Room)
                    | (TileKind::Room, TileKind::Hallway)
                    | (TileKind::Room, TileKind::Room)
            );

            (connectable && first.region != second.region)
                .then(|| Connector::new(position, first.region, second.region))
        })
    }

    fn add_connector_for_region(&mut self, region: RegionId, connector: Connector) {
        self.connectors
            .entry(region)
            .or_default()
            .push_back(connector);
    }
}
