use super::MapGenerator;
use crate::{
    constants::{DIRECTIONS, DOOR_CLEARANCE, PER_MILLE, WALL_REGION},
    region_table::RegionError,
    types::{Connector, Position, RegionId, TileKind},
};

use std::collections::BTreeSet;

use rand::{Rng, seq::SliceRandom};
use tracing::event;

impl MapGenerator {
    /// Grows the root room into every other region, one door at a time,
    /// until a single region is left or the root runs out of connectors.
    pub(super) fn connect_regions(&mut self) -> Result<(), RegionError> {
        let Some(root) = self.root_region else {
            event!(
                tracing::Level::WARN,
                "Skipping region connection, no root region"
            );
            self.sweep_unused_connectors()?;
            return Ok(());
        };

        for connectors in self.connectors.values_mut() {
            connectors.make_contiguous().shuffle(&mut self.rng);
        }

        // Regions that already received a door on top of the one that merged them
        let mut extra_connections = BTreeSet::new();

        while self.regions.region_count() > 1 {
            let Some(connector) = self.connectors.get_mut(&root).and_then(|c| c.pop_front())
            else {
                event!(
                    tracing::Level::WARN,
                    "Root region ran out of connectors with {} regions left unconnected",
                    self.regions.region_count() - 1
                );
                break;
            };

            let still_connector = self.grid.kind_at(connector.position) == TileKind::Connector;
            let is_root_merge = connector.touches(root);
            let target = connector.other_than(root);
            let has_extra_door = extra_connections.contains(&connector.origin.0)
                || extra_connections.contains(&connector.origin.1);
            let will_allow_extra_door =
                self.rng.random_range(0..PER_MILLE) < self.config.extra_connector_chance;
            let not_next_to_door = !self.is_next_to_door(connector.position);

            let will_merge = still_connector
                && is_root_merge
                && not_next_to_door
                && (target.is_some() || (!has_extra_door && will_allow_extra_door));

            if !will_merge {
                if still_connector {
                    self.set_tile(connector.position, TileKind::Wall, WALL_REGION)?;
                }
                continue;
            }

            self.set_tile(connector.position, TileKind::Door, root)?;
            self.report.doors += 1;

            match target {
                Some(region) => self.merge_into_root(region, root)?,
                None => {
                    event!(tracing::Level::TRACE, "Extra door at {}", connector);
                    extra_connections.extend(
                        [connector.origin.0, connector.origin.1]
                            .into_iter()
                            .filter(|region| *region != root),
                    );
                    self.report.extra_doors += 1;
                }
            }

            self.render_step();
        }

        self.sweep_unused_connectors()?;

        event!(
            tracing::Level::INFO,
            "Placed {} doors ({} extra), {} regions left",
            self.report.doors,
            self.report.extra_doors,
            self.regions.region_count()
        );

        Ok(())
    }

    /// Tests whether a door lies within [`DOOR_CLEARANCE`] tiles of
    /// `position` along any axis.
    pub(super) fn is_next_to_door(&self, position: Position) -> bool {
        DIRECTIONS.iter().any(|direction| {
            (1..=DOOR_CLEARANCE).any(|distance| {
                self.grid.get_at_direction(position, *direction, distance).kind == TileKind::Door
            })
        })
    }

    // Folds `region` into root and hands its connectors over. Connectors
    // that led from `region` to root are dropped, root already holds them.
    fn merge_into_root(&mut self, region: RegionId, root: RegionId) -> Result<(), RegionError> {
        let rewritten = self.regions.remove(region, root, &mut self.grid)?;

        event!(
            tracing::Level::DEBUG,
            "Merged region {} into root, {} tiles rewritten",
            region,
            rewritten
        );

        let inherited = self.connectors.remove(&region).unwrap_or_default();

        for connectors in self.connectors.values_mut() {
            for connector in connectors.iter_mut() {
                connector.recolor(region, root);
            }
        }

        let root_connectors = self.connectors.entry(root).or_default();
        for mut connector in inherited {
            if connector.touches(root) {
                continue;
            }

            connector.recolor(region, root);
            root_connectors.push_back(connector);
        }

        Ok(())
    }

    // Connectors that never became doors go back to being walls.
    fn sweep_unused_connectors(&mut self) -> Result<(), RegionError> {
        let leftovers = std::mem::take(&mut self.connectors)
            .into_values()
            .flatten()
            .map(|connector: Connector| connector.position)
            .collect::<BTreeSet<_>>();

        for position in leftovers {
            if self.grid.kind_at(position) == TileKind::Connector {
                self.set_tile(position, TileKind::Wall, WALL_REGION)?;
            }
        }

        Ok(())
    }
}
