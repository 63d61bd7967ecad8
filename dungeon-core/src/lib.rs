mod algos;
mod constants;
mod region_table;
mod tile_grid;
mod types;

use tracing::{Level, span};

pub use algos::{
    GenerationConfig, GenerationObserver, GenerationReport, MapGenerator, ProgressHandle,
};
pub use region_table::{RegionError, RegionTable};
pub use tile_grid::TileGrid;
pub use types::{Bounds, Direction, Position, RegionId, Tile, TileKind};

/// Generates a single map and hands back its grid, region table and report.
pub fn create_map(
    config: GenerationConfig,
) -> Result<(TileGrid, RegionTable, GenerationReport), RegionError> {
    let span = span!(Level::DEBUG, "create_map");
    let _guard = span.enter();

    let mut generator = MapGenerator::new();
    let report = generator.generate(config)?;
    let (grid, regions) = generator.into_parts();

    Ok((grid, regions, report))
}
