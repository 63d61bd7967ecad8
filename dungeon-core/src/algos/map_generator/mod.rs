use crate::{
    algos::{GeneratorRng, RngHandler},
    constants::{
        DIRECTIONS, PROGRESS_COMPLETE, PROGRESS_CONNECTORS_DONE, PROGRESS_HALLWAYS_DONE,
        PROGRESS_REGIONS_DONE, PROGRESS_ROOMS_DONE, WALL_REGION,
    },
    region_table::{RegionError, RegionTable},
    tile_grid::TileGrid,
    types::{Connector, Direction, Position, RegionId, TileKind},
};

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{Level, event, span};

mod connect_regions;
mod gen_connectors;
mod gen_hallways;
mod gen_rooms;
mod generator_config;
mod remove_dead_ends;

pub use generator_config::GenerationConfig;

/// Receives the grid after every carving step, so a renderer can show the
/// map while it is being generated.
pub trait GenerationObserver {
    fn on_step(&mut self, grid: &TileGrid, progress: f32);
}

impl<F> GenerationObserver for F
where
    F: FnMut(&TileGrid, f32),
{
    fn on_step(&mut self, grid: &TileGrid, progress: f32) {
        self(grid, progress)
    }
}

/// A cloneable view on the progress of a [`MapGenerator`], readable from
/// other threads while a generation run is in flight.
#[derive(Debug, Clone)]
pub struct ProgressHandle(Arc<AtomicU32>);

impl ProgressHandle {
    fn new(fraction: f32) -> Self {
        ProgressHandle(Arc::new(AtomicU32::new(fraction.to_bits())))
    }

    pub fn fraction(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn publish(&self, fraction: f32) {
        self.0.store(fraction.to_bits(), Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub rooms: usize,
    pub hallway_regions: usize,
    pub connectors: usize,
    pub doors: usize,
    pub extra_doors: usize,
    pub dead_ends_removed: usize,
    pub dangling_doors_removed: usize,
    pub regions_remaining: usize,
    /// False when some regions could not be reached from the root region.
    pub fully_connected: bool,
}

/// Generates maps made of rooms, maze-like hallways and the doors joining
/// them, in five phases:
///
/// 1. rooms are scattered over the grid with a one tile wall between them,
/// 2. the remaining space is filled with hallways,
/// 3. every wall separating two regions is marked as a connector,
/// 4. connectors are turned into doors until every region is reachable
///    from a single root room,
/// 5. hallway dead ends and dangling doors are filled back in.
pub struct MapGenerator {
    config: GenerationConfig,
    rng: GeneratorRng,
    grid: TileGrid,
    regions: RegionTable,
    root_region: Option<RegionId>,
    current_region: RegionId,
    // Connectors touching each region, so the connectors of a merged
    // region can be handed over to the region that absorbed it.
    connectors: BTreeMap<RegionId, VecDeque<Connector>>,
    progress: ProgressHandle,
    observer: Option<Box<dyn GenerationObserver + Send>>,
    report: GenerationReport,
}

impl Default for MapGenerator {
    fn default() -> Self {
        MapGenerator::new()
    }
}

impl MapGenerator {
    pub fn new() -> Self {
        let config = GenerationConfig::default();

        MapGenerator {
            rng: RngHandler::seeded(config.seed),
            config,
            grid: TileGrid::default(),
            regions: RegionTable::default(),
            root_region: None,
            current_region: WALL_REGION,
            connectors: BTreeMap::new(),
            progress: ProgressHandle::new(PROGRESS_COMPLETE),
            observer: None,
            report: GenerationReport::default(),
        }
    }

    pub fn with_observer(mut self, observer: impl GenerationObserver + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Generates a new map from scratch. The same configuration (seed
    /// included) always yields the same map.
    ///
    /// # Errors
    ///
    /// A [`RegionError`] means the region bookkeeping got corrupted; maps that
    /// simply could not be fully connected are reported through
    /// [`GenerationReport::fully_connected`] instead.
    pub fn generate(&mut self, config: GenerationConfig) -> Result<GenerationReport, RegionError> {
        let span = span!(Level::DEBUG, "generate", seed = config.seed);
        let _guard = span.enter();

        let generation_start = std::time::Instant::now();

        self.reset(config);

        event!(
            Level::INFO,
            "Starting map generation. Seed {} size {}x{}",
            self.config.seed,
            self.config.width,
            self.config.height
        );

        self.generate_rooms()?;
        self.progress.publish(PROGRESS_ROOMS_DONE);

        self.generate_hallways()?;
        self.progress.publish(PROGRESS_HALLWAYS_DONE);

        self.generate_connectors()?;
        self.progress.publish(PROGRESS_CONNECTORS_DONE);

        self.connect_regions()?;
        self.progress.publish(PROGRESS_REGIONS_DONE);

        self.remove_dead_ends()?;

        self.report.regions_remaining = self.regions.region_count();
        self.report.fully_connected = self.report.regions_remaining <= 1;
        self.progress.publish(PROGRESS_COMPLETE);

        event!(
            Level::DEBUG,
            "Generated map with {} rooms and {} doors in {:.2}ms",
            self.report.rooms,
            self.report.doors - self.report.dangling_doors_removed,
            generation_start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(self.report.clone())
    }

    pub fn generation_progress(&self) -> f32 {
        self.progress.fraction()
    }

    pub fn progress_handle(&self) -> ProgressHandle {
        self.progress.clone()
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    pub fn root_region(&self) -> Option<RegionId> {
        self.root_region
    }

    pub fn into_parts(self) -> (TileGrid, RegionTable) {
        (self.grid, self.regions)
    }

    fn reset(&mut self, config: GenerationConfig) {
        self.progress.publish(0.0);

        self.config = config.normalized();
        self.rng = RngHandler::seeded(self.config.seed);
        self.grid = TileGrid::new(self.config.width, self.config.height);
        self.regions = RegionTable::new(self.config.width, self.config.height);
        self.root_region = None;
        self.current_region = WALL_REGION;
        self.connectors.clear();
        self.report = GenerationReport::default();
    }

    // Writes a tile and keeps the region table in sync with it.
    fn set_tile(
        &mut self,
        position: Position,
        kind: TileKind,
        region: RegionId,
    ) -> Result<(), RegionError> {
        self.regions.set(&self.grid, position, region)?;
        self.grid.set(position, kind, region);

        Ok(())
    }

    fn shuffled_directions(&mut self) -> [Direction; 4] {
        let mut directions = DIRECTIONS;
        directions.shuffle(&mut self.rng);
        directions
    }

    // Carves `distance` tiles from `location` towards `direction` with the
    // current region, leaving `location` on the last carved tile.
    fn carve_to_direction(
        &mut self,
        location: &mut Position,
        direction: Direction,
        distance: i32,
        kind: TileKind,
    ) -> Result<(), RegionError> {
        for step in 1..=distance {
            self.set_tile(location.offset(direction, step), kind, self.current_region)?;
        }

        *location = location.offset(direction, distance);

        Ok(())
    }

    fn render_step(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_step(&self.grid, self.progress.fraction());
        }

        if let Some(delay) = self.config.step_delay() {
            std::thread::sleep(delay);
        }
    }
}
