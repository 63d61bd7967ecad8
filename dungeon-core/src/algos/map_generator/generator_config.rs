use crate::constants::{
    DEFAULT_DEAD_ENDS, DEFAULT_EXTRA_CONNECTOR_CHANCE, DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH,
    DEFAULT_ROOM_ATTEMPTS, DEFAULT_ROOM_MAX, DEFAULT_ROOM_MIN, DEFAULT_ROOM_RATIO_MAX,
    DEFAULT_ROOM_RATIO_MIN, DEFAULT_SEED, PER_MILLE,
};

use std::time::Duration;

use anyhow::{Result, bail, ensure};
use serde::{Deserialize, Serialize};
use tracing::event;

#[cfg_attr(feature = "cli", derive(clap::Args))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Width of the map in tiles
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_MAP_WIDTH))]
    pub width: u32,
    /// Height of the map in tiles
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_MAP_HEIGHT))]
    pub height: u32,
    /// Seed used to generate the map
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_SEED))]
    pub seed: u64,
    /// Minimum number of tiles a room spans in either dimension
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_ROOM_MIN))]
    pub room_min: u32,
    /// Maximum number of tiles a room spans in either dimension
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_ROOM_MAX))]
    pub room_max: u32,
    /// Smallest accepted width:height ratio of a room
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_ROOM_RATIO_MIN))]
    pub room_ratio_min: f32,
    /// Largest accepted width:height ratio of a room
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_ROOM_RATIO_MAX))]
    pub room_ratio_max: f32,
    /// Number of times the generator tries to place a room
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_ROOM_ATTEMPTS))]
    pub room_attempts: u32,
    /// Chance, per mille, of opening an extra door into an already connected region
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_EXTRA_CONNECTOR_CHANCE))]
    pub extra_connector_chance: u32,
    /// Number of hallway dead ends to leave in the map
    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_DEAD_ENDS))]
    pub dead_ends: u32,
    /// Milliseconds to pause after every carving step, for progressive rendering
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0))]
    pub step_delay_ms: u64,
    /// Generate stairs (reserved, not produced by the generator)
    #[cfg_attr(feature = "cli", arg(long))]
    pub stairs: bool,
    /// Generate egress on the map edge (reserved, not produced by the generator)
    #[cfg_attr(feature = "cli", arg(long))]
    pub edge_egress: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            width: DEFAULT_MAP_WIDTH,
            height: DEFAULT_MAP_HEIGHT,
            seed: DEFAULT_SEED,
            room_min: DEFAULT_ROOM_MIN,
            room_max: DEFAULT_ROOM_MAX,
            room_ratio_min: DEFAULT_ROOM_RATIO_MIN,
            room_ratio_max: DEFAULT_ROOM_RATIO_MAX,
            room_attempts: DEFAULT_ROOM_ATTEMPTS,
            extra_connector_chance: DEFAULT_EXTRA_CONNECTOR_CHANCE,
            dead_ends: DEFAULT_DEAD_ENDS,
            step_delay_ms: 0,
            stairs: false,
            edge_egress: false,
        }
    }
}

impl GenerationConfig {
    pub fn step_delay(&self) -> Option<Duration> {
        (self.step_delay_ms > 0).then(|| Duration::from_millis(self.step_delay_ms))
    }

    /// Reports the first setting that generation would have to degrade
    /// around. Generation itself never fails on these.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0 && self.height > 0,
            "map dimensions must be greater than zero, got {}x{}",
            self.width,
            self.height
        );
        ensure!(self.room_min > 0, "room_min must be greater than zero");
        ensure!(
            self.room_min <= self.room_max,
            "room_min ({}) is larger than room_max ({})",
            self.room_min,
            self.room_max
        );
        ensure!(
            self.room_min <= self.width && self.room_min <= self.height,
            "rooms of at least {} tiles cannot fit a {}x{} map",
            self.room_min,
            self.width,
            self.height
        );
        if !(self.room_ratio_min > 0.0 && self.room_ratio_min <= self.room_ratio_max) {
            bail!(
                "invalid room ratio window [{}, {}]",
                self.room_ratio_min,
                self.room_ratio_max
            );
        }
        ensure!(
            self.extra_connector_chance <= PER_MILLE,
            "extra_connector_chance is per mille and cannot exceed {}",
            PER_MILLE
        );

        Ok(())
    }

    pub(crate) fn normalized(&self) -> GenerationConfig {
        let mut config = self.clone();

        if config.room_min > config.room_max {
            event!(
                tracing::Level::WARN,
                "Swapping room_min ({}) and room_max ({})",
                config.room_min,
                config.room_max
            );
            std::mem::swap(&mut config.room_min, &mut config.room_max);
        }

        if config.room_min == 0 {
            event!(tracing::Level::WARN, "Raising room_min from 0 to 1");
            config.room_min = 1;
            config.room_max = config.room_max.max(1);
        }

        if config.room_ratio_min > config.room_ratio_max {
            event!(
                tracing::Level::WARN,
                "Swapping room ratio bounds [{}, {}]",
                config.room_ratio_min,
                config.room_ratio_max
            );
            std::mem::swap(&mut config.room_ratio_min, &mut config.room_ratio_max);
        }

        if config.extra_connector_chance > PER_MILLE {
            event!(
                tracing::Level::WARN,
                "Clamping extra_connector_chance {} to {}",
                config.extra_connector_chance,
                PER_MILLE
            );
            config.extra_connector_chance = PER_MILLE;
        }

        if config.width == 0 || config.height == 0 {
            event!(
                tracing::Level::WARN,
                "Generating an empty {}x{} map",
                config.width,
                config.height
            );
        } else if config.room_min > config.width || config.room_min > config.height {
            event!(
                tracing::Level::WARN,
                "Rooms of at least {} tiles cannot fit a {}x{} map, no rooms will be placed",
                config.room_min,
                config.width,
                config.height
            );
        }

        if config.stairs || config.edge_egress {
            event!(
                tracing::Level::WARN,
                "Stairs and edge egress are left to map consumers and will not be generated"
            );
        }

        config
    }
}
