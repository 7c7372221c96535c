use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::error::GameError;
use super::grid::Grid;

/// Configuration for the game
///
/// Every field has a default, so a partial JSON config file only needs to
/// list the options it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,

    /// Speed at the start of the first session
    pub initial_speed: u32,
    /// Lowest speed reachable with speed-down
    pub min_speed: u32,
    /// Highest speed reachable with speed-up
    pub max_speed: u32,
    /// Ticks per second at speed zero; the tick rate is `base_tick_rate + speed`
    pub base_tick_rate: u32,

    // Food rewards
    /// Points for ordinary food
    pub ordinary_points: u32,
    /// Points for bonus food
    pub bonus_points: u32,
    /// Chance that a freshly spawned food item is bonus food
    pub bonus_probability: f64,

    /// Fixed RNG seed for reproducible food placement
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 15,
            initial_speed: 8,
            min_speed: 1,
            max_speed: 20,
            base_tick_rate: 10,
            ordinary_points: 1,
            bonus_points: 5,
            bonus_probability: 0.1,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Load a configuration from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))
    }

    /// Same configuration with a fixed RNG seed
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    /// Validate configuration parameters
    ///
    /// Returns the grid described by the configuration so callers don't have
    /// to re-check the dimensions.
    pub fn validate(&self) -> Result<Grid, GameError> {
        let grid = Grid::new(self.grid_width, self.grid_height)?;

        if self.min_speed == 0 || self.min_speed > self.max_speed {
            return Err(GameError::InvalidSpeedRange {
                min: self.min_speed,
                max: self.max_speed,
            });
        }

        if !(self.min_speed..=self.max_speed).contains(&self.initial_speed) {
            return Err(GameError::InitialSpeedOutOfRange {
                speed: self.initial_speed,
                min: self.min_speed,
                max: self.max_speed,
            });
        }

        if !(0.0..=1.0).contains(&self.bonus_probability) {
            return Err(GameError::InvalidBonusProbability(self.bonus_probability));
        }

        // A tick rate above 1 GHz rounds to a zero-length interval
        if self.base_tick_rate.checked_add(self.max_speed).is_none()
            || self.tick_interval(self.max_speed).is_zero()
        {
            return Err(GameError::InvalidTickRate);
        }

        Ok(grid)
    }

    /// Clamp a speed into the configured range
    pub fn clamp_speed(&self, speed: i64) -> u32 {
        speed.clamp(self.min_speed as i64, self.max_speed as i64) as u32
    }

    /// Time between ticks at the given speed
    pub fn tick_interval(&self, speed: u32) -> Duration {
        let rate = self.base_tick_rate.saturating_add(speed).max(1);
        Duration::from_secs(1) / rate
    }
}
