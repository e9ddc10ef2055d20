use crate::entity::Position;
use crate::error::ConfigError;
use std::time::Duration;

pub const MIN_GRID_SIZE: i32 = 2;

// Timer period at speed 1; higher speeds divide it.
const BASE_TICK_INTERVAL_MS: u64 = 400;

/// Everything needed to build (and rebuild on reset) a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Side of the square grid
    pub grid_size: i32,
    pub initial_head: Position,
    pub initial_food: Position,
    /// How often the driver should call `tick()`. The engine never reads it.
    pub tick_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            initial_head: Position::new(2, 2),
            initial_food: Position::new(10, 10),
            tick_interval: Self::interval_for_speed(1),
        }
    }
}

impl GameConfig {
    pub fn new(grid_size: i32) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    pub fn with_head(mut self, head: Position) -> Self {
        self.initial_head = head;
        self
    }

    pub fn with_food(mut self, food: Position) -> Self {
        self.initial_food = food;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_speed(self, speed: u32) -> Self {
        self.with_tick_interval(Self::interval_for_speed(speed))
    }

    /// Speed 1 ticks every 400ms, speed 2 every 200ms, and so on.
    /// Speed 0 is treated as 1.
    pub fn interval_for_speed(speed: u32) -> Duration {
        Duration::from_millis(BASE_TICK_INTERVAL_MS / u64::from(speed.max(1)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall { size: self.grid_size });
        }

        for (what, position) in [("head", self.initial_head), ("food", self.initial_food)] {
            if !position.is_within(self.grid_size) {
                return Err(ConfigError::OutOfBounds {
                    what,
                    position,
                    grid_size: self.grid_size,
                });
            }
        }

        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }

        Ok(())
    }
}
