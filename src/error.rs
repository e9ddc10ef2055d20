use crate::entity::Position;

/// Errors raised while validating a [`GameConfig`](crate::config::GameConfig).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid size {size} is too small, need at least 2")]
    GridTooSmall { size: i32 },

    #[error("{what} position {position} is outside the {grid_size}x{grid_size} grid")]
    OutOfBounds {
        what: &'static str,
        position: Position,
        grid_size: i32,
    },

    #[error("tick interval must be non-zero")]
    ZeroTickInterval,
}
