pub mod config;
pub mod control_pad;
pub mod entity;
pub mod error;
pub mod game;
pub mod renderer;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli_renderer;

#[cfg(target_arch = "wasm32")]
pub mod web_renderer;
#[cfg(target_arch = "wasm32")]
mod web_main;

pub use config::GameConfig;
pub use entity::{Direction, Position};
pub use error::ConfigError;
pub use game::{Cell, Game, GameState, Snapshot};
pub use renderer::{Input, Renderer};

#[cfg(not(target_arch = "wasm32"))]
pub use cli_renderer::CliRenderer;
#[cfg(target_arch = "wasm32")]
pub use web_renderer::WebRenderer;
#[cfg(target_arch = "wasm32")]
pub use web_main::start_game;
