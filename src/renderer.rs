use crate::entity::Direction;
use crate::game::Snapshot;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Direction(Direction),
    Quit,
    Restart,
    Tap, // Touch tap outside the control pad - restarts a finished game
}

/// Presentation side of the game: draws snapshots and turns user actions
/// into [`Input`] events. Implemented by the terminal and browser front-ends.
pub trait Renderer {
    /// Initialize the renderer
    fn init(&mut self) -> io::Result<()>;

    /// Draw one frame from a state snapshot
    fn render(&mut self, snapshot: &Snapshot) -> io::Result<()>;

    /// Clean up and restore terminal/display state
    fn cleanup(&mut self) -> io::Result<()>;

    /// Poll for input from the user
    fn poll_input(&mut self) -> io::Result<Option<Input>>;
}
