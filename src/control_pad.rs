//! Touch input geometry for the browser front-end: swipe classification and
//! the on-screen four-button pad drawn under the board.
//!
//! Kept free of any browser types so the layout can be tested natively.

use crate::entity::Direction;

/// Minimum distance in pixels to register a swipe
pub const SWIPE_THRESHOLD: f64 = 30.0;

const BUTTON_SIZE: f64 = 56.0;
const BUTTON_GAP: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Button {
    pub direction: Direction,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl Button {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.size && y >= self.y && y < self.y + self.size
    }

    pub fn label(&self) -> &'static str {
        match self.direction {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

/// UP on top, LEFT and RIGHT side by side, DOWN at the bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPad {
    pub buttons: [Button; 4],
}

impl ControlPad {
    /// Lays the pad out centred horizontally in `area_width`, starting at `top`.
    pub fn new(area_width: f64, top: f64) -> Self {
        let step = BUTTON_SIZE + BUTTON_GAP;
        let center_x = area_width / 2.0 - BUTTON_SIZE / 2.0;

        let button = |direction, x, y| Button {
            direction,
            x,
            y,
            size: BUTTON_SIZE,
        };

        Self {
            buttons: [
                button(Direction::Up, center_x, top),
                button(Direction::Left, center_x - step, top + step),
                button(Direction::Right, center_x + step, top + step),
                button(Direction::Down, center_x, top + 2.0 * step),
            ],
        }
    }

    pub fn width() -> f64 {
        3.0 * BUTTON_SIZE + 2.0 * BUTTON_GAP
    }

    pub fn height() -> f64 {
        3.0 * BUTTON_SIZE + 2.0 * BUTTON_GAP
    }

    pub fn hit_test(&self, x: f64, y: f64) -> Option<Direction> {
        self.buttons
            .iter()
            .find(|button| button.contains(x, y))
            .map(|button| button.direction)
    }
}

/// Direction of a swipe from its start to end displacement, or `None` if it
/// was too short to count. The larger axis wins.
pub fn swipe_direction(dx: f64, dy: f64, threshold: f64) -> Option<Direction> {
    let abs_dx = dx.abs();
    let abs_dy = dy.abs();

    if abs_dx <= threshold && abs_dy <= threshold {
        return None;
    }

    if abs_dx > abs_dy {
        if dx > 0.0 {
            Some(Direction::Right)
        } else {
            Some(Direction::Left)
        }
    } else if dy > 0.0 {
        Some(Direction::Down)
    } else {
        Some(Direction::Up)
    }
}
