//! Board interaction layer: what to draw, and what a gesture means.

mod board;
mod cursor;
mod intent;

pub use board::{Activity, BoardView, CellView, GameView, StepView, SubBoardView};
pub use cursor::{BoardCursor, Direction};
pub use intent::Intent;
