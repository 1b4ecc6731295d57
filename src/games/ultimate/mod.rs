//! Super tic-tac-toe: a 3x3 grid of 3x3 sub-boards.

mod types;

pub use types::{
    ActiveSubBoard, BOARD_SIZE, CellTarget, CellValue, GameId, GameState, Mark, Outcome,
    SubBoardState,
};
