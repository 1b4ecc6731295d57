//! Core domain types for super tic-tac-toe, as reported by the game server.
//!
//! The server encodes marks as signed integers (`1` for X, `-1` for O, `0` for
//! blank) and a drawn game as `2`. These types decode that encoding once at the
//! boundary so the rest of the client works with enums.

use std::num::NonZeroUsize;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Number of sub-boards on the outer board, and of cells in a sub-board.
pub const BOARD_SIZE: usize = 9;

/// Player in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Mark {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Mark {
    /// Symbol drawn on the board.
    pub fn symbol(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl TryFrom<i8> for Mark {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Mark::X),
            -1 => Ok(Mark::O),
            other => Err(format!("invalid player value {}", other)),
        }
    }
}

impl From<Mark> for i8 {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => 1,
            Mark::O => -1,
        }
    }
}

/// A cell on a sub-board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum CellValue {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Cell claimed by a player.
    Occupied(Mark),
}

impl CellValue {
    /// Symbol drawn for this cell; blank when empty.
    pub fn symbol(self) -> &'static str {
        match self {
            CellValue::Empty => "",
            CellValue::Occupied(mark) => mark.symbol(),
        }
    }

    /// Whether a player has claimed the cell.
    pub fn is_occupied(self) -> bool {
        matches!(self, CellValue::Occupied(_))
    }
}

impl TryFrom<i8> for CellValue {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CellValue::Empty),
            other => Mark::try_from(other)
                .map(CellValue::Occupied)
                .map_err(|_| format!("invalid cell value {}", other)),
        }
    }
}

impl From<CellValue> for i8 {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Empty => 0,
            CellValue::Occupied(mark) => mark.into(),
        }
    }
}

/// Result of a sub-board or of the whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Outcome {
    /// Still being played.
    #[default]
    InProgress,
    /// Won by a player.
    Won(Mark),
    /// Ended with nobody winning.
    Draw,
}

impl Outcome {
    /// Wire value the server uses for a drawn game.
    pub const DRAW_VALUE: i8 = 2;

    /// Whether the outcome is decided.
    pub fn is_decided(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// Whether this decided outcome matches a cell's value.
    pub fn claims(self, cell: CellValue) -> bool {
        matches!((self, cell), (Outcome::Won(w), CellValue::Occupied(m)) if w == m)
    }
}

impl TryFrom<i8> for Outcome {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Outcome::InProgress),
            Outcome::DRAW_VALUE => Ok(Outcome::Draw),
            other => Mark::try_from(other)
                .map(Outcome::Won)
                .map_err(|_| format!("invalid winner value {}", other)),
        }
    }
}

impl From<Outcome> for i8 {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::InProgress => 0,
            Outcome::Won(mark) => mark.into(),
            Outcome::Draw => Outcome::DRAW_VALUE,
        }
    }
}

/// Sub-board the next move must be played in.
///
/// Decoded from `currentSubBoard`: indices 0-8 pin a sub-board, while `null`,
/// a missing field, or any out-of-range value mean free choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "Option<i64>")]
pub enum ActiveSubBoard {
    /// Play is constrained to this sub-board.
    Board(u8),
    /// Any sub-board may be chosen.
    #[default]
    Any,
}

impl ActiveSubBoard {
    /// Whether a move in `sub_board` satisfies the constraint.
    pub fn permits(self, sub_board: u8) -> bool {
        match self {
            ActiveSubBoard::Board(index) => index == sub_board,
            ActiveSubBoard::Any => true,
        }
    }
}

impl From<Option<i64>> for ActiveSubBoard {
    fn from(value: Option<i64>) -> Self {
        match value {
            Some(index) if (0..BOARD_SIZE as i64).contains(&index) => {
                ActiveSubBoard::Board(index as u8)
            }
            _ => ActiveSubBoard::Any,
        }
    }
}

impl From<ActiveSubBoard> for Option<i64> {
    fn from(active: ActiveSubBoard) -> Self {
        match active {
            ActiveSubBoard::Board(index) => Some(i64::from(index)),
            ActiveSubBoard::Any => None,
        }
    }
}

/// A cell addressed by sub-board and position within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("({}, {})", sub_board, cell)]
pub struct CellTarget {
    sub_board: u8,
    cell: u8,
}

impl CellTarget {
    /// Center cell of the center sub-board.
    pub const CENTER: Self = Self { sub_board: 4, cell: 4 };

    /// Creates a target, or `None` if either index is outside 0-8.
    pub fn new(sub_board: u8, cell: u8) -> Option<Self> {
        if usize::from(sub_board) < BOARD_SIZE && usize::from(cell) < BOARD_SIZE {
            Some(Self { sub_board, cell })
        } else {
            None
        }
    }

    /// Decodes a linear index (0-80).
    pub fn from_linear(index: u8) -> Option<Self> {
        Self::new(index / BOARD_SIZE as u8, index % BOARD_SIZE as u8)
    }

    /// Sub-board index.
    pub fn sub_board(&self) -> u8 {
        self.sub_board
    }

    /// Cell index within the sub-board.
    pub fn cell(&self) -> u8 {
        self.cell
    }

    /// Single-integer encoding sent on the wire.
    pub fn linear_index(&self) -> u8 {
        self.sub_board * BOARD_SIZE as u8 + self.cell
    }
}

/// One of the nine 3x3 grids composing the outer board.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubBoardState {
    squares: [CellValue; BOARD_SIZE],
    #[serde(default)]
    winner: Outcome,
}

impl SubBoardState {
    /// Cells in row-major order.
    pub fn squares(&self) -> &[CellValue; BOARD_SIZE] {
        &self.squares
    }

    /// Result of this sub-board.
    pub fn winner(&self) -> Outcome {
        self.winner
    }

    /// True when no empty cell is left.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|cell| cell.is_occupied())
    }
}

/// Complete game state as last reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    sub_boards: [SubBoardState; BOARD_SIZE],
    #[serde(rename = "currentSubBoard", default)]
    active_sub_board: ActiveSubBoard,
    current_player: Mark,
    history_length: NonZeroUsize,
    #[serde(default)]
    winner: Outcome,
}

impl GameState {
    /// Fresh game: every cell empty, free choice of sub-board, X to move.
    pub fn new() -> Self {
        Self {
            sub_boards: Default::default(),
            active_sub_board: ActiveSubBoard::Any,
            current_player: Mark::X,
            history_length: NonZeroUsize::MIN,
            winner: Outcome::InProgress,
        }
    }

    /// The nine sub-boards.
    pub fn sub_boards(&self) -> &[SubBoardState; BOARD_SIZE] {
        &self.sub_boards
    }

    /// Sub-board the next move is constrained to.
    pub fn active_sub_board(&self) -> ActiveSubBoard {
        self.active_sub_board
    }

    /// Player to move.
    pub fn current_player(&self) -> Mark {
        self.current_player
    }

    /// Number of recorded positions, including the starting one.
    pub fn history_length(&self) -> usize {
        self.history_length.get()
    }

    /// Index of the position currently displayed.
    pub fn current_step(&self) -> usize {
        self.history_length.get() - 1
    }

    /// Steps that can be jumped to.
    pub fn steps(&self) -> std::ops::Range<usize> {
        0..self.history_length.get()
    }

    /// Overall result.
    pub fn winner(&self) -> Outcome {
        self.winner
    }

    /// Whether the game has a winner or ended in a draw.
    pub fn is_over(&self) -> bool {
        self.winner.is_decided()
    }

    /// Value of the addressed cell.
    pub fn cell(&self, target: CellTarget) -> CellValue {
        self.sub_boards[usize::from(target.sub_board())].squares[usize::from(target.cell())]
    }
}

/// Fixture builders for unit tests; real states only come from the server.
#[cfg(test)]
impl GameState {
    pub(crate) fn with_cell(mut self, target: CellTarget, mark: Mark) -> Self {
        self.sub_boards[usize::from(target.sub_board())].squares[usize::from(target.cell())] =
            CellValue::Occupied(mark);
        self
    }

    pub(crate) fn with_active_sub_board(mut self, active: ActiveSubBoard) -> Self {
        self.active_sub_board = active;
        self
    }

    pub(crate) fn with_history_length(mut self, length: usize) -> Self {
        self.history_length = NonZeroUsize::new(length).expect("history length is at least one");
        self
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque identifier the server assigns to a game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a create-game response body.
    ///
    /// Accepts plain text (`7`) as well as JSON strings (`"g1"`) and numbers.
    pub fn parse(body: &str) -> Result<Self, ClientError> {
        let trimmed = body.trim();
        let id = match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::String(s)) => s,
            Ok(serde_json::Value::Number(n)) => n.to_string(),
            _ => trimmed.to_string(),
        };
        let id = id.trim();
        if id.is_empty() {
            return Err(ClientError::decode("Empty game identifier in create response"));
        }
        Ok(Self(id.to_string()))
    }

    /// Identifier as sent in query strings.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
