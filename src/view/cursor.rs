//! Keyboard cursor over the 9x9 grid of cells.

use crate::games::ultimate::{ActiveSubBoard, CellTarget};

/// Direction of a cursor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards row 8.
    Down,
    /// Towards column 0.
    Left,
    /// Towards column 8.
    Right,
}

/// Position on the outer grid, counted in cells (rows and columns 0-8).
///
/// Row 0 is the top row of sub-boards 0-2, row 3 the top row of 3-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCursor {
    target: CellTarget,
}

impl BoardCursor {
    const LAST: u8 = 8;

    /// Cursor on the center cell of the center sub-board.
    pub fn new() -> Self {
        Self::at(CellTarget::CENTER)
    }

    /// Cursor placed on `target`.
    pub fn at(target: CellTarget) -> Self {
        Self { target }
    }

    /// Cursor at a grid position, or `None` outside 0-8.
    pub fn from_grid(row: u8, col: u8) -> Option<Self> {
        if row > Self::LAST || col > Self::LAST {
            return None;
        }
        CellTarget::new((row / 3) * 3 + col / 3, (row % 3) * 3 + col % 3).map(Self::at)
    }

    /// Grid row.
    pub fn row(&self) -> u8 {
        (self.target.sub_board() / 3) * 3 + self.target.cell() / 3
    }

    /// Grid column.
    pub fn col(&self) -> u8 {
        (self.target.sub_board() % 3) * 3 + self.target.cell() % 3
    }

    /// Cell under the cursor.
    pub fn target(&self) -> CellTarget {
        self.target
    }

    /// Moves one cell, stopping at the edges.
    pub fn moved(self, direction: Direction) -> Self {
        let (row, col) = (self.row(), self.col());
        let next = match direction {
            Direction::Up => Self::from_grid(row.saturating_sub(1), col),
            Direction::Down => Self::from_grid((row + 1).min(Self::LAST), col),
            Direction::Left => Self::from_grid(row, col.saturating_sub(1)),
            Direction::Right => Self::from_grid(row, (col + 1).min(Self::LAST)),
        };
        next.unwrap_or(self)
    }

    /// Moves into the constrained sub-board, keeping the position within
    /// the sub-board. Unchanged when play is unconstrained or already there.
    pub fn follow(self, active: ActiveSubBoard) -> Self {
        match active {
            ActiveSubBoard::Board(sub) if sub != self.target.sub_board() => {
                CellTarget::new(sub, self.target.cell()).map(Self::at).unwrap_or(self)
            }
            _ => self,
        }
    }
}

impl Default for BoardCursor {
    fn default() -> Self {
        Self::new()
    }
}
