//! Pure derivation of what to draw from a session snapshot.

use derive_getters::Getters;

use super::Intent;
use crate::games::ultimate::{ActiveSubBoard, CellTarget, GameState, Mark, Outcome};
use crate::session::SessionSnapshot;

/// Everything a front-end needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardView {
    /// No game open.
    Empty,
    /// A request is in flight; nothing else is shown.
    Loading,
    /// The board of the open game.
    Board(GameView),
}

impl BoardView {
    /// Derives the view for a snapshot.
    pub fn render(snapshot: &SessionSnapshot) -> Self {
        if snapshot.pending {
            return BoardView::Loading;
        }
        match &snapshot.state {
            Some(state) => BoardView::Board(GameView::new(state, snapshot.last_error.clone())),
            None => BoardView::Empty,
        }
    }

    /// The game view, if a board is shown.
    pub fn game(&self) -> Option<&GameView> {
        match self {
            BoardView::Board(game) => Some(game),
            _ => None,
        }
    }
}

/// How a sub-board relates to the move constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Play is not constrained to this sub-board.
    Inactive,
    /// Play is constrained here and an empty cell remains.
    ActivePlayable,
    /// Play is constrained here but every cell is taken, so the server will
    /// let the next move go anywhere.
    ActiveFull,
}

/// One cell as drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    target: CellTarget,
    symbol: &'static str,
    highlighted: bool,
    playable: bool,
}

impl CellView {
    /// Address of the cell.
    pub fn target(&self) -> CellTarget {
        self.target
    }

    /// "X", "O", or blank.
    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Cell belongs to the player who won its sub-board.
    pub fn highlighted(&self) -> bool {
        self.highlighted
    }

    /// A move here would pass the client-side checks.
    pub fn playable(&self) -> bool {
        self.playable
    }

    /// Intent raised when this cell is chosen.
    pub fn intent(&self) -> Intent {
        Intent::SubmitMove(self.target)
    }
}

/// One sub-board as drawn.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SubBoardView {
    index: u8,
    activity: Activity,
    winner: Outcome,
    /// Sub-board was won by the player who won the game.
    highlighted: bool,
    cells: Vec<CellView>,
}

/// One entry of the move history list.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct StepView {
    step: usize,
    label: String,
    current: bool,
}

impl StepView {
    /// Intent raised when this step is chosen.
    pub fn intent(&self) -> Intent {
        Intent::JumpToStep(self.step)
    }
}

/// Board, status and history of an open game.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameView {
    sub_boards: Vec<SubBoardView>,
    active_sub_board: ActiveSubBoard,
    winner: Outcome,
    current_player: Mark,
    status: String,
    steps: Vec<StepView>,
    current_step: usize,
    last_error: Option<String>,
}

impl GameView {
    /// Derives the view of `state`.
    pub fn new(state: &GameState, last_error: Option<String>) -> Self {
        let winner = state.winner();
        let active = state.active_sub_board();

        let sub_boards = state
            .sub_boards()
            .iter()
            .enumerate()
            .map(|(index, sub)| {
                let index = index as u8;
                let activity = match active {
                    ActiveSubBoard::Board(a) if a == index && sub.is_full() => Activity::ActiveFull,
                    ActiveSubBoard::Board(a) if a == index => Activity::ActivePlayable,
                    _ => Activity::Inactive,
                };
                let open = !winner.is_decided() && active.permits(index);
                let cells = sub
                    .squares()
                    .iter()
                    .enumerate()
                    .filter_map(|(cell, value)| {
                        let target = CellTarget::new(index, cell as u8)?;
                        Some(CellView {
                            target,
                            symbol: value.symbol(),
                            highlighted: sub.winner().claims(*value),
                            playable: open && !value.is_occupied(),
                        })
                    })
                    .collect();
                SubBoardView {
                    index,
                    activity,
                    winner: sub.winner(),
                    highlighted: winner.is_decided() && sub.winner() == winner,
                    cells,
                }
            })
            .collect();

        let current_step = state.current_step();
        let steps = state
            .steps()
            .map(|step| StepView {
                step,
                label: step_label(step),
                current: step == current_step,
            })
            .collect();

        Self {
            sub_boards,
            active_sub_board: active,
            winner,
            current_player: state.current_player(),
            status: status_line(winner, state.current_player()),
            steps,
            current_step,
            last_error,
        }
    }

    /// The cell at `target`.
    pub fn cell(&self, target: CellTarget) -> &CellView {
        &self.sub_boards[usize::from(target.sub_board())].cells[usize::from(target.cell())]
    }

    /// Intent for choosing the cell at `target`.
    pub fn cell_intent(&self, target: CellTarget) -> Intent {
        self.cell(target).intent()
    }

    /// Intent for choosing history entry `step`, if it is listed.
    pub fn step_intent(&self, step: usize) -> Option<Intent> {
        self.steps.get(step).map(StepView::intent)
    }

    /// Intent for the "AI move" control.
    pub fn ai_intent(&self) -> Intent {
        Intent::RequestAiMove
    }

    /// Whether any cell passes the client-side checks.
    pub fn has_playable_cell(&self) -> bool {
        self.sub_boards
            .iter()
            .flat_map(|sub| sub.cells.iter())
            .any(|cell| cell.playable)
    }
}

fn status_line(winner: Outcome, current_player: Mark) -> String {
    match winner {
        Outcome::Won(mark) => format!("Winner: {}", mark.symbol()),
        Outcome::Draw => "Draw".to_string(),
        Outcome::InProgress => format!("Next player: {}", current_player.symbol()),
    }
}

fn step_label(step: usize) -> String {
    if step == 0 {
        "Go to game start".to_string()
    } else {
        format!("Go to move #{}", step)
    }
}
