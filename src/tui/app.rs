//! Front-end state that lives outside the session: cursors and focus.

use tracing::debug;

use super::input::Command;
use crate::games::ultimate::ActiveSubBoard;
use crate::view::{BoardCursor, BoardView, Direction, Intent};

/// Which panel receives cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The 9x9 board.
    #[default]
    Board,
    /// The move history list.
    History,
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing beyond redrawing.
    Redraw,
    /// Hand an intent to the session controller.
    Dispatch(Intent),
    /// Replace the session with a new game.
    NewGame,
    /// Close the session and leave.
    Quit,
}

/// Main application state.
#[derive(Debug, Default)]
pub struct App {
    cursor: BoardCursor,
    focus: Focus,
    selected_step: usize,
    last_active: Option<ActiveSubBoard>,
    last_current_step: Option<usize>,
}

impl App {
    /// Creates a new application.
    pub fn new() -> Self {
        Self::default()
    }

    /// Board cursor.
    pub fn cursor(&self) -> BoardCursor {
        self.cursor
    }

    /// Focused panel.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Highlighted history entry.
    pub fn selected_step(&self) -> usize {
        self.selected_step
    }

    /// Adjusts cursors after the view changed.
    ///
    /// The board cursor jumps into a newly constrained sub-board and the
    /// history selection follows the current step whenever it moves.
    pub fn sync(&mut self, view: &BoardView) {
        let Some(game) = view.game() else {
            return;
        };
        let active = *game.active_sub_board();
        if self.last_active != Some(active) {
            self.cursor = self.cursor.follow(active);
            self.last_active = Some(active);
        }
        let current = *game.current_step();
        if self.last_current_step != Some(current) {
            self.selected_step = current;
            self.last_current_step = Some(current);
        }
        self.selected_step = self.selected_step.min(game.steps().len().saturating_sub(1));
    }

    /// Forgets per-game cursor state.
    pub fn reset(&mut self) {
        debug!("Resetting front-end state");
        *self = Self::new();
    }

    /// Applies a key command against the view currently on screen.
    pub fn handle(&mut self, command: Command, view: &BoardView) -> Action {
        match command {
            Command::Quit => Action::Quit,
            Command::NewGame => Action::NewGame,
            Command::ToggleFocus => {
                self.focus = match self.focus {
                    Focus::Board => Focus::History,
                    Focus::History => Focus::Board,
                };
                Action::Redraw
            }
            Command::Move(direction) => {
                match self.focus {
                    Focus::Board => self.cursor = self.cursor.moved(direction),
                    Focus::History => self.move_selection(direction, view),
                }
                Action::Redraw
            }
            Command::AiMove => match view.game() {
                Some(game) => Action::Dispatch(game.ai_intent()),
                None => Action::Redraw,
            },
            Command::Select => {
                let Some(game) = view.game() else {
                    return Action::Redraw;
                };
                let intent = match self.focus {
                    Focus::Board => Some(game.cell_intent(self.cursor.target())),
                    Focus::History => game.step_intent(self.selected_step),
                };
                intent.map(Action::Dispatch).unwrap_or(Action::Redraw)
            }
        }
    }

    fn move_selection(&mut self, direction: Direction, view: &BoardView) {
        let Some(game) = view.game() else {
            return;
        };
        let last = game.steps().len().saturating_sub(1);
        self.selected_step = match direction {
            Direction::Up | Direction::Left => self.selected_step.saturating_sub(1),
            Direction::Down | Direction::Right => (self.selected_step + 1).min(last),
        };
    }
}
