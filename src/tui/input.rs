//! Key bindings for the terminal client.

use crossterm::event::KeyCode;

use crate::view::Direction;

/// What a key press asks the client to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move the focused cursor.
    Move(Direction),
    /// Activate whatever the cursor is on.
    Select,
    /// Switch focus between the board and the history list.
    ToggleFocus,
    /// Ask the server's AI to move.
    AiMove,
    /// Close the current game and open a fresh one.
    NewGame,
    /// Close the game and exit.
    Quit,
}

/// Maps a key to a command.
pub fn command_for(key: KeyCode) -> Option<Command> {
    match key {
        KeyCode::Up | KeyCode::Char('k') => Some(Command::Move(Direction::Up)),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::Move(Direction::Down)),
        KeyCode::Left | KeyCode::Char('h') => Some(Command::Move(Direction::Left)),
        KeyCode::Right | KeyCode::Char('l') => Some(Command::Move(Direction::Right)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Select),
        KeyCode::Tab | KeyCode::BackTab => Some(Command::ToggleFocus),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::AiMove),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Command::NewGame),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}
