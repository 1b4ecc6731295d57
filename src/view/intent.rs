//! Interaction intents raised by the board view.

use crate::games::ultimate::CellTarget;

/// A user gesture the session controller should act on.
///
/// Intents carry no legality judgement; the controller decides whether to
/// contact the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Intent {
    /// A cell was chosen.
    #[display("submit move {}", _0)]
    SubmitMove(CellTarget),
    /// The AI control was activated.
    #[display("request AI move")]
    RequestAiMove,
    /// A history entry was chosen.
    #[display("jump to step {}", _0)]
    JumpToStep(usize),
}
