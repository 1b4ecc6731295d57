//! Game server capabilities consumed by the client.

mod rest;

pub use rest::RestGameApi;

use crate::error::ClientError;
use crate::games::ultimate::{CellTarget, GameId, GameState};

/// Operations the remote game server offers.
///
/// Every mutating call returns the full game state after the change; the
/// client never derives state on its own.
#[async_trait::async_trait]
pub trait GameApi: Send + Sync {
    /// Creates a game and returns its identifier.
    async fn create(&self) -> Result<GameId, ClientError>;

    /// Fetches the current state of a game.
    async fn fetch(&self, id: &GameId) -> Result<GameState, ClientError>;

    /// Deletes a game.
    async fn delete(&self, id: &GameId) -> Result<(), ClientError>;

    /// Plays the current player's mark at `target`.
    async fn play(&self, id: &GameId, target: CellTarget) -> Result<GameState, ClientError>;

    /// Lets the server's AI choose and play the next move.
    async fn play_ai(&self, id: &GameId) -> Result<GameState, ClientError>;

    /// Signals that the game is still attended.
    async fn ping(&self, id: &GameId) -> Result<(), ClientError>;

    /// Moves the game to an earlier step of its history.
    async fn jump(&self, id: &GameId, step: usize) -> Result<GameState, ClientError>;
}

#[async_trait::async_trait]
impl<T: GameApi + ?Sized> GameApi for std::sync::Arc<T> {
    async fn create(&self) -> Result<GameId, ClientError> {
        (**self).create().await
    }

    async fn fetch(&self, id: &GameId) -> Result<GameState, ClientError> {
        (**self).fetch(id).await
    }

    async fn delete(&self, id: &GameId) -> Result<(), ClientError> {
        (**self).delete(id).await
    }

    async fn play(&self, id: &GameId, target: CellTarget) -> Result<GameState, ClientError> {
        (**self).play(id, target).await
    }

    async fn play_ai(&self, id: &GameId) -> Result<GameState, ClientError> {
        (**self).play_ai(id).await
    }

    async fn ping(&self, id: &GameId) -> Result<(), ClientError> {
        (**self).ping(id).await
    }

    async fn jump(&self, id: &GameId, step: usize) -> Result<GameState, ClientError> {
        (**self).jump(id, step).await
    }
}
