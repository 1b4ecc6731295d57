//! Session controller: the client-side state machine for one game.
//!
//! The controller owns the game identifier, a mirror of the last state the
//! server reported, and a `pending` flag that admits at most one mutating
//! request at a time. Intents that would be rejected anyway (wrong sub-board,
//! finished game, request already in flight) are dropped locally without a
//! round-trip.
//!
//! ```text
//! Uninitialized -> Initializing -> Ready <-> Mutating
//!                                   Ready  -> Terminated
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::ping::LivenessPing;
use crate::api::GameApi;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::games::ultimate::{CellTarget, GameId, GameState};
use crate::view::Intent;

/// How often [`SessionController::close`] checks for a settled request.
const CLOSE_POLL: Duration = Duration::from_millis(50);

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SessionPhase {
    /// No game yet, or the last start attempt failed.
    Uninitialized,
    /// Create/fetch round-trip in flight.
    Initializing,
    /// Mirroring server state, accepting intents.
    Ready,
    /// A move, AI move or jump is in flight.
    Mutating,
    /// Game deleted; the controller accepts nothing further.
    Terminated,
}

/// Why an operation was dropped without contacting the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// No game state to act on.
    NotReady,
    /// The session was already started.
    AlreadyStarted,
    /// Another request is in flight.
    Pending,
    /// The game already has a result.
    GameOver,
    /// The move targets a sub-board other than the active one.
    InactiveSubBoard,
    /// Sub-board or cell index outside 0-8.
    OutOfBounds,
    /// The requested step is beyond the current one.
    StepOutOfRange,
}

/// What an operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A request was sent and its response applied.
    Sent,
    /// Nothing was sent.
    Skipped(SkipReason),
}

/// Copy of the session taken for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Identifier of the open game.
    pub game_id: Option<GameId>,
    /// Last state reported by the server.
    pub state: Option<GameState>,
    /// Whether a mutating request is in flight.
    pub pending: bool,
    /// Lifecycle phase.
    pub phase: SessionPhase,
    /// Message of the most recent failed request, cleared on success.
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct SessionState {
    game_id: Option<GameId>,
    cached: Option<GameState>,
    pending: bool,
    phase: SessionPhase,
    last_error: Option<String>,
    pinger: Option<LivenessPing>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            game_id: None,
            cached: None,
            pending: false,
            phase: SessionPhase::Uninitialized,
            last_error: None,
            pinger: None,
        }
    }

    /// Checks the phase shared by all in-game operations.
    fn ready(&self) -> Result<(GameId, &GameState), SkipReason> {
        match self.phase {
            SessionPhase::Initializing | SessionPhase::Mutating => Err(SkipReason::Pending),
            SessionPhase::Uninitialized | SessionPhase::Terminated => Err(SkipReason::NotReady),
            SessionPhase::Ready => match (&self.game_id, &self.cached) {
                (Some(id), Some(state)) => Ok((id.clone(), state)),
                _ => Err(SkipReason::NotReady),
            },
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears `pending` when a request finishes, fails, or its future is dropped.
struct PendingGuard<'a> {
    state: &'a Mutex<SessionState>,
    fallback: SessionPhase,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    /// Marks the session busy; caller holds the lock.
    fn arm(
        state: &'a Mutex<SessionState>,
        locked: &mut SessionState,
        busy: SessionPhase,
        fallback: SessionPhase,
    ) -> Self {
        locked.pending = true;
        locked.phase = busy;
        Self {
            state,
            fallback,
            armed: true,
        }
    }

    /// Applies `update` and leaves the busy phase in one critical section.
    fn settle(mut self, phase: SessionPhase, update: impl FnOnce(&mut SessionState)) {
        let mut locked = lock(self.state);
        update(&mut locked);
        locked.pending = false;
        locked.phase = phase;
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut locked = lock(self.state);
            locked.pending = false;
            locked.phase = self.fallback;
        }
    }
}

struct Inner<A> {
    api: Arc<A>,
    state: Mutex<SessionState>,
    request_timeout: Duration,
    ping_interval: Duration,
}

/// Drives one game session against a [`GameApi`].
///
/// Cloning is cheap and every clone shares the same session, so a front-end
/// can spawn an operation and keep rendering from [`snapshot`](Self::snapshot).
pub struct SessionController<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for SessionController<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> std::fmt::Debug for SessionController<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &*lock(&self.inner.state))
            .field("request_timeout", &self.inner.request_timeout)
            .field("ping_interval", &self.inner.ping_interval)
            .finish()
    }
}

impl<A: GameApi + 'static> SessionController<A> {
    /// Creates an uninitialized session.
    #[instrument(skip(api))]
    pub fn new(api: A, request_timeout: Duration, ping_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api: Arc::new(api),
                state: Mutex::new(SessionState::new()),
                request_timeout,
                ping_interval,
            }),
        }
    }

    /// Creates an uninitialized session with timings from configuration.
    pub fn with_config(api: A, config: &ClientConfig) -> Self {
        Self::new(api, config.request_timeout(), config.ping_interval())
    }

    /// Current session contents.
    pub fn snapshot(&self) -> SessionSnapshot {
        let locked = lock(&self.inner.state);
        SessionSnapshot {
            game_id: locked.game_id.clone(),
            state: locked.cached.clone(),
            pending: locked.pending,
            phase: locked.phase,
            last_error: locked.last_error.clone(),
        }
    }

    /// Whether a mutating request is in flight.
    pub fn is_pending(&self) -> bool {
        lock(&self.inner.state).pending
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        lock(&self.inner.state).phase
    }

    /// Whether the liveness ping loop is running.
    pub fn is_pinging(&self) -> bool {
        lock(&self.inner.state)
            .pinger
            .as_ref()
            .is_some_and(|pinger| !pinger.is_finished())
    }

    /// Creates a game on the server and loads its state.
    ///
    /// Once the server assigns an identifier it is kept for the life of the
    /// session and pinging starts. If the fetch then fails, calling `start`
    /// again retries only the fetch.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<Dispatch, ClientError> {
        let (guard, existing) = {
            let mut locked = lock(&self.inner.state);
            match locked.phase {
                SessionPhase::Uninitialized => {}
                SessionPhase::Initializing | SessionPhase::Mutating => {
                    return Ok(self.skipped("start", SkipReason::Pending));
                }
                SessionPhase::Ready | SessionPhase::Terminated => {
                    return Ok(self.skipped("start", SkipReason::AlreadyStarted));
                }
            }
            let existing = locked.game_id.clone();
            let guard = PendingGuard::arm(
                &self.inner.state,
                &mut locked,
                SessionPhase::Initializing,
                SessionPhase::Uninitialized,
            );
            (guard, existing)
        };

        let id = match existing {
            Some(id) => {
                debug!(game_id = %id, "Reusing game from earlier attempt");
                id
            }
            None => {
                let id = match self.bounded(self.inner.api.create()).await {
                    Ok(id) => id,
                    Err(e) => return Err(self.fail(guard, SessionPhase::Uninitialized, e)),
                };
                let pinger = LivenessPing::spawn(
                    Arc::clone(&self.inner.api),
                    id.clone(),
                    self.inner.ping_interval,
                    self.inner.request_timeout,
                );
                let mut locked = lock(&self.inner.state);
                locked.game_id = Some(id.clone());
                locked.pinger = Some(pinger);
                id
            }
        };

        match self.bounded(self.inner.api.fetch(&id)).await {
            Ok(state) => {
                info!(game_id = %id, "Session ready");
                guard.settle(SessionPhase::Ready, |locked| {
                    locked.cached = Some(state);
                    locked.last_error = None;
                });
                Ok(Dispatch::Sent)
            }
            Err(e) => Err(self.fail(guard, SessionPhase::Uninitialized, e)),
        }
    }

    /// Plays the current player's mark at `cell` of `sub_board`.
    ///
    /// Dropped locally when the game is over, the sub-board is not the one
    /// play is constrained to, or another request is in flight.
    #[instrument(skip(self))]
    pub async fn submit_move(&self, sub_board: u8, cell: u8) -> Result<Dispatch, ClientError> {
        let Some(target) = CellTarget::new(sub_board, cell) else {
            return Ok(self.skipped("submit_move", SkipReason::OutOfBounds));
        };

        let (guard, id) = match self.begin(|state| {
            if state.is_over() {
                Err(SkipReason::GameOver)
            } else if !state.active_sub_board().permits(sub_board) {
                Err(SkipReason::InactiveSubBoard)
            } else {
                Ok(())
            }
        }) {
            Ok(begun) => begun,
            Err(reason) => return Ok(self.skipped("submit_move", reason)),
        };

        debug!(index = target.linear_index(), "Submitting move");
        let result = self.bounded(self.inner.api.play(&id, target)).await;
        self.finish(guard, result)
    }

    /// Asks the server's AI to play the next move.
    #[instrument(skip(self))]
    pub async fn request_ai_move(&self) -> Result<Dispatch, ClientError> {
        let (guard, id) = match self.begin(|_| Ok(())) {
            Ok(begun) => begun,
            Err(reason) => return Ok(self.skipped("request_ai_move", reason)),
        };

        let result = self.bounded(self.inner.api.play_ai(&id)).await;
        self.finish(guard, result)
    }

    /// Returns the game to `step` of its history.
    ///
    /// Jumping to the current step is allowed and simply reloads it.
    #[instrument(skip(self))]
    pub async fn jump_to_step(&self, step: usize) -> Result<Dispatch, ClientError> {
        let (guard, id) = match self.begin(|state| {
            if step <= state.current_step() {
                Ok(())
            } else {
                Err(SkipReason::StepOutOfRange)
            }
        }) {
            Ok(begun) => begun,
            Err(reason) => return Ok(self.skipped("jump_to_step", reason)),
        };

        let result = self.bounded(self.inner.api.jump(&id, step)).await;
        self.finish(guard, result)
    }

    /// Deletes the game and stops pinging.
    ///
    /// Local state is cleared before the delete request is sent, so the
    /// session is closed even if the server cannot be reached.
    #[instrument(skip(self))]
    pub async fn terminate(&self) -> Result<Dispatch, ClientError> {
        let (id, pinger) = {
            let mut locked = lock(&self.inner.state);
            if locked.pending {
                return Ok(self.skipped("terminate", SkipReason::Pending));
            }
            if locked.phase == SessionPhase::Terminated {
                return Ok(self.skipped("terminate", SkipReason::NotReady));
            }
            let Some(id) = locked.game_id.take() else {
                return Ok(self.skipped("terminate", SkipReason::NotReady));
            };
            locked.cached = None;
            locked.phase = SessionPhase::Terminated;
            (id, locked.pinger.take())
        };

        if let Some(pinger) = pinger {
            pinger.stop();
        }

        info!(game_id = %id, "Terminating session");
        match self.bounded(self.inner.api.delete(&id)).await {
            Ok(()) => Ok(Dispatch::Sent),
            Err(e) => {
                warn!(game_id = %id, error = %e, "Delete failed");
                lock(&self.inner.state).last_error = Some(e.message.clone());
                Err(e)
            }
        }
    }

    /// Waits up to `wait` for an in-flight request to settle, then terminates.
    ///
    /// Returns `Skipped(Pending)` when the request is still running at the
    /// deadline; the game is then left for the server to expire.
    #[instrument(skip(self))]
    pub async fn close(&self, wait: Duration) -> Result<Dispatch, ClientError> {
        let deadline = Instant::now() + wait;
        while self.is_pending() && Instant::now() < deadline {
            tokio::time::sleep(CLOSE_POLL).await;
        }
        self.terminate().await
    }

    /// Routes an intent raised by the board view.
    pub async fn dispatch(&self, intent: Intent) -> Result<Dispatch, ClientError> {
        match intent {
            Intent::SubmitMove(target) => self.submit_move(target.sub_board(), target.cell()).await,
            Intent::RequestAiMove => self.request_ai_move().await,
            Intent::JumpToStep(step) => self.jump_to_step(step).await,
        }
    }

    /// Checks preconditions and marks the session busy in one step.
    fn begin(
        &self,
        check: impl FnOnce(&GameState) -> Result<(), SkipReason>,
    ) -> Result<(PendingGuard<'_>, GameId), SkipReason> {
        let mut locked = lock(&self.inner.state);
        let (id, state) = locked.ready()?;
        check(state)?;
        let guard = PendingGuard::arm(
            &self.inner.state,
            &mut locked,
            SessionPhase::Mutating,
            SessionPhase::Ready,
        );
        Ok((guard, id))
    }

    fn finish(
        &self,
        guard: PendingGuard<'_>,
        result: Result<GameState, ClientError>,
    ) -> Result<Dispatch, ClientError> {
        match result {
            Ok(state) => {
                debug!(
                    history_length = state.history_length(),
                    winner = ?state.winner(),
                    "Applying server state"
                );
                guard.settle(SessionPhase::Ready, |locked| {
                    locked.cached = Some(state);
                    locked.last_error = None;
                });
                Ok(Dispatch::Sent)
            }
            Err(e) => Err(self.fail(guard, SessionPhase::Ready, e)),
        }
    }

    fn fail(&self, guard: PendingGuard<'_>, phase: SessionPhase, error: ClientError) -> ClientError {
        warn!(error = %error, "Request failed");
        let message = error.message.clone();
        guard.settle(phase, |locked| locked.last_error = Some(message));
        error
    }

    fn skipped(&self, operation: &'static str, reason: SkipReason) -> Dispatch {
        debug!(operation, reason = %reason, "Skipped without contacting server");
        Dispatch::Skipped(reason)
    }

    async fn bounded<T>(
        &self,
        request: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        match tokio::time::timeout(self.inner.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::timeout(format!(
                "No response within {:?}",
                self.inner.request_timeout
            ))),
        }
    }
}
