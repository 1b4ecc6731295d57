//! In-memory game server used by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use strictly_ultimate::{
    ActiveSubBoard, BOARD_SIZE, CellTarget, ClientError, GameApi, GameId, GameState, Mark,
    Outcome, SessionController,
};
use tokio::sync::Notify;

/// A request the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create,
    Fetch(GameId),
    Delete(GameId),
    Play(GameId, u8),
    PlayAi(GameId),
    Ping(GameId),
    Jump(GameId, usize),
}

/// Scripted server.
///
/// While a gate is installed, every call except `delete` and `ping` parks at
/// it. `fetch` returns the current state. Moves, AI moves and jumps answer with
/// the next queued response and make it current; with nothing queued they
/// return the current state unchanged.
#[derive(Debug, Default)]
pub struct FakeServer {
    calls: Mutex<Vec<Call>>,
    current: Mutex<GameState>,
    responses: Mutex<VecDeque<Result<GameState, ClientError>>>,
    create_errors: Mutex<VecDeque<ClientError>>,
    fetch_errors: Mutex<VecDeque<ClientError>>,
    fail_pings: AtomicBool,
    hang_mutations: AtomicBool,
    gate: Mutex<Option<Arc<Gate>>>,
}

/// Holds mutating requests until released.
#[derive(Debug, Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Waits until a request is parked at the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Lets the parked request answer.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_state(state: GameState) -> Arc<Self> {
        let server = Self::default();
        *server.current.lock().unwrap() = state;
        Arc::new(server)
    }

    pub fn queue(&self, response: Result<GameState, ClientError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn fail_next_create(&self, error: ClientError) {
        self.create_errors.lock().unwrap().push_back(error);
    }

    pub fn fail_next_fetch(&self, error: ClientError) {
        self.fetch_errors.lock().unwrap().push_back(error);
    }

    pub fn fail_pings(&self) {
        self.fail_pings.store(true, Ordering::SeqCst);
    }

    pub fn hang_mutations(&self) {
        self.hang_mutations.store(true, Ordering::SeqCst);
    }

    pub fn gate(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ping_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Ping(_)))
            .count()
    }

    /// Calls other than pings, which may interleave at any point.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::Ping(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Waits at the gate, if one is installed.
    async fn park(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }

    async fn respond(&self) -> Result<GameState, ClientError> {
        if self.hang_mutations.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.park().await;
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(state)) => {
                *self.current.lock().unwrap() = state.clone();
                Ok(state)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.current.lock().unwrap().clone()),
        }
    }
}

#[async_trait::async_trait]
impl GameApi for FakeServer {
    async fn create(&self) -> Result<GameId, ClientError> {
        self.record(Call::Create);
        self.park().await;
        let error = self.create_errors.lock().unwrap().pop_front();
        match error {
            Some(e) => Err(e),
            None => Ok(GameId::new("g1")),
        }
    }

    async fn fetch(&self, id: &GameId) -> Result<GameState, ClientError> {
        self.record(Call::Fetch(id.clone()));
        self.park().await;
        let error = self.fetch_errors.lock().unwrap().pop_front();
        match error {
            Some(e) => Err(e),
            None => Ok(self.current.lock().unwrap().clone()),
        }
    }

    async fn delete(&self, id: &GameId) -> Result<(), ClientError> {
        self.record(Call::Delete(id.clone()));
        Ok(())
    }

    async fn play(&self, id: &GameId, target: CellTarget) -> Result<GameState, ClientError> {
        self.record(Call::Play(id.clone(), target.linear_index()));
        self.respond().await
    }

    async fn play_ai(&self, id: &GameId) -> Result<GameState, ClientError> {
        self.record(Call::PlayAi(id.clone()));
        self.respond().await
    }

    async fn ping(&self, id: &GameId) -> Result<(), ClientError> {
        self.record(Call::Ping(id.clone()));
        if self.fail_pings.load(Ordering::SeqCst) {
            Err(ClientError::network("connection refused"))
        } else {
            Ok(())
        }
    }

    async fn jump(&self, id: &GameId, step: usize) -> Result<GameState, ClientError> {
        self.record(Call::Jump(id.clone(), step));
        self.respond().await
    }
}

pub const INTERVAL: Duration = Duration::from_secs(10);

/// Controller with the reference timings: 10 s timeout, 10 s ping period.
pub fn controller(server: &Arc<FakeServer>) -> SessionController<Arc<FakeServer>> {
    SessionController::new(Arc::clone(server), INTERVAL, INTERVAL)
}

pub fn target(sub_board: u8, cell: u8) -> CellTarget {
    CellTarget::new(sub_board, cell).unwrap()
}

/// Builds server states the way the server reports them, through JSON.
#[derive(Debug, Clone)]
pub struct Fixture {
    squares: [[i8; BOARD_SIZE]; BOARD_SIZE],
    sub_board_winners: [i8; BOARD_SIZE],
    active: Option<i64>,
    player: i8,
    history_length: usize,
    winner: i8,
}

impl Fixture {
    /// Fresh game: empty board, free choice, X to move.
    pub fn new() -> Self {
        Self {
            squares: [[0; BOARD_SIZE]; BOARD_SIZE],
            sub_board_winners: [0; BOARD_SIZE],
            active: None,
            player: i8::from(Mark::X),
            history_length: 1,
            winner: 0,
        }
    }

    pub fn cell(mut self, target: CellTarget, mark: Mark) -> Self {
        self.squares[usize::from(target.sub_board())][usize::from(target.cell())] = i8::from(mark);
        self
    }

    pub fn sub_board_winner(mut self, sub_board: u8, winner: Outcome) -> Self {
        self.sub_board_winners[usize::from(sub_board)] = i8::from(winner);
        self
    }

    pub fn active(mut self, active: ActiveSubBoard) -> Self {
        self.active = active.into();
        self
    }

    pub fn player(mut self, mark: Mark) -> Self {
        self.player = i8::from(mark);
        self
    }

    pub fn history(mut self, length: usize) -> Self {
        self.history_length = length;
        self
    }

    pub fn winner(mut self, winner: Outcome) -> Self {
        self.winner = i8::from(winner);
        self
    }

    pub fn json(&self) -> serde_json::Value {
        let sub_boards: Vec<_> = self
            .squares
            .iter()
            .zip(self.sub_board_winners)
            .map(|(squares, winner)| serde_json::json!({ "squares": squares, "winner": winner }))
            .collect();
        serde_json::json!({
            "subBoards": sub_boards,
            "currentSubBoard": self.active,
            "currentPlayer": self.player,
            "historyLength": self.history_length,
            "winner": self.winner
        })
    }

    pub fn build(&self) -> GameState {
        serde_json::from_value(self.json()).expect("fixture should decode")
    }
}

/// State after X opens in the center of the center sub-board.
pub fn after_center_move() -> Fixture {
    Fixture::new()
        .cell(target(4, 4), Mark::X)
        .active(ActiveSubBoard::Board(4))
        .player(Mark::O)
        .history(2)
}
