//! Strictly Ultimate - client for networked super tic-tac-toe
//!
//! The game server owns the rules; this library mirrors what the server
//! reports and turns user gestures into server requests.
//!
//! # Architecture
//!
//! - **Games**: wire types for the 3x3 grid of 3x3 sub-boards
//! - **Api**: the [`GameApi`] capability trait and its REST implementation
//! - **Session**: [`SessionController`], the client-side state machine, and
//!   the liveness ping task that keeps an open game from expiring
//! - **View**: [`BoardView`], a pure mapping from session state to what is
//!   drawn, and the [`Intent`]s a gesture raises
//! - **TUI**: a ratatui front-end over the above
//!
//! # Example
//!
//! ```no_run
//! use strictly_ultimate::{BoardView, ClientConfig, RestGameApi, SessionController};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::default();
//! let session = SessionController::with_config(RestGameApi::from_config(&config)?, &config);
//! session.start().await?;
//! session.submit_move(4, 4).await?;
//!
//! if let BoardView::Board(game) = BoardView::render(&session.snapshot()) {
//!     println!("{}", game.status());
//! }
//! session.terminate().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod config;
mod error;
mod games;
mod session;
mod tui;
mod view;

// Crate-level exports - Server capabilities
pub use api::{GameApi, RestGameApi};

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError, SERVER_URL_ENV};

// Crate-level exports - Errors
pub use error::{ClientError, ClientErrorKind};

// Crate-level exports - Game types
pub use games::ultimate::{
    ActiveSubBoard, BOARD_SIZE, CellTarget, CellValue, GameId, GameState, Mark, Outcome,
    SubBoardState,
};

// Crate-level exports - Session management
pub use session::{
    Dispatch, LivenessPing, SessionController, SessionPhase, SessionSnapshot, SkipReason,
};

// Crate-level exports - Board interaction layer
pub use view::{
    Activity, BoardCursor, BoardView, CellView, Direction, GameView, Intent, StepView,
    SubBoardView,
};

// Crate-level exports - Terminal front-end
pub use tui::run_tui;
