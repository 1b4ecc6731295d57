//! Client-side game session: state machine and liveness pings.

mod controller;
mod ping;

pub use controller::{Dispatch, SessionController, SessionPhase, SessionSnapshot, SkipReason};
pub use ping::LivenessPing;
