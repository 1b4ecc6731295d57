//! Periodic liveness pings for an attended game.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::api::GameApi;
use crate::games::ultimate::GameId;

/// Background task pinging the server while a game is open.
///
/// The task reads the game identifier from a watch channel on every tick. It
/// ends when the identifier is cleared, when [`LivenessPing::stop`] is called,
/// or when the handle is dropped.
#[derive(Debug)]
pub struct LivenessPing {
    game_id: watch::Sender<Option<GameId>>,
    task: JoinHandle<()>,
}

impl LivenessPing {
    /// Spawns the ping loop on the current runtime.
    ///
    /// The first ping is sent one `interval` after spawning.
    #[instrument(skip(api), fields(game_id = %game_id))]
    pub fn spawn<A>(api: Arc<A>, game_id: GameId, interval: Duration, timeout: Duration) -> Self
    where
        A: GameApi + 'static,
    {
        info!(?interval, "Starting liveness pings");
        let (tx, rx) = watch::channel(Some(game_id));
        let task = tokio::spawn(ping_loop(api, rx, interval, timeout));
        Self { game_id: tx, task }
    }

    /// Clears the identifier so the loop stops, then cancels the task.
    #[instrument(skip(self))]
    pub fn stop(self) {
        info!("Stopping liveness pings");
        self.game_id.send_replace(None);
    }

    /// Whether the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for LivenessPing {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn ping_loop<A>(
    api: Arc<A>,
    mut game_id: watch::Receiver<Option<GameId>>,
    interval: Duration,
    timeout: Duration,
) where
    A: GameApi + 'static,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let current = game_id.borrow().clone();
                let Some(id) = current else {
                    debug!("No game open, skipping ping");
                    continue;
                };
                // Failures are dropped; the next tick tries again.
                match tokio::time::timeout(timeout, api.ping(&id)).await {
                    Ok(Ok(())) => debug!(game_id = %id, "Ping acknowledged"),
                    Ok(Err(e)) => debug!(game_id = %id, error = %e, "Ping failed"),
                    Err(_) => debug!(game_id = %id, "Ping timed out"),
                }
            }
            changed = game_id.changed() => {
                if changed.is_err() || game_id.borrow().is_none() {
                    debug!("Game closed, ping loop exiting");
                    break;
                }
            }
        }
    }
}
