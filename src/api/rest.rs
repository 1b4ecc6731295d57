//! REST client for the game server.

use std::time::Duration;

use reqwest::{Method, Url};
use tracing::{debug, info, instrument, warn};

use super::GameApi;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::games::ultimate::{CellTarget, GameId, GameState};

/// HTTP game server client.
#[derive(Debug, Clone)]
pub struct RestGameApi {
    /// Base URL of the game server, without trailing slash.
    base_url: String,
    /// HTTP client with the request timeout applied.
    client: reqwest::Client,
}

impl RestGameApi {
    /// Creates a client whose every request fails after `timeout`.
    #[instrument(skip_all, fields(base_url = %base_url.as_ref(), timeout = ?timeout))]
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.as_ref().trim_end_matches('/').to_string();
        info!("Created REST game client");
        Ok(Self { base_url, client })
    }

    /// Creates a client from configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(config.server_url(), config.request_timeout())
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ClientError> {
        let raw = format!("{}{}", self.base_url, path);
        let parsed = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        parsed.map_err(|e| ClientError::network(format!("Invalid server URL {}: {}", raw, e)))
    }

    /// Sends a request and returns the body of a successful response.
    async fn send(&self, method: Method, url: Url) -> Result<String, ClientError> {
        debug!(method = %method, url = %url, "Sending request");

        let response = self
            .client
            .request(method, url.clone())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, url = %url, "Request failed");
                ClientError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, body_len = body.len(), "Got response");

        if !status.is_success() {
            warn!(status = %status, body = %body, "Server rejected request");
            return Err(ClientError::server(status.as_u16(), body.trim()));
        }

        Ok(body)
    }

    async fn send_for_state(&self, method: Method, url: Url) -> Result<GameState, ClientError> {
        let body = self.send(method, url).await?;
        let state: GameState = serde_json::from_str(&body)?;
        debug!(
            history_length = state.history_length(),
            active = ?state.active_sub_board(),
            "Decoded game state"
        );
        Ok(state)
    }

    fn id_param(id: &GameId) -> (&'static str, String) {
        ("id", id.as_str().to_string())
    }
}

#[async_trait::async_trait]
impl GameApi for RestGameApi {
    #[instrument(skip(self))]
    async fn create(&self) -> Result<GameId, ClientError> {
        let url = self.url("/game/create", &[])?;
        let body = self.send(Method::POST, url).await?;
        let id = GameId::parse(&body)?;
        info!(game_id = %id, "Game created");
        Ok(id)
    }

    #[instrument(skip(self), fields(game_id = %id))]
    async fn fetch(&self, id: &GameId) -> Result<GameState, ClientError> {
        let url = self.url("/game", &[Self::id_param(id)])?;
        self.send_for_state(Method::GET, url).await
    }

    #[instrument(skip(self), fields(game_id = %id))]
    async fn delete(&self, id: &GameId) -> Result<(), ClientError> {
        let url = self.url("/game", &[Self::id_param(id)])?;
        self.send(Method::DELETE, url).await?;
        info!("Game deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(game_id = %id, index = target.linear_index()))]
    async fn play(&self, id: &GameId, target: CellTarget) -> Result<GameState, ClientError> {
        let url = self.url(
            "/game/play",
            &[
                Self::id_param(id),
                ("index", target.linear_index().to_string()),
            ],
        )?;
        self.send_for_state(Method::POST, url).await
    }

    #[instrument(skip(self), fields(game_id = %id))]
    async fn play_ai(&self, id: &GameId) -> Result<GameState, ClientError> {
        let url = self.url("/game/play/ai", &[Self::id_param(id)])?;
        self.send_for_state(Method::POST, url).await
    }

    #[instrument(skip(self), fields(game_id = %id))]
    async fn ping(&self, id: &GameId) -> Result<(), ClientError> {
        let url = self.url("/game/ping", &[Self::id_param(id)])?;
        self.send(Method::GET, url).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(game_id = %id))]
    async fn jump(&self, id: &GameId, step: usize) -> Result<GameState, ClientError> {
        let url = self.url("/game/jump", &[Self::id_param(id), ("step", step.to_string())])?;
        self.send_for_state(Method::POST, url).await
    }
}
