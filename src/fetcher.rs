use std::future::Future;

use serde_json::Value;
use tracing::debug;

use crate::config::{Config, USER_AGENT};
use crate::error::{AppError, Result};

/// Source of per-game box scores, keyed by provider game id.
pub trait BoxScoreSource: Send + Sync {
    fn fetch(&self, game_id: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// Game-detail feed client. Every call goes to the network; no retry, no cache.
#[derive(Debug, Clone)]
pub struct GameDetailClient {
    client: reqwest::Client,
    base_url: String,
    season: String,
}

impl GameDetailClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: cfg.game_detail_url.trim_end_matches('/').to_string(),
            season: cfg.season.clone(),
        })
    }

    pub fn game_url(&self, game_id: &str) -> String {
        format!(
            "{}/{}/scores/gamedetail/{}_gamedetail.json",
            self.base_url, self.season, game_id
        )
    }
}

impl BoxScoreSource for GameDetailClient {
    async fn fetch(&self, game_id: &str) -> Result<Value> {
        let url = self.game_url(game_id);
        debug!("Fetching box score {game_id} from {url}");
        let resp: Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !resp.is_object() {
            return Err(AppError::Upstream(format!(
                "game detail for {game_id} was not a JSON object"
            )));
        }
        Ok(resp)
    }
}
