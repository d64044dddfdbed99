use std::collections::HashMap;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::error::{AppError, Result};

pub const GAME_DETAIL_URL: &str = "https://data.nba.com/data/10s/v2015/json/mobile_teams/nba";

/// The game-detail CDN rejects requests without a browser-like user agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) fantasy-leaders/0.1";

/// "Today" for `/leaders` without a date is resolved in this zone.
pub const LEADERBOARD_TZ: Tz = chrono_tz::US::Eastern;

/// Owner label for players not present in the roster snapshot.
pub const FREE_AGENT: &str = "FA";

/// Days covered by the upcoming-games projection when `?days=` is not given.
pub const UPCOMING_WINDOW_DAYS: i64 = 4;
pub const MAX_UPCOMING_WINDOW_DAYS: i64 = 366;

/// Season-average floor for the upcoming projection.
pub mod projection_floor {
    pub const MIN_MINUTES: f64 = 18.0;
    pub const MIN_FANTASY_SCORE: f64 = 30.0;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// Season year used in the game-detail URL (SEASON).
    pub season: String,
    /// First day of the fantasy season; scoring period 1 (SEASON_START).
    pub season_start: NaiveDate,
    pub schedule_path: String,
    pub roster_path: String,
    /// Season-averages snapshot. Missing file disables `/upcoming` (PLAYERS_PATH).
    pub players_path: String,
    pub game_detail_url: String,
    /// Fantasy team id → owner label (OWNER_LABELS, comma-separated `id=label`).
    /// Example: "1=Hoop Dreams,2=Bench Mob"
    pub owner_labels: HashMap<i64, String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let season = std::env::var("SEASON").unwrap_or_else(|_| "2018".to_string());
        let season_start =
            std::env::var("SEASON_START").unwrap_or_else(|_| "2018-10-16".to_string());

        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            season_start: NaiveDate::parse_from_str(&season_start, "%Y-%m-%d")
                .map_err(|_| {
                    AppError::Config(format!(
                        "SEASON_START must be YYYY-MM-DD, got {season_start:?}"
                    ))
                })?,
            schedule_path: std::env::var("SCHEDULE_PATH")
                .unwrap_or_else(|_| format!("schedule-{season}.json")),
            roster_path: std::env::var("ROSTER_PATH")
                .unwrap_or_else(|_| "espn_data.json".to_string()),
            players_path: std::env::var("PLAYERS_PATH")
                .unwrap_or_else(|_| "players.json".to_string()),
            game_detail_url: std::env::var("GAME_DETAIL_URL")
                .unwrap_or_else(|_| GAME_DETAIL_URL.to_string()),
            owner_labels: parse_owner_labels(&std::env::var("OWNER_LABELS").unwrap_or_default())?,
            season,
        })
    }
}

/// Parse `1=Hoop Dreams,2=Bench Mob` into a team-id → label table.
/// Blank entries are ignored; a later duplicate id replaces an earlier one.
pub fn parse_owner_labels(raw: &str) -> Result<HashMap<i64, String>> {
    let mut labels = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((id, label)) = entry.split_once('=') else {
            return Err(AppError::Config(format!("OWNER_LABELS entry {entry:?} is not id=label")));
        };
        let id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| {
                AppError::Config(format!("OWNER_LABELS id {:?} is not an integer", id.trim()))
            })?;
        labels.insert(id, label.trim().to_string());
    }
    Ok(labels)
}
