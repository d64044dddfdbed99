use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::scorer::calculate_fantasy_score;
use crate::scorer::schema::normalize_record;
use crate::types::StatLine;

/// Season-averages snapshot in the stats API table layout:
/// `{"resultSets":[{"headers":[...],"rowSet":[[...], ...]}]}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayersSnapshot {
    pub result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub headers: Vec<String>,
    pub row_set: Vec<Vec<Value>>,
}

#[derive(Debug, Clone)]
pub struct SeasonPlayer {
    pub id: i64,
    pub name: String,
    pub team: String,
    pub stats: StatLine,
    /// Fantasy score of the season averages.
    pub fantasy_score: f64,
}

#[derive(Debug, Default)]
pub struct PlayerStatsIndex {
    players: Vec<SeasonPlayer>,
}

impl PlayerStatsIndex {
    /// Rows that cannot be mapped onto the stat schema are skipped with a warning.
    pub fn build(snapshot: PlayersSnapshot) -> Result<Self> {
        let set = snapshot
            .result_sets
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Snapshot("players snapshot has no result sets".to_string()))?;

        let mut players = Vec::with_capacity(set.row_set.len());
        for row in set.row_set {
            if row.len() != set.headers.len() {
                warn!(
                    "Skipping player row with {} cells, expected {}",
                    row.len(),
                    set.headers.len()
                );
                continue;
            }
            let record: Map<String, Value> = set.headers.iter().cloned().zip(row).collect();
            match season_player(record) {
                Ok(p) => players.push(p),
                Err(e) => warn!("Skipping player row: {e}"),
            }
        }
        Ok(Self { players })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(&path)?;
        let snapshot: PlayersSnapshot = serde_json::from_str(&raw)?;
        let index = Self::build(snapshot)?;
        info!("Loaded {} season players from {}", index.len(), path.as_ref().display());
        Ok(index)
    }

    pub fn players(&self) -> &[SeasonPlayer] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }
}

fn season_player(record: Map<String, Value>) -> Result<SeasonPlayer> {
    let record = normalize_record(record);
    let text = |key: &'static str| -> Result<String> {
        record
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AppError::MissingName(key))
    };
    let id = record
        .get("PLAYER_ID")
        .and_then(Value::as_i64)
        .ok_or(AppError::MissingName("PLAYER_ID"))?;
    let name = text("PLAYER_NAME")?;
    let team = text("TEAM_ABBREVIATION")?;
    let mut stats = StatLine::from_record(&record)?;
    let fantasy_score = calculate_fantasy_score(&mut stats);
    Ok(SeasonPlayer { id, name, team, stats, fantasy_score })
}
