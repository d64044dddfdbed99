use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::FREE_AGENT;
use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct RosterSnapshot {
    pub players: Vec<RosterPlayer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayer {
    /// Fantasy team holding the player; absent or 0 for free agents.
    pub on_team_id: Option<i64>,
    pub player: RosterPlayerInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayerInfo {
    pub full_name: Option<String>,
}

/// Player full name → fantasy owner label.
///
/// Names are the only join key, so two players sharing a name collide and the
/// later snapshot entry wins.
#[derive(Debug, Default)]
pub struct RosterIndex {
    owners: HashMap<String, String>,
}

impl RosterIndex {
    pub fn build(snapshot: RosterSnapshot, owner_labels: &HashMap<i64, String>) -> Self {
        let mut owners = HashMap::with_capacity(snapshot.players.len());
        for entry in snapshot.players {
            let Some(name) = entry.player.full_name else {
                warn!("Skipping roster entry without fullName (onTeamId {:?})", entry.on_team_id);
                continue;
            };
            let owner = entry
                .on_team_id
                .and_then(|id| owner_labels.get(&id))
                .map(String::as_str)
                .unwrap_or(FREE_AGENT);
            if let Some(previous) = owners.insert(name.clone(), owner.to_string()) {
                debug!("Roster name collision for {name}: {previous} replaced by {owner}");
            }
        }
        Self { owners }
    }

    pub fn load<P: AsRef<Path>>(path: P, owner_labels: &HashMap<i64, String>) -> Result<Self> {
        let raw = std::fs::read_to_string(&path)?;
        let snapshot: RosterSnapshot = serde_json::from_str(&raw)?;
        info!(
            "Considering {} roster entries from {}",
            snapshot.players.len(),
            path.as_ref().display()
        );
        let index = Self::build(snapshot, owner_labels);
        info!(
            "Roster loaded: {} players, {} owned",
            index.len(),
            index.owners.values().filter(|o| o.as_str() != FREE_AGENT).count(),
        );
        Ok(index)
    }

    /// Owner label for `player_name`, `FA` when unknown.
    pub fn owner_of(&self, player_name: &str) -> &str {
        self.owners.get(player_name).map(String::as_str).unwrap_or(FREE_AGENT)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }
}
