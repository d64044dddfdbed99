use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    /// Provider game code, e.g. `20181201/BOSLAL`. Not present in every snapshot.
    pub game_code: Option<String>,
    pub date: NaiveDate,
    pub visitor: String,
    pub home: String,
}

// ---------------------------------------------------------------------------
// Stat lines
// ---------------------------------------------------------------------------

/// Double/triple/quadruple-double flag derived from how many categories reached 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Milestone {
    /// DD: exactly two categories.
    Dd,
    /// TD: exactly three categories.
    Td,
    /// QD: exactly four categories.
    Qd,
}

impl Milestone {
    /// Exact counts only: five qualifying categories yield no milestone.
    pub fn from_count(double_stats: u32) -> Option<Self> {
        match double_stats {
            2 => Some(Milestone::Dd),
            3 => Some(Milestone::Td),
            4 => Some(Milestone::Qd),
            _ => None,
        }
    }

    pub fn bonus(self) -> f64 {
        match self {
            Milestone::Dd => 5.0,
            Milestone::Td => 15.0,
            Milestone::Qd => 25.0,
        }
    }
}

/// One player's counting stats in the canonical field set.
/// Built from a provider record by `scorer::schema::StatLine::from_record`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub min: Option<f64>,
    pub fgm: f64,
    pub fga: f64,
    pub fg3m: f64,
    pub fg3a: Option<f64>,
    pub ftm: f64,
    pub fta: f64,
    pub oreb: f64,
    pub dreb: f64,
    pub ast: f64,
    pub stl: f64,
    pub blk: f64,
    pub tov: f64,
    pub pts: f64,
    /// Win-percentage contribution; only season aggregates carry it.
    pub w_pct: f64,
    /// Set by `calculate_fantasy_score`.
    pub milestone: Option<Milestone>,
}

// ---------------------------------------------------------------------------
// Output rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub player_name: String,
    pub team: String,
    pub owner: String,
    pub stats: StatLine,
    pub fantasy_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingRow {
    pub player_id: i64,
    pub player_name: String,
    pub team: String,
    pub owner: String,
    /// Team games inside the projection window.
    pub games: usize,
    pub minutes: Option<f64>,
    /// Season-average fantasy score.
    pub fantasy_score: f64,
}
