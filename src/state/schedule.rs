use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::types::GameRecord;

// ---------------------------------------------------------------------------
// Snapshot shape: {"lscd":[{"mscd":{"g":[game, ...]}}, ...]}, one entry per month
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ScheduleSnapshot {
    #[serde(rename = "lscd")]
    pub months: Vec<MonthEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MonthEntry {
    #[serde(rename = "mscd")]
    pub schedule: MonthSchedule,
}

#[derive(Debug, Deserialize)]
pub struct MonthSchedule {
    #[serde(rename = "g")]
    pub games: Vec<RawGame>,
}

#[derive(Debug, Deserialize)]
pub struct RawGame {
    pub gid: String,
    pub gcode: Option<String>,
    /// `YYYY-MM-DD`
    pub gdte: NaiveDate,
    pub v: RawTeam,
    pub h: RawTeam,
}

#[derive(Debug, Deserialize)]
pub struct RawTeam {
    /// Team abbreviation, e.g. `BOS`.
    pub ta: String,
}

// ---------------------------------------------------------------------------
// ScheduleIndex
// ---------------------------------------------------------------------------

/// Season schedule indexed by team and by date. Immutable once built.
///
/// Every game is listed under both participants in `by_team` and under its
/// date in `by_date`. List order follows the snapshot (chronological).
#[derive(Debug, Default)]
pub struct ScheduleIndex {
    by_team: HashMap<String, Vec<NaiveDate>>,
    by_date: HashMap<NaiveDate, Vec<GameRecord>>,
    game_count: usize,
}

impl ScheduleIndex {
    pub fn build(snapshot: ScheduleSnapshot) -> Self {
        let mut index = Self::default();
        for game in snapshot.months.into_iter().flat_map(|m| m.schedule.games) {
            index.by_team.entry(game.v.ta.clone()).or_default().push(game.gdte);
            index.by_team.entry(game.h.ta.clone()).or_default().push(game.gdte);
            index.by_date.entry(game.gdte).or_default().push(GameRecord {
                game_id: game.gid,
                game_code: game.gcode,
                date: game.gdte,
                visitor: game.v.ta,
                home: game.h.ta,
            });
            index.game_count += 1;
        }
        index
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(&path)?;
        let snapshot: ScheduleSnapshot = serde_json::from_str(&raw)?;
        let index = Self::build(snapshot);
        info!(
            "Loaded schedule from {}: {} games, {} teams, {} game days",
            path.as_ref().display(),
            index.game_count,
            index.by_team.len(),
            index.by_date.len(),
        );
        Ok(index)
    }

    /// Games on `date`; empty when nothing is scheduled.
    pub fn games_on_date(&self, date: NaiveDate) -> &[GameRecord] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dates_for_team(&self, team: &str) -> &[NaiveDate] {
        self.by_team.get(team).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Game dates for `team` in the half-open window `[from, to)`.
    pub fn upcoming_dates_for_team(
        &self,
        team: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<NaiveDate> {
        self.dates_for_team(team)
            .iter()
            .copied()
            .filter(|d| *d >= from && *d < to)
            .collect()
    }

    pub fn game_count(&self) -> usize {
        self.game_count
    }
}

/// League day index: 1 on `season_start`, counting calendar days.
pub fn scoring_period(season_start: NaiveDate, date: NaiveDate) -> i64 {
    (date - season_start).num_days() + 1
}
