use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::config::{projection_floor, LEADERBOARD_TZ};
use crate::error::{AppError, Result};
use crate::fetcher::BoxScoreSource;
use crate::scorer::{calculate_fantasy_score, normalize_keys};
use crate::state::schedule::scoring_period;
use crate::state::{PlayerStatsIndex, RosterIndex, ScheduleIndex};
use crate::types::{GameRecord, LeaderboardRow, StatLine, UpcomingRow};

/// Today's date in the leaderboard time zone.
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&LEADERBOARD_TZ).date_naive()
}

// ---------------------------------------------------------------------------
// Box score sides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Visitor,
    Home,
}

impl Side {
    fn key(self) -> &'static str {
        match self {
            Side::Visitor => "vls",
            Side::Home => "hls",
        }
    }

    /// `(team abbreviation, player entries)` for this side, or None when the
    /// game detail has no usable lineup yet (e.g. the game has not started).
    fn lineup(self, box_score: &Value) -> Option<(&str, &[Value])> {
        let side = box_score.get("g")?.get(self.key())?;
        let team = side.get("ta")?.as_str()?;
        let players = side.get("pstsg")?.as_array()?;
        Some((team, players.as_slice()))
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Visitor => write!(f, "visitor"),
            Side::Home => write!(f, "home"),
        }
    }
}

// ---------------------------------------------------------------------------
// LeaderboardAssembler
// ---------------------------------------------------------------------------

/// Joins schedule, box scores and roster into a day's fantasy leaderboard.
///
/// All indices are loaded at startup and never mutated afterwards.
pub struct LeaderboardAssembler<S> {
    schedule: ScheduleIndex,
    roster: RosterIndex,
    players: PlayerStatsIndex,
    source: S,
    season_start: NaiveDate,
    health: Arc<HealthState>,
    latency: Arc<LatencyStats>,
}

impl<S: BoxScoreSource> LeaderboardAssembler<S> {
    pub fn new(
        schedule: ScheduleIndex,
        roster: RosterIndex,
        players: PlayerStatsIndex,
        source: S,
        season_start: NaiveDate,
        health: Arc<HealthState>,
        latency: Arc<LatencyStats>,
    ) -> Self {
        Self {
            schedule,
            roster,
            players,
            source,
            season_start,
            health,
            latency,
        }
    }

    pub fn schedule(&self) -> &ScheduleIndex {
        &self.schedule
    }

    pub fn roster(&self) -> &RosterIndex {
        &self.roster
    }

    pub fn players(&self) -> &PlayerStatsIndex {
        &self.players
    }

    pub fn health(&self) -> &HealthState {
        &self.health
    }

    pub fn latency(&self) -> &LatencyStats {
        &self.latency
    }

    pub fn scoring_period(&self, date: NaiveDate) -> i64 {
        scoring_period(self.season_start, date)
    }

    /// Score every player in every game on `date`, highest fantasy score first.
    ///
    /// Games are fetched one after another. A fetch failure aborts the whole
    /// request. A bad player record abandons the rest of its game; rows already
    /// collected from that game are kept.
    pub async fn assemble(&self, date: NaiveDate) -> Result<Vec<LeaderboardRow>> {
        self.health.inc_leaderboard_requests();

        let games = self.schedule.games_on_date(date);
        if games.is_empty() {
            debug!("No games scheduled on {date}");
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        for game in games {
            let started = Instant::now();
            let box_score = match self.source.fetch(&game.game_id).await {
                Ok(b) => b,
                Err(e) => {
                    self.health.inc_fetch_failures();
                    return Err(e);
                }
            };
            self.latency.record(started.elapsed());
            self.health.mark_fetch();

            let before = rows.len();
            if let Err(e) = self.collect_game(game, &box_score, &mut rows) {
                self.health.inc_abandoned_games();
                warn!(
                    game_id = %game.game_id,
                    "Abandoned remaining entries of {} @ {}: {e}",
                    game.visitor, game.home,
                );
            }
            debug!(game_id = %game.game_id, "Collected {} rows", rows.len() - before);
        }

        sort_by_score(&mut rows);
        info!("Leaderboard for {date}: {} games, {} players", games.len(), rows.len());
        Ok(rows)
    }

    fn collect_game(
        &self,
        game: &GameRecord,
        box_score: &Value,
        rows: &mut Vec<LeaderboardRow>,
    ) -> Result<()> {
        for side in [Side::Visitor, Side::Home] {
            let Some((team, entries)) = side.lineup(box_score) else {
                debug!(game_id = %game.game_id, "No {side} lineup in box score, skipping");
                continue;
            };
            for entry in entries {
                let row = self.score_entry(team, entry).map_err(|e| {
                    error!(game_id = %game.game_id, team, "Failed to score player entry: {e}");
                    e
                })?;
                rows.push(row);
            }
        }
        Ok(())
    }

    fn score_entry(&self, team: &str, entry: &Value) -> Result<LeaderboardRow> {
        let Value::Object(record) = normalize_keys(entry.clone()) else {
            return Err(AppError::Upstream(format!("player entry is not an object: {entry}")));
        };
        let mut stats = StatLine::from_record(&record)?;
        let fantasy_score = calculate_fantasy_score(&mut stats);

        let name_part = |key: &'static str| {
            record
                .get(key)
                .and_then(Value::as_str)
                .ok_or(AppError::MissingName(key))
        };
        let player_name = format!("{} {}", name_part("FN")?, name_part("LN")?);
        let owner = self.roster.owner_of(&player_name).to_string();

        Ok(LeaderboardRow {
            player_name,
            team: team.to_string(),
            owner,
            stats,
            fantasy_score,
        })
    }

    /// Season players above the projection floor with their team's game count
    /// in `[today, today + window_days)`. Most games first, then best season score.
    pub fn upcoming(&self, today: NaiveDate, window_days: i64) -> Vec<UpcomingRow> {
        let window_end = today + Duration::days(window_days);
        let mut rows: Vec<UpcomingRow> = self
            .players
            .players()
            .iter()
            .filter(|p| {
                p.stats.min.unwrap_or(0.0) > projection_floor::MIN_MINUTES
                    && p.fantasy_score > projection_floor::MIN_FANTASY_SCORE
            })
            .map(|p| UpcomingRow {
                player_id: p.id,
                player_name: p.name.clone(),
                team: p.team.clone(),
                owner: self.roster.owner_of(&p.name).to_string(),
                games: self.schedule.upcoming_dates_for_team(&p.team, today, window_end).len(),
                minutes: p.stats.min,
                fantasy_score: p.fantasy_score,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.games
                .cmp(&a.games)
                .then(b.fantasy_score.total_cmp(&a.fantasy_score))
        });
        rows
    }
}

/// Descending by fantasy score; ties keep encounter order.
pub fn sort_by_score(rows: &mut [LeaderboardRow]) {
    rows.sort_by(|a, b| b.fantasy_score.total_cmp(&a.fantasy_score));
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::state::players::PlayersSnapshot;
    use crate::state::roster::RosterSnapshot;
    use crate::state::schedule::tests::{date, snapshot};
    use crate::types::Milestone;

    /// In-memory box scores keyed by game id; unknown ids fail like a transport error.
    pub(crate) struct StubSource {
        pub(crate) games: HashMap<String, Value>,
    }

    impl BoxScoreSource for StubSource {
        async fn fetch(&self, game_id: &str) -> Result<Value> {
            self.games
                .get(game_id)
                .cloned()
                .ok_or_else(|| AppError::Upstream(format!("no box score for {game_id}")))
        }
    }

    pub(crate) fn entry(first: &str, last: &str, pts: u32, ast: u32) -> Value {
        json!({
            "fn": first, "ln": last, "min": 30,
            "fgm": 5, "fga": 10, "tpm": 0, "tpa": 1, "ftm": 0, "fta": 0,
            "oreb": 2, "dreb": 1, "ast": ast, "stl": 2, "blk": 1, "tov": 3, "pts": pts
        })
    }

    pub(crate) fn box_score(
        visitor: Option<(&str, Vec<Value>)>,
        home: Option<(&str, Vec<Value>)>,
    ) -> Value {
        let mut g = serde_json::Map::new();
        if let Some((ta, players)) = visitor {
            g.insert("vls".to_string(), json!({"ta": ta, "tn": "Visitors", "pstsg": players}));
        }
        if let Some((ta, players)) = home {
            g.insert("hls".to_string(), json!({"ta": ta, "tn": "Home", "pstsg": players}));
        }
        json!({"g": g})
    }

    pub(crate) fn assembler(
        games: &[(&str, &str, &str, &str)],
        box_scores: Vec<(&str, Value)>,
    ) -> LeaderboardAssembler<StubSource> {
        let roster: RosterSnapshot = serde_json::from_value(json!({"players": [
            {"onTeamId": 1, "player": {"fullName": "Kyrie Irving"}}
        ]}))
        .unwrap();
        let labels = HashMap::from([(1, "Hoop Dreams".to_string())]);
        LeaderboardAssembler::new(
            ScheduleIndex::build(snapshot(games)),
            RosterIndex::build(roster, &labels),
            PlayerStatsIndex::default(),
            StubSource {
                games: box_scores.into_iter().map(|(id, v)| (id.to_string(), v)).collect(),
            },
            date("2018-10-16"),
            Arc::new(HealthState::new()),
            Arc::new(LatencyStats::new()),
        )
    }

    const BOS_AT_LAL: (&str, &str, &str, &str) = ("0021800345", "2018-12-01", "BOS", "LAL");

    #[tokio::test]
    async fn single_game_double_double() {
        let a = assembler(
            &[BOS_AT_LAL],
            vec![(
                "0021800345",
                box_score(Some(("BOS", vec![entry("Kyrie", "Irving", 10, 10)])), None),
            )],
        );
        let rows = a.assemble(date("2018-12-01")).await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.player_name, "Kyrie Irving");
        assert_eq!(row.team, "BOS");
        assert_eq!(row.owner, "Hoop Dreams");
        assert_eq!(row.stats.milestone, Some(Milestone::Dd));
        assert!((row.fantasy_score - 34.0).abs() < 1e-9, "score={}", row.fantasy_score);
        assert_eq!(a.latency.len(), 1);
    }

    #[tokio::test]
    async fn unrostered_player_is_free_agent() {
        let a = assembler(
            &[BOS_AT_LAL],
            vec![(
                "0021800345",
                box_score(None, Some(("LAL", vec![entry("Lonzo", "Ball", 8, 9)]))),
            )],
        );
        let rows = a.assemble(date("2018-12-01")).await.unwrap();
        assert_eq!(rows[0].owner, "FA");
        assert_eq!(rows[0].team, "LAL");
        assert_eq!(rows[0].stats.milestone, None);
    }

    #[tokio::test]
    async fn empty_day_is_empty_leaderboard() {
        let a = assembler(&[BOS_AT_LAL], vec![]);
        let rows = a.assemble(date("2018-12-02")).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn sorts_across_games_and_keeps_ties_stable() {
        let a = assembler(
            &[BOS_AT_LAL, ("0021800346", "2018-12-01", "GSW", "PHX")],
            vec![
                (
                    "0021800345",
                    box_score(
                        Some(("BOS", vec![entry("Tie", "First", 8, 5)])),
                        Some(("LAL", vec![entry("Low", "Scorer", 2, 0)])),
                    ),
                ),
                (
                    "0021800346",
                    box_score(
                        Some(("GSW", vec![entry("Top", "Scorer", 40, 5)])),
                        Some(("PHX", vec![entry("Tie", "Second", 8, 5)])),
                    ),
                ),
            ],
        );
        let rows = a.assemble(date("2018-12-01")).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(names, ["Top Scorer", "Tie First", "Tie Second", "Low Scorer"]);
        assert_eq!(rows[1].fantasy_score, rows[2].fantasy_score);
        assert_eq!(rows[2].team, "PHX");
    }

    #[tokio::test]
    async fn missing_side_is_skipped() {
        let box_score = json!({"g": {
            "vls": {"ta": "BOS"},
            "hls": {"ta": "LAL", "pstsg": [entry("Lonzo", "Ball", 8, 9)]}
        }});
        let a = assembler(&[BOS_AT_LAL], vec![("0021800345", box_score)]);
        let rows = a.assemble(date("2018-12-01")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team, "LAL");
    }

    #[tokio::test]
    async fn game_not_started_yields_no_rows() {
        let pregame = json!({"g": {"gid": "0021800345", "st": "1"}});
        let a = assembler(&[BOS_AT_LAL], vec![("0021800345", pregame)]);
        assert!(a.assemble(date("2018-12-01")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_record_abandons_rest_of_its_game_only() {
        let mut broken = entry("Broken", "Record", 10, 0);
        broken.as_object_mut().unwrap().remove("tov");
        let a = assembler(
            &[BOS_AT_LAL, ("0021800346", "2018-12-01", "GSW", "PHX")],
            vec![
                (
                    "0021800345",
                    box_score(
                        Some((
                            "BOS",
                            vec![
                                entry("Kept", "Before", 10, 0),
                                broken,
                                entry("Lost", "After", 10, 0),
                            ],
                        )),
                        Some(("LAL", vec![entry("Lost", "Home", 10, 0)])),
                    ),
                ),
                (
                    "0021800346",
                    box_score(Some(("GSW", vec![entry("Other", "Game", 10, 0)])), None),
                ),
            ],
        );
        let rows = a.assemble(date("2018-12-01")).await.unwrap();
        let mut names: Vec<_> = rows.iter().map(|r| r.player_name.as_str()).collect();
        names.sort();
        assert_eq!(names, ["Kept Before", "Other Game"]);
        assert_eq!(a.health.abandoned_games(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let a = assembler(&[BOS_AT_LAL], vec![]);
        let err = a.assemble(date("2018-12-01")).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert_eq!(a.health.fetch_failures(), 1);
    }

    #[tokio::test]
    async fn missing_name_is_a_bad_record() {
        let mut nameless = entry("No", "Last", 10, 0);
        nameless.as_object_mut().unwrap().remove("ln");
        let a = assembler(
            &[BOS_AT_LAL],
            vec![("0021800345", box_score(Some(("BOS", vec![nameless])), None))],
        );
        assert!(a.assemble(date("2018-12-01")).await.unwrap().is_empty());
        assert_eq!(a.health.abandoned_games(), 1);
    }

    #[test]
    fn upcoming_counts_team_games_in_window() {
        let players: PlayersSnapshot = serde_json::from_value(json!({"resultSets": [{
            "headers": ["PLAYER_ID", "PLAYER_NAME", "TEAM_ABBREVIATION", "MIN",
                        "FGM", "FGA", "FTM", "FTA", "OREB", "DREB", "AST", "STL", "BLK", "TOV", "PTS"],
            "rowSet": [
                [1, "Kyrie Irving", "BOS", 33.0, 9.0, 18.0, 3.0, 3.0, 1.0, 4.0, 7.0, 1.5, 0.3, 2.6, 24.0],
                [2, "Bench Guy", "BOS", 12.0, 9.0, 18.0, 3.0, 3.0, 1.0, 4.0, 7.0, 1.5, 0.3, 2.6, 24.0],
                [3, "Lonzo Ball", "LAL", 30.0, 9.0, 18.0, 3.0, 3.0, 1.0, 4.0, 7.0, 1.5, 0.3, 2.6, 26.0],
                [4, "Cold Hand", "LAL", 30.0, 2.0, 10.0, 0.0, 0.0, 0.0, 2.0, 1.0, 0.0, 0.0, 1.0, 4.0]
            ]
        }]}))
        .unwrap();
        let mut a = assembler(
            &[
                BOS_AT_LAL,
                ("0021800350", "2018-12-02", "LAL", "GSW"),
                ("0021800360", "2018-12-05", "PHX", "BOS"),
            ],
            vec![],
        );
        a.players = PlayerStatsIndex::build(players).unwrap();

        let rows = a.upcoming(date("2018-12-01"), 4);
        let summary: Vec<_> = rows.iter().map(|r| (r.player_name.as_str(), r.games)).collect();
        assert_eq!(summary, [("Lonzo Ball", 2), ("Kyrie Irving", 1)]);
        assert_eq!(rows[1].owner, "Hoop Dreams");
    }

    #[test]
    fn scoring_period_uses_season_start() {
        let a = assembler(&[], vec![]);
        assert_eq!(a.scoring_period(date("2018-10-16")), 1);
        assert_eq!(a.scoring_period(date("2018-12-01")), 47);
    }

    #[test]
    fn today_is_resolved_in_us_eastern() {
        let before = Utc::now().with_timezone(&chrono_tz::US::Eastern).date_naive();
        let got = today();
        let after = Utc::now().with_timezone(&chrono_tz::US::Eastern).date_naive();
        assert!(got == before || got == after, "today={got} eastern={before}..{after}");
    }
}
