use crate::types::{Milestone, StatLine};

/// Category counts at or above this value contribute to a milestone.
const DOUBLE_THRESHOLD: f64 = 10.0;

/// Per-stat weights of the fantasy formula.
pub mod weights {
    pub const FGA: f64 = -0.75;
    pub const FGM: f64 = 1.0;
    pub const FG3M: f64 = 0.5;
    pub const FTA: f64 = -0.5;
    pub const FTM: f64 = 1.0;
    pub const OREB: f64 = 1.5;
    pub const DREB: f64 = 0.5;
    pub const AST: f64 = 1.5;
    pub const STL: f64 = 2.5;
    pub const BLK: f64 = 2.5;
    pub const TOV: f64 = -1.5;
    pub const PTS: f64 = 1.0;
    pub const W_PCT: f64 = 2.0;
}

/// Number of categories at 10+. Rebounds count once, as OREB + DREB.
pub fn double_stats(line: &StatLine) -> u32 {
    let singles = [line.ast, line.stl, line.blk, line.pts]
        .iter()
        .filter(|&&v| v >= DOUBLE_THRESHOLD)
        .count() as u32;
    let rebounds = u32::from(line.oreb + line.dreb >= DOUBLE_THRESHOLD);
    singles + rebounds
}

/// Fantasy score for one stat line, rounded to 2 decimals.
/// Records the derived milestone on `line`.
pub fn calculate_fantasy_score(line: &mut StatLine) -> f64 {
    line.milestone = Milestone::from_count(double_stats(line));

    let score = weights::FGA * line.fga
        + weights::FGM * line.fgm
        + weights::FG3M * line.fg3m
        + weights::FTA * line.fta
        + weights::FTM * line.ftm
        + weights::OREB * line.oreb
        + weights::DREB * line.dreb
        + weights::AST * line.ast
        + weights::STL * line.stl
        + weights::BLK * line.blk
        + weights::TOV * line.tov
        + weights::PTS * line.pts
        + weights::W_PCT * line.w_pct
        + line.milestone.map_or(0.0, Milestone::bonus);

    round2(score)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}
