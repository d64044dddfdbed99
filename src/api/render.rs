use std::fmt::Write;

use chrono::NaiveDate;

use crate::types::LeaderboardRow;

pub const COLUMNS: &[&str] = &[
    "player_name",
    "team",
    "owner",
    "min",
    "fgm",
    "fga",
    "tpm",
    "tpa",
    "ftm",
    "fta",
    "oreb",
    "dreb",
    "ast",
    "stl",
    "blk",
    "tov",
    "pts",
    "fantasy_score",
];

/// Render a leaderboard as the HTML table served by `/leaders`.
pub fn leaderboard_html(date: NaiveDate, scoring_period: i64, rows: &[LeaderboardRow]) -> String {
    let mut html = String::with_capacity(512 + rows.len() * 256);
    let _ = write!(
        html,
        "<html><h3>{} (scoring period {scoring_period})</h3><table border=2 width=1024>",
        date.format("%Y-%m-%d")
    );

    html.push_str("<tr>");
    for column in COLUMNS {
        let _ = write!(html, "<th>{column}</th>");
    }
    html.push_str("</tr>");

    for row in rows {
        html.push_str("<tr align=right>");
        for cell in cells(row) {
            let _ = write!(html, "<td>{}</td>", escape(&cell));
        }
        html.push_str("</tr>");
    }

    html.push_str("</table></html>");
    html
}

fn cells(row: &LeaderboardRow) -> [String; 18] {
    let s = &row.stats;
    [
        row.player_name.clone(),
        row.team.clone(),
        row.owner.clone(),
        opt_stat(s.min),
        stat(s.fgm),
        stat(s.fga),
        stat(s.fg3m),
        opt_stat(s.fg3a),
        stat(s.ftm),
        stat(s.fta),
        stat(s.oreb),
        stat(s.dreb),
        stat(s.ast),
        stat(s.stl),
        stat(s.blk),
        stat(s.tov),
        stat(s.pts),
        format!("{:.2}", row.fantasy_score),
    ]
}

/// Whole numbers print without a fraction: `7`, `33.5`.
fn stat(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

fn opt_stat(v: Option<f64>) -> String {
    v.map(stat).unwrap_or_default()
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
