use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::render::leaderboard_html;
use crate::config::{MAX_UPCOMING_WINDOW_DAYS, UPCOMING_WINDOW_DAYS};
use crate::error::AppError;
use crate::fetcher::BoxScoreSource;
use crate::leaderboard::{today, LeaderboardAssembler};
use crate::types::UpcomingRow;

pub struct ApiState<S> {
    pub assembler: Arc<LeaderboardAssembler<S>>,
}

// derive(Clone) would require S: Clone
impl<S> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            assembler: Arc::clone(&self.assembler),
        }
    }
}

pub fn router<S: BoxScoreSource + 'static>(state: ApiState<S>) -> Router {
    Router::new()
        .route("/leaders", get(get_leaders_today::<S>))
        .route("/leaders/:date", get(get_leaders::<S>))
        .route("/upcoming", get(get_upcoming::<S>))
        .route("/health", get(get_health::<S>))
        .route("/stats/latency", get(get_stats_latency::<S>))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<i64>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    pub scheduled_games: usize,
    pub roster_players: usize,
    pub season_players: usize,
    pub leaderboard_requests: u64,
    pub fetch_failures: u64,
    pub abandoned_games: u64,
    pub last_fetch_at_ms: Option<u64>,
}

#[derive(Serialize)]
pub struct LatencyResponse {
    pub samples: u64,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_leaders_today<S: BoxScoreSource>(
    State(state): State<ApiState<S>>,
) -> Result<Html<String>, AppError> {
    render_leaders(&state, today()).await
}

async fn get_leaders<S: BoxScoreSource>(
    State(state): State<ApiState<S>>,
    Path(date): Path<String>,
) -> Result<Html<String>, AppError> {
    let date =
        NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| AppError::InvalidDate(date))?;
    render_leaders(&state, date).await
}

async fn render_leaders<S: BoxScoreSource>(
    state: &ApiState<S>,
    date: NaiveDate,
) -> Result<Html<String>, AppError> {
    let rows = state.assembler.assemble(date).await?;
    let period = state.assembler.scoring_period(date);
    Ok(Html(leaderboard_html(date, period, &rows)))
}

async fn get_upcoming<S: BoxScoreSource>(
    State(state): State<ApiState<S>>,
    Query(params): Query<UpcomingQuery>,
) -> Json<Vec<UpcomingRow>> {
    let days = params.days.unwrap_or(UPCOMING_WINDOW_DAYS).clamp(0, MAX_UPCOMING_WINDOW_DAYS);
    Json(state.assembler.upcoming(today(), days))
}

async fn get_health<S: BoxScoreSource>(State(state): State<ApiState<S>>) -> Json<HealthResponse> {
    let a = &state.assembler;
    let health = a.health();
    let last_fetch = health.last_fetch_at_ms();
    Json(HealthResponse {
        scheduled_games: a.schedule().game_count(),
        roster_players: a.roster().len(),
        season_players: a.players().len(),
        leaderboard_requests: health.leaderboard_requests(),
        fetch_failures: health.fetch_failures(),
        abandoned_games: health.abandoned_games(),
        last_fetch_at_ms: (last_fetch > 0).then_some(last_fetch),
    })
}

async fn get_stats_latency<S: BoxScoreSource>(
    State(state): State<ApiState<S>>,
) -> Json<LatencyResponse> {
    let latency = state.assembler.latency();
    let (p50_ms, p95_ms, p99_ms) = latency.percentiles_ms();
    Json(LatencyResponse {
        samples: latency.len(),
        p50_ms,
        p95_ms,
        p99_ms,
    })
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::leaderboard::tests::{assembler, box_score, entry};

    fn app() -> Router {
        let a = assembler(
            &[("0021800345", "2018-12-01", "BOS", "LAL")],
            vec![(
                "0021800345",
                box_score(
                    Some(("BOS", vec![entry("Kyrie", "Irving", 10, 10)])),
                    Some(("LAL", vec![entry("Lonzo", "Ball", 8, 9)])),
                ),
            )],
        );
        router(ApiState { assembler: Arc::new(a) })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn leaders_for_date_renders_sorted_table() {
        let (status, body) = get(app(), "/leaders/2018-12-01").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h3>2018-12-01 (scoring period 47)</h3>"));
        let kyrie = body.find("Kyrie Irving").unwrap();
        let lonzo = body.find("Lonzo Ball").unwrap();
        assert!(kyrie < lonzo);
        assert!(body.contains("<td>Hoop Dreams</td>"));
        assert!(body.contains("<td>34.00</td>"));
    }

    #[tokio::test]
    async fn leaders_without_date_uses_today() {
        let before = today();
        let (status, body) = get(app(), "/leaders").await;
        let after = today();
        assert_eq!(status, StatusCode::OK);
        let header = |d: NaiveDate| format!("<h3>{}", d.format("%Y-%m-%d"));
        assert!(
            body.contains(&header(before)) || body.contains(&header(after)),
            "body={body}"
        );
    }

    #[tokio::test]
    async fn day_without_games_is_empty_table() {
        let (status, body) = get(app(), "/leaders/2018-12-02").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("<td>"));
    }

    #[tokio::test]
    async fn malformed_date_is_bad_request() {
        let (status, _) = get(app(), "/leaders/12-01-2018").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_counters() {
        let app = app();
        let _ = get(app.clone(), "/leaders/2018-12-01").await;
        let (status, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["scheduled_games"], 1);
        assert_eq!(v["roster_players"], 1);
        assert_eq!(v["leaderboard_requests"], 1);
        assert!(v["last_fetch_at_ms"].as_u64().is_some());
    }

    #[tokio::test]
    async fn upcoming_without_players_is_empty() {
        let (status, body) = get(app(), "/upcoming?days=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }
}
