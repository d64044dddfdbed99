mod api;
mod config;
mod error;
mod fetcher;
mod leaderboard;
mod scorer;
mod state;
mod types;

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::GameDetailClient;
use crate::leaderboard::LeaderboardAssembler;
use crate::state::{PlayerStatsIndex, RosterIndex, ScheduleIndex};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Static snapshots, read once ---
    let schedule = ScheduleIndex::load(&cfg.schedule_path)?;

    if cfg.owner_labels.is_empty() {
        warn!(
            "OWNER_LABELS not set: every player will show as FA. \
             Example: OWNER_LABELS=1=Hoop Dreams,2=Bench Mob"
        );
    } else {
        info!("Owner labels configured for {} fantasy teams", cfg.owner_labels.len());
    }
    let roster = RosterIndex::load(&cfg.roster_path, &cfg.owner_labels)?;

    let players = if Path::new(&cfg.players_path).is_file() {
        PlayerStatsIndex::load(&cfg.players_path)?
    } else {
        warn!("{} not found: /upcoming will be empty", cfg.players_path);
        PlayerStatsIndex::default()
    };

    // --- Assembler ---
    let health = Arc::new(HealthState::new());
    let latency = Arc::new(LatencyStats::new());
    let source = GameDetailClient::new(&cfg)?;
    info!("Box scores from {}", source.game_url("{game_id}"));
    let assembler = LeaderboardAssembler::new(
        schedule,
        roster,
        players,
        source,
        cfg.season_start,
        health,
        latency,
    );

    // --- HTTP API server ---
    let app = router(ApiState { assembler: Arc::new(assembler) });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
