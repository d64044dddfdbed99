//! Shared health counters for the /health endpoint.
//! Updated by the leaderboard assembler and the route handlers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Default)]
pub struct HealthState {
    /// Leaderboard requests served (including empty days).
    pub leaderboard_requests: AtomicU64,
    /// Box-score fetches that failed and aborted a request.
    pub fetch_failures: AtomicU64,
    /// Games whose remaining entries were abandoned after a bad player record.
    pub abandoned_games: AtomicU64,
    /// Millisecond timestamp of the last successful box-score fetch (0 = none).
    pub last_fetch_at_ms: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_leaderboard_requests(&self) {
        self.leaderboard_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fetch_failures(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_abandoned_games(&self) {
        self.abandoned_games.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_fetch(&self) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        self.last_fetch_at_ms.store(now_ms, Ordering::Relaxed);
    }

    pub fn leaderboard_requests(&self) -> u64 {
        self.leaderboard_requests.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn abandoned_games(&self) -> u64 {
        self.abandoned_games.load(Ordering::Relaxed)
    }

    pub fn last_fetch_at_ms(&self) -> u64 {
        self.last_fetch_at_ms.load(Ordering::Relaxed)
    }
}
