use std::time::Duration;
use tokio::time::{interval, Interval};
use tracing::{error, info};

use crate::AppState;

const CLEANUP_INTERVAL_SECONDS: u64 = 3600;

/// Periodically forgets revoked tokens that have expired on their own.
pub struct TokenCleanupService {
    state: AppState,
    interval: Interval,
}

impl TokenCleanupService {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            interval: interval(Duration::from_secs(CLEANUP_INTERVAL_SECONDS)),
        }
    }

    pub async fn run(&mut self) {
        info!("Starting revoked token cleanup service");

        loop {
            self.interval.tick().await;

            match infra::repos::revoked_tokens::delete_expired(&self.state.db).await {
                Ok(0) => {}
                Ok(removed) => info!("Removed {} expired token revocations", removed),
                Err(e) => error!("Error cleaning up revoked tokens: {}", e),
            }
        }
    }
}

pub fn spawn_token_cleanup_service(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut service = TokenCleanupService::new(state);
        service.run().await;
    })
}
