use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::ask_job_registry::AskJobRegistry;

const FALLBACK_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically evicts terminal ask jobs older than the retention window.
pub struct JobReaper {
    registry: Arc<AskJobRegistry>,
    retention: Duration,
    sweep_interval: Duration,
}

impl JobReaper {
    pub fn new(
        registry: Arc<AskJobRegistry>,
        retention: Duration,
        sweep_interval: Duration,
    ) -> Self {
        let sweep_interval = if sweep_interval.is_zero() {
            tracing::warn!(
                fallback_secs = FALLBACK_SWEEP_INTERVAL.as_secs(),
                "Zero sweep interval configured, using fallback"
            );
            FALLBACK_SWEEP_INTERVAL
        } else {
            sweep_interval
        };
        Self {
            registry,
            retention,
            sweep_interval,
        }
    }

    pub fn sweep(&self) -> usize {
        let Ok(retention) = chrono::Duration::from_std(self.retention) else {
            return 0;
        };
        match Utc::now().checked_sub_signed(retention) {
            Some(cutoff) => self.registry.evict_finished_before(cutoff),
            None => 0,
        }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            retention_secs = self.retention.as_secs(),
            sweep_interval_secs = self.sweep_interval.as_secs(),
            "Job reaper started"
        );
        let mut ticker = tokio::time::interval(self.sweep_interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = self.sweep();
                    if evicted > 0 {
                        tracing::debug!(
                            evicted,
                            remaining = self.registry.len(),
                            "Evicted expired ask jobs"
                        );
                    }
                }
            }
        }
        tracing::info!("Job reaper stopped");
    }
}
