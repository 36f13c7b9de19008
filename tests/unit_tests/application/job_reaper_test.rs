use std::sync::Arc;
use std::time::Duration;

use askql::application::services::{AskJobRegistry, JobReaper};
use askql::domain::AskResult;
use tokio_util::sync::CancellationToken;

fn registry_with_stopped_and_running_job() -> Arc<AskJobRegistry> {
    let registry = Arc::new(AskJobRegistry::new());
    let stopped = registry.create("stopped");
    registry.create("running");
    registry
        .handle(stopped)
        .unwrap()
        .complete(AskResult::Stopped)
        .unwrap();
    registry
}

#[test]
fn given_zero_retention_when_sweeping_then_evicts_terminal_jobs_only() {
    let registry = registry_with_stopped_and_running_job();
    let reaper = JobReaper::new(
        Arc::clone(&registry),
        Duration::ZERO,
        Duration::from_secs(60),
    );

    std::thread::sleep(Duration::from_millis(5));
    let evicted = reaper.sweep();

    assert_eq!(evicted, 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn given_long_retention_when_sweeping_then_keeps_recent_jobs() {
    let registry = registry_with_stopped_and_running_job();
    let reaper = JobReaper::new(
        Arc::clone(&registry),
        Duration::from_secs(3600),
        Duration::from_secs(60),
    );

    assert_eq!(reaper.sweep(), 0);
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn given_running_reaper_when_shutdown_requested_then_stops_after_sweeping() {
    let registry = registry_with_stopped_and_running_job();
    let reaper = JobReaper::new(
        Arc::clone(&registry),
        Duration::ZERO,
        Duration::from_millis(5),
    );
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(reaper.run(shutdown.clone()));
    tokio::time::timeout(Duration::from_secs(5), async {
        while registry.len() > 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    shutdown.cancel();

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn given_zero_sweep_interval_when_running_then_sweeps_and_shuts_down_cleanly() {
    let registry = registry_with_stopped_and_running_job();
    let reaper = JobReaper::new(Arc::clone(&registry), Duration::ZERO, Duration::ZERO);
    let shutdown = CancellationToken::new();

    let task = tokio::spawn(reaper.run(shutdown.clone()));
    tokio::time::timeout(Duration::from_secs(5), async {
        while registry.len() > 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    shutdown.cancel();

    let joined = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap();
    assert!(joined.is_ok());
    assert_eq!(registry.len(), 1);
}
