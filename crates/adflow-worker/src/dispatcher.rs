//! Job dispatcher: polling loop, claim, deliver, retry bookkeeping.
//!
//! Shutdown: [`JobDispatcher::shutdown`] signals the loop to stop; it does
//! not wait for in-flight deliveries. Jobs left pending are picked up again
//! on the next run; delivery is at-least-once by design.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::sleep;
use uuid::Uuid;

use adflow_core::constants::INTERNAL_SECRET_HEADER;
use adflow_db::{CreatorRepository, SocialJobRepository};

/// Body of the job dispatch POST. The external worker resolves everything
/// else from the job row and reports status out-of-band.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DispatchPayload {
    pub job_id: Uuid,
}

/// Body of the snapshot dispatch POST.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SnapshotDispatchPayload {
    pub snapshot_id: Uuid,
}

#[derive(Clone)]
pub struct DispatcherConfig {
    pub worker_url: String,
    pub internal_secret: String,
    pub poll_interval_ms: u64,
    pub batch_size: i64,
    pub max_attempts: i32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_url: "http://localhost:4100".to_string(),
            internal_secret: String::new(),
            poll_interval_ms: 1000,
            batch_size: 10,
            max_attempts: 5,
        }
    }
}

pub struct JobDispatcher {
    shutdown_tx: mpsc::Sender<()>,
}

impl JobDispatcher {
    /// Spawn the dispatch loop on the runtime and return a handle for
    /// shutdown.
    pub fn spawn(
        jobs: SocialJobRepository,
        creators: CreatorRepository,
        config: DispatcherConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            run_loop(jobs, creators, config, shutdown_rx).await;
        });

        Self { shutdown_tx }
    }

    /// Signal the loop to stop after the current poll cycle.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn run_loop(
    jobs: SocialJobRepository,
    creators: CreatorRepository,
    config: DispatcherConfig,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let client = reqwest::Client::new();
    let base = config.worker_url.trim_end_matches('/').to_string();
    let job_endpoint = format!("{}/jobs", base);
    let snapshot_endpoint = format!("{}/snapshots", base);
    tracing::info!(endpoint = %base, "Job dispatcher started");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("Job dispatcher shutting down");
                return;
            }
            _ = sleep(Duration::from_millis(config.poll_interval_ms)) => {}
        }

        dispatch_jobs(&client, &jobs, &config, &job_endpoint).await;
        dispatch_snapshots(&client, &creators, &config, &snapshot_endpoint).await;
    }
}

async fn dispatch_jobs(
    client: &reqwest::Client,
    jobs: &SocialJobRepository,
    config: &DispatcherConfig,
    endpoint: &str,
) {
    let claimed = match jobs
        .claim_pending(config.batch_size, config.max_attempts)
        .await
    {
        Ok(claimed) => claimed,
        Err(e) => {
            tracing::error!(error = %e, "Failed to claim pending jobs");
            return;
        }
    };

    for job in claimed {
        let payload = DispatchPayload { job_id: job.id };
        let result = client
            .post(endpoint)
            .header(INTERNAL_SECRET_HEADER, config.internal_secret.as_str())
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                if let Err(e) = jobs.mark_running(job.id).await {
                    tracing::error!(job_id = %job.id, error = %e, "Failed to mark job running");
                } else {
                    tracing::info!(
                        job_id = %job.id,
                        attempt = job.dispatch_attempts,
                        "Dispatched social data job"
                    );
                }
            }
            Ok(response) => {
                let status = response.status();
                record_job_failure(
                    jobs,
                    job.id,
                    &format!("fetch worker returned {}", status),
                    config.max_attempts,
                )
                .await;
            }
            Err(e) => {
                record_job_failure(jobs, job.id, &e.to_string(), config.max_attempts).await;
            }
        }
    }
}

async fn dispatch_snapshots(
    client: &reqwest::Client,
    creators: &CreatorRepository,
    config: &DispatcherConfig,
    endpoint: &str,
) {
    let claimed = match creators
        .claim_undispatched_snapshots(config.batch_size, config.max_attempts)
        .await
    {
        Ok(claimed) => claimed,
        Err(e) => {
            tracing::error!(error = %e, "Failed to claim undispatched snapshots");
            return;
        }
    };

    for snapshot in claimed {
        let payload = SnapshotDispatchPayload {
            snapshot_id: snapshot.id,
        };
        let result = client
            .post(endpoint)
            .header(INTERNAL_SECRET_HEADER, config.internal_secret.as_str())
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                if let Err(e) = creators.mark_snapshot_dispatched(snapshot.id).await {
                    tracing::error!(
                        snapshot_id = %snapshot.id,
                        error = %e,
                        "Failed to mark snapshot dispatched"
                    );
                } else {
                    tracing::info!(
                        snapshot_id = %snapshot.id,
                        attempt = snapshot.dispatch_attempts,
                        "Dispatched analytics snapshot"
                    );
                }
            }
            Ok(response) => {
                let status = response.status();
                record_snapshot_failure(
                    creators,
                    snapshot.id,
                    &format!("fetch worker returned {}", status),
                )
                .await;
            }
            Err(e) => {
                record_snapshot_failure(creators, snapshot.id, &e.to_string()).await;
            }
        }
    }
}

async fn record_job_failure(
    jobs: &SocialJobRepository,
    job_id: Uuid,
    error: &str,
    max_attempts: i32,
) {
    tracing::warn!(job_id = %job_id, error = %error, "Dispatch attempt failed");
    if let Err(e) = jobs.record_dispatch_failure(job_id, error, max_attempts).await {
        tracing::error!(job_id = %job_id, error = %e, "Failed to record dispatch failure");
    }
}

async fn record_snapshot_failure(creators: &CreatorRepository, snapshot_id: Uuid, error: &str) {
    tracing::warn!(snapshot_id = %snapshot_id, error = %error, "Snapshot dispatch attempt failed");
    if let Err(e) = creators
        .record_snapshot_dispatch_failure(snapshot_id, error)
        .await
    {
        tracing::error!(snapshot_id = %snapshot_id, error = %e, "Failed to record snapshot dispatch failure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_payload_shape() {
        let job_id = Uuid::new_v4();
        let json = serde_json::to_value(DispatchPayload { job_id }).expect("serialize");
        assert_eq!(json["job_id"], serde_json::json!(job_id.to_string()));
        assert_eq!(json.as_object().map(|o| o.len()), Some(1));
    }

    #[test]
    fn test_snapshot_payload_shape() {
        let snapshot_id = Uuid::new_v4();
        let json =
            serde_json::to_value(SnapshotDispatchPayload { snapshot_id }).expect("serialize");
        assert_eq!(json["snapshot_id"], serde_json::json!(snapshot_id.to_string()));
        assert_eq!(json.as_object().map(|o| o.len()), Some(1));
    }

    #[test]
    fn test_default_config_bounds() {
        let config = DispatcherConfig::default();
        assert!(config.batch_size > 0);
        assert!(config.max_attempts > 0);
        assert!(config.poll_interval_ms >= 100);
    }
}
