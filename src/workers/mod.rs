pub mod metrics_refresh;
pub mod model_retrain;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::WorkerConfig;
use crate::recommender::RecommenderEngine;

/// Timeout for individual worker invocations (5 minutes).
const WORKER_TIMEOUT: Duration = Duration::from_secs(300);

/// Drain period before scheduler shutdown to let in-flight tasks complete.
#[cfg(test)]
const DRAIN_TIMEOUT: Duration = Duration::from_millis(10);
#[cfg(not(test))]
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerName {
    ModelRetrain,
    MetricsRefresh,
}

impl WorkerName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModelRetrain => "model_retrain",
            Self::MetricsRefresh => "metrics_refresh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub name: WorkerName,
    pub cron: String,
    pub enabled: bool,
}

pub struct WorkerManager {
    engine: Arc<RecommenderEngine>,
    shutdown_rx: broadcast::Receiver<()>,
    config: WorkerConfig,
}

impl WorkerManager {
    pub fn new(
        engine: Arc<RecommenderEngine>,
        shutdown_rx: broadcast::Receiver<()>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            engine,
            shutdown_rx,
            config: config.clone(),
        }
    }

    /// Single source of truth for all planned jobs and their cron schedules.
    /// An empty cron expression disables the job.
    pub fn planned_jobs(&self) -> Vec<JobSpec> {
        if !self.config.is_leader {
            return Vec::new();
        }

        vec![
            JobSpec {
                name: WorkerName::ModelRetrain,
                cron: self.config.retrain_cron.trim().to_string(),
                enabled: !self.config.retrain_cron.trim().is_empty(),
            },
            JobSpec {
                name: WorkerName::MetricsRefresh,
                cron: self.config.metrics_cron.trim().to_string(),
                enabled: !self.config.metrics_cron.trim().is_empty(),
            },
        ]
    }

    /// Start the worker scheduler. Returns an error if the scheduler cannot be created or started.
    pub async fn start(mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !self.config.is_leader {
            tracing::info!("Worker leader disabled; skipping worker startup");
            return Ok(());
        }

        let mut scheduler = JobScheduler::new().await?;

        self.register_jobs(&scheduler).await;

        scheduler.start().await?;

        tracing::info!("Worker manager started");
        let _ = self.shutdown_rx.recv().await;

        tracing::info!(
            "Worker manager shutting down, draining for {}s",
            DRAIN_TIMEOUT.as_secs()
        );
        tokio::time::sleep(DRAIN_TIMEOUT).await;
        let _ = scheduler.shutdown().await;
        Ok(())
    }

    async fn register_jobs(&self, scheduler: &JobScheduler) {
        for job in self.planned_jobs() {
            if !job.enabled {
                tracing::info!(name = job.name.as_str(), "Skipping disabled worker");
                continue;
            }

            let engine = self.engine.clone();
            let name_str = job.name.as_str();

            let registered = match job.name {
                WorkerName::ModelRetrain => {
                    add_job(scheduler, &job.cron, name_str, move || {
                        let engine = engine.clone();
                        async move {
                            model_retrain::run(&engine).await;
                        }
                    })
                    .await
                }
                WorkerName::MetricsRefresh => {
                    add_job(scheduler, &job.cron, name_str, move || {
                        let engine = engine.clone();
                        async move {
                            metrics_refresh::run(&engine).await;
                        }
                    })
                    .await
                }
            };
            if registered {
                tracing::info!(name = name_str, cron = %job.cron, "Registered worker");
            }
        }
    }
}

/// Add a job to the scheduler with an overlap guard and timeout wrapper.
async fn add_job<Fut, F>(scheduler: &JobScheduler, cron: &str, name: &'static str, mut run: F) -> bool
where
    F: FnMut() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let running = Arc::new(AtomicBool::new(false));

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let guard = running.clone();

        if guard
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(
                worker = name,
                "Skipping worker invocation: previous run still in progress"
            );
            return Box::pin(async {});
        }

        let fut = run();
        Box::pin(async move {
            if tokio::time::timeout(WORKER_TIMEOUT, fut).await.is_err() {
                tracing::error!(
                    worker = name,
                    timeout_secs = WORKER_TIMEOUT.as_secs(),
                    "Worker timed out"
                );
            }
            guard.store(false, Ordering::SeqCst);
        })
    });

    match job {
        Ok(job) => match scheduler.add(job).await {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(error = %err, cron, worker = name, "Failed to add worker job");
                false
            }
        },
        Err(err) => {
            tracing::error!(error = %err, cron, worker = name, "Failed to create worker job");
            false
        }
    }
}
