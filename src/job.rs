use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{error, info};

use crate::backend::InstrumentedBackend;
use crate::config::Settings;
use crate::error::JobError;
use crate::metrics::{CONVERTER_JOBS_TOTAL, CONVERTER_JOB_PHASE};
use crate::types::{JobPhase, JobReport};

pub type JobStatusHandle = Arc<RwLock<JobPhase>>;

pub struct ConversionJob {
    settings: Arc<Settings>,
    backend: InstrumentedBackend,
    status: JobStatusHandle,
}

impl ConversionJob {
    pub fn new(settings: Arc<Settings>, backend: InstrumentedBackend) -> Self {
        let status = Arc::new(RwLock::new(JobPhase::Pending));
        CONVERTER_JOB_PHASE
            .with_label_values(&[&settings.job_id])
            .set(JobPhase::Pending.gauge_value());
        Self {
            settings,
            backend,
            status,
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn status(&self) -> JobStatusHandle {
        self.status.clone()
    }

    pub async fn run(&self) -> Result<JobReport, JobError> {
        let source = &self.settings.source_bucket;
        let dest = &self.settings.dest_bucket;
        let started_at = Utc::now();
        let start = Instant::now();

        info!(
            job_id = %self.settings.job_id,
            source_bucket = %source,
            dest_bucket = %dest,
            "{}",
            start_message(source, dest)
        );
        self.set_phase(JobPhase::Running).await;

        if let Err(err) = self.backend.convert(source, dest).await {
            self.set_phase(JobPhase::Failed).await;
            CONVERTER_JOBS_TOTAL
                .with_label_values(&[&self.settings.job_id, "failed"])
                .inc();
            error!(job_id = %self.settings.job_id, error = %err, "Conversion failed");
            return Err(err);
        }

        info!(job_id = %self.settings.job_id, "Conversion complete.");
        self.set_phase(JobPhase::Complete).await;
        CONVERTER_JOBS_TOTAL
            .with_label_values(&[&self.settings.job_id, "complete"])
            .inc();

        Ok(JobReport {
            job_id: self.settings.job_id.clone(),
            source_bucket: source.clone(),
            dest_bucket: dest.clone(),
            started_at,
            finished_at: Utc::now(),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    async fn set_phase(&self, phase: JobPhase) {
        *self.status.write().await = phase;
        CONVERTER_JOB_PHASE
            .with_label_values(&[&self.settings.job_id])
            .set(phase.gauge_value());
    }
}

pub fn start_message(source_bucket: &str, dest_bucket: &str) -> String {
    format!("Starting conversion job from {source_bucket} to {dest_bucket}...")
}
