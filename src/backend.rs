use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::Settings;
use crate::error::JobError;
use crate::metrics::CONVERTER_CONVERSION_TIME_SECONDS;

#[async_trait]
pub trait ConversionBackend: Send + Sync {
    async fn convert(&self, source_bucket: &str, dest_bucket: &str) -> Result<(), JobError>;
}

/// Stands in for the conversion by waiting out a fixed duration.
pub struct SimulatedBackend {
    work: Duration,
}

impl SimulatedBackend {
    pub fn new(work: Duration) -> Self {
        Self { work }
    }
}

#[async_trait]
impl ConversionBackend for SimulatedBackend {
    async fn convert(&self, _source_bucket: &str, _dest_bucket: &str) -> Result<(), JobError> {
        sleep(self.work).await;
        Ok(())
    }
}

pub struct InstrumentedBackend {
    delegate: Arc<dyn ConversionBackend>,
    job_id: String,
}

impl InstrumentedBackend {
    pub fn new(delegate: Arc<dyn ConversionBackend>, job_id: String) -> Self {
        Self { delegate, job_id }
    }

    pub async fn convert(&self, source_bucket: &str, dest_bucket: &str) -> Result<Duration, JobError> {
        let start = Instant::now();
        self.delegate.convert(source_bucket, dest_bucket).await?;
        let duration = start.elapsed();
        CONVERTER_CONVERSION_TIME_SECONDS
            .with_label_values(&[&self.job_id])
            .observe(duration.as_secs_f64());
        debug!(job_id = %self.job_id, latency_ms = duration.as_secs_f64() * 1000.0, "Conversion backend finished");
        Ok(duration)
    }
}

pub fn build_backend(settings: &Settings) -> InstrumentedBackend {
    let delegate: Arc<dyn ConversionBackend> = Arc::new(SimulatedBackend::new(settings.simulated_work));
    InstrumentedBackend::new(delegate, settings.job_id.clone())
}
