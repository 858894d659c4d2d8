use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, Encoder, HistogramVec, IntCounterVec,
    IntGaugeVec, TextEncoder,
};

pub static CONVERTER_JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "converter_jobs_total",
        "Total number of conversion jobs by outcome",
        &["job_id", "outcome"]
    )
    .expect("register converter_jobs_total")
});

pub static CONVERTER_CONVERSION_TIME_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "converter_conversion_time_seconds",
        "Histogram of conversion backend durations",
        &["job_id"],
        vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]
    )
    .expect("register converter_conversion_time_seconds")
});

pub static CONVERTER_JOB_PHASE: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "converter_job_phase",
        "Current job phase (0 pending, 1 running, 2 complete, 3 failed)",
        &["job_id"]
    )
    .expect("register converter_job_phase")
});

pub fn gather_metrics() -> String {
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if TextEncoder::new().encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
