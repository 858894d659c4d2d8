use std::future::{pending, Future};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::backend::build_backend;
use crate::config::Settings;
use crate::error::JobError;
use crate::job::{ConversionJob, JobStatusHandle};
use crate::metrics::gather_metrics;
use crate::types::JobPhase;

pub async fn run(settings: Settings) -> Result<()> {
    run_until(settings, ctrl_c()).await
}

/// Runs the job unless `shutdown` resolves first, in which case the job is interrupted.
pub async fn run_until(settings: Settings, shutdown: impl Future<Output = ()>) -> Result<()> {
    let settings = Arc::new(settings);
    let backend = build_backend(&settings);
    let job = ConversionJob::new(settings.clone(), backend);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let http_server = match settings.http_port {
        Some(port) => {
            let router = status_router(settings.job_id.clone(), job.status());
            Some(spawn_server(router, port, shutdown_tx.subscribe()).await?)
        }
        None => None,
    };

    let outcome = tokio::select! {
        _ = shutdown => {
            info!(job_id = %job.settings().job_id, "Shutdown signal received");
            Err(JobError::Interrupted)
        }
        res = job.run() => res,
    };

    let _ = shutdown_tx.send(());
    if let Some(server) = http_server {
        server.await.ok();
    }

    match outcome {
        Ok(report) => {
            info!(
                job_id = %report.job_id,
                elapsed_ms = report.elapsed_ms,
                finished_at = %report.finished_at,
                "Conversion job finished"
            );
            Ok(())
        }
        Err(err) => {
            error!(job_id = %settings.job_id, reason = err.label(), error = %err, "Conversion job did not finish");
            Err(err.into())
        }
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed the job runs to completion.
async fn ctrl_c() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "Unable to listen for Ctrl-C; job cannot be interrupted");
        pending::<()>().await;
    }
}

pub fn status_router(job_id: String, status: JobStatusHandle) -> Router {
    Router::new()
        .route(
            "/health",
            get(move || {
                let job_id = job_id.clone();
                let status = status.clone();
                async move {
                    let phase = *status.read().await;
                    Json(health_body(&job_id, phase))
                }
            }),
        )
        .route(
            "/metrics",
            get(|| async { ([(CONTENT_TYPE, prometheus::TEXT_FORMAT)], gather_metrics()).into_response() }),
        )
}

async fn spawn_server(app: Router, port: u16, mut shutdown: broadcast::Receiver<()>) -> Result<JoinHandle<()>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind status listener on {addr}"))?;
    info!(port, "Status server listening");
    Ok(tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
            .ok();
    }))
}

fn health_body(job_id: &str, phase: JobPhase) -> serde_json::Value {
    serde_json::json!({ "status": phase.as_str(), "jobId": job_id })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tokio::sync::RwLock;
    use tower::util::ServiceExt;

    use super::*;
    use crate::metrics::CONVERTER_JOB_PHASE;

    fn settings(job_id: &str) -> Settings {
        Settings::from_vars(vec![("JOB_ID".to_string(), job_id.to_string())]).unwrap()
    }

    #[test]
    fn health_reports_phase_and_job() {
        let body = health_body("job-7", JobPhase::Running);
        assert_eq!(body["status"], "running");
        assert_eq!(body["jobId"], "job-7");
    }

    #[tokio::test(start_paused = true)]
    async fn run_returns_normally_without_http() {
        let start = tokio::time::Instant::now();
        run_until(settings("app-run"), pending()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_before_completion_interrupts_job() {
        let start = tokio::time::Instant::now();
        let err = run_until(settings("app-interrupted"), tokio::time::sleep(Duration::from_secs(1)))
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<JobError>(), Some(JobError::Interrupted)));
        assert!(start.elapsed() < Duration::from_secs(5));
        let phase = CONVERTER_JOB_PHASE
            .with_label_values(&["app-interrupted"])
            .get();
        assert_eq!(phase, JobPhase::Running.gauge_value());
    }

    #[tokio::test]
    async fn health_route_reports_current_phase() {
        let status = Arc::new(RwLock::new(JobPhase::Running));
        let app = status_router("job-health".to_string(), status.clone());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "running");
        assert_eq!(body["jobId"], "job-health");
    }

    #[tokio::test]
    async fn metrics_route_serves_prometheus_text() {
        CONVERTER_JOB_PHASE
            .with_label_values(&["job-metrics-route"])
            .set(JobPhase::Complete.gauge_value());
        let app = status_router("job-metrics-route".to_string(), Arc::new(RwLock::new(JobPhase::Complete)));

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            prometheus::TEXT_FORMAT
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("converter_job_phase"));
        assert!(text.contains("job-metrics-route"));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = status_router("job-404".to_string(), Arc::new(RwLock::new(JobPhase::Pending)));
        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn port_in_use_returns_error() {
        let holder = tokio::net::TcpListener::bind("0.0.0.0:0").await.unwrap();
        let port = holder.local_addr().unwrap().port();
        let (_tx, rx) = broadcast::channel::<()>(1);
        let app = status_router("job-busy".to_string(), Arc::new(RwLock::new(JobPhase::Pending)));

        let err = spawn_server(app, port, rx).await.unwrap_err();
        assert!(err.to_string().contains("bind status listener"));
    }
}
