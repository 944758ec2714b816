//! HTTP trigger surface for external schedulers.

use crate::runner::DigestRunner;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub const WELCOME: &str = "Welcome to TickerHug! 🚀";
pub const RUN_OK: &str = "Cron job executed successfully.";
pub const RUN_FAILED: &str = "Cron job failed.";

/// Create the trigger router.
pub fn create_router(runner: Arc<DigestRunner>) -> Router {
    Router::new()
        .route("/", get(welcome_handler))
        .route("/health", get(health_handler))
        .route("/run-cron", get(run_cron_handler).post(run_cron_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(runner)
}

async fn welcome_handler() -> &'static str {
    WELCOME
}

/// Health check handler.
async fn health_handler() -> &'static str {
    "OK"
}

/// Run one digest cycle. Fetch failures are absorbed into the message;
/// only a failed dispatch answers 500.
async fn run_cron_handler(State(runner): State<Arc<DigestRunner>>) -> (StatusCode, &'static str) {
    info!("Digest run triggered over HTTP");
    match runner.run_once().await {
        Ok(_) => (StatusCode::OK, RUN_OK),
        Err(e) => {
            error!(error = %e, "Triggered digest run failed");
            (StatusCode::INTERNAL_SERVER_ERROR, RUN_FAILED)
        }
    }
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve<F>(
    runner: Arc<DigestRunner>,
    port: u16,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(runner);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Trigger server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::tests::{runner_with, RecordingChannel};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    async fn call(router: Router, method: Method, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn offline_router(channel: Arc<RecordingChannel>) -> Router {
        // Port 9 refuses connections, so every fetch falls back
        let runner = runner_with("http://127.0.0.1:9", "http://127.0.0.1:9/", channel);
        create_router(Arc::new(runner))
    }

    #[tokio::test]
    async fn test_welcome_and_health() {
        let router = offline_router(RecordingChannel::new(false, 0));
        assert_eq!(
            call(router.clone(), Method::GET, "/").await,
            (StatusCode::OK, WELCOME.to_string())
        );
        assert_eq!(
            call(router, Method::GET, "/health").await,
            (StatusCode::OK, "OK".to_string())
        );
    }

    #[tokio::test]
    async fn test_run_cron_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v5/account/balance")
            .with_status(200)
            .with_body(r#"{"code":"0","msg":"","data":[{"totalEq":"10"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/v5/market/ticker")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let channel = RecordingChannel::new(false, 0);
        let runner = runner_with(&server.url(), "http://127.0.0.1:9/", channel.clone());
        let router = create_router(Arc::new(runner));

        assert_eq!(
            call(router, Method::GET, "/run-cron").await,
            (StatusCode::OK, RUN_OK.to_string())
        );
        let sent = channel.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Eq:$10\nError fetching prices.\n"));
    }

    #[tokio::test]
    async fn test_run_cron_dispatch_failure_is_500() {
        let channel = RecordingChannel::new(true, 0);
        let router = offline_router(channel.clone());

        assert_eq!(
            call(router, Method::POST, "/run-cron").await,
            (StatusCode::INTERNAL_SERVER_ERROR, RUN_FAILED.to_string())
        );
        assert_eq!(channel.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let router = offline_router(RecordingChannel::new(false, 0));
        let (status, _) = call(router, Method::GET, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
