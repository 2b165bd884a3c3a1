// File: modbot-core/src/http.rs

use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use http::StatusCode;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::Error;
use crate::services::ingestion::IngestionPipeline;

pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook/telegram";

/// Webhook route plus a health probe. The webhook always answers `200 OK`;
/// the upstream retries on anything else, and a retried delivery must not
/// turn into a second violation.
pub fn webhook_router(pipeline: Arc<IngestionPipeline>, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(handle_update))
        .route("/health", get(|| async { "OK" }))
        .with_state(pipeline)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn handle_update(
    State(pipeline): State<Arc<IngestionPipeline>>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let ack = pipeline.ingest(&body).await;
    debug!("Webhook delivery acknowledged: {:?}", ack);
    (StatusCode::OK, "OK")
}

/// Serves `router` until `shutdown` resolves; in-flight requests are drained.
pub async fn serve<F>(addr: SocketAddr, router: Router, shutdown: F) -> Result<(), Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!("Webhook server listening on http://{}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Webhook server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::Request;
    use tower::ServiceExt;

    use crate::services::{EventContext, IngestionConfig};
    use crate::services::commands::builtin_registry;
    use crate::test_utils::RecordingPlatform;

    fn router() -> Router {
        let platform = Arc::new(RecordingPlatform::new());
        let context = EventContext::in_memory(platform);
        let registry = Arc::new(builtin_registry().unwrap());
        let pipeline = Arc::new(IngestionPipeline::new(context, registry, IngestionConfig::default()));
        webhook_router(pipeline, DEFAULT_WEBHOOK_PATH)
    }

    #[tokio::test]
    async fn test_webhook_acknowledges_garbage() {
        let response = router()
            .oneshot(
                Request::post(DEFAULT_WEBHOOK_PATH)
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_webhook_acknowledges_update_without_message() {
        let response = router()
            .oneshot(
                Request::post(DEFAULT_WEBHOOK_PATH)
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"update_id": 1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
