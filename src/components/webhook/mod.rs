mod handlers;

pub use handlers::{health_handler, should_sync, webhook_handler, RESOURCE_STATE_HEADER};

use crate::context::AppContext;
use crate::error::{Error, SyncResult};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the router
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Bind the configured port and serve until `shutdown` resolves
pub async fn serve<F>(ctx: AppContext, shutdown: F) -> SyncResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], ctx.config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Webhook server listening on port {}", ctx.config.port);

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(Error::from)
}
