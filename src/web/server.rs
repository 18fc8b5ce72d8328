//! HTTP server implementation

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::handlers::{
    add_record, delete_record, get_record, stats_handler, update_record, AppState,
};
use crate::store::RecordStorage;

/// Build the application router for a store
pub fn router(store: Arc<dyn RecordStorage>) -> Router {
    let state: AppState = store;

    Router::new()
        .route(
            "/records/*key",
            get(get_record)
                .post(add_record)
                .put(update_record)
                .delete(delete_record),
        )
        .route("/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the web server until it fails
pub async fn run_web_server(addr: &str, store: Arc<dyn RecordStorage>) -> anyhow::Result<()> {
    let app = router(store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Record API available at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
