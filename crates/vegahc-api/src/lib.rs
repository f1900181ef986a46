//! vegahc-api — HTTP exposure of the latest health verdict.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Latest verdict; 200 when healthy, 500 otherwise |
//!
//! ```text
//! 200 {"status":"HEALTHY","reasons":[]}
//! 500 {"status":"UNHEALTHY","reasons":["core http endpoint is not online"]}
//! 500 {"status":"UNKNOWN","reasons":[]}
//! ```

pub mod handlers;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;
use vegahc_monitor::ResultStore;

/// Shared state for handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: ResultStore,
}

/// Build the status router.
pub fn build_router(store: ResultStore) -> Router {
    Router::new()
        .route("/", get(handlers::health_status))
        .with_state(ApiState { store })
}

/// Serve the status router on `listener` until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    store: ResultStore,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "health check server listening");

    axum::serve(listener, build_router(store))
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    info!("health check server stopped");
    Ok(())
}
