use axum::{
    routing::{get, post},
    Router,
};
use seo_core::Result;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/articles", get(handlers::list_articles).post(handlers::create_article))
        .route("/api/articles/:id", get(handlers::get_article).delete(handlers::delete_article))
        .route("/api/articles/:id/load", post(handlers::load_article))
        .route("/api/export", get(handlers::export_articles))
        .route("/api/import", post(handlers::import_articles))
        .route("/api/draft", get(handlers::get_draft).put(handlers::put_draft))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/deepen", post(handlers::deepen))
        .layer(cors)
        .with_state(state)
}

/// Serves the API until `shutdown` resolves, then closes the session so the
/// draft is written and the autosave timer stops.
pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let session = state.session.clone();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    session.shutdown();
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use seo_core::{Error, Result};
}
