use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod error;
pub mod handlers;
pub mod profiles;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/news", get(handlers::news))
        .route("/api/everything", get(handlers::everything))
        .route("/api/international", get(handlers::international))
        .route("/api/profiles", get(handlers::list_profiles))
        .route("/api/profiles/:name", get(handlers::profile))
        .route("/api/filter", post(handlers::filter_articles))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves the app until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 listening on {}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await
}

pub mod prelude {
    pub use crate::profiles::{Outcome, ProfileOverrides, RouteProfile};
    pub use crate::AppState;
    pub use ng_core::{Article, Error, Result};
}
