use crate::error::{DirectoryError, Result};
use crate::queries::QueryService;
use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub queries: Arc<QueryService>,
}

/// Maps query failures to HTTP responses: bad client input is 400,
/// everything else is 500. "No results" never reaches this path.
struct ApiError(DirectoryError);

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0 {
            DirectoryError::InvalidDay(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "bizhours",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn businesses_by_category(
    State(state): State<AppState>,
    Path(category_name): Path<String>,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let businesses = state.queries.by_category(&category_name).await?;
    Ok(Json(businesses))
}

async fn businesses_by_day(
    State(state): State<AppState>,
    Path(day_of_week): Path<String>,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let businesses = state.queries.by_day(&day_of_week).await?;
    Ok(Json(businesses))
}

async fn businesses_open_now(
    State(state): State<AppState>,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let businesses = state.queries.open_at(Utc::now()).await?;
    Ok(Json(businesses))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/businesses/category/:category_name", get(businesses_by_category))
        .route("/businesses/day/:day_of_week", get(businesses_by_day))
        .route("/businesses/open-now", get(businesses_open_now))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

/// Starts the read-only query API and serves until shutdown.
pub async fn run_server(addr: SocketAddr, queries: Arc<QueryService>) -> Result<()> {
    let app = router(AppState { queries });

    info!("Query API listening on http://{}", addr);
    println!("🚀 Query API running on http://{}", addr);
    println!("   GET /businesses/category/:name");
    println!("   GET /businesses/day/:day");
    println!("   GET /businesses/open-now");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|e| DirectoryError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    #[tokio::test]
    async fn router_builds_with_empty_storage() {
        let queries = Arc::new(QueryService::new(Arc::new(InMemoryStorage::new())));
        let _ = router(AppState { queries });
    }
}
