use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use linked_art_types::{CandidatesResponse, HealthResponse};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ResolveError;
use crate::service::GatewayService;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Comma-separated dataset names
    pub datasets: String,
    pub entity_name: String,
    #[serde(default = "default_lang")]
    pub name_lang: String,
    #[serde(default)]
    pub entity_type: String,
}

#[derive(Debug, Deserialize)]
pub struct GetParams {
    pub dataset: String,
    pub identifier: String,
    #[serde(default)]
    pub entity_type: String,
}

fn default_lang() -> String {
    "en".to_string()
}

pub fn create_router(service: Arc<GatewayService>) -> Router {
    Router::new()
        .route("/api/basic/search_by_name", get(search_by_name))
        .route("/api/basic/get", get(get_by_id))
        .route("/api/health", get(health))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(service)
}

async fn search_by_name(
    State(service): State<Arc<GatewayService>>,
    Query(params): Query<SearchParams>,
) -> Json<CandidatesResponse> {
    Json(
        service
            .search_by_name(
                &params.datasets,
                &params.entity_name,
                &params.name_lang,
                &params.entity_type,
            )
            .await,
    )
}

async fn get_by_id(
    State(service): State<Arc<GatewayService>>,
    Query(params): Query<GetParams>,
) -> Response {
    match service
        .get_by_id(&params.dataset, &params.identifier, &params.entity_type)
        .await
    {
        Ok(found) => Json(found).into_response(),
        Err(error @ ResolveError::UnknownDataset(_)) => {
            tracing::warn!(dataset = %params.dataset, "Rejected unknown dataset");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": error.to_string() })),
            )
                .into_response()
        }
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": error.to_string() })),
        )
            .into_response(),
    }
}

async fn health(State(service): State<Arc<GatewayService>>) -> Json<HealthResponse> {
    Json(service.health())
}
