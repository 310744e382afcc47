use std::sync::Arc;

use aide::axum::{
    ApiRouter,
    routing::{get, post},
};
use aide::openapi::{Info, OpenApi};
use aide::scalar::Scalar;
use axum::{
    Extension, Json, Router,
    http::{HeaderValue, Method, header},
    routing::get as axum_get,
};
use tower_http::cors::CorsLayer;

use crate::{config::HttpConfig, service::Pipeline};

use super::handlers::{health, update_data};
use super::types::RouterState;

/// Browser access for the configured origins, `None` when CORS is off
fn cors_layer(http: &HttpConfig) -> Option<CorsLayer> {
    if http.allows_any_origin() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = http
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring CORS origin {origin:?}: {e}");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

pub(super) fn build_router(pipeline: Arc<Pipeline>) -> Router {
    let cors = cors_layer(&pipeline.config().http);
    let mut api = OpenApi {
        info: Info {
            title: "PCSO Lotto Data API".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            ..Default::default()
        },
        ..Default::default()
    };

    let app = ApiRouter::new()
        .route(
            "/api/docs",
            Scalar::new("/api/docs/openapi.json")
                .with_title("PCSO Lotto API Docs")
                .axum_route(),
        )
        .api_route("/api/health", get(health))
        .api_route("/api/update-data", post(update_data))
        .with_state(RouterState { pipeline })
        .finish_api(&mut api);

    let api = Arc::new(api);
    let app = app
        .route("/api/docs/openapi.json", axum_get(serve_openapi))
        .layer(Extension(api));

    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

async fn serve_openapi(Extension(api): Extension<Arc<OpenApi>>) -> Json<OpenApi> {
    Json((*api).clone())
}
