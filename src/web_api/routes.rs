pub mod authentication_routes;
pub mod health_routes;
pub mod task_routes;
pub mod user_routes;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{app_state::SharedState, message_response::MessageResponse, settings::Settings};

pub const API_PREFIX: &str = "/api/v1";

pub fn map_routes(app_state: SharedState) -> Router {
    let api = Router::new()
        .merge(health_routes::get_router())
        .merge(authentication_routes::get_router(app_state.clone()))
        .merge(user_routes::get_router(app_state.clone()))
        .merge(task_routes::get_router(app_state.clone()))
        .fallback(unknown_route);

    let mut router = Router::new().nest(API_PREFIX, api);
    if let Some(dir) = &app_state.settings.static_dir {
        router = router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    router
        .layer(cors_layer(&app_state.settings))
        .layer(TraceLayer::new_for_http())
}

async fn unknown_route() -> (StatusCode, Json<MessageResponse>) {
    (StatusCode::NOT_FOUND, Json(MessageResponse::new("Route not found")))
}

/// Credentialed CORS for the configured frontend origin only.
fn cors_layer(settings: &Settings) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match HeaderValue::from_str(&settings.client_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(client_url = %settings.client_url, error = %e, "client_url is not a valid origin, CORS disabled");
            layer
        }
    }
}
