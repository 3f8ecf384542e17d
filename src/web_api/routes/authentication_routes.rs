use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::SharedState, authentication_controller::AuthenticationController};

pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route("/register", post(AuthenticationController::register))
        .route("/login", post(AuthenticationController::login))
        .route("/logout", get(AuthenticationController::logout))
        .route("/login-status", get(AuthenticationController::status))
        .with_state(app_state)
}
