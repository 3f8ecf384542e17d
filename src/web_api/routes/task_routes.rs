use axum::{middleware, routing::get, Router};

use crate::{app_state::SharedState, authentication::auth::auth_middleware, task_controller::TaskController};

pub const ROUTER_PATH: &str = "/tasks";

pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route(ROUTER_PATH, get(TaskController::list).post(TaskController::create))
        .route(
            format!("{}/:id", ROUTER_PATH).as_str(),
            get(TaskController::get)
                .patch(TaskController::update)
                .delete(TaskController::delete),
        )
        .route(
            format!("{}/", ROUTER_PATH).as_str(),
            get(TaskController::missing_id)
                .patch(TaskController::missing_id)
                .delete(TaskController::missing_id),
        )
        .layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware))
        .with_state(app_state)
}
