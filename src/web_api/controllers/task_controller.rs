use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::{
    app_state::SharedState, delete_task_response::DeleteTaskResponse, extract::JsonBody, task::Task,
    task_error::TaskError, task_fields::TaskFields, user::User,
};

pub struct TaskController {}

impl TaskController {
    pub async fn create(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        JsonBody(body): JsonBody<TaskFields>,
    ) -> Result<(StatusCode, Json<Task>), TaskError> {
        let task = state.tasks.create(user.id, body)?;
        Ok((StatusCode::CREATED, Json(task)))
    }

    pub async fn list(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
    ) -> Result<Json<Vec<Task>>, TaskError> {
        state.tasks.list(user.id).map(Json)
    }

    pub async fn get(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        Path(id): Path<String>,
    ) -> Result<Json<Task>, TaskError> {
        state.tasks.get(user.id, &id).map(Json)
    }

    pub async fn update(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        Path(id): Path<String>,
        JsonBody(body): JsonBody<TaskFields>,
    ) -> Result<Json<Task>, TaskError> {
        state.tasks.update(user.id, &id, body).map(Json)
    }

    pub async fn delete(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        Path(id): Path<String>,
    ) -> Result<Json<DeleteTaskResponse>, TaskError> {
        let task = state.tasks.delete(user.id, &id)?;
        Ok(Json(DeleteTaskResponse::new(task)))
    }

    /// `/tasks/` with the id left off.
    pub async fn missing_id() -> TaskError {
        TaskError::Validation("Task id is required".to_string())
    }
}
