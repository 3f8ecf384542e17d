use axum::{extract::State, Extension, Json};

use crate::{
    app_state::SharedState, authentication::auth::AuthError, extract::JsonBody, register_request::is_plausible_email,
    user::User, user_edit_request::UserEditRequest, user_get_response::UserGetResponse,
};

pub struct UserController {}

impl UserController {
    pub async fn get(Extension(user): Extension<User>) -> Json<UserGetResponse> {
        Json(user.to_get_dto())
    }

    pub async fn edit(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        JsonBody(body): JsonBody<UserEditRequest>,
    ) -> Result<Json<UserGetResponse>, AuthError> {
        if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AuthError::Invalid("Name is required".to_string()));
        }
        if body.email.as_deref().is_some_and(|e| !is_plausible_email(e)) {
            return Err(AuthError::Invalid("Invalid email address".to_string()));
        }

        let edited = user.edit(body);
        if !state.data_context.update_user(&edited)? {
            return Err(AuthError::EmailTaken);
        }
        tracing::info!(user_id = %edited.id, "profile updated");
        Ok(Json(edited.to_get_dto()))
    }
}
