use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    app_state::SharedState,
    authentication::auth::{self, AuthError},
    extract::JsonBody,
    login_request::LoginRequest,
    login_status_response::LoginStatusResponse,
    message_response::MessageResponse,
    register_request::RegisterRequest,
    user::{normalize_email, User},
};

pub struct AuthenticationController {}

impl AuthenticationController {
    pub async fn register(
        State(state): State<SharedState>,
        JsonBody(body): JsonBody<RegisterRequest>,
    ) -> Result<Response, AuthError> {
        body.validate().map_err(AuthError::Invalid)?;

        let user = User::new(body)?;
        if !state.data_context.create_user(&user)? {
            return Err(AuthError::EmailTaken);
        }
        tracing::info!(user_id = %user.id, "user registered");

        Self::with_session(&state, &user, StatusCode::CREATED)
    }

    pub async fn login(
        State(state): State<SharedState>,
        JsonBody(body): JsonBody<LoginRequest>,
    ) -> Result<Response, AuthError> {
        if body.email.trim().is_empty() || body.password.is_empty() {
            return Err(AuthError::Invalid("Email and password are required".to_string()));
        }

        let user = state
            .data_context
            .get_user_by_email(&normalize_email(&body.email))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.verify_password(&body.password) {
            tracing::warn!(user_id = %user.id, "failed login");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Self::with_session(&state, &user, StatusCode::OK)
    }

    pub async fn logout(State(state): State<SharedState>) -> Result<Response, AuthError> {
        let cookie = auth::expired_session_cookie(&state.settings)?;
        Ok((
            StatusCode::OK,
            [(header::SET_COOKIE, cookie)],
            Json(MessageResponse::new("Logged out successfully")),
        )
            .into_response())
    }

    pub async fn status(
        State(state): State<SharedState>,
        headers: HeaderMap,
    ) -> Result<Json<LoginStatusResponse>, AuthError> {
        auth::authenticate(&state, &headers)?;
        Ok(Json(LoginStatusResponse { logged_in: true }))
    }

    fn with_session(state: &SharedState, user: &User, status: StatusCode) -> Result<Response, AuthError> {
        let token = auth::create_token(user, &state.settings)?;
        let cookie = auth::session_cookie(&token, &state.settings)?;
        Ok((status, [(header::SET_COOKIE, cookie)], Json(user.to_get_dto())).into_response())
    }
}
