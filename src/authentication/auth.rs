use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    app_state::SharedState, data_context::StoreError, message_response::MessageResponse, settings::Settings,
    user::User,
};

pub const SESSION_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authorized, no token")]
    MissingSession,
    #[error("Not authorized, token failed")]
    InvalidSession,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Invalid(String),
    #[error("User already exists")]
    EmailTaken,
    #[error("auth: {0}")]
    Infrastructure(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingSession | AuthError::InvalidSession | AuthError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Invalid(_) | AuthError::EmailTaken => StatusCode::BAD_REQUEST,
            AuthError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::Infrastructure(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AuthError::Infrastructure(e.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AuthError::Infrastructure(e.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AuthError::Infrastructure(detail) => {
                tracing::error!(%detail, "authentication failed internally");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(MessageResponse::new(message))).into_response()
    }
}

// ── Tokens ─────────────────────────────────────────────────────

pub fn create_token(user: &User, settings: &Settings) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiry = now + Duration::minutes(i64::from(settings.jwt_expiration_in_minutes));

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        exp: expiry.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, settings: &Settings) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

// ── Cookies ────────────────────────────────────────────────────

pub fn session_cookie(token: &str, settings: &Settings) -> Result<HeaderValue, AuthError> {
    let max_age = i64::from(settings.jwt_expiration_in_minutes) * 60;
    cookie_header(token, max_age, settings.secure_cookies)
}

pub fn expired_session_cookie(settings: &Settings) -> Result<HeaderValue, AuthError> {
    cookie_header("", 0, settings.secure_cookies)
}

fn cookie_header(value: &str, max_age: i64, secure: bool) -> Result<HeaderValue, AuthError> {
    let mut cookie = format!("{SESSION_COOKIE}={value}; HttpOnly; Path=/; SameSite=Strict; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| AuthError::Infrastructure(e.to_string()))
}

/// Session token from `Authorization: Bearer …`, else from the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

/// Resolve the caller's session to a stored user.
pub fn authenticate(state: &SharedState, headers: &HeaderMap) -> Result<User, AuthError> {
    let token = token_from_headers(headers).ok_or(AuthError::MissingSession)?;
    let claims = verify_token(token, &state.settings).map_err(|_| AuthError::InvalidSession)?;
    state
        .data_context
        .get_user(claims.sub)?
        .ok_or(AuthError::InvalidSession)
}

pub async fn auth_middleware(
    State(state): State<SharedState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticate(&state, request.headers()).map_err(|e| {
        tracing::warn!(path = %request.uri().path(), error = %e, "request rejected");
        e
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
